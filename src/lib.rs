#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Search-based optimizer operations for an experiment-tracking host.
//!
//! The crate declares four batch operations (Bayesian optimization with
//! Gaussian processes as `gp`, decision trees as `forest`, gradient boosted
//! regression trees as `gbrt`, and a `random` baseline) and produces the
//! search-space tokens their backends read. It does not run any optimizer
//! itself: the host launches the backend command of an operation and passes
//! one encoded token per flag.
//!
//! # Getting Started
//!
//! ```
//! use skopt_ops::prelude::*;
//!
//! let resolver = OperationResolver::builtin()?;
//! let (model, op) = resolver.resolve("bayesian").expect("gp alias");
//! let gp = model.operation(op)?;
//!
//! let token = gp.encode_flag("acq-func", None)?;
//! assert_eq!(token.to_string(), "[LCB, EI, PI, gp_hedge, EIps, PIps]");
//!
//! let lr = FlagDef::new().with_range(0.0, 1.0);
//! let token = encode_flag_for_optimizer(&lr, Some(&FlagValue::Float(0.3)));
//! assert_eq!(token.to_string(), "uniform[0.0:1.0:0.3]");
//! # Ok::<(), skopt_ops::Error>(())
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`OperationCatalog`](catalog::OperationCatalog) | Operation definitions with behavioral defaults filled in. |
//! | [`FlagDef`](flag::FlagDef) | A tunable flag: default, choices, range, distribution. |
//! | [`encode_flag_for_optimizer`](encoder::encode_flag_for_optimizer) | Flag → [`SearchSpace`](encoder::SearchSpace) token. |
//! | [`OperationResolver`](resolver::OperationResolver) | Alias → ([`ModelProxy`](resolver::ModelProxy), [`OperationName`](resolver::OperationName)). |
//! | [`FlagValue`](value::FlagValue) | Flag values and their canonical text encoding. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) for catalog builds, resolution and encoding | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod catalog;
pub mod encoder;
mod error;
pub mod flag;
pub mod resolver;
pub mod value;

pub use catalog::{BehavioralDefaults, OperationCatalog, OperationDef};
pub use encoder::{SearchFunction, SearchSpace, encode_flag_for_optimizer};
pub use error::{Error, Result};
pub use flag::{FlagChoice, FlagDef, FlagType};
pub use resolver::{ModelProxy, OperationName, OperationResolver};
pub use value::FlagValue;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use skopt_ops::prelude::*;
/// ```
pub mod prelude {
    pub use crate::catalog::{BehavioralDefaults, OperationCatalog, OperationDef};
    pub use crate::encoder::{SearchFunction, SearchSpace, encode_flag_for_optimizer};
    pub use crate::error::{Error, Result};
    pub use crate::flag::{FlagChoice, FlagDef, FlagType};
    pub use crate::resolver::{ModelProxy, ModelRef, OperationName, OperationResolver};
    pub use crate::value::FlagValue;
}
