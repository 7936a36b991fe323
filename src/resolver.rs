//! Resolution of user-typed operation specs such as `gp` or `skopt:forest`.
//!
//! | Spec | Operation |
//! |------|-----------|
//! | `random`, `skopt:random` | [`OperationName::Random`] |
//! | `gp`, `skopt:gp`, `bayesian`, `gaussian` | [`OperationName::Gp`] |
//! | `forest`, `skopt:forest` | [`OperationName::Forest`] |
//! | `gbrt`, `skopt:gbrt` | [`OperationName::Gbrt`] |
//!
//! Any other spec resolves to `None`, which lets a host move on to its next
//! resolver.
//!
//! # Example
//!
//! ```
//! use skopt_ops::resolver::{OperationName, OperationResolver};
//!
//! let resolver = OperationResolver::builtin().unwrap();
//! let (model, op) = resolver.resolve("bayesian").unwrap();
//! assert_eq!(op, OperationName::Gp);
//! assert_eq!(model.operation(op).unwrap().name(), "gp");
//! assert!(resolver.resolve("grid").is_none());
//! ```

use core::fmt;
use std::sync::Arc;

use crate::catalog::{OperationCatalog, OperationDef};
use crate::error::Result;

/// Name of the model that owns the optimizer operations.
pub const MODEL_NAME: &str = "skopt";

/// The optimizer operations this crate declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationName {
    /// Random search.
    Random,
    /// Bayesian optimization with Gaussian processes.
    Gp,
    /// Sequential optimization with decision trees.
    Forest,
    /// Sequential optimization with gradient boosted regression trees.
    Gbrt,
}

impl OperationName {
    /// All operations, in declaration order.
    pub const ALL: [OperationName; 4] = [
        OperationName::Random,
        OperationName::Gp,
        OperationName::Forest,
        OperationName::Gbrt,
    ];

    /// Returns the catalog name of the operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OperationName::Random => "random",
            OperationName::Gp => "gp",
            OperationName::Forest => "forest",
            OperationName::Gbrt => "gbrt",
        }
    }

    /// Maps a recognized alias to its operation.
    #[must_use]
    pub fn from_alias(spec: &str) -> Option<Self> {
        match spec {
            "random" | "skopt:random" => Some(OperationName::Random),
            "gp" | "skopt:gp" | "bayesian" | "gaussian" => Some(OperationName::Gp),
            "forest" | "skopt:forest" => Some(OperationName::Forest),
            "gbrt" | "skopt:gbrt" => Some(OperationName::Gbrt),
            _ => None,
        }
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the model as reported to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRef {
    /// Where the model comes from; always `builtin`.
    pub source_type: &'static str,
    /// Package providing the model.
    pub package_name: &'static str,
    /// Version of that package.
    pub package_version: &'static str,
    /// Model name.
    pub model_name: &'static str,
}

impl Default for ModelRef {
    fn default() -> Self {
        Self {
            source_type: "builtin",
            package_name: env!("CARGO_PKG_NAME"),
            package_version: env!("CARGO_PKG_VERSION"),
            model_name: MODEL_NAME,
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}:{}",
            self.source_type, self.package_name, self.package_version, self.model_name
        )
    }
}

/// A lightweight handle on the shared catalog, returned by resolution.
#[derive(Clone, Debug)]
pub struct ModelProxy {
    reference: ModelRef,
    catalog: Arc<OperationCatalog>,
}

impl ModelProxy {
    /// Creates a handle on `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<OperationCatalog>) -> Self {
        Self {
            reference: ModelRef::default(),
            catalog,
        }
    }

    /// Returns the model name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.reference.model_name
    }

    /// Returns the model identity.
    #[must_use]
    pub fn reference(&self) -> &ModelRef {
        &self.reference
    }

    /// Returns the shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Looks up the definition of `op`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`](crate::Error::UnknownOperation) if
    /// the catalog does not declare `op`.
    pub fn operation(&self, op: OperationName) -> Result<&OperationDef> {
        self.catalog.lookup(op.as_str())
    }
}

/// Maps operation specs to a model handle and operation.
#[derive(Clone, Debug)]
pub struct OperationResolver {
    catalog: Arc<OperationCatalog>,
}

impl OperationResolver {
    /// Creates a resolver over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<OperationCatalog>) -> Self {
        Self { catalog }
    }

    /// Creates a resolver over the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalog fails to build.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Arc::new(OperationCatalog::build()?)))
    }

    /// Returns the catalog shared with every resolved [`ModelProxy`].
    #[must_use]
    pub fn catalog(&self) -> &Arc<OperationCatalog> {
        &self.catalog
    }

    /// Resolves `spec`, or returns `None` if it is not one of this
    /// resolver's aliases.
    #[must_use]
    pub fn resolve(&self, spec: &str) -> Option<(ModelProxy, OperationName)> {
        let Some(op) = OperationName::from_alias(spec) else {
            trace_debug!(spec, "no optimizer operation matches spec");
            return None;
        };
        trace_debug!(spec, operation = op.as_str(), "resolved optimizer operation");
        Some((ModelProxy::new(Arc::clone(&self.catalog)), op))
    }
}
