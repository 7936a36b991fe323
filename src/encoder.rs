//! Translation of flag definitions into optimizer search-space tokens.
//!
//! [`encode_flag_for_optimizer`] picks one of three forms for a flag:
//!
//! | Flag declares | Token |
//! |---|---|
//! | non-empty `choices` | [`SearchSpace::Choices`]: the raw choice values, in order |
//! | a `min`/`max` range | [`SearchSpace::Function`]: `dist[low:high]` or `dist[low:high:initial]` |
//! | neither | [`SearchSpace::Fixed`]: the value, unchanged |
//!
//! Choices win over a range when a flag declares both.
//!
//! # Example
//!
//! ```
//! use skopt_ops::encoder::encode_flag_for_optimizer;
//! use skopt_ops::flag::FlagDef;
//! use skopt_ops::value::FlagValue;
//!
//! let flag = FlagDef::new().with_range(0.0, 1.0);
//! let token = encode_flag_for_optimizer(&flag, Some(&FlagValue::Float(0.3)));
//! assert_eq!(token.to_string(), "uniform[0.0:1.0:0.3]");
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::flag::{Bounds, FlagDef};
use crate::value::{FlagValue, encode, encode_list, encode_opt};

/// Reference to [`encode_flag_for_optimizer`] as carried in operation defaults.
pub const ENCODER_REF: &str = "skopt:encode_flag_for_optimizer";

/// Signature shared by flag encoders.
pub type EncodeFn = fn(&FlagDef, Option<&FlagValue>) -> SearchSpace;

/// A distribution function over a numeric range, e.g. `log-uniform[1e-5:0.1:0.01]`.
///
/// Bounds and the initial value are stored in their encoded form. The
/// delimiter is `:` with no escaping, so encoded parts must not contain one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchFunction {
    /// Distribution name.
    pub name: String,
    /// Encoded lower bound.
    pub low: String,
    /// Encoded upper bound.
    pub high: String,
    /// Encoded initial value hint.
    pub initial: Option<String>,
}

impl SearchFunction {
    /// Parses `name[low:high]` or `name[low:high:initial]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSearchFunction`] if the string does not have
    /// that shape.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSearchFunction(s.to_owned());
        let (name, rest) = s.split_once('[').ok_or_else(invalid)?;
        let args = rest.strip_suffix(']').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        let parts: Vec<&str> = args.split(':').collect();
        let (low, high, initial) = match parts.as_slice() {
            [low, high] => (*low, *high, None),
            [low, high, initial] => (*low, *high, Some(*initial)),
            _ => return Err(invalid()),
        };
        if low.is_empty() || high.is_empty() || initial.is_some_and(str::is_empty) {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_owned(),
            low: low.to_owned(),
            high: high.to_owned(),
            initial: initial.map(str::to_owned),
        })
    }
}

impl FromStr for SearchFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SearchFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}:{}", self.name, self.low, self.high)?;
        if let Some(initial) = &self.initial {
            write!(f, ":{initial}")?;
        }
        f.write_str("]")
    }
}

impl Serialize for SearchFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The search-space token passed to an optimizer for one flag.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchSpace {
    /// Sample from these values, in declaration order.
    Choices(Vec<FlagValue>),
    /// Sample from a distribution over a numeric range.
    Function(SearchFunction),
    /// Not searched; the optimizer uses this value as is.
    Fixed(Option<FlagValue>),
}

impl SearchSpace {
    /// Short name of the token form, used in log events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SearchSpace::Choices(_) => "choices",
            SearchSpace::Function(_) => "function",
            SearchSpace::Fixed(_) => "fixed",
        }
    }
}

impl fmt::Display for SearchSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchSpace::Choices(values) => f.write_str(&encode_list(values)),
            SearchSpace::Function(func) => fmt::Display::fmt(func, f),
            SearchSpace::Fixed(value) => f.write_str(&encode_opt(value.as_ref())),
        }
    }
}

/// Encodes a flag for the optimizer's search space.
///
/// `value` is the flag's current value. For a ranged flag it becomes the
/// initial hint; for a fixed flag it is returned unchanged. Choices are
/// returned without their descriptions and ignore `value`.
///
/// Bounds are not checked for order; call [`FlagDef::validate`] first to
/// reject `min > max`.
#[must_use]
pub fn encode_flag_for_optimizer(flag: &FlagDef, value: Option<&FlagValue>) -> SearchSpace {
    if !flag.choices().is_empty() {
        return SearchSpace::Choices(flag.choices().iter().map(|c| c.value.clone()).collect());
    }
    if let Some(bounds) = flag.bounds() {
        return SearchSpace::Function(encode_function(flag.distribution_or_default(), bounds, value));
    }
    SearchSpace::Fixed(value.cloned())
}

fn encode_function(name: &str, bounds: &Bounds, value: Option<&FlagValue>) -> SearchFunction {
    SearchFunction {
        name: name.to_owned(),
        low: encode(&bounds.min),
        high: encode(&bounds.max),
        initial: value.map(encode),
    }
}

/// Looks up the encoder named by an operation's `flag-encoder` reference.
#[must_use]
pub fn resolve(reference: &str) -> Option<EncodeFn> {
    match reference {
        ENCODER_REF => Some(encode_flag_for_optimizer),
        _ => None,
    }
}
