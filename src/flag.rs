//! Flag definitions: the tunable parameters of an operation.
//!
//! A [`FlagDef`] describes what values a flag may take. The encoder in
//! [`crate::encoder`] turns it into a search-space token for the optimizer.
//!
//! # Example
//!
//! ```
//! use skopt_ops::flag::FlagDef;
//!
//! let lr = FlagDef::new()
//!     .with_default(0.01)
//!     .with_range(1e-5, 1e-1)
//!     .with_distribution("log-uniform");
//! assert!(lr.validate().is_ok());
//!
//! let acq = FlagDef::new()
//!     .with_choice("LCB", "Lower confidence bound")
//!     .with_choice("EI", "Negative expected improvement");
//! assert_eq!(acq.choices().len(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{FlagValue, encode};

/// Distribution used for ranged flags that do not name one.
pub const DEFAULT_DISTRIBUTION: &str = "uniform";

/// Declared type of a flag value.
///
/// The type is a hint for textual encoding by the host; it is not enforced here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagType {
    /// Free-form text.
    String,
    /// Integer or float.
    Number,
    /// Floating-point number.
    Float,
    /// Integer.
    Int,
    /// Boolean.
    Boolean,
    /// Filesystem path.
    Path,
    /// Filesystem path that must exist.
    ExistingPath,
}

/// One allowed value of a flag, with optional documentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagChoice {
    /// The raw value passed to the optimizer.
    pub value: FlagValue,
    /// Human-readable description, used only for help output.
    #[serde(default)]
    pub description: Option<String>,
}

impl FlagChoice {
    /// Creates an undocumented choice.
    #[must_use]
    pub fn new(value: impl Into<FlagValue>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }
}

/// An inclusive numeric range. Both ends are always present together.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Lower bound.
    pub min: FlagValue,
    /// Upper bound.
    pub max: FlagValue,
}

/// A tunable parameter of an operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlagDef {
    description: Option<String>,
    default: Option<FlagValue>,
    flag_type: Option<FlagType>,
    choices: Vec<FlagChoice>,
    bounds: Option<Bounds>,
    distribution: Option<String>,
}

impl FlagDef {
    /// Creates a flag with no default, no range and no choices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the help text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_type(mut self, flag_type: FlagType) -> Self {
        self.flag_type = Some(flag_type);
        self
    }

    /// Appends an allowed value.
    #[must_use]
    pub fn with_choice(mut self, value: impl Into<FlagValue>, description: impl Into<String>) -> Self {
        self.choices.push(FlagChoice {
            value: value.into(),
            description: Some(description.into()),
        });
        self
    }

    /// Replaces the allowed values.
    #[must_use]
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = FlagChoice>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }

    /// Sets the numeric range searched when the flag has no choices.
    #[must_use]
    pub fn with_range(mut self, min: impl Into<FlagValue>, max: impl Into<FlagValue>) -> Self {
        self.bounds = Some(Bounds {
            min: min.into(),
            max: max.into(),
        });
        self
    }

    /// Sets the sampling distribution used with the range.
    #[must_use]
    pub fn with_distribution(mut self, name: impl Into<String>) -> Self {
        self.distribution = Some(name.into());
        self
    }

    pub(crate) fn with_bounds(mut self, bounds: Option<Bounds>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Returns the help text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the default value.
    #[must_use]
    pub fn default_value(&self) -> Option<&FlagValue> {
        self.default.as_ref()
    }

    /// Returns the declared type.
    #[must_use]
    pub fn flag_type(&self) -> Option<FlagType> {
        self.flag_type
    }

    /// Returns the allowed values in declaration order.
    #[must_use]
    pub fn choices(&self) -> &[FlagChoice] {
        &self.choices
    }

    /// Returns the numeric range, if declared.
    #[must_use]
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Returns the declared distribution name.
    #[must_use]
    pub fn distribution(&self) -> Option<&str> {
        self.distribution.as_deref()
    }

    /// Returns the distribution name, falling back to [`DEFAULT_DISTRIBUTION`].
    #[must_use]
    pub fn distribution_or_default(&self) -> &str {
        self.distribution().unwrap_or(DEFAULT_DISTRIBUTION)
    }

    /// Checks that the range, if any, is numeric and ordered.
    ///
    /// Encoding does not call this; an unvalidated flag with `min > max` is
    /// encoded as declared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonNumericBound`] or [`Error::InvalidBounds`].
    pub fn validate(&self) -> Result<()> {
        let Some(bounds) = &self.bounds else {
            return Ok(());
        };
        let low = numeric_bound(&bounds.min)?;
        let high = numeric_bound(&bounds.max)?;
        if low > high {
            return Err(Error::InvalidBounds {
                low: encode(&bounds.min),
                high: encode(&bounds.max),
            });
        }
        Ok(())
    }
}

fn numeric_bound(value: &FlagValue) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::NonNumericBound(encode(value)))
}
