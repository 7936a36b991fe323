/// Errors raised while building the operation catalog or encoding flags.
///
/// An unrecognized operation alias is not an error: alias resolution returns
/// `None` so a host can try other resolvers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a flag declares only one side of its numeric range.
    #[error("flag '{flag}' of operation '{operation}' declares {present} without {missing}")]
    PartialBounds {
        /// The operation declaring the flag.
        operation: String,
        /// The malformed flag.
        flag: String,
        /// The bound that was declared (`min` or `max`).
        present: &'static str,
        /// The bound that is missing.
        missing: &'static str,
    },

    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The encoded lower bound.
        low: String,
        /// The encoded upper bound.
        high: String,
    },

    /// Returned when a range bound is not an integer or float.
    #[error("range bound '{0}' is not numeric")]
    NonNumericBound(String),

    /// Returned when a declared flag fails validation.
    #[error("invalid flag '{flag}' for operation '{operation}': {source}")]
    InvalidFlag {
        /// The operation declaring the flag.
        operation: String,
        /// The invalid flag.
        flag: String,
        /// The validation failure.
        #[source]
        source: Box<Error>,
    },

    /// Returned when a catalog lookup names an operation it does not hold.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// Returned when a flag name is not declared by the operation.
    #[error("operation '{operation}' has no flag '{flag}'")]
    UnknownFlag {
        /// The operation that was queried.
        operation: String,
        /// The undeclared flag.
        flag: String,
    },

    /// Returned when an operation names a flag encoder this crate does not provide.
    #[error("operation '{operation}' uses unknown flag encoder '{reference}'")]
    UnknownEncoder {
        /// The operation carrying the reference.
        operation: String,
        /// The unresolved encoder reference.
        reference: String,
    },

    /// Returned when an operation declaration cannot be parsed.
    #[error("invalid operation declaration: {0}")]
    Declaration(String),

    /// Returned when a search function string is malformed.
    #[error("invalid search function '{0}'")]
    InvalidSearchFunction(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Declaration(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
