use thiserror::Error;

/// Failure to parse a single quantity string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,

    #[error("quantity {0:?} does not start with a number")]
    InvalidNumber(String),

    #[error("quantity {input:?} has unknown suffix {suffix:?}")]
    UnknownSuffix { input: String, suffix: String },

    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// Failure to evaluate a quota fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    #[error("invalid quantity for {resource}: {source}")]
    InvalidQuantity {
        resource: String,
        #[source]
        source: QuantityError,
    },

    #[error("resource {resource} is declared more than once")]
    DuplicateResource { resource: String },

    #[error("sum of {resource} limits is out of range")]
    Overflow { resource: String },
}

impl QuotaError {
    /// Name of the resource the error is about.
    pub fn resource(&self) -> &str {
        match self {
            QuotaError::InvalidQuantity { resource, .. }
            | QuotaError::DuplicateResource { resource }
            | QuotaError::Overflow { resource } => resource,
        }
    }
}
