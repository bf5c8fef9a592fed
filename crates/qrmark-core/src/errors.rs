use thiserror::Error;

/// Reasons a verified claim set cannot become a redemption.
///
/// Every variant is terminal: a ticket that produced one of these will
/// produce it again on retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// A mandatory claim is absent.
    #[error("missing claim '{0}'")]
    Missing(&'static str),
    /// A claim is present but not representable as an integer.
    #[error("claim '{0}' is not an integer")]
    TypeInvalid(&'static str),
    /// A claim is an integer but outside its permitted range.
    #[error("claim '{name}' has invalid value {value}")]
    InvalidValue {
        /// Claim name.
        name: &'static str,
        /// Offending value as it appeared in the ticket.
        value: String,
    },
}
