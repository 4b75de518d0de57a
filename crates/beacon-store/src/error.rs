use thiserror::Error;

use crate::guard::ActionKind;

/// Failures a mutation can surface to its caller. Missing-target mutations
/// are deliberately NOT here: those degrade to silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{action} rate limit exceeded ({limit} per {window})")]
    RateLimited {
        action: ActionKind,
        limit: u32,
        window: &'static str,
    },

    #[error("trust score {score} is below the minimum of {min}")]
    TrustTooLow { score: u8, min: u8 },

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("the community owner cannot leave without transferring ownership")]
    OwnerCannotLeave,
}
