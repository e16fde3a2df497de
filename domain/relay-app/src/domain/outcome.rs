use thiserror::Error;

use crate::{domain::submission::FieldError, ports::mail::DeliveryError};

pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";
pub const UNKNOWN_KEY_MESSAGE: &str = "unknown user key";

/// Result of relaying one submission, as reported back to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    NotSent { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("key not authorized")]
    Unauthorized,
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("unexpected error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> u16 {
        match self {
            RelayError::Unauthorized => 403,
            RelayError::Field(_) | RelayError::Delivery(_) | RelayError::Internal(_) => 500,
        }
    }

    /// Text safe to show an untrusted submitter. Delivery and internal
    /// details never leave the relay.
    pub fn client_message(&self) -> String {
        match self {
            RelayError::Field(err) => err.to_string(),
            RelayError::Unauthorized => UNKNOWN_KEY_MESSAGE.to_string(),
            RelayError::Delivery(_) | RelayError::Internal(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl From<RelayError> for Outcome {
    fn from(err: RelayError) -> Self {
        Outcome::NotSent {
            status: err.status(),
            message: err.client_message(),
        }
    }
}
