pub mod client;
pub mod controller;
pub mod engine;
pub mod suggest;
pub mod trip;
pub mod validator;
pub mod weather;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("estimate service returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("malformed estimate response: {0}")]
    MalformedResponse(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid arrival instant: {0}")]
    InvalidInstant(String),
}

impl EstimateError {
    /// User-facing message for the submission error state. Raw transport
    /// errors are never shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            EstimateError::Remote { status, .. } if *status >= 500 => {
                "The estimate service is having trouble right now. Please try again.".to_string()
            }
            EstimateError::Remote { .. } => {
                "The estimate request was rejected. Check your trip details and try again."
                    .to_string()
            }
            EstimateError::MalformedResponse(_) => {
                "The estimate service sent back something we could not read. Please try again."
                    .to_string()
            }
            EstimateError::Transport(_) => {
                "Could not reach the estimate service. Check your connection and try again."
                    .to_string()
            }
            EstimateError::InvalidInstant(_) => {
                "The arrival date and time do not form a valid calendar instant.".to_string()
            }
        }
    }
}
