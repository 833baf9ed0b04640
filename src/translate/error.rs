//! Translation error taxonomy
//!
//! Every failure of a translation call is one of these variants. All of them
//! are logged at the translation boundary and none modify the line.

use std::fmt;

#[derive(Debug)]
pub enum TranslateError {
    /// No API key in configuration and no build-time default
    MissingCredential,
    /// A translation for this line is already pending
    InFlight,
    /// Request could not be sent or the body could not be read
    Transport(String),
    /// Backend answered with a non-success status
    Status { status: u16, body: String },
    /// Response body did not have the expected shape
    Malformed(String),
    /// The line component went away before the result could be applied
    Cancelled,
}

impl TranslateError {
    /// Expected outcomes that only merit a debug log
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::InFlight | Self::Cancelled)
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "No API key configured"),
            Self::InFlight => write!(f, "Translation already in progress"),
            Self::Transport(msg) => write!(f, "Network error: {}", msg),
            Self::Status { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP {}", status)
                } else {
                    write!(f, "HTTP {}: {}", status, body)
                }
            }
            Self::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            Self::Cancelled => write!(f, "Line was removed before the translation arrived"),
        }
    }
}

impl std::error::Error for TranslateError {}
