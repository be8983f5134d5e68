//! Outbound alert payloads.

use serde::{Deserialize, Serialize};

/// Rendered alert ready for the alert transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}
