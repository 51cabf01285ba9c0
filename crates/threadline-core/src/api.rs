//! Response envelope shared by the mocked back-end services.

use serde::{Deserialize, Serialize};

/// Envelope returned by the thread list / delete endpoints.
///
/// `success` is the acknowledgement; a `false` value is a negative answer
/// even when the call itself completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            count: None,
        }
    }

    pub fn rejected(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            message: message.into(),
            count: None,
        }
    }
}
