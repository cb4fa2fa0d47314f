//! The `{ success, data, message }` envelope every endpoint answers with.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

/// An acknowledgement whose payload, if any, the caller does not need.
pub type Ack = Envelope<serde_json::Value>;

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// A success with no payload.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    /// The payload, or an error if the call failed or carried none.
    pub fn into_data(self) -> Result<T, ClientError> {
        if !self.success {
            return Err(ClientError::Api {
                status: 200,
                message: self.message.unwrap_or_else(|| "request failed".into()),
            });
        }
        self.data
            .ok_or_else(|| ClientError::InvalidResponse("response carried no data".into()))
    }
}
