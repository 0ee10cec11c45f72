use crate::client::JsonObject;
use crate::Result;
use serde::Serialize;
use serde_json::Value;

/// Outcome of a toolkit operation.
///
/// On the wire a success is the cluster's raw response and a failure is a
/// mapping with the single key `"error"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Success(JsonObject),
    Failed { error: String },
}

impl OperationResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            error: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Success(_) => None,
        }
    }

    #[must_use]
    pub const fn response(&self) -> Option<&JsonObject> {
        match self {
            Self::Success(response) => Some(response),
            Self::Failed { .. } => None,
        }
    }

    /// The wire shape as a JSON object.
    #[must_use]
    pub fn into_json(self) -> JsonObject {
        match self {
            Self::Success(response) => response,
            Self::Failed { error } => {
                let mut object = JsonObject::new();
                object.insert("error".to_string(), Value::String(error));
                object
            }
        }
    }
}

impl From<Result<JsonObject>> for OperationResult {
    fn from(result: Result<JsonObject>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}
