use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure taxonomy shared by the upstream clients, the name reconciliation
/// and the prediction pipeline.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{context}: upstream returned {}", .status.map_or("no response".to_string(), |s| s.to_string()))]
    Upstream {
        context: String,
        status: Option<StatusCode>,
        details: Option<Value>,
    },

    #[error("{0} not set")]
    MissingCredentials(&'static str),
}

impl ServiceError {
    pub fn upstream(context: impl Into<String>, status: Option<StatusCode>, details: Option<Value>) -> Self {
        ServiceError::Upstream {
            context: context.into(),
            status,
            details,
        }
    }

    /// Transport or decode failure from reqwest, with no usable response body.
    pub fn transport(context: impl Into<String>, err: reqwest::Error) -> Self {
        ServiceError::Upstream {
            context: format!("{}: {}", context.into(), err),
            status: err.status(),
            details: None,
        }
    }

    /// Short machine-readable tag for response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Upstream { .. } => "upstream",
            ServiceError::MissingCredentials(_) => "configuration",
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
