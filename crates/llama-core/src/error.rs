use thiserror::Error;

/// Coarse classification of [`LlamaError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Decode,
    Shape,
    InvalidArguments,
}

/// Errors exposed by `llama-core`.
///
/// Every variant carries enough context (URL, endpoint, requested data type)
/// to tell the caller which request failed and why. Nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlamaError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("an error occurred while trying to connect to '{url}': {message}")]
    Connection { url: String, message: String },
    #[error("request to '{url}' timed out")]
    Timeout { url: String },
    #[error("'{url}' returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON response received from '{url}': {message}")]
    Decode { url: String, message: String },

    #[error("{}", describe_shape(.endpoint, .entity.as_deref(), .data_type.as_deref(), .detail))]
    Shape {
        endpoint: String,
        entity: Option<String>,
        data_type: Option<String>,
        detail: String,
    },

    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },
}

impl LlamaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn shape(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Shape {
            endpoint: endpoint.into(),
            entity: None,
            data_type: None,
            detail: detail.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Connection { .. } | Self::Timeout { .. } | Self::Status { .. } => {
                ErrorKind::Transport
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Shape { .. } => ErrorKind::Shape,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
        }
    }

    /// URL of the request that failed, for transport and decode errors.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Connection { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Decode { url, .. } => Some(url),
            _ => None,
        }
    }
}

fn describe_shape(
    endpoint: &str,
    entity: Option<&str>,
    data_type: Option<&str>,
    detail: &str,
) -> String {
    let mut message = format!("unexpected response from '{endpoint}'");
    if let Some(entity) = entity {
        message.push_str(&format!(" for {entity}"));
    }
    if let Some(data_type) = data_type {
        message.push_str(&format!(" with dataType '{data_type}'"));
    }
    message.push_str(": ");
    message.push_str(detail);
    message
}
