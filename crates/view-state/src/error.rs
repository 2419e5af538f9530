use thiserror::Error;

/// Everything that can go wrong between a user action and the display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Input is neither a dotted IPv4 quad nor a full eight-group IPv6 address.
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// The lookup server answered with an `error` field.
    #[error("{0}")]
    LookupFailed(String),

    /// Transport-level failure talking to the lookup server.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("refresh already in progress")]
    AlreadyRefreshing,

    /// A search was attempted while a refresh cycle is outstanding.
    #[error("a refresh is in progress")]
    RefreshPending,

    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ViewError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
