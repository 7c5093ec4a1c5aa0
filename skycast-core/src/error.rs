use thiserror::Error;

/// Failure taxonomy for the weather client and dashboard orchestration.
///
/// `Http` and `Decode` are kept distinct so callers can tell a provider
/// rejection (bad city name, bad credential) apart from a response body we
/// could not make sense of. A forecast sample with a missing temperature
/// field surfaces as `Decode`, since deserialization is strict.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request never produced a usable response (connect failure,
    /// timeout, etc.).
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("weather provider returned HTTP {status} {reason}")]
    Http { status: u16, reason: String },

    /// The response body was not the JSON shape we expect.
    #[error("failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A search was attempted with an empty location query.
    #[error("location query must not be empty")]
    EmptyLocation,
}

impl WeatherError {
    /// Status code of an `Http` error, if that is what this is.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            WeatherError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
