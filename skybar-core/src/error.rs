use thiserror::Error;

/// Failure of one fetch cycle against a weather provider.
///
/// The scheduler absorbs these: a failed cycle delivers nothing and the next
/// scheduled cycle retries naturally.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a usable response (DNS, TLS, timeout...).
    #[error("request to {provider} failed")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not match the provider's documented shape.
    #[error("failed to parse {provider} response")]
    Payload {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
