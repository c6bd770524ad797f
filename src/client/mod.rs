//! HAL search client and its error type.
//!
//! [`HalClient`] resolves the endpoint once at construction and then turns
//! [`SearchParams`](crate::models::SearchParams) into a single GET request per
//! call. The response is handed back untouched; parsing the body is left to
//! the caller since its shape depends on the requested
//! [`Format`](crate::models::Format).
//!
//! ```rust,no_run
//! use hal_search::client::HalClient;
//! use hal_search::models::SearchParams;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HalClient::builder().collection("TDS-MACS").build()?;
//! let params = SearchParams::new("python")
//!     .include_fields(["docid", "label_s"])
//!     .after(2012)
//!     .before(2019)
//!     .rows(100);
//! let response = client.search(&params).await?;
//! println!("{}", response.text().await?);
//! # Ok(())
//! # }
//! ```

mod hal;

pub use hal::{resolve_endpoint, HalClient, HalClientBuilder};

/// Errors that can occur when talking to the HAL search API
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    /// Invalid client configuration, detected at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value outside a closed set of allowed tokens
    #[error("Invalid {field} {value:?}, expected one of: {allowed}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport failure, including timeouts
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("HAL API returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

impl HalError {
    pub(crate) fn invalid_choice(field: &'static str, value: &str, allowed: &[&str]) -> Self {
        HalError::InvalidChoice {
            field,
            value: value.to_string(),
            allowed: allowed.join(", "),
        }
    }

    /// Whether the request failed because the timeout expired
    pub fn is_timeout(&self) -> bool {
        matches!(self, HalError::Network(e) if e.is_timeout())
    }

    /// HTTP status code, when the failure carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            HalError::HttpStatus { status, .. } => Some(*status),
            HalError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
