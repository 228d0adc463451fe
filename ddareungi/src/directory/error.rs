//! Station directory error types.

/// Errors from the Open API station directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API key was rejected by the Open Data portal
    #[error("unauthorized: Open API key rejected ({message})")]
    Unauthorized { message: String },

    /// API returned an error envelope
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// A page could not be fetched even after retries; the fetch is aborted
    /// rather than returning a directory with silently missing stations
    #[error("paging failed at rows {start}-{end}: {message}")]
    Paging {
        start: u32,
        end: u32,
        message: String,
    },
}
