//! Member-site client error types.

/// Errors from the cookie-authenticated member site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Site returned an error status code
    #[error("site error {status}: {message}")]
    Api { status: u16, message: String },

    /// A JSON endpoint returned something that was not JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// An authenticated page answered with the login page instead; the
    /// session cookie has expired or was never valid. One transparent
    /// re-login is attempted before this escalates.
    #[error("session expired (login page returned for an authenticated request)")]
    SessionExpired,

    /// Login apparently succeeded but the upstream issued no session cookie
    #[error("no session cookie issued after login")]
    CookieMissing,

    /// Credentials rejected by the upstream service; the account must be
    /// reconfigured before any further authenticated fetch can work.
    #[error("credentials rejected; reconfiguration required")]
    Auth,
}
