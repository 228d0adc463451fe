//! Cookie-authenticated member-site access.
//!
//! The member site is the unofficial half of the system: no documented
//! API, server-rendered mobile markup, and a spring-security session
//! cookie that expires without warning. This module keeps all of that
//! contained — the HTTP client, markup extraction, and the session
//! lifecycle — so the rest of the crate only sees typed results.

mod client;
mod error;
pub mod parse;
mod session;

pub use client::{RentStatus, SiteClient, SiteConfig, UseHistory};
pub use error::SiteError;
pub use session::{Authenticate, SessionManager, SessionState};
