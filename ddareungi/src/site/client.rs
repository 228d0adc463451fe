//! Member-site HTTP client.
//!
//! Talks to the public bike member site the way its mobile web app does:
//! cookie-authenticated, server-rendered pages plus a few JSON probes. The
//! cookie jar holds the renewable session artifact; [`login`] fills it by
//! driving the site's spring-security form.
//!
//! [`login`]: SiteClient::login

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{FavoriteStation, HistoryPeriod, HistoryRecord, RideSummary};

use super::error::SiteError;
use super::parse;

/// Default base URL for the member site.
const DEFAULT_BASE_URL: &str = "https://www.bikeseoul.com";

/// Fixed mobile UA; the desktop markup differs and parses worse.
const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

const LOGIN_PATH: &str = "/login.do";
const USE_HISTORY_PATH: &str = "/app/mybike/getMemberUseHistory.do";
const FAVORITES_PATH: &str = "/app/mybike/favoriteStation.do";
const LEFT_PAGE_PATH: &str = "/myLeftPage.do";

/// Rent-status probe paths; the site has served this endpoint under two
/// prefixes, so both are tried in order.
const RENT_STATUS_PATHS: [&str; 2] = [
    "/app/rentCheck/isChkRentStatus.do",
    "/app/rent/isChkRentStatus.do",
];

/// Seoul is UTC+9 year-round.
fn seoul_offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("fixed offset in range")
}

/// Configuration for the member-site client.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Base URL for the site
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SiteConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Login/rent probe response from the member site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RentStatus {
    #[serde(rename = "loginYn", default)]
    login_yn: Option<String>,
    #[serde(rename = "memberYn", default)]
    member_yn: Option<String>,
}

impl RentStatus {
    /// Whether the probe proves a live member session.
    ///
    /// `None` means the probe did not carry a verdict either way.
    pub fn logged_in(&self) -> Option<bool> {
        let login = self.login_yn.as_deref().unwrap_or("").trim().to_uppercase();
        if login.is_empty() {
            return None;
        }
        if login != "Y" {
            return Some(false);
        }
        let member = self.member_yn.as_deref().unwrap_or("").trim().to_uppercase();
        if !member.is_empty() && member != "Y" {
            return Some(false);
        }
        Some(true)
    }
}

/// One fetched use-history window.
#[derive(Debug, Clone)]
pub struct UseHistory {
    /// Rides, most recent first.
    pub records: Vec<HistoryRecord>,
    pub summary: RideSummary,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

/// Client for the cookie-authenticated member site.
#[derive(Debug, Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
}

impl SiteClient {
    /// Create a new member-site client with an empty cookie jar.
    pub fn new(config: SiteConfig) -> Result<Self, SiteError> {
        let base = Url::parse(&config.base_url).map_err(|e| SiteError::Api {
            status: 0,
            message: format!("invalid base URL: {e}"),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(MOBILE_UA));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.7,en;q=0.6"),
        );

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, jar, base })
    }

    /// Seed the cookie jar from a raw pasted cookie header.
    ///
    /// Lets a previously captured session be tried before any login.
    pub fn seed_cookie_header(&self, raw: &str) {
        let normalized = parse::normalize_cookie(raw);
        for pair in normalized.split(';') {
            let pair = pair.trim();
            if !pair.is_empty() && pair.contains('=') {
                self.jar.add_cookie_str(pair, &self.base);
            }
        }
    }

    /// Whether the jar currently holds any cookie for the site.
    pub fn has_session_cookie(&self) -> bool {
        self.jar.cookies(&self.base).is_some()
    }

    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        let base = self.base.as_str().trim_end_matches('/');
        if href.starts_with('/') {
            format!("{base}{href}")
        } else {
            format!("{base}/{}", href.trim_start_matches("./"))
        }
    }

    async fn get_text(
        &self,
        path: &str,
        params: &[(&str, String)],
        referer: Option<&str>,
    ) -> Result<String, SiteError> {
        let mut request = self.http.get(self.absolute_url(path));
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(referer) = referer {
            request = request.header(REFERER, self.absolute_url(referer));
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), "site fetch");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SiteError::SessionExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(response.text().await?)
    }

    async fn get_json(&self, path: &str, referer: Option<&str>) -> Result<Value, SiteError> {
        let mut request = self
            .http
            .get(self.absolute_url(path))
            .header(ACCEPT, "application/json, text/plain, */*");
        if let Some(referer) = referer {
            request = request.header(REFERER, self.absolute_url(referer));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SiteError::SessionExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SiteError::Json {
            message: e.to_string(),
        })
    }

    async fn post_form(
        &self,
        action: &str,
        fields: &[(String, String)],
        referer: Option<&str>,
    ) -> Result<String, SiteError> {
        let mut request = self.http.post(self.absolute_url(action)).form(fields);
        if let Some(referer) = referer {
            request = request.header(REFERER, self.absolute_url(referer));
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(action, status = status.as_u16(), "site post");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(response.text().await?)
    }

    /// Drive the site's login form with the given credentials.
    ///
    /// Success is judged by the rent-status probe reporting a live member
    /// session afterwards; the site answers the form POST with HTTP 200
    /// either way.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SiteError> {
        let page = self.get_text(LOGIN_PATH, &[], Some(LOGIN_PATH)).await?;
        let form = parse::extract_login_form(&page);

        let mut fields = form.fields;
        set_field(&mut fields, &form.user_field, username);
        set_field(&mut fields, &form.pass_field, password);

        self.post_form(&form.action, &fields, Some(LOGIN_PATH)).await?;

        let status = self.rent_status().await?;
        if status.logged_in() != Some(true) {
            tracing::warn!("login rejected by member site");
            return Err(SiteError::Auth);
        }
        if !self.has_session_cookie() {
            return Err(SiteError::CookieMissing);
        }

        Ok(())
    }

    /// Probe the rent-status endpoint, which doubles as a session check.
    pub async fn rent_status(&self) -> Result<RentStatus, SiteError> {
        let mut last_err = None;
        for path in RENT_STATUS_PATHS {
            match self.get_json(path, Some(path)).await {
                Ok(value) => {
                    return serde_json::from_value(value).map_err(|e| SiteError::Json {
                        message: e.to_string(),
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or(SiteError::SessionExpired))
    }

    /// Fetch the favorite stations with their inline bike counts.
    pub async fn favorites(&self) -> Result<Vec<FavoriteStation>, SiteError> {
        let html = self
            .get_text(FAVORITES_PATH, &[], Some(FAVORITES_PATH))
            .await?;
        if parse::looks_like_login(&html) {
            return Err(SiteError::SessionExpired);
        }
        Ok(parse::parse_favorites(&html))
    }

    /// Fetch one use-history window.
    ///
    /// The window is requested through the page's search-date parameters,
    /// computed in Seoul local time.
    pub async fn use_history(&self, period: HistoryPeriod) -> Result<UseHistory, SiteError> {
        let today = Utc::now().with_timezone(&seoul_offset()).date_naive();
        let start = today - chrono::Duration::days(period.days());

        let params = [
            ("searchStartDate", start.format("%Y-%m-%d").to_string()),
            ("searchEndDate", today.format("%Y-%m-%d").to_string()),
        ];
        let html = self
            .get_text(USE_HISTORY_PATH, &params, Some(USE_HISTORY_PATH))
            .await?;
        if parse::looks_like_login(&html) {
            return Err(SiteError::SessionExpired);
        }

        let (records, summary) = parse::parse_history(&html);
        let (period_start, period_end) = parse::parse_period_range(&html);

        Ok(UseHistory {
            records,
            summary,
            period_start: period_start.or(Some(start)),
            period_end: period_end.or(Some(today)),
        })
    }

    /// Fetch the voucher expiry from the member left page, when shown.
    pub async fn ticket_expiry(&self) -> Result<Option<chrono::NaiveDateTime>, SiteError> {
        let html = self
            .get_text(LEFT_PAGE_PATH, &[], Some(LEFT_PAGE_PATH))
            .await?;
        if parse::looks_like_login(&html) {
            return Err(SiteError::SessionExpired);
        }
        Ok(parse::parse_ticket_expiry(&html))
    }
}

fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(field) = fields.iter_mut().find(|(n, _)| n == name) {
        field.1 = value.to_string();
    } else {
        fields.push((name.to_string(), value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SiteConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation_and_urls() {
        let client = SiteClient::new(SiteConfig::new().with_base_url("https://example.test")).unwrap();
        assert_eq!(client.absolute_url("/login.do"), "https://example.test/login.do");
        assert_eq!(client.absolute_url("./next.do"), "https://example.test/next.do");
        assert_eq!(
            client.absolute_url("https://other.test/x"),
            "https://other.test/x"
        );
    }

    #[test]
    fn seeded_cookie_is_visible() {
        let client = SiteClient::new(SiteConfig::new()).unwrap();
        assert!(!client.has_session_cookie());
        client.seed_cookie_header("Cookie: JSESSIONID=abc; WMONID=xyz");
        assert!(client.has_session_cookie());
    }

    #[test]
    fn rent_status_verdicts() {
        let yes: RentStatus =
            serde_json::from_value(serde_json::json!({"loginYn": "Y", "memberYn": "Y"})).unwrap();
        assert_eq!(yes.logged_in(), Some(true));

        let no: RentStatus = serde_json::from_value(serde_json::json!({"loginYn": "N"})).unwrap();
        assert_eq!(no.logged_in(), Some(false));

        let guest: RentStatus =
            serde_json::from_value(serde_json::json!({"loginYn": "Y", "memberYn": "N"})).unwrap();
        assert_eq!(guest.logged_in(), Some(false));

        let silent: RentStatus = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(silent.logged_in(), None);
    }

    #[test]
    fn set_field_overwrites_or_appends() {
        let mut fields = vec![("j_username".to_string(), String::new())];
        set_field(&mut fields, "j_username", "me");
        set_field(&mut fields, "j_password", "secret");
        assert_eq!(fields[0].1, "me");
        assert_eq!(fields[1], ("j_password".to_string(), "secret".to_string()));
    }
}
