//! Extraction of structured data from member-site markup.
//!
//! The member site has no JSON API for favorites or ride history; both come
//! as server-rendered mobile pages whose markup varies between deployments.
//! Extraction therefore leans on several fallbacks per field, mirroring
//! what the pages have actually served: anchor hrefs, inline
//! `moveRentalStation(...)` handlers, and count blocks inside each list
//! item.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{FavoriteStation, HistoryRecord, RideSummary, StationCode, split_numbered_name};

// Markers that prove a page is real member content, not the login screen.
static DATA_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(kcal_box|payment_box|moveRentalStation\(\s*'ST-[^']+'\s*,\s*'[^']+'\s*\))")
        .unwrap()
});
static LOGOUT_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(logout|/logout|logout\.do)").unwrap());
static LOGIN_FORM_ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<form[^>]+action=["'][^"']*(j_spring_security_check|login)[^"']*["']"#)
        .unwrap()
});
static PASSWORD_INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<input[^>]+type=["']password["']"#).unwrap());

static FORM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<form[^>]*>.*?</form>").unwrap());
static INPUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<input[^>]*>").unwrap());
static ACTION_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)action=["']([^"']+)["']"#).unwrap());
static NAME_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)name=["']([^"']+)["']"#).unwrap());
static TYPE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)type=["']([^"']+)["']"#).unwrap());
static VALUE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)value=["']([^"']*)["']"#).unwrap());

static LI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li>").unwrap());
static PLACE_DIV_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<div[^>]*class=["'][^"']*\bplace\b[^"']*["'][^>]*>.*?<a[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#,
    )
    .unwrap()
});
static PLACE_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<a[^>]*class=["'][^"']*\bplace\b[^"']*["'][^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#,
    )
    .unwrap()
});
static ST_HREF_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]*href=["']([^"']*ST-[^"']+)["'][^>]*>(.*?)</a>"#).unwrap()
});
static MOVE_RENTAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)moveRentalStation\(\s*'([^']+)'\s*,\s*'([^']+)'\s*\)").unwrap()
});
static BIKE_COUNTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<div[^>]*class=["'][^"']*\bbike\b[^"']*["'][^>]*>.*?<p>\s*(\d+)\s*/\s*(\d+)\s*</p>"#)
        .unwrap()
});
static ST_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(ST-\d+)").unwrap());

static PAYMENT_BOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<div[^>]*class=["'][^"']*\b(?:payment_box|paymentBox)\b[^"']*["'][^>]*>(.*?)</div>"#)
        .unwrap()
});
static KCAL_BOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<div[^>]*class=["'][^"']*\b(?:kcal_box|kcalBox)\b[^"']*["'][^>]*>(.*?)</div>"#)
        .unwrap()
});
static TABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<table[^>]*>(.*?)</table>").unwrap());
static TR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap());
static TD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").unwrap());

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(20\d{2})[-./](\d{1,2})[-./](\d{1,2})\s+(\d{1,2}):(\d{2})(?::(\d{2}))?").unwrap()
});
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(20\d{2})[-./](\d{1,2})[-./](\d{1,2})").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?").unwrap());
static NAME_VALUE_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)name=["']([^"']+)["'][^>]*value=["']([^"']+)["']"#).unwrap()
});

/// Normalize a raw cookie header as pasted by a user.
///
/// People paste whole request dumps; this keeps the `Cookie:` line if one
/// is present, strips the prefix, and collapses stray quotes and line
/// breaks into a single header value.
pub fn normalize_cookie(raw: &str) -> String {
    let mut v = raw.trim().trim_matches(['"', '\'']).to_string();

    if v.contains('\n') || v.contains('\r') {
        let unfolded = v.replace('\r', "\n");
        let lines: Vec<&str> = unfolded
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let cookie_line = lines
            .iter()
            .find(|l| l.to_lowercase().starts_with("cookie:"))
            .or_else(|| lines.iter().find(|l| l.to_lowercase().starts_with("cookie ")));
        v = match cookie_line {
            Some(line) => (*line).to_string(),
            None => lines.join(" "),
        };
    }
    v = v.split_whitespace().collect::<Vec<_>>().join(" ");

    for prefix in ["cookie ", "cookie:"] {
        if v.to_lowercase().starts_with(prefix) {
            v = v[prefix.len()..].trim().to_string();
        }
    }
    v
}

/// Strip markup from a fragment, decoding entities and turning `<br>` into
/// newlines.
pub fn strip_tags(fragment: &str) -> String {
    let with_breaks = BR_RE.replace_all(fragment, "\n");
    let without_tags = TAG_RE.replace_all(&with_breaks, "");
    html_escape::decode_html_entities(without_tags.as_ref())
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// Decide whether a page is the login screen rather than member content.
///
/// Pages carrying known data markers or a logout link are member content;
/// otherwise a password input together with a spring-security login form is
/// taken as the login screen. An empty body is treated as expired too.
pub fn looks_like_login(html: &str) -> bool {
    if html.trim().is_empty() {
        return true;
    }
    if DATA_MARKER_RE.is_match(html) || LOGOUT_MARKER_RE.is_match(html) {
        return false;
    }

    let has_password = PASSWORD_INPUT_RE.is_match(html);
    has_password
        && (html.to_lowercase().contains("j_spring_security_check")
            || LOGIN_FORM_ACTION_RE.is_match(html))
}

/// The login form as discovered on the login page.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub action: String,
    /// Every named input with its preset value (hidden CSRF fields etc.);
    /// the credential fields are overwritten before submission.
    pub fields: Vec<(String, String)>,
    pub user_field: String,
    pub pass_field: String,
}

/// Extract the login form from the login page markup.
///
/// Falls back to the spring-security defaults (`/j_spring_security_check`,
/// `j_username` / `j_password`) when the markup does not reveal them.
pub fn extract_login_form(html: &str) -> LoginForm {
    let mut action = String::new();
    let mut form_html = "";

    for form in FORM_RE.find_iter(html) {
        let Some(cand) = ACTION_ATTR_RE
            .captures(form.as_str())
            .map(|c| c[1].trim().to_string())
        else {
            continue;
        };
        form_html = form.as_str();
        if cand.contains("j_spring_security_check") || cand.contains("login") {
            action = cand;
            break;
        }
        if action.is_empty() {
            action = cand;
        }
    }
    if action.is_empty() {
        action = "/j_spring_security_check".to_string();
    }

    let mut fields = Vec::new();
    let mut user_field: Option<String> = None;
    let mut pass_field: Option<String> = None;

    for input in INPUT_RE.find_iter(form_html) {
        let tag = input.as_str();
        let Some(name) = NAME_ATTR_RE.captures(tag).map(|c| c[1].trim().to_string()) else {
            continue;
        };
        let input_type = TYPE_ATTR_RE
            .captures(tag)
            .map(|c| c[1].trim().to_lowercase())
            .unwrap_or_else(|| "text".to_string());
        let value = VALUE_ATTR_RE
            .captures(tag)
            .map(|c| c[1].to_string())
            .unwrap_or_default();

        let lname = name.to_lowercase();
        if input_type == "password" && pass_field.is_none() {
            pass_field = Some(name.clone());
        }
        if user_field.is_none()
            && matches!(input_type.as_str(), "text" | "email")
            && ["user", "id", "login"].iter().any(|k| lname.contains(k))
        {
            user_field = Some(name.clone());
        }

        fields.push((name, value));
    }

    if user_field.is_none() {
        user_field = fields
            .iter()
            .map(|(name, _)| name)
            .find(|name| {
                let lname = name.to_lowercase();
                ["user", "id", "login"].iter().any(|k| lname.contains(k))
            })
            .cloned();
    }

    LoginForm {
        action,
        fields,
        user_field: user_field.unwrap_or_else(|| "j_username".to_string()),
        pass_field: pass_field.unwrap_or_else(|| "j_password".to_string()),
    }
}

/// Parse the favorites page into stations with their inline bike counts.
///
/// Each favorite is a `<li>` carrying a station anchor (several markup
/// generations exist, hence the fallbacks) and optionally a
/// "general / sprout" count block.
pub fn parse_favorites(html: &str) -> Vec<FavoriteStation> {
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for li in LI_RE.captures_iter(html) {
        let li = &li[1];

        let mut code_str = String::new();
        let mut raw_name = String::new();

        let anchor = PLACE_DIV_ANCHOR_RE
            .captures(li)
            .or_else(|| PLACE_ANCHOR_RE.captures(li))
            .or_else(|| ST_HREF_ANCHOR_RE.captures(li));
        if let Some(anchor) = anchor {
            if let Some(code) = ST_CODE_RE.captures(&anchor[1]) {
                code_str = code[1].to_uppercase();
            }
            raw_name = strip_tags(&anchor[2]);
        }

        if code_str.is_empty() || raw_name.is_empty() {
            if let Some(call) = MOVE_RENTAL_RE.captures(li) {
                if code_str.is_empty() {
                    code_str = call[1].trim().to_uppercase();
                }
                if raw_name.is_empty() {
                    raw_name = call[2].trim().to_string();
                }
            }
        }

        if code_str.is_empty() || raw_name.is_empty() {
            continue;
        }
        if !seen.insert((code_str.clone(), raw_name.clone())) {
            continue;
        }
        let Ok(code) = StationCode::parse(&code_str) else {
            continue;
        };

        let counts = BIKE_COUNTS_RE.captures(li);
        let bikes_general = counts.as_ref().and_then(|c| c[1].parse().ok());
        let bikes_sprout = counts.as_ref().and_then(|c| c[2].parse().ok());

        let (numeric_id, title) = split_numbered_name(&raw_name);

        out.push(FavoriteStation {
            code,
            numeric_id,
            name: if title.is_empty() {
                raw_name.clone()
            } else {
                title.to_string()
            },
            bikes_general,
            bikes_sprout,
        });
    }

    out
}

/// Parse the use-history page into ride records and the period summary.
///
/// Records come most recent first. Rows whose numeric fields do not parse
/// keep those fields absent; the row itself (times, stations) is retained.
pub fn parse_history(html: &str) -> (Vec<HistoryRecord>, RideSummary) {
    let block = PAYMENT_BOX_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());

    let mut records = parse_history_tables(block.unwrap_or(html));
    if records.is_empty() && block.is_some() {
        records = parse_history_tables(html);
    }

    // Most recent first; upstream order is kept for ties and undated rows.
    records.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    (records, parse_summary_box(html))
}

fn parse_history_tables(fragment: &str) -> Vec<HistoryRecord> {
    for table in TABLE_RE.captures_iter(fragment) {
        let records = parse_history_rows(&table[1]);
        if !records.is_empty() {
            return records;
        }
    }
    Vec::new()
}

fn parse_history_rows(table_html: &str) -> Vec<HistoryRecord> {
    let mut out = Vec::new();

    for row in TR_RE.captures_iter(table_html) {
        let cells: Vec<String> = TD_RE
            .captures_iter(&row[1])
            .map(|c| strip_tags(&c[1]))
            .collect();
        if cells.len() < 5 || cells.iter().all(String::is_empty) {
            continue;
        }

        let started_at = parse_datetime(&cells[1]);
        let ended_at = parse_datetime(&cells[3]);
        let duration_seconds = match (started_at, ended_at) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_seconds()),
            _ => None,
        };

        let distance_km = cells.get(6).and_then(|c| first_number(c));

        out.push(HistoryRecord {
            rental_station: cells[2].clone(),
            return_station: cells[4].clone(),
            started_at,
            ended_at,
            distance_meters: distance_km.map(|km| km * 1000.0),
            duration_seconds,
            calories_burned: cells.get(7).and_then(|c| first_number(c)),
            co2_saved_grams: cells.get(8).and_then(|c| first_number(c)).map(|kg| kg * 1000.0),
            bike_no: Some(cells[0].clone()).filter(|c| !c.is_empty()),
            history_id: cells.get(5).cloned().filter(|c| !c.is_empty()),
        });
    }

    out
}

/// Parse the summary box above the history table.
///
/// The box renders alternating label/value text nodes ("이용시간" /
/// "2시간 15분", …); labels are matched by keyword since their exact
/// wording has shifted between site versions.
pub fn parse_summary_box(html: &str) -> RideSummary {
    let Some(content) = KCAL_BOX_RE.captures(html) else {
        return RideSummary::default();
    };

    let text = TAG_RE.replace_all(&content[1], "\n");
    let decoded = html_escape::decode_html_entities(text.as_ref()).replace('\u{a0}', " ");
    let lines: Vec<&str> = decoded.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut summary = RideSummary::default();
    for pair in lines.chunks(2) {
        let [key, value] = pair else { break };
        let lkey = key.to_lowercase();
        if key.contains("시간") || lkey.contains("time") {
            summary.usage_time = Some((*value).to_string());
        } else if key.contains("거리") || lkey.contains("km") {
            summary.distance_km = first_number(value);
        } else if key.contains("칼로리") || lkey.contains("kcal") {
            summary.calories_kcal = first_number(value);
        } else if key.contains("탄소") || lkey.contains("co2") {
            summary.co2_saved_kg = first_number(value);
        }
    }

    summary
}

/// Extract the search period bounds from the use-history form inputs.
///
/// Falls back to the first two dates anywhere in the page when the inputs
/// are not named recognizably.
pub fn parse_period_range(html: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut start = None;
    let mut end = None;

    for cap in NAME_VALUE_INPUT_RE.captures_iter(html) {
        let name = cap[1].to_lowercase();
        let Some(date) = parse_date(&cap[2]) else {
            continue;
        };
        if start.is_none() && (name.contains("start") || name.contains("from")) {
            start = Some(date);
        }
        if end.is_none() && (name.contains("end") || name.contains("to")) {
            end = Some(date);
        }
    }

    if start.is_none() || end.is_none() {
        let mut dates = DATE_RE.captures_iter(html);
        if start.is_none() {
            start = dates.next().and_then(|c| capture_date(&c));
        }
        if end.is_none() {
            end = dates.next().and_then(|c| capture_date(&c));
        }
    }

    (start, end)
}

/// Extract the voucher expiry from the member left-page markup.
pub fn parse_ticket_expiry(html: &str) -> Option<NaiveDateTime> {
    if let Some(cap) = DATETIME_RE.captures(html) {
        return datetime_from_captures(&cap);
    }
    // Date-only markup means "valid through that day".
    DATE_RE
        .captures(html)
        .and_then(|c| capture_date(&c))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_RE
        .captures(text)
        .and_then(|cap| datetime_from_captures(&cap))
        .or_else(|| parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn datetime_from_captures(cap: &regex::Captures<'_>) -> Option<NaiveDateTime> {
    let date = capture_date(cap)?;
    let hour: u32 = cap[4].parse().ok()?;
    let minute: u32 = cap[5].parse().ok()?;
    let second: u32 = cap.get(6).and_then(|s| s.as_str().parse().ok()).unwrap_or(0);
    date.and_hms_opt(hour, minute, second)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_RE.captures(text).and_then(|c| capture_date(&c))
}

fn capture_date(cap: &regex::Captures<'_>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        cap[1].parse().ok()?,
        cap[2].parse().ok()?,
        cap[3].parse().ok()?,
    )
}

fn first_number(text: &str) -> Option<f64> {
    NUMBER_RE.find(text)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAVORITES_HTML: &str = r##"
    <ul class="fav_list">
      <li>
        <div class="place"><a href="/app/station/moveStationRealtimeStatus.do?stationId=ST-3685">102. 망원역 1번출구 앞</a></div>
        <div class="bike">일반 / 새싹<p>12 / 3</p></div>
      </li>
      <li>
        <a href="#" onclick="moveRentalStation('ST-812', '207. 여의나루역 1번출구 앞')">바로가기</a>
        <div class="bike">일반 / 새싹<p>0 / 0</p></div>
      </li>
      <li><a href="/somewhere">즐겨찾기 안내</a></li>
    </ul>
    "##;

    #[test]
    fn favorites_parse_anchor_and_onclick_forms() {
        let favorites = parse_favorites(FAVORITES_HTML);
        assert_eq!(favorites.len(), 2);

        assert_eq!(favorites[0].code.as_str(), "ST-3685");
        assert_eq!(favorites[0].numeric_id, Some(102));
        assert_eq!(favorites[0].name, "망원역 1번출구 앞");
        assert_eq!(favorites[0].bikes_general, Some(12));
        assert_eq!(favorites[0].bikes_sprout, Some(3));

        assert_eq!(favorites[1].code.as_str(), "ST-812");
        assert_eq!(favorites[1].numeric_id, Some(207));
        assert_eq!(favorites[1].bikes_general, Some(0));
    }

    #[test]
    fn favorites_dedupe_repeated_entries() {
        let doubled = format!("{FAVORITES_HTML}{FAVORITES_HTML}");
        assert_eq!(parse_favorites(&doubled).len(), 2);
    }

    const HISTORY_HTML: &str = r#"
    <div class="kcal_box">
      <p>이용시간</p><p>1시간 42분</p>
      <p>이용거리</p><p>14.2 km</p>
      <p>칼로리</p><p>322.5 kcal</p>
      <p>탄소절감</p><p>3.1 kg</p>
    </div>
    <div class="payment_box">
      <table>
        <tr><th>자전거</th><th>대여일시</th><th>대여소</th><th>반납일시</th><th>반납 대여소</th></tr>
        <tr>
          <td>SPB-40125</td><td>2026-08-01 09:12:00</td><td>102. 망원역 1번출구 앞</td>
          <td>2026-08-01 09:40:00</td><td>207. 여의나루역 1번출구 앞</td>
          <td>998877</td><td>5.4</td>
        </tr>
        <tr>
          <td>SPB-11200</td><td>2026-08-02 18:05:00</td><td>207. 여의나루역 1번출구 앞</td>
          <td>2026-08-02 18:31:00</td><td>102. 망원역 1번출구 앞</td>
          <td>998901</td><td>abc</td>
        </tr>
      </table>
    </div>
    "#;

    #[test]
    fn history_rows_parse_and_sort_most_recent_first() {
        let (records, _) = parse_history(HISTORY_HTML);
        assert_eq!(records.len(), 2);

        // Aug 2 ride comes first even though the table lists it second.
        assert_eq!(records[0].bike_no.as_deref(), Some("SPB-11200"));
        assert_eq!(records[0].rental_station, "207. 여의나루역 1번출구 앞");
        assert_eq!(records[0].duration_seconds, Some(26 * 60));
        // Unparseable distance is kept absent; the record survives.
        assert_eq!(records[0].distance_meters, None);

        assert_eq!(records[1].history_id.as_deref(), Some("998877"));
        assert_eq!(records[1].distance_meters, Some(5400.0));
        assert_eq!(records[1].duration_seconds, Some(28 * 60));
    }

    #[test]
    fn summary_box_maps_labels_by_keyword() {
        let (_, summary) = parse_history(HISTORY_HTML);
        assert_eq!(summary.usage_time.as_deref(), Some("1시간 42분"));
        assert_eq!(summary.distance_km, Some(14.2));
        assert_eq!(summary.calories_kcal, Some(322.5));
        assert_eq!(summary.co2_saved_kg, Some(3.1));
    }

    #[test]
    fn history_of_empty_page_is_empty() {
        let (records, summary) = parse_history("<html><body>내역이 없습니다</body></html>");
        assert!(records.is_empty());
        assert_eq!(summary, RideSummary::default());
    }

    const LOGIN_HTML: &str = r#"
    <form action="/j_spring_security_check" method="post">
      <input type="hidden" name="_csrf" value="abc123">
      <input type="text" name="j_username" placeholder="아이디">
      <input type="password" name="j_password">
    </form>
    "#;

    #[test]
    fn login_page_is_detected() {
        assert!(looks_like_login(LOGIN_HTML));
        assert!(looks_like_login(""));
        assert!(!looks_like_login(HISTORY_HTML));
        assert!(!looks_like_login(FAVORITES_HTML));
        // A page with a logout link is member content even with a password
        // input somewhere on it.
        let with_logout = format!("{LOGIN_HTML}<a href=\"/logout.do\">로그아웃</a>");
        assert!(!looks_like_login(&with_logout));
    }

    #[test]
    fn login_form_extraction_keeps_hidden_fields() {
        let form = extract_login_form(LOGIN_HTML);
        assert_eq!(form.action, "/j_spring_security_check");
        assert_eq!(form.user_field, "j_username");
        assert_eq!(form.pass_field, "j_password");
        assert!(form.fields.iter().any(|(n, v)| n == "_csrf" && v == "abc123"));
    }

    #[test]
    fn login_form_defaults_when_markup_is_opaque() {
        let form = extract_login_form("<html><body>nothing here</body></html>");
        assert_eq!(form.action, "/j_spring_security_check");
        assert_eq!(form.user_field, "j_username");
        assert_eq!(form.pass_field, "j_password");
    }

    #[test]
    fn cookie_normalization_strips_dumps() {
        assert_eq!(normalize_cookie("  JSESSIONID=abc; other=1  "), "JSESSIONID=abc; other=1");
        assert_eq!(
            normalize_cookie("GET /x HTTP/1.1\nCookie: JSESSIONID=abc\nHost: example"),
            "JSESSIONID=abc"
        );
        assert_eq!(normalize_cookie("\"cookie: a=b\""), "a=b");
    }

    #[test]
    fn ticket_expiry_parses_datetime_and_date() {
        assert_eq!(
            parse_ticket_expiry("이용권 만료: 2026-09-30 23:59"),
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap().and_hms_opt(23, 59, 0)
        );
        assert_eq!(
            parse_ticket_expiry("<span>2026.10.02</span>"),
            NaiveDate::from_ymd_opt(2026, 10, 2).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_ticket_expiry("만료일 없음"), None);
    }

    #[test]
    fn period_range_prefers_named_inputs() {
        let html = r#"
        <form id="searchFrm">
          <input name="searchStartDate" value="2026-07-01">
          <input name="searchEndDate" value="2026-07-31">
        </form>
        "#;
        let (start, end) = parse_period_range(html);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 7, 1));
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 7, 31));
    }
}
