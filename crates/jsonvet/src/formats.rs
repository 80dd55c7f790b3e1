//! The format registry: named string predicates.
//!
//! Formats are plain `fn(&str) -> bool` entries looked up by name at compile
//! time; user-supplied formats registered through
//! [`crate::ValidationOptions::with_format`] take precedence over these.
use std::{
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use email_address::EmailAddress;
use fancy_regex::Regex;
use once_cell::sync::Lazy;
use referencing::Draft;
use uuid_simd::{parse_hyphenated, Out};

use crate::ecma;

/// A format validator.
pub(crate) trait Format: Send + Sync {
    fn is_valid(&self, value: &str) -> bool;
}

impl<F> Format for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

/// Look up a built-in format for the given draft.
///
/// Formats introduced by later drafts are unknown (hence ignored) in earlier
/// ones.
pub(crate) fn builtin(draft: Draft, name: &str) -> Option<fn(&str) -> bool> {
    match name {
        "date-time" => Some(is_valid_datetime),
        "email" | "idn-email" => Some(is_valid_email),
        "hostname" => Some(is_valid_hostname),
        "ipv4" => Some(is_valid_ipv4),
        "ipv6" => Some(is_valid_ipv6),
        "uri" => Some(is_valid_uri),
        "regex" => Some(is_valid_regex),
        "uri-reference" if draft >= Draft::Draft6 => Some(is_valid_uri_reference),
        "uri-template" if draft >= Draft::Draft6 => Some(is_valid_uri_template),
        "json-pointer" if draft >= Draft::Draft6 => Some(is_valid_json_pointer),
        "date" if draft >= Draft::Draft7 => Some(is_valid_date),
        "time" if draft >= Draft::Draft7 => Some(is_valid_time),
        "idn-hostname" if draft >= Draft::Draft7 => Some(is_valid_idn_hostname),
        "iri" if draft >= Draft::Draft7 => Some(is_valid_iri),
        "iri-reference" if draft >= Draft::Draft7 => Some(is_valid_iri_reference),
        "relative-json-pointer" if draft >= Draft::Draft7 => {
            Some(is_valid_relative_json_pointer)
        }
        "duration" if draft >= Draft::Draft201909 => Some(is_valid_duration),
        "uuid" if draft >= Draft::Draft201909 => Some(is_valid_uuid),
        _ => None,
    }
}

#[inline]
fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

/// RFC 3339 `full-date`, including month lengths and leap years.
fn is_valid_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let year = bytes[..4]
        .iter()
        .fold(0u32, |acc, byte| acc * 10 + u32::from(byte - b'0'));
    let (Some(month), Some(day)) = (
        parse_two_digits(&bytes[5..7]),
        parse_two_digits(&bytes[8..10]),
    ) else {
        return false;
    };
    if day == 0 {
        return false;
    }
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => day <= 31,
        4 | 6 | 9 | 11 => day <= 30,
        2 => day <= if is_leap_year(year) { 29 } else { 28 },
        _ => false,
    }
}

/// RFC 3339 `full-time`. Leap seconds are accepted only when the time is
/// 23:59:60 once normalized to UTC.
fn is_valid_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    let len = bytes.len();
    // "HH:MM:SSZ" is the shortest possible form
    if len < 9 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    let (Some(hh), Some(mm), Some(ss)) = (
        parse_two_digits(&bytes[0..2]),
        parse_two_digits(&bytes[3..5]),
        parse_two_digits(&bytes[6..8]),
    ) else {
        return false;
    };
    if hh > 23 || mm > 59 || ss > 60 {
        return false;
    }
    let mut i = 8;
    if i < len && bytes[i] == b'.' {
        i += 1;
        let fraction_start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == fraction_start {
            return false;
        }
    }
    if i == len {
        return false;
    }
    match bytes[i] {
        b'Z' | b'z' => i == len - 1 && (ss != 60 || (hh == 23 && mm == 59)),
        sign @ (b'+' | b'-') => {
            if len - i != 6 || bytes[i + 3] != b':' {
                return false;
            }
            let (Some(offset_hh), Some(offset_mm)) = (
                parse_two_digits(&bytes[i + 1..i + 3]),
                parse_two_digits(&bytes[i + 4..i + 6]),
            ) else {
                return false;
            };
            if offset_hh > 23 || offset_mm > 59 {
                return false;
            }
            if ss == 60 {
                let offset = i64::from(offset_hh) * 60 + i64::from(offset_mm);
                let local = i64::from(hh) * 60 + i64::from(mm);
                let utc = if sign == b'+' {
                    local - offset
                } else {
                    local + offset
                }
                .rem_euclid(24 * 60);
                utc == 23 * 60 + 59
            } else {
                true
            }
        }
        _ => false,
    }
}

/// RFC 3339 `date-time`: a full date, a `T` or `t` separator, a full time.
fn is_valid_datetime(value: &str) -> bool {
    if value.len() < 11 {
        return false;
    }
    let (date, time) = value.split_at(10);
    let mut time_chars = time.chars();
    if !matches!(time_chars.next(), Some('T' | 't')) {
        return false;
    }
    is_valid_date(date) && is_valid_time(time_chars.as_str())
}

/// ISO 8601 duration: `PnW` or `P[nY][nM][nD][T[nH][nM][nS]]` with at least
/// one component.
fn is_valid_duration(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('P') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    fn units(part: &str, allowed: &[char]) -> Option<usize> {
        let mut matched = 0;
        let mut next_allowed = allowed;
        let mut digits = 0;
        for ch in part.chars() {
            if ch.is_ascii_digit() {
                digits += 1;
            } else {
                if digits == 0 {
                    return None;
                }
                let position = next_allowed.iter().position(|unit| *unit == ch)?;
                next_allowed = &next_allowed[position + 1..];
                digits = 0;
                matched += 1;
            }
        }
        // Trailing digits without a unit are invalid
        if digits > 0 {
            return None;
        }
        Some(matched)
    }
    if let Some(weeks) = date_part.strip_suffix('W') {
        return time_part.is_none()
            && !weeks.is_empty()
            && weeks.bytes().all(|byte| byte.is_ascii_digit());
    }
    let date_units = match units(date_part, &['Y', 'M', 'D']) {
        Some(count) => count,
        None => return false,
    };
    match time_part {
        Some(time) => match units(time, &['H', 'M', 'S']) {
            Some(0) | None => false,
            Some(_) => true,
        },
        None => date_units > 0,
    }
}

fn is_valid_hostname(value: &str) -> bool {
    !(value.is_empty()
        || value.starts_with('-')
        || value.ends_with('-')
        || value.len() > 255
        || value
            .chars()
            .any(|ch| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '.'))
        || value.split('.').any(|label| label.len() > 63 || label.is_empty() && !value.ends_with('.')))
}

fn is_valid_idn_hostname(value: &str) -> bool {
    idna::domain_to_ascii_strict(value).is_ok()
}

/// The mailbox grammar via `email_address`, with the hostname / IP-literal
/// checks applied to the domain part.
fn is_valid_email(value: &str) -> bool {
    let Ok(parsed) = EmailAddress::from_str(value) else {
        return false;
    };
    let domain = parsed.domain();
    if let Some(literal) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        if let Some(address) = literal.strip_prefix("IPv6:") {
            address.parse::<Ipv6Addr>().is_ok()
        } else {
            address_is_ipv4(literal)
        }
    } else {
        is_valid_hostname(domain)
    }
}

fn address_is_ipv4(value: &str) -> bool {
    // The std parser already rejects leading zeros per the strict grammar
    Ipv4Addr::from_str(value).is_ok()
}

fn is_valid_ipv4(value: &str) -> bool {
    address_is_ipv4(value)
}

fn is_valid_ipv6(value: &str) -> bool {
    Ipv6Addr::from_str(value).is_ok()
}

fn is_valid_uri(value: &str) -> bool {
    referencing::Uri::parse(value).is_ok()
}

fn is_valid_uri_reference(value: &str) -> bool {
    referencing::UriRef::parse(value).is_ok()
}

fn is_valid_iri(value: &str) -> bool {
    referencing::Iri::parse(value).is_ok()
}

fn is_valid_iri_reference(value: &str) -> bool {
    referencing::IriRef::parse(value).is_ok()
}

static JSON_POINTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/(([^/~])|(~[01]))*)*\z").expect("Is a valid regex"));
static RELATIVE_JSON_POINTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/(?:[^~/]|~0|~1)*)*)\z").expect("Is a valid regex")
});
static URI_TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:(?:[^\x00-\x20"'<>%\\^`{|}]|%[0-9a-f]{2})|\{[+#./;?&=,!@|]?(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?(?:,(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?)*})*\z"#,
    )
    .expect("Is a valid regex")
});

fn is_valid_json_pointer(value: &str) -> bool {
    JSON_POINTER_RE
        .is_match(value)
        .expect("Simple JSON_POINTER_RE pattern")
}

fn is_valid_relative_json_pointer(value: &str) -> bool {
    RELATIVE_JSON_POINTER_RE
        .is_match(value)
        .expect("Simple RELATIVE_JSON_POINTER_RE pattern")
}

fn is_valid_uri_template(value: &str) -> bool {
    URI_TEMPLATE_RE
        .is_match(value)
        .expect("Simple URI_TEMPLATE_RE pattern")
}

fn is_valid_regex(value: &str) -> bool {
    ecma::to_rust_regex(value)
        .map(|pattern| Regex::new(&pattern).is_ok())
        .unwrap_or(false)
}

fn is_valid_uuid(value: &str) -> bool {
    let mut out = [0; 16];
    parse_hyphenated(value.as_bytes(), Out::from_mut(&mut out)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2024-02-29", true; "leap day on a leap year")]
    #[test_case("2023-02-29", false; "leap day on a common year")]
    #[test_case("2024-13-01", false; "month out of range")]
    #[test_case("2024-04-31", false; "day out of range")]
    #[test_case("2024-4-01", false; "missing zero padding")]
    fn date(value: &str, expected: bool) {
        assert_eq!(is_valid_date(value), expected);
    }

    #[test_case("23:59:60Z", true; "leap second in UTC")]
    #[test_case("15:59:60-08:00", true; "leap second with offset")]
    #[test_case("12:00:60Z", false; "leap second at noon")]
    #[test_case("08:30:06.283185Z", true; "fractional seconds")]
    #[test_case("08:30:06", false; "missing offset")]
    fn time(value: &str, expected: bool) {
        assert_eq!(is_valid_time(value), expected);
    }

    #[test_case("P1Y2M3DT4H5M6S", true)]
    #[test_case("P4W", true)]
    #[test_case("PT1M", true)]
    #[test_case("P", false; "no components")]
    #[test_case("P1YT", false; "empty time part")]
    #[test_case("P2D1Y", false; "out of order")]
    fn duration(value: &str, expected: bool) {
        assert_eq!(is_valid_duration(value), expected);
    }

    #[test_case("127.0.0.1", true)]
    #[test_case("127.0.0.01", false; "leading zeros are not dotted-quad")]
    #[test_case("256.0.0.1", false)]
    fn ipv4(value: &str, expected: bool) {
        assert_eq!(is_valid_ipv4(value), expected);
    }
}
