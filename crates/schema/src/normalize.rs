//! Field and identifier normalizations.
//!
//! The identifier rules are ports of the standard library-world algorithms
//! the feeds rely on: ISBN check digits with 10/13 conversion, ISSN check
//! digits, and LCCN canonicalization per the Library of Congress structure
//! (0-3 letter prefix, 2- or 4-digit year, 6-digit zero-padded serial).

use chrono::{NaiveDate, NaiveDateTime};

/// Sentinel stored when a numeric field does not parse as base-10.
pub const NUMERIC_SENTINEL: i64 = 9999;

/// Accepted `rights_timestamp` renderings with a time component.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Accepted date-only renderings; the time defaults to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

pub(crate) fn int_with_fallback(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(NUMERIC_SENTINEL)
}

pub(crate) fn allow_flag(raw: &str) -> i64 {
    match raw {
        "allow" | "1" => 1,
        _ => 0,
    }
}

/// Canonical `%Y-%m-%d %H:%M:%S` rendering of a timestamp field.
///
/// A blank field is null, not an error. A non-empty field that matches
/// none of the accepted formats is an error the caller reports against
/// the whole record.
pub(crate) fn canonical_timestamp(raw: &str) -> Result<Option<String>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(Some(format!("{} 00:00:00", d.format("%Y-%m-%d"))));
        }
    }
    Err(format!("unrecognized timestamp {raw:?}"))
}

/// All normalized forms of one raw ISBN token: the form it arrived in
/// (hyphens stripped) plus its 10- or 13-digit counterpart. Returns
/// nothing when the check digit does not hold.
pub(crate) fn isbn_normalized_values(raw: &str) -> Vec<String> {
    let Some(candidate) = candidate_number(raw, &[10, 13]) else {
        return Vec::new();
    };
    if !isbn_valid(&candidate) {
        return Vec::new();
    }
    if candidate.len() == 10 {
        let mut thirteen = format!("978{}", &candidate[..9]);
        thirteen.push(isbn13_check_char(&thirteen));
        vec![candidate, thirteen]
    } else {
        let mut values = vec![candidate.clone()];
        // Only the 978 prefix maps back onto the ISBN-10 space.
        if let Some(body) = candidate.strip_prefix("978") {
            let mut ten = body[..9].to_string();
            ten.push(isbn10_check_char(&ten));
            values.push(ten);
        }
        values
    }
}

/// Normalizes one ISSN token to its 8-character form, or `None` when the
/// mod-11 check digit does not hold.
pub(crate) fn issn_normalized(raw: &str) -> Option<String> {
    let candidate = candidate_number(raw, &[8])?;
    if !candidate.as_bytes()[..7].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let sum: u32 = candidate[..7]
        .bytes()
        .enumerate()
        .map(|(i, b)| (b - b'0') as u32 * (8 - i as u32))
        .sum();
    let check = check_char((11 - sum % 11) % 11);
    candidate.ends_with(check).then_some(candidate)
}

/// Canonicalizes an LCCN: whitespace removed, everything from the first
/// `/` dropped, and an all-digit post-hyphen serial zero-padded to six
/// digits. Returns `None` when the result does not match the LC shape
/// table.
pub(crate) fn lccn_normalized(raw: &str) -> Option<String> {
    let mut lccn: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(slash) = lccn.find('/') {
        lccn.truncate(slash);
    }
    if let Some(hyphen) = lccn.find('-') {
        let head = &lccn[..hyphen];
        let tail = &lccn[hyphen + 1..];
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            lccn = format!("{head}{tail:0>6}");
        }
    }
    lccn_shape_ok(&lccn).then_some(lccn)
}

/// An LCCN is a 0-3 letter prefix followed by 8 digits (2-digit year) or a
/// 0-2 letter prefix followed by 10 digits (4-digit year).
fn lccn_shape_ok(lccn: &str) -> bool {
    let bytes = lccn.as_bytes();
    let letters = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if !bytes[letters..].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let digits = bytes.len() - letters;
    matches!((letters, digits), (0..=3, 8) | (0..=2, 10))
}

/// Extracts the first digits-and-hyphens run (plus at most one trailing
/// `x`/`X`) from arbitrary text, strips the hyphens, and uppercases the
/// check character. Returns `None` unless the result has one of the
/// accepted lengths.
fn candidate_number(raw: &str, accepted_lengths: &[usize]) -> Option<String> {
    let bytes = raw.as_bytes();
    let start = bytes.iter().position(|&b| b.is_ascii_digit() || b == b'-')?;
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'-') {
        end += 1;
    }
    let mut num: String = raw[start..end].chars().filter(|&c| c != '-').collect();
    if end < bytes.len() && (bytes[end] == b'x' || bytes[end] == b'X') {
        num.push('X');
    }
    accepted_lengths.contains(&num.len()).then_some(num)
}

fn isbn_valid(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    match bytes.len() {
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && candidate.ends_with(isbn10_check_char(&candidate[..9]))
        }
        13 => {
            bytes.iter().all(u8::is_ascii_digit)
                && candidate.ends_with(isbn13_check_char(&candidate[..12]))
        }
        _ => false,
    }
}

/// Mod-11 check character over 9 digits, positionally weighted 1-9.
/// Callers guarantee `digits9` is exactly 9 ASCII digits.
fn isbn10_check_char(digits9: &str) -> char {
    let sum: u32 = digits9
        .bytes()
        .enumerate()
        .map(|(i, b)| (b - b'0') as u32 * (i as u32 + 1))
        .sum();
    check_char(sum % 11)
}

/// EAN-13 check character over 12 digits, weights alternating 1 and 3.
/// Callers guarantee `digits12` is exactly 12 ASCII digits.
fn isbn13_check_char(digits12: &str) -> char {
    let sum: u32 = digits12
        .bytes()
        .enumerate()
        .map(|(i, b)| (b - b'0') as u32 * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    check_char((10 - sum % 10) % 10)
}

fn check_char(value: u32) -> char {
    match value {
        10 => 'X',
        d => (b'0' + d as u8) as char,
    }
}
