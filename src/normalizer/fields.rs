//! Field lookup helpers shared by the source strategies.
//!
//! Paths are dot-separated; numeric segments index into arrays, so
//! `line_items.0.name` reads the first line item's name. Every concept is
//! looked up from an ordered candidate list and the first non-empty value
//! wins.

use serde_json::Value;

use crate::domain::Payload;

/// Candidate paths for a display name.
#[derive(Debug, Clone, Copy)]
pub struct NameFields {
    /// First-name paths.
    pub first: &'static [&'static str],
    /// Last-name paths, paired with a found first name.
    pub last: &'static [&'static str],
    /// Full-name paths, used when no first name is found.
    pub full: &'static [&'static str],
}

/// Candidate paths for a location.
#[derive(Debug, Clone, Copy)]
pub struct LocationFields {
    /// Paths holding a ready-made location string.
    pub direct: &'static [&'static str],
    /// Object prefixes holding `city` and `country` (or `country_code`,
    /// `countryCode`) keys.
    /// An empty prefix means the payload root.
    pub prefixes: &'static [&'static str],
}

/// Resolves a dotted path inside `payload`.
#[must_use]
pub fn lookup<'a>(payload: &'a Payload, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = payload.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns the trimmed, non-empty text at `path`. Numbers are stringified.
#[must_use]
pub fn text(payload: &Payload, path: &str) -> Option<String> {
    match lookup(payload, path)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty text among `paths`.
#[must_use]
pub fn first_text(payload: &Payload, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| text(payload, path))
}

/// Resolves a display name: first name plus last initial, else a shortened
/// full name.
#[must_use]
pub fn resolve_name(payload: &Payload, fields: &NameFields) -> Option<String> {
    if let Some(first) = first_text(payload, fields.first) {
        let last = first_text(payload, fields.last);
        return Some(display_name(&first, last.as_deref()));
    }
    first_text(payload, fields.full).map(|full| shorten_full_name(&full))
}

/// `"Sam"` + `"Lee"` → `"Sam L."`; `"Sam"` alone stays `"Sam"`.
#[must_use]
pub fn display_name(first: &str, last: Option<&str>) -> String {
    let first = first.trim();
    match last.and_then(|l| l.trim().chars().next()) {
        Some(initial) => format!("{first} {}.", initial.to_uppercase()),
        None => first.to_string(),
    }
}

/// `"Sam Lee Jones"` → `"Sam J."`. Single words and emails are kept whole.
#[must_use]
pub fn shorten_full_name(full: &str) -> String {
    let mut parts = full.split_whitespace();
    let Some(first) = parts.next() else {
        return String::new();
    };
    display_name(first, parts.last())
}

/// Resolves a location: a direct string, else `city, country`, else city,
/// else country, each tried across all prefixes before moving on.
#[must_use]
pub fn resolve_location(payload: &Payload, fields: &LocationFields) -> Option<String> {
    if let Some(direct) = first_text(payload, fields.direct) {
        return Some(direct);
    }
    let parts: Vec<(Option<String>, Option<String>)> = fields
        .prefixes
        .iter()
        .map(|prefix| {
            let city = text(payload, &join(prefix, "city"));
            let country = first_text(
                payload,
                &[
                    join(prefix, "country").as_str(),
                    join(prefix, "country_code").as_str(),
                    join(prefix, "countryCode").as_str(),
                ],
            );
            (city, country)
        })
        .collect();

    parts
        .iter()
        .find_map(|(city, country)| match (city, country) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            _ => None,
        })
        .or_else(|| parts.iter().find_map(|(city, _)| city.clone()))
        .or_else(|| parts.iter().find_map(|(_, country)| country.clone()))
}

/// Amount text at the first matching path, stringified as given.
#[must_use]
pub fn amount(payload: &Payload, paths: &[&str]) -> Option<String> {
    first_text(payload, paths)
}

/// Amount in minor units (cents) at the first matching path, converted to
/// a two-decimal major-unit string. String values are passed through.
#[must_use]
pub fn minor_units_amount(payload: &Payload, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match lookup(payload, path)? {
        Value::Number(n) => n.as_i64().map(format_minor_units),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// `1250` → `"12.50"`.
#[must_use]
pub fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Uppercased currency code at the first matching path.
#[must_use]
pub fn currency(payload: &Payload, paths: &[&str]) -> Option<String> {
    first_text(payload, paths).map(|c| c.to_ascii_uppercase())
}

/// Copies scalar entries of the object at `path` into `out`, without
/// replacing keys already present.
pub fn flatten_object_into(payload: &Payload, path: &str, out: &mut Payload) {
    let Some(Value::Object(map)) = lookup(payload, path) else {
        return;
    };
    for (key, value) in map {
        if matches!(value, Value::Object(_) | Value::Array(_) | Value::Null) {
            continue;
        }
        if !payload.contains_key(key) && !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
}

/// Inserts `value` under `key` when present.
pub fn put(out: &mut Payload, key: &str, value: Option<String>) {
    if let Some(value) = value {
        out.insert(key.to_string(), Value::String(value));
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
