//! Identifier normalization for the two proto naming conventions:
//! `UpperCamel` for messages/enums and `lower_snake` for fields.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static pattern"));

/// `user_profile` → `UserProfile`, `api-key` → `ApiKey`, `HTTP_status` → `HTTPStatus`.
///
/// Idempotent: the output contains no separators, so a second pass sees one
/// already-capitalized segment.
pub fn normalize_type_name(name: &str) -> String {
    NON_ALNUM
        .split(name)
        .filter(|part| !part.is_empty())
        .map(capitalize_segment)
        .collect()
}

/// `UserProfile` → `user_profile`, `HTTPStatus` → `http_status`, `x-rate limit` → `x_rate_limit`.
pub fn normalize_field_name(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                // last capital of an acronym starts the next word: HTTPStatus
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary {
                push_separator(&mut out);
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else {
            push_separator(&mut out);
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Enum member suffix: upper-cased, with every non-alphanumeric character as `_`.
pub fn enum_value_name(literal: &str) -> String {
    let value: String = literal
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if value.is_empty() { "EMPTY".to_string() } else { value }
}

/// Hands out names unique within one emitted type, suffixing `_2`, `_3`, … on collision.
#[derive(Debug, Default)]
pub struct NameSet {
    taken: HashSet<String>,
}

impl NameSet {
    pub fn claim(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                tracing::warn!(name = %base, renamed = %candidate, "name collision inside one type");
                return candidate;
            }
            n += 1;
        }
    }
}

fn capitalize_segment(part: &str) -> String {
    // keep acronyms like `ID` or `HTTP` intact
    if part.len() > 1 && !part.bytes().any(|b| b.is_ascii_lowercase()) {
        return part.to_string();
    }
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with('_') {
        out.push('_');
    }
}
