//! Text normalization, measurement-driven wrapping and truncation.
//!
//! Everything here is pure: measurement is injected as a closure so the same
//! wrapping runs against builtin AFM widths, embedded TrueType advances, or a
//! fixed-width stub in tests.

use std::str::SplitWhitespace;

use chrono::NaiveDate;

pub const EMPTY_FALLBACK: &str = "\u{2014}";
pub const ELLIPSIS: char = '\u{2026}';

/// Collapse whitespace runs to single spaces, drop control characters, trim.
/// Returns `fallback` when nothing printable remains.
pub fn normalize_text(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

/// Normalize an optional field; `None` when absent or blank.
pub fn non_empty(raw: Option<&str>) -> Option<String> {
    let text = normalize_text(raw?, "");
    (!text.is_empty()).then_some(text)
}

/// Lines of `text` that each measure at most `max_width`, broken at whitespace.
/// A single word wider than `max_width` gets a line of its own and overflows.
pub struct WrappedLines<'a, F> {
    words: SplitWhitespace<'a>,
    pending: Option<&'a str>,
    max_width: f32,
    measure: F,
}

impl<F: Fn(&str) -> f32> Iterator for WrappedLines<'_, F> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = self.pending.take().or_else(|| self.words.next())?;
        let mut line = first.to_string();
        for word in self.words.by_ref() {
            let candidate = format!("{line} {word}");
            if (self.measure)(&candidate) <= self.max_width {
                line = candidate;
            } else {
                self.pending = Some(word);
                break;
            }
        }
        Some(line)
    }
}

pub fn wrap_lines<F: Fn(&str) -> f32>(text: &str, max_width: f32, measure: F) -> WrappedLines<'_, F> {
    WrappedLines {
        words: text.split_whitespace(),
        pending: None,
        max_width,
        measure,
    }
}

/// Materialized form of [`wrap_lines`]. Empty input yields no lines.
pub fn wrap_to_width<F: Fn(&str) -> f32>(text: &str, max_width: f32, measure: F) -> Vec<String> {
    wrap_lines(text, max_width, measure).collect()
}

/// First `max_chars` characters (trimmed) plus an ellipsis when `text` is longer.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    let mut out = head.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

/// Keep `[A-Za-z0-9_-]`, turn every other run of characters into one `_`.
pub fn sanitize_filename_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `12500.0` → `€12,500.00` (with symbol `€`). Negative values keep the sign in front.
pub fn format_money(amount: f64, symbol: &str) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{symbol}{grouped}.{:02}", cents % 100)
}

pub fn format_hours(hours: f64) -> String {
    format!("{hours:.1}")
}

/// `17 October 2026`
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// `Oct 17, 2026`
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// `PENDING` → `Pending`, `partially_paid` → `Partially Paid`.
pub fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Split free text into short bullet lines: one per source line or sentence,
/// list markers stripped, each capped at `max_chars`, at most `max_count`.
pub fn split_into_bullets(text: &str, max_chars: usize, max_count: usize) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .flat_map(split_sentences)
        .map(|s| normalize_text(&s, ""))
        .filter(|s| !s.is_empty())
        .map(|s| truncate_with_ellipsis(&s, max_chars))
        .take(max_count)
        .collect()
}

fn split_sentences(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        current.push(ch);
        let at_boundary = matches!(ch, '.' | '!' | '?' | ';')
            && chars.peek().is_none_or(|next| next.is_whitespace());
        if at_boundary {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

fn strip_list_marker(s: &str) -> &str {
    let trimmed = s.trim_start();
    let without_symbol = trimmed.trim_start_matches(['-', '*', '\u{2022}', '\u{2013}']);
    if without_symbol.len() != trimmed.len() {
        return without_symbol.trim_start();
    }
    // "1." / "2)" style numbering
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(after) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if after.starts_with(char::is_whitespace) {
                return after.trim_start();
            }
        }
    }
    trimmed
}
