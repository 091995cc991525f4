//! JSON recovery for malformed model output.
//!
//! Models wrap JSON in prose or markdown fences, truncate output mid-object
//! at token limits, leave string literals unterminated, and emit trailing
//! commas. [`extract_json`] runs an ordered sequence of repairs, each checked
//! with a real parse, and short-circuits on the first one that yields valid
//! JSON.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a complete `"key": value,` pair, where the value is a string,
/// number, boolean, or null. Used to find the last intact field before a
/// truncation point.
static COMPLETE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = r#""(?:[^"\\]|\\.)*"\s*:\s*(?:"(?:[^"\\]|\\.)*"|-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?|true|false|null)\s*,"#;
    #[allow(clippy::unwrap_used)] // the pattern is a compile-time constant
    let regex = Regex::new(pattern).unwrap();
    regex
});

/// Extracts (and if necessary repairs) the first JSON value found in `text`.
///
/// Valid input is returned byte-for-byte. Otherwise the repairs of the
/// module docs are attempted against an object span first, then an array
/// span. If nothing parses, the fence-stripped text is returned unchanged so
/// the caller's parse error carries a human-diagnosable payload. Callers
/// must still attempt the actual parse.
///
/// The truncation repair keeps whole fields only: a record cut mid-value
/// loses its incomplete trailing field rather than having content fabricated.
/// It keys off the last complete `"key": value,` pair, so a record whose last
/// intact field is not comma-terminated can be truncated one field earlier
/// than strictly necessary.
#[must_use]
pub fn extract_json(text: &str) -> String {
    if parses(text) {
        return text.to_string();
    }

    let cleaned = strip_fences(text);
    if parses(cleaned) {
        return cleaned.to_string();
    }

    for kind in span_order(cleaned) {
        if let Some(span) = locate_span(cleaned, kind) {
            if let Some(repaired) = repair(span) {
                return repaired;
            }
        }
    }

    cleaned.to_string()
}

/// Object spans are preferred, unless the first unquoted opening delimiter
/// is a `[`, the object is nested inside an array (a batch response)
/// and extracting it alone would silently drop the remaining records.
fn span_order(text: &str) -> [SpanKind; 2] {
    let mut in_string = false;
    let mut escape_next = false;
    for c in text.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => return [SpanKind::Object, SpanKind::Array],
            '[' if !in_string => return [SpanKind::Array, SpanKind::Object],
            _ => {}
        }
    }
    [SpanKind::Object, SpanKind::Array]
}

fn parses(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Applies the repair chain to a located span, returning the first variant
/// that parses.
fn repair(span: &str) -> Option<String> {
    if parses(span) {
        return Some(span.to_string());
    }

    let decommaed = strip_trailing_commas(span);
    if parses(&decommaed) {
        return Some(decommaed);
    }

    let closed = close_unterminated_strings(&decommaed);
    if parses(&closed) {
        return Some(closed);
    }

    let truncated = recover_truncation(&closed)?;
    parses(&truncated).then_some(truncated)
}

/// Strips markdown code fences (```json or bare ```), tolerating a missing
/// closing fence on truncated output.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    for marker in ["```json", "```"] {
        if let Some(start) = trimmed.find(marker) {
            let body = &trimmed[start + marker.len()..];
            return match body.find("```") {
                Some(end) => body[..end].trim(),
                None => body.trim(),
            };
        }
    }
    trimmed
}

#[derive(Debug, Clone, Copy)]
enum SpanKind {
    Object,
    Array,
}

impl SpanKind {
    fn delimiters(self) -> (char, char) {
        match self {
            Self::Object => ('{', '}'),
            Self::Array => ('[', ']'),
        }
    }
}

/// Locates the first balanced `{...}` or `[...]` span.
///
/// A stateful scan tracks string-literal and escape state so that delimiters
/// inside string values never affect depth. When the text ends before the
/// span balances (truncated output), the unterminated tail from the opening
/// delimiter is returned for downstream repair.
fn locate_span(text: &str, kind: SpanKind) -> Option<&str> {
    let (open, close) = kind.delimiters();
    let mut in_string = false;
    let mut escape_next = false;
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        if c == open {
            if depth == 0 {
                start = Some(i);
            }
            depth += 1;
        } else if c == close && depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start {
                    return Some(&text[s..=i]);
                }
            }
        }
    }

    start.map(|s| &text[s..])
}

/// Drops any comma whose next non-whitespace character closes an object or
/// array. String-aware: commas inside string literals are untouched.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' if in_string => {
                escape_next = true;
                out.push(c);
            }
            '"' => {
                in_string = !in_string;
                out.push(c);
            }
            ',' if !in_string => {
                let rest = text[i + 1..].trim_start();
                if !rest.starts_with('}') && !rest.starts_with(']') {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Closes a dangling string literal on any line with an odd count of
/// unescaped quotes. The quote is inserted before a trailing comma when one
/// is present, since the comma belongs outside the string value.
fn close_unterminated_strings(text: &str) -> String {
    let repaired: Vec<String> = text
        .lines()
        .map(|line| {
            if unescaped_quote_count(line) % 2 == 0 {
                return line.to_string();
            }
            let trimmed = line.trim_end();
            trimmed.strip_suffix(',').map_or_else(
                || format!("{trimmed}\""),
                |without_comma| format!("{without_comma}\","),
            )
        })
        .collect();
    repaired.join("\n")
}

fn unescaped_quote_count(line: &str) -> usize {
    let mut count = 0;
    let mut escape_next = false;
    for c in line.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' => escape_next = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count
}

/// Cuts truncated output back to its last complete `"key": value,` pair and
/// closes every still-open object and array.
fn recover_truncation(text: &str) -> Option<String> {
    let last = COMPLETE_PAIR.find_iter(text).last()?;
    let mut repaired = text[..last.end()].trim_end().to_string();
    if repaired.ends_with(',') {
        repaired.pop();
    }
    for closer in open_closers(&repaired).into_iter().rev() {
        repaired.push(closer);
    }
    Some(repaired)
}

/// Returns the closing delimiter for every object/array still open at the
/// end of `text`, in opening order.
fn open_closers(text: &str) -> Vec<char> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for c in text.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack
}
