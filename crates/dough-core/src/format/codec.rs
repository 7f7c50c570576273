//! Text codec for config documents.
//!
//! Files are TOML.  Every key of a [`ConfigDocument`] is written as a single
//! top-level assignment with an inline value, so one setting is one line:
//!
//! ```toml
//! # Engine video settings
//!
//! Fullscreen = false # Start in exclusive fullscreen mode
//! Window = { width = 1280, height = 720, title = "Doughbox" }
//!
//! # Names of the layers pushed at startup.
//! # Order matters.
//! Layers = ["Example Layer", "Example Overlay Layer"]
//! # Last edited by hand.
//! ```
//!
//! Comment placement rules:
//!
//! - a one-line comment on a one-line value is written inline after the value,
//!   unless it was read from above the key;
//! - anything longer goes in `# ` lines directly above the key;
//! - a comment block at the top of the file, followed by a blank line, is the
//!   document preamble;
//! - blank lines and comments not touching a key stay where they were, as
//!   [`Trivia`] of the next entry or of the document epilogue.
//!
//! On read, the values come from the `toml` parser; comments are recovered by
//! a line scanner that understands strings well enough not to mistake a `#`
//! inside a string for a comment.  Hand-written files using `[table]`
//! sections or multi-line values load fine.  Every comment inside a
//! multi-line value or a section is folded into the comment of the top-level
//! key it belongs to, so no comment text is lost when the file is rewritten
//! in the one-line form.

use std::collections::HashMap;

use thiserror::Error;
use tracing::trace;

use crate::domain::document::{ConfigDocument, ConfigEntry, Trivia};
use crate::domain::value::TypedValue;

/// Errors raised while decoding a document.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The text is not valid TOML.
    #[error("invalid TOML: {0}")]
    Syntax(#[from] toml::de::Error),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses document text.
///
/// # Errors
///
/// Returns [`FormatError::Syntax`] if the text is not valid TOML.
///
/// # Examples
///
/// ```rust
/// use dough_core::{parse_document, serialize_document, TypedValue};
///
/// let doc = parse_document("VSync = true # Wait for vblank\n").unwrap();
/// let entry = doc.get("VSync").unwrap();
/// assert_eq!(entry.value, TypedValue::Boolean(true));
/// assert_eq!(entry.comment.as_deref(), Some("Wait for vblank"));
/// assert_eq!(serialize_document(&doc), "VSync = true # Wait for vblank\n");
/// ```
pub fn parse_document(text: &str) -> Result<ConfigDocument, FormatError> {
    let table: toml::Table = toml::from_str(text)?;
    let mut layout = scan_layout(text);

    let mut doc = ConfigDocument::new();
    doc.preamble = layout.preamble.take();
    doc.epilogue = std::mem::take(&mut layout.epilogue);
    for (key, value) in table {
        let entry = match layout.by_key.remove(&key) {
            Some(found) => found.into_entry(value),
            None => ConfigEntry::new(value),
        };
        doc.put(key, entry);
    }
    if !layout.by_key.is_empty() {
        trace!(dropped = layout.by_key.len(), "config comments not matched to a parsed key");
    }
    Ok(doc)
}

/// Serialises a document to text.
///
/// Output is deterministic: the same document always yields the same bytes.
pub fn serialize_document(doc: &ConfigDocument) -> String {
    let mut out = String::new();

    if let Some(preamble) = &doc.preamble {
        push_comment_lines(&mut out, preamble);
        out.push('\n');
    }

    for (key, entry) in doc.iter() {
        push_trivia(&mut out, &entry.leading);
        let key = format_key(key);
        let value = entry.value.to_string();
        match &entry.comment {
            Some(c) if !entry.comment_above && !c.contains('\n') && !value.contains('\n') => {
                out.push_str(&format!("{key} = {value} # {c}\n"));
            }
            Some(c) => {
                push_comment_lines(&mut out, c);
                out.push_str(&format!("{key} = {value}\n"));
            }
            None => out.push_str(&format!("{key} = {value}\n")),
        }
    }

    push_trivia(&mut out, &doc.epilogue);
    out
}

// ── Writing helpers ───────────────────────────────────────────────────────────

fn push_comment_line(out: &mut String, line: &str) {
    if line.is_empty() {
        out.push_str("#\n");
    } else {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
}

fn push_comment_lines(out: &mut String, comment: &str) {
    for line in comment.split('\n') {
        push_comment_line(out, line);
    }
}

fn push_trivia(out: &mut String, trivia: &[Trivia]) {
    for t in trivia {
        match t {
            Trivia::Blank => out.push('\n'),
            Trivia::Comment(c) => push_comment_line(out, c),
        }
    }
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Writes `key` bare when TOML allows it, otherwise as a basic string.
fn format_key(key: &str) -> String {
    if is_bare_key(key) {
        return key.to_string();
    }
    let mut quoted = String::with_capacity(key.len() + 2);
    quoted.push('"');
    for c in key.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04X}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

// ── Comment recovery ──────────────────────────────────────────────────────────

/// Comments and spacing recovered for one top-level key.
#[derive(Debug, Default)]
struct KeyLayout {
    comment: Vec<String>,
    above: bool,
    leading: Vec<Trivia>,
}

impl KeyLayout {
    fn into_entry(mut self, value: TypedValue) -> ConfigEntry {
        let comment = self.comment.join("\n");
        if comment.is_empty() && !self.comment.is_empty() {
            // Only bare `#` lines: keep them as trivia.
            self.leading
                .extend(self.comment.into_iter().map(Trivia::Comment));
            let mut entry = ConfigEntry::new(value);
            entry.leading = self.leading;
            return entry;
        }
        let mut entry = ConfigEntry::with_comment(value, Some(comment));
        entry.comment_above = self.above;
        entry.leading = self.leading;
        entry
    }
}

#[derive(Debug, Default)]
struct ScannedLayout {
    preamble: Option<String>,
    epilogue: Vec<Trivia>,
    by_key: HashMap<String, KeyLayout>,
}

impl ScannedLayout {
    fn key(&mut self, key: &str) -> &mut KeyLayout {
        self.by_key.entry(key.to_string()).or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrState {
    Code,
    Basic,
    Literal,
    MultiBasic,
    MultiLiteral,
}

/// Tracks string and bracket nesting across lines.
///
/// Works on bytes: every delimiter it looks for is ASCII, and ASCII bytes
/// never occur inside a multi-byte UTF-8 sequence, so the only slice taken
/// (right after a `#`) is always on a character boundary.
#[derive(Debug)]
struct LineScanner {
    state: StrState,
    depth: i32,
}

impl LineScanner {
    fn new() -> Self {
        Self {
            state: StrState::Code,
            depth: 0,
        }
    }

    /// `true` when the previous line left a value unfinished.
    fn in_value(&self) -> bool {
        self.state != StrState::Code || self.depth > 0
    }

    /// Feeds one line; returns the text after the first `#` that is outside
    /// any string.
    fn feed<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        let bytes = line.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let rest = &bytes[i..];
            match self.state {
                StrState::Code => match bytes[i] {
                    b'#' => return Some(&line[i + 1..]),
                    b'"' if rest.starts_with(b"\"\"\"") => {
                        self.state = StrState::MultiBasic;
                        i += 3;
                        continue;
                    }
                    b'\'' if rest.starts_with(b"'''") => {
                        self.state = StrState::MultiLiteral;
                        i += 3;
                        continue;
                    }
                    b'"' => self.state = StrState::Basic,
                    b'\'' => self.state = StrState::Literal,
                    b'[' | b'{' => self.depth += 1,
                    b']' | b'}' => self.depth -= 1,
                    _ => {}
                },
                StrState::Basic => match bytes[i] {
                    b'\\' => i += 1,
                    b'"' => self.state = StrState::Code,
                    _ => {}
                },
                StrState::Literal => {
                    if bytes[i] == b'\'' {
                        self.state = StrState::Code;
                    }
                }
                StrState::MultiBasic => {
                    if bytes[i] == b'\\' {
                        i += 1;
                    } else if rest.starts_with(b"\"\"\"") {
                        self.state = StrState::Code;
                        i += 3;
                        continue;
                    }
                }
                StrState::MultiLiteral => {
                    if rest.starts_with(b"'''") {
                        self.state = StrState::Code;
                        i += 3;
                        continue;
                    }
                }
            }
            i += 1;
        }
        None
    }
}

fn strip_comment_marker(after_hash: &str) -> &str {
    after_hash.strip_prefix(' ').unwrap_or(after_hash)
}

/// Returns the first key segment of `s` (decoded) and the text after it.
fn first_key_segment(s: &str) -> Option<(String, &str)> {
    let s = s.trim_start();
    let end = match s.as_bytes().first()? {
        b'"' => {
            let bytes = s.as_bytes();
            let mut i = 1;
            loop {
                match bytes.get(i)? {
                    b'\\' => i += 2,
                    b'"' => break i + 1,
                    _ => i += 1,
                }
            }
        }
        b'\'' => s[1..].find('\'')? + 2,
        _ => {
            let n = s
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(s.len());
            if n == 0 {
                return None;
            }
            n
        }
    };
    let raw = &s[..end];
    let key = if raw.starts_with('"') || raw.starts_with('\'') {
        // Let the TOML parser handle escape sequences.
        let parsed: toml::Table = toml::from_str(&format!("{raw} = 0")).ok()?;
        parsed.keys().next()?.clone()
    } else {
        raw.to_string()
    };
    Some((key, &s[end..]))
}

/// Top-level key assigned by a `key = value` or `key.sub = value` line.
fn assignment_key(line: &str) -> Option<String> {
    let (key, rest) = first_key_segment(line)?;
    match rest.trim_start().as_bytes().first()? {
        b'=' | b'.' => Some(key),
        _ => None,
    }
}

/// Top-level key introduced by a `[key]`, `[key.sub]` or `[[key]]` header.
fn header_key(line: &str) -> Option<String> {
    let inner = line.trim_start().trim_start_matches('[');
    first_key_segment(inner).map(|(key, _)| key)
}

/// Splits the trivia gathered before a key into the part detached from it
/// and the comment lines directly above it.
fn split_trivia(mut trivia: Vec<Trivia>) -> (Vec<Trivia>, Vec<String>) {
    let split = trivia
        .iter()
        .rposition(|t| *t == Trivia::Blank)
        .map_or(0, |i| i + 1);
    let above = trivia
        .split_off(split)
        .into_iter()
        .filter_map(|t| match t {
            Trivia::Comment(c) => Some(c),
            Trivia::Blank => None,
        })
        .collect();
    (trivia, above)
}

fn only_comments(trivia: &[Trivia]) -> bool {
    !trivia.is_empty() && trivia.iter().all(|t| matches!(t, Trivia::Comment(_)))
}

fn take_comments(trivia: Vec<Trivia>) -> Option<String> {
    let lines: Vec<String> = trivia
        .into_iter()
        .filter_map(|t| match t {
            Trivia::Comment(c) => Some(c),
            Trivia::Blank => None,
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn scan_layout(text: &str) -> ScannedLayout {
    let mut out = ScannedLayout::default();
    let mut trivia: Vec<Trivia> = Vec::new();
    let mut seen_content = false;
    // Key of the `[section]` currently open, if any.
    let mut section: Option<String> = None;
    // Key whose multi-line value is still open.
    let mut open_key: Option<String> = None;
    let mut scanner = LineScanner::new();

    for raw in text.lines() {
        if scanner.in_value() {
            let trailing = scanner.feed(raw);
            if let (Some(key), Some(c)) = (&open_key, trailing) {
                let c = strip_comment_marker(c).trim_end();
                if !c.is_empty() {
                    out.key(key).comment.push(c.to_string());
                }
            }
            if !scanner.in_value() {
                open_key = None;
            }
            continue;
        }

        let line = raw.trim_start();
        if line.is_empty() {
            if !seen_content && out.preamble.is_none() && only_comments(&trivia) {
                out.preamble = take_comments(std::mem::take(&mut trivia));
            } else {
                trivia.push(Trivia::Blank);
            }
            continue;
        }

        if let Some(after_hash) = line.strip_prefix('#') {
            trivia.push(Trivia::Comment(
                strip_comment_marker(after_hash).trim_end().to_string(),
            ));
            continue;
        }

        seen_content = true;

        if line.starts_with('[') {
            let (leading, above) = split_trivia(std::mem::take(&mut trivia));
            let trailing = scanner.feed(line);
            scanner = LineScanner::new();
            section = header_key(line);
            if let Some(key) = &section {
                let layout = out.key(key);
                layout.leading.extend(leading);
                layout.above |= !above.is_empty();
                layout.comment.extend(above);
                if let Some(c) = trailing.map(|c| strip_comment_marker(c).trim_end()) {
                    if !c.is_empty() {
                        layout.comment.push(c.to_string());
                    }
                }
            }
            continue;
        }

        let trailing = scanner.feed(line);
        let key = match &section {
            Some(key) => Some(key.clone()),
            None => assignment_key(line),
        };
        let Some(key) = key else {
            trivia.clear();
            continue;
        };

        let (leading, above) = split_trivia(std::mem::take(&mut trivia));
        let layout = out.key(&key);
        if section.is_some() {
            // Inside a section only the comment text survives; spacing does
            // not map onto the one-line form.
            layout.above = true;
            layout
                .comment
                .extend(take_comments(leading).into_iter().chain(above));
        } else {
            layout.leading.extend(leading);
            layout.above |= !above.is_empty();
            layout.comment.extend(above);
        }
        if let Some(c) = trailing.map(|c| strip_comment_marker(c).trim_end()) {
            if !c.is_empty() {
                layout.comment.push(c.to_string());
            }
        }
        if scanner.in_value() {
            open_key = Some(key);
        }
    }

    if !seen_content && out.preamble.is_none() && only_comments(&trivia) {
        out.preamble = take_comments(trivia);
    } else {
        while trivia.last() == Some(&Trivia::Blank) {
            trivia.pop();
        }
        out.epilogue = trivia;
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
