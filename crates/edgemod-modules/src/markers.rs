//! Marker-delimited text documents
//!
//! Ledgers and patch targets are plain text files in which tooling owns the
//! lines between a start and an end comment. [`MarkedDocument`] splits a file
//! into lines, locates marker blocks and renders the file back with its
//! original trailing-newline state. Block entries of the form
//! `"key": value,` are read and written through [`BlockEntry`].

use edgemod_core::config::{marker_end, marker_start};
use std::collections::BTreeMap;

/// A start/end marker comment pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

impl MarkerPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// `// EDGE MODULE <name> START` / `// EDGE MODULE <name> END`
    pub fn named(name: &str) -> Self {
        Self::new(marker_start(name), marker_end(name))
    }
}

/// Line indices of a located block: `start` and `end` are the marker lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: usize,
    pub end: usize,
}

impl BlockRange {
    /// Index of the first line after the start marker
    pub fn inner_start(&self) -> usize {
        self.start + 1
    }
}

/// A text file as a list of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedDocument {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl MarkedDocument {
    /// Split on `\n` or `\r\n`. A final line terminator is remembered rather
    /// than kept as an empty line.
    pub fn parse(content: &str) -> Self {
        let trailing_newline = content.ends_with('\n');
        let body = if trailing_newline {
            content
                .strip_suffix("\r\n")
                .or_else(|| content.strip_suffix('\n'))
                .unwrap_or(content)
        } else {
            content
        };

        let lines = if body.is_empty() && trailing_newline {
            vec![String::new()]
        } else {
            body.split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect()
        };

        Self {
            lines,
            trailing_newline,
        }
    }

    /// First line containing the start marker, then the first line after it
    /// containing the end marker.
    pub fn find_block(&self, pair: &MarkerPair) -> Option<BlockRange> {
        let start = self.lines.iter().position(|l| l.contains(&pair.start))?;
        let end = self.lines[start + 1..]
            .iter()
            .position(|l| l.contains(&pair.end))
            .map(|offset| start + 1 + offset)?;
        Some(BlockRange { start, end })
    }

    /// Lines strictly between the markers
    pub fn block_lines(&self, range: BlockRange) -> &[String] {
        &self.lines[range.inner_start()..range.end]
    }

    /// Block body joined with `\n`
    pub fn block_text(&self, range: BlockRange) -> String {
        self.block_lines(range).join("\n")
    }

    /// Replace everything between the markers. Returns the new range.
    pub fn replace_block(&mut self, range: BlockRange, body: Vec<String>) -> BlockRange {
        let len = body.len();
        self.lines.splice(range.inner_start()..range.end, body);
        BlockRange {
            start: range.start,
            end: range.inner_start() + len,
        }
    }

    /// Insert lines before `index`
    pub fn insert_lines(&mut self, index: usize, new_lines: Vec<String>) {
        self.lines.splice(index..index, new_lines);
    }

    /// Remove every line in the block for which `predicate` holds
    pub fn remove_block_lines<F>(&mut self, range: BlockRange, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let body: Vec<String> = self.block_lines(range).to_vec();
        let kept: Vec<String> = body.iter().filter(|l| !predicate(l)).cloned().collect();
        let removed = body.len() - kept.len();
        if removed > 0 {
            self.replace_block(range, kept);
        }
        removed
    }

    /// Parse the `"key": value,` entries of a block, ignoring other lines
    pub fn read_entries(&self, range: BlockRange) -> BTreeMap<String, EntryValue> {
        self.block_lines(range)
            .iter()
            .filter_map(|l| BlockEntry::parse(l))
            .map(|e| (e.key, e.value))
            .collect()
    }

    /// Rewrite a block from entries in key order
    pub fn write_entries(
        &mut self,
        range: BlockRange,
        entries: &BTreeMap<String, EntryValue>,
    ) -> BlockRange {
        let body = entries
            .iter()
            .map(|(key, value)| BlockEntry::render(key, value))
            .collect();
        self.replace_block(range, body)
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }
}

/// Value side of a block entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    /// A quoted string (`"1.2.0"`)
    Literal(String),
    /// A bare identifier (`formsModule`)
    Identifier(String),
}

impl EntryValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) | Self::Identifier(s) => s,
        }
    }
}

/// One `"key": value,` line of a ledger block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    pub key: String,
    pub value: EntryValue,
}

impl BlockEntry {
    /// Parse an entry line; anything else (comments, blank lines) is `None`
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let (key, rest) = split_string_literal(trimmed)?;
        let rest = rest.trim_start().strip_prefix(':')?.trim();
        let rest = rest.strip_suffix(',').unwrap_or(rest).trim_end();

        let value = if rest.starts_with('"') {
            let (literal, tail) = split_string_literal(rest)?;
            if !tail.trim().is_empty() {
                return None;
            }
            EntryValue::Literal(literal)
        } else if !rest.is_empty() && rest.chars().all(is_identifier_char) {
            EntryValue::Identifier(rest.to_string())
        } else {
            return None;
        };

        Some(Self { key, value })
    }

    /// Two-space indented entry line with a trailing comma
    pub fn render(key: &str, value: &EntryValue) -> String {
        let value = match value {
            EntryValue::Literal(s) => quote(s),
            EntryValue::Identifier(s) => s.clone(),
        };
        format!("  {}: {},", quote(key), value)
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Split a leading JSON string literal off `s`, returning the decoded string
/// and the remainder.
fn split_string_literal(s: &str) -> Option<(String, &str)> {
    if !s.starts_with('"') {
        return None;
    }
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => {
                let literal = &s[..=i];
                let decoded: String = serde_json::from_str(literal).ok()?;
                return Some((decoded, &s[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = "export const edgeModuleRegistry = {\n  // EDGE MODULE REGISTRY START\n  \"b\": \"2.0.0\",\n  // hand note\n  \"a\": \"1.0.0\",\n  // EDGE MODULE REGISTRY END\n};\n";

    #[test]
    fn test_parse_and_render_preserve_trailing_newline() {
        assert_eq!(MarkedDocument::parse(LEDGER).render(), LEDGER);

        let no_newline = "line one\nline two";
        assert_eq!(MarkedDocument::parse(no_newline).render(), no_newline);
    }

    #[test]
    fn test_crlf_is_normalized() {
        let doc = MarkedDocument::parse("a\r\nb\r\n");
        assert_eq!(doc.lines, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(doc.render(), "a\nb\n");
    }

    #[test]
    fn test_find_block_requires_end_after_start() {
        let doc = MarkedDocument::parse("// X END\n// X START\nbody\n");
        let pair = MarkerPair::new("// X START", "// X END");
        assert!(doc.find_block(&pair).is_none());
    }

    #[test]
    fn test_entries_are_rewritten_sorted() {
        let mut doc = MarkedDocument::parse(LEDGER);
        let pair = MarkerPair::named("REGISTRY");
        let range = doc.find_block(&pair).unwrap();

        let mut entries = doc.read_entries(range);
        assert_eq!(entries.len(), 2);
        entries.insert("c".into(), EntryValue::Literal("0.1.0".into()));
        doc.write_entries(range, &entries);

        let rendered = doc.render();
        let a = rendered.find("\"a\"").unwrap();
        let b = rendered.find("\"b\"").unwrap();
        let c = rendered.find("\"c\"").unwrap();
        assert!(a < b && b < c);
        assert!(!rendered.contains("hand note"));
        assert!(rendered.ends_with("};\n"));
    }

    #[test]
    fn test_block_entry_codec() {
        let entry = BlockEntry::parse("  \"pep-talk\": pepTalkModule,").unwrap();
        assert_eq!(entry.key, "pep-talk");
        assert_eq!(entry.value, EntryValue::Identifier("pepTalkModule".into()));

        let entry = BlockEntry::parse("\"forms\":\"1.2.3\"").unwrap();
        assert_eq!(entry.value, EntryValue::Literal("1.2.3".into()));

        assert!(BlockEntry::parse("// comment").is_none());
        assert!(BlockEntry::parse("\"x\": some call(),").is_none());

        assert_eq!(
            BlockEntry::render("forms", &EntryValue::Literal("1.2.3".into())),
            "  \"forms\": \"1.2.3\","
        );
    }

    #[test]
    fn test_remove_block_lines() {
        let mut doc = MarkedDocument::parse("// A START\nkeep\ndrop\n// A END\n");
        let range = doc.find_block(&MarkerPair::new("// A START", "// A END")).unwrap();
        assert_eq!(doc.remove_block_lines(range, |l| l == "drop"), 1);
        assert_eq!(doc.render(), "// A START\nkeep\n// A END\n");
    }
}
