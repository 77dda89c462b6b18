//! Textual layout of a notebook document
//!
//! Notebooks are written by several tools with different JSON styles:
//! nbformat uses a one-space indent and keeps non-ASCII text as-is, while a
//! bare `json.dumps` produces a single line with `", "` separators and
//! `\uXXXX` escapes. [`Layout`] records the style a document was read with so
//! that it can be written back in the same shape.

use serde_json::ser::Formatter;
use std::io;

/// JSON style detected from a notebook's text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Indentation unit for pretty-printed documents, `None` for single-line documents
    pub indent: Option<String>,
    /// Line terminator used between pretty-printed lines
    pub line_ending: String,
    /// Single-line documents only: `", "` / `": "` instead of `","` / `":"`
    pub spaced_separators: bool,
    /// Non-ASCII characters are written as `\uXXXX` escapes
    pub ascii_only: bool,
    /// Document starts with a UTF-8 byte order mark
    pub bom: bool,
    /// Document ends with a line terminator
    pub trailing_newline: bool,
}

impl Default for Layout {
    /// The layout nbformat writes: one-space indent, trailing newline.
    fn default() -> Self {
        Self {
            indent: Some(" ".to_string()),
            line_ending: "\n".to_string(),
            spaced_separators: false,
            ascii_only: false,
            bom: false,
            trailing_newline: true,
        }
    }
}

impl Layout {
    /// Detect the layout of a notebook document from its text.
    #[must_use]
    pub fn detect(content: &str) -> Self {
        let bom = content.starts_with('\u{feff}');
        let body = content.trim_start_matches('\u{feff}');
        let trimmed = body.trim_end();

        let line_ending = if trimmed.contains("\r\n") || body.ends_with("\r\n") {
            "\r\n"
        } else {
            "\n"
        };

        let indent = trimmed.split_once('\n').map(|(_, rest)| {
            rest.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect::<String>()
        });

        let spaced_separators = indent.is_none() && key_separator_is_spaced(trimmed);

        Self {
            indent,
            line_ending: line_ending.to_string(),
            spaced_separators,
            ascii_only: body.is_ascii() && body.contains("\\u"),
            bom,
            trailing_newline: body.ends_with('\n'),
        }
    }

    pub(crate) fn formatter(&self) -> LayoutFormatter<'_> {
        LayoutFormatter {
            layout: self,
            depth: 0,
            has_value: false,
        }
    }
}

/// Whether the first key/value separator outside a string literal is `": "`.
fn key_separator_is_spaced(text: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == ':' {
            return chars.next() == Some(' ');
        }
    }
    false
}

/// `serde_json` formatter that reproduces a [`Layout`]
pub(crate) struct LayoutFormatter<'a> {
    layout: &'a Layout,
    depth: usize,
    has_value: bool,
}

impl LayoutFormatter<'_> {
    fn newline_and_indent<W: ?Sized + io::Write>(&self, writer: &mut W, indent: &str) -> io::Result<()> {
        writer.write_all(self.layout.line_ending.as_bytes())?;
        for _ in 0..self.depth {
            writer.write_all(indent.as_bytes())?;
        }
        Ok(())
    }

    fn open<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(bracket)
    }

    fn close<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth -= 1;
        if let Some(indent) = &self.layout.indent {
            if self.has_value {
                self.newline_and_indent(writer, indent)?;
            }
        }
        writer.write_all(bracket)
    }

    fn separate<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        match &self.layout.indent {
            Some(indent) => {
                if !first {
                    writer.write_all(b",")?;
                }
                self.newline_and_indent(writer, indent)
            }
            None if first => Ok(()),
            None if self.layout.spaced_separators => writer.write_all(b", "),
            None => writer.write_all(b","),
        }
    }
}

impl Formatter for LayoutFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.separate(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.separate(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.layout.indent.is_some() || self.layout.spaced_separators {
            writer.write_all(b": ")
        } else {
            writer.write_all(b":")
        }
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        if !self.layout.ascii_only || fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_nbformat_layout() {
        let layout = Layout::detect("{\n \"cells\": [],\n \"nbformat\": 4\n}\n");
        assert_eq!(layout, Layout::default());
    }

    #[test]
    fn test_detect_two_space_indent_without_newline() {
        let layout = Layout::detect("{\n  \"cells\": []\n}");
        assert_eq!(layout.indent.as_deref(), Some("  "));
        assert!(!layout.trailing_newline);
    }

    #[test]
    fn test_detect_python_dumps_layout() {
        let layout = Layout::detect("{\"cells\": [], \"note\": \"caf\\u00e9\"}");
        assert_eq!(layout.indent, None);
        assert!(layout.spaced_separators);
        assert!(layout.ascii_only);
        assert!(!layout.trailing_newline);
    }

    #[test]
    fn test_detect_compact_layout() {
        let layout = Layout::detect("{\"a\":\"x: y\",\"cells\":[]}");
        assert_eq!(layout.indent, None);
        assert!(!layout.spaced_separators);
    }

    #[test]
    fn test_separator_inside_string_is_ignored() {
        assert!(!key_separator_is_spaced("{\"a: \\\"b\":1}"));
        assert!(key_separator_is_spaced("{\"a:b\": 1}"));
    }

    #[test]
    fn test_detect_bom_and_crlf() {
        let layout = Layout::detect("\u{feff}{\r\n \"cells\": []\r\n}\r\n");
        assert!(layout.bom);
        assert_eq!(layout.line_ending, "\r\n");
        assert_eq!(layout.indent.as_deref(), Some(" "));
        assert!(layout.trailing_newline);
    }

    #[test]
    fn test_ascii_without_unicode_escapes_is_not_ascii_only() {
        let layout = Layout::detect("{\"cells\": [], \"path\": \"C:\\\\data\"}");
        assert!(!layout.ascii_only);
    }

    #[test]
    fn test_non_ascii_document_is_not_ascii_only() {
        let layout = Layout::detect("{\n \"cells\": [],\n \"title\": \"café\"\n}\n");
        assert!(!layout.ascii_only);
    }
}
