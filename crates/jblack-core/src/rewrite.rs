//! Formatting of individual cell texts
//!
//! [`CellRewriter`] runs one cell's text through a [`CodeFormatter`],
//! falling back to per-segment formatting when the cell holds directive
//! lines and to the original text when the code cannot be parsed.
//! Unparseable units are recorded in [`InvalidCode`] instead of failing.

use crate::error::FormatterError;
use crate::formatter::CodeFormatter;
use crate::magic::{is_magic_line, Segments};
use crate::mode::Mode;
use std::collections::btree_map::{self, BTreeMap};

/// Code the formatter could not parse, keyed by the unit's original text
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InvalidCode {
    entries: BTreeMap<String, String>,
}

impl InvalidCode {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `code` as unparseable with the formatter's `message`.
    pub fn record(&mut self, code: &str, message: &str) {
        self.entries.insert(code.to_string(), message.to_string());
    }

    /// Formatter message recorded for `code`, if any.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(code, message)` pairs ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(code, message)| (code.as_str(), message.as_str()))
    }

    /// Move every entry of `other` into `self`.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

impl IntoIterator for InvalidCode {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Formats cell texts with one formatter and one [`Mode`]
#[derive(Debug, Clone, Copy)]
pub struct CellRewriter<'a, F: ?Sized> {
    formatter: &'a F,
    mode: &'a Mode,
}

impl<'a, F: CodeFormatter + ?Sized> CellRewriter<'a, F> {
    #[must_use]
    pub const fn new(formatter: &'a F, mode: &'a Mode) -> Self {
        Self { formatter, mode }
    }

    /// Format one cell's text.
    ///
    /// Unparseable code is returned unchanged and recorded in `invalid`.
    /// A cell rejected because of a directive line is formatted segment by
    /// segment around its directive lines.
    ///
    /// # Errors
    ///
    /// Returns formatter failures other than [`FormatterError::CannotParse`].
    pub fn format_cell(&self, text: &str, invalid: &mut InvalidCode) -> Result<String, FormatterError> {
        match self.formatter.format_code(text, self.mode) {
            Ok(formatted) => Ok(formatted),
            Err(FormatterError::CannotParse { message, line }) => {
                let segments = Segments::split(text);
                if rejected_directive(line.as_deref()) && segments.magic_count() > 0 {
                    log::debug!(
                        "cell holds {} directive line(s); formatting {} segment(s) separately",
                        segments.magic_count(),
                        segments.code().len()
                    );
                    let formatted =
                        segments.try_map_code(|segment| self.format_segment(segment, invalid))?;
                    Ok(formatted.join())
                } else {
                    log::warn!("cannot parse cell, leaving it unchanged: {message}");
                    invalid.record(text, &message);
                    Ok(text.to_string())
                }
            }
            Err(e) => Err(e),
        }
    }

    fn format_segment(&self, segment: &str, invalid: &mut InvalidCode) -> Result<String, FormatterError> {
        if segment.is_empty() {
            return Ok(String::new());
        }
        match self.formatter.format_code(segment, self.mode) {
            Ok(formatted) => Ok(formatted),
            Err(FormatterError::CannotParse { message, .. }) => {
                log::warn!("cannot parse segment, leaving it unchanged: {message}");
                invalid.record(segment, &message);
                Ok(segment.to_string())
            }
            Err(e) => Err(e),
        }
    }
}

/// Whether the line quoted in a parse failure is a directive line.
fn rejected_directive(line: Option<&str>) -> bool {
    line.is_some_and(|line| is_magic_line(line.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubFormatter;
    use pretty_assertions::assert_eq;

    fn format(text: &str) -> (String, InvalidCode) {
        let mode = Mode::default();
        let rewriter = CellRewriter::new(&StubFormatter, &mode);
        let mut invalid = InvalidCode::new();
        let formatted = rewriter.format_cell(text, &mut invalid).unwrap();
        (formatted, invalid)
    }

    #[test]
    fn test_plain_cell_is_formatted() {
        let (formatted, invalid) = format("x=1\ny = 2");
        assert_eq!(formatted, "x = 1\ny = 2\n");
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_magic_lines_are_preserved_in_place() {
        let text = "%matplotlib inline\nimport numpy as np\nx=np.arange(3)\n!ls   \ny =  2\n%time z=1\n";
        let (formatted, invalid) = format(text);
        assert_eq!(
            formatted,
            "%matplotlib inline\nimport numpy as np\nx = np.arange(3)\n!ls   \ny = 2\n%time z=1\n"
        );
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_unparseable_cell_is_kept_and_recorded() {
        let text = "def f(:\n  return 1\n";
        let (formatted, invalid) = format(text);
        assert_eq!(formatted, text);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid.get(text), Some("Cannot parse: 1:0: def f(:"));
    }

    #[test]
    fn test_unparseable_segment_is_kept_and_others_formatted() {
        let text = "a=1\n%time f()\ndef g(:\n%time h()\nb=2\n";
        let (formatted, invalid) = format(text);
        assert_eq!(formatted, "a = 1\n%time f()\ndef g(:\n%time h()\nb = 2\n");
        assert_eq!(invalid.len(), 1);
        assert!(invalid.get("def g(:\n").is_some());
    }

    #[test]
    fn test_indented_magic_is_not_segmented() {
        let text = "for i in range(3):\n    %time f(i)\n";
        let (formatted, invalid) = format(text);
        assert_eq!(formatted, text);
        assert_eq!(invalid.len(), 1);
    }

    #[test]
    fn test_empty_cell_formats_to_empty_text() {
        let (formatted, invalid) = format("");
        assert_eq!(formatted, "");
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_formatter_failure_propagates() {
        let mode = Mode::default();
        let rewriter = CellRewriter::new(&StubFormatter, &mode);
        let mut invalid = InvalidCode::new();
        let err = rewriter
            .format_cell("raise_formatter_crash()\n", &mut invalid)
            .unwrap_err();
        assert!(matches!(err, FormatterError::Failed { .. }));
    }

    #[test]
    fn test_invalid_code_extend_and_iter() {
        let mut a = InvalidCode::new();
        a.record("b", "second");
        let mut b = InvalidCode::new();
        b.record("a", "first");
        a.extend(b);
        let entries: Vec<_> = a.iter().collect();
        assert_eq!(entries, [("a", "first"), ("b", "second")]);
    }
}
