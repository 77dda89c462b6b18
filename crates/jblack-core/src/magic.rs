//! IPython magic commands and shell escapes
//!
//! Lines such as `%matplotlib inline`, `%%time` or `!pip install x` are
//! understood by the notebook kernel but are not Python, so a cell holding
//! one cannot be formatted as a whole. [`Segments`] splits such a cell into
//! the runs of ordinary code between directive lines so each run can be
//! formatted on its own, then stitches the cell back together with the
//! directive lines untouched.

use jblack_notebook::split_fragments;

/// Prefixes marking a directive line
pub const MAGIC_PREFIXES: [char; 3] = ['%', '!', '$'];

/// Whether `line` is a directive line.
#[inline]
#[must_use]
pub fn is_magic_line(line: &str) -> bool {
    line.trim_end().starts_with(MAGIC_PREFIXES)
}

/// A cell split around its directive lines
///
/// Always holds exactly one more code segment than directive lines:
/// `code[0], magic[0], code[1], magic[1], ..., code[n]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segments {
    code: Vec<String>,
    magics: Vec<String>,
}

impl Segments {
    /// Split `text` at every directive line.
    #[must_use]
    pub fn split(text: &str) -> Self {
        let mut code = vec![String::new()];
        let mut magics = Vec::new();

        for line in split_fragments(text) {
            if is_magic_line(&line) {
                magics.push(line);
                code.push(String::new());
            } else if let Some(current) = code.last_mut() {
                current.push_str(&line);
            }
        }

        Self { code, magics }
    }

    /// Number of directive lines found.
    #[inline]
    #[must_use]
    pub fn magic_count(&self) -> usize {
        self.magics.len()
    }

    /// The code segments between directive lines, in order.
    #[inline]
    #[must_use]
    pub fn code(&self) -> &[String] {
        &self.code
    }

    /// Replace every code segment with the result of `f`, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map_code<E, F>(mut self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        for segment in &mut self.code {
            *segment = f(segment)?;
        }
        Ok(self)
    }

    /// Reassemble the cell text.
    #[must_use]
    pub fn join(&self) -> String {
        let mut text = String::new();
        for (index, segment) in self.code.iter().enumerate() {
            text.push_str(segment);
            if let Some(magic) = self.magics.get(index) {
                text.push_str(magic);
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_magic_line() {
        assert!(is_magic_line("%matplotlib inline\n"));
        assert!(is_magic_line("%%time"));
        assert!(is_magic_line("!pip install black  \n"));
        assert!(is_magic_line("$ echo hi"));
        assert!(!is_magic_line("x = 1 % 2\n"));
        assert!(!is_magic_line("    %time f()\n"));
        assert!(!is_magic_line("\n"));
    }

    #[test]
    fn test_split_without_magics() {
        let segments = Segments::split("x = 1\ny = 2\n");
        assert_eq!(segments.magic_count(), 0);
        assert_eq!(segments.code(), ["x = 1\ny = 2\n"]);
    }

    #[test]
    fn test_split_around_magics() {
        let text = "import numpy\n%matplotlib inline\nx=1\n!ls\ny=2";
        let segments = Segments::split(text);
        assert_eq!(segments.magic_count(), 2);
        assert_eq!(segments.code(), ["import numpy\n", "x=1\n", "y=2"]);
        assert_eq!(segments.join(), text);
    }

    #[test]
    fn test_split_leading_and_adjacent_magics() {
        let text = "%%time\n%load_ext autoreload\nfor i in range(3):\n    print(i)\n";
        let segments = Segments::split(text);
        assert_eq!(segments.code(), ["", "", "for i in range(3):\n    print(i)\n"]);
        assert_eq!(segments.join(), text);
    }

    #[test]
    fn test_trailing_magic_without_newline() {
        let segments = Segments::split("x = 1\n%time f()");
        assert_eq!(segments.code(), ["x = 1\n", ""]);
        assert_eq!(segments.join(), "x = 1\n%time f()");
    }

    #[test]
    fn test_try_map_code_keeps_magics_in_place() {
        let segments = Segments::split("a\n%magic one\nb\n%magic two\nc\n");
        let mapped = segments
            .try_map_code(|code| Ok::<_, ()>(code.to_uppercase()))
            .unwrap();
        assert_eq!(mapped.join(), "A\n%magic one\nB\n%magic two\nC\n");
    }

    #[test]
    fn test_try_map_code_stops_on_error() {
        let mut calls = 0;
        let result = Segments::split("a\n%m\nb\n").try_map_code(|_| {
            calls += 1;
            Err::<String, _>("boom")
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 1);
    }
}
