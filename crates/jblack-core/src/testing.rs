//! Deterministic stand-in for Black used by unit tests
//!
//! Rules, applied line by line:
//! - a line starting (after indentation) with `%`, `!` or `$`, or containing
//!   `(:`, cannot be parsed; the first such line is reported the way Black
//!   reports it
//! - a lone top-level `=` gets exactly one space on each side
//! - trailing whitespace, leading and trailing blank lines are removed
//! - non-empty output ends with a newline
//!
//! Source containing `raise_formatter_crash` makes the formatter itself fail.

use crate::error::FormatterError;
use crate::formatter::CodeFormatter;
use crate::magic::MAGIC_PREFIXES;
use crate::mode::Mode;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StubFormatter;

impl CodeFormatter for StubFormatter {
    fn format_code(&self, source: &str, _mode: &Mode) -> Result<String, FormatterError> {
        if source.contains("raise_formatter_crash") {
            return Err(FormatterError::Failed {
                code: Some(1),
                stderr: "error: cannot format -: INTERNAL ERROR".to_string(),
            });
        }

        for (index, line) in source.lines().enumerate() {
            if line.trim_start().starts_with(MAGIC_PREFIXES) || line.contains("(:") {
                return Err(FormatterError::CannotParse {
                    message: format!("Cannot parse: {}:0: {line}", index + 1),
                    line: Some(line.to_string()),
                });
            }
        }

        let lines: Vec<String> = source.lines().map(space_assignment).collect();
        let first = lines.iter().position(|l| !l.is_empty());
        let last = lines.iter().rposition(|l| !l.is_empty());

        match (first, last) {
            (Some(first), Some(last)) => Ok(lines[first..=last].join("\n") + "\n"),
            _ => Ok(String::new()),
        }
    }
}

fn space_assignment(line: &str) -> String {
    let line = line.trim_end();
    let bytes = line.as_bytes();
    let mut depth = 0i32;

    for (pos, &byte) in bytes.iter().enumerate() {
        match byte {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'"' | b'\'' | b'#' => break,
            b'=' if depth == 0 => {
                let prev = pos.checked_sub(1).map(|i| bytes[i]);
                let next = bytes.get(pos + 1).copied();
                if matches!(prev, Some(b'<' | b'>' | b'!' | b'=')) || next == Some(b'=') {
                    break;
                }
                let (left, right) = line.split_at(pos);
                return format!("{} = {}", left.trim_end(), right[1..].trim_start());
            }
            _ => {}
        }
    }
    line.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_is_idempotent() {
        let mode = Mode::default();
        let once = StubFormatter.format_code("\n\nx=1\ny  =  f(a=1)\n\n", &mode).unwrap();
        assert_eq!(once, "x = 1\ny = f(a=1)\n");
        assert_eq!(StubFormatter.format_code(&once, &mode).unwrap(), once);
    }
}
