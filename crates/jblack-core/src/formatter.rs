use crate::error::FormatterError;
use crate::mode::Mode;

/// A code formatter invoked as a black box: text in, formatted text out.
///
/// Implementations must be usable from several worker threads at once.
pub trait CodeFormatter: Send + Sync {
    /// Format one unit of source text (a whole cell or a segment of one).
    ///
    /// # Errors
    ///
    /// Returns [`FormatterError::CannotParse`] when the input is not valid
    /// source, and other variants when the formatter itself fails.
    fn format_code(&self, source: &str, mode: &Mode) -> Result<String, FormatterError>;
}

impl<F: CodeFormatter + ?Sized> CodeFormatter for &F {
    fn format_code(&self, source: &str, mode: &Mode) -> Result<String, FormatterError> {
        (**self).format_code(source, mode)
    }
}
