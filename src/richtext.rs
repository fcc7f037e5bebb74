//! Styled text fragments.
//!
//! A [`Span`] is a slice of text that is either regular or bold, the only inline styling the
//! report uses.  Spans are converted into [`genpdf`] styled strings when the document is rendered.

use genpdf::style::{Style, StyledString};

/// A slice of text together with its weight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Convenience shorthand that marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Converts the span to a [`StyledString`].
    pub fn to_styled_string(&self) -> StyledString {
        let mut style = Style::new();
        if self.bold {
            style.set_bold();
        }
        StyledString::new(self.text.clone(), style)
    }
}
