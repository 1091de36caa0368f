use super::{
    token::{Token, TokenKind},
    LineBreaks,
};
use crate::lexer::Lexer;

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

/// `KIND literal`, one token per line.
pub struct BasicFormatter;

impl<'src> ToFormatter<BasicFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter {
        BasicFormatter
    }
}

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "EOF".into(),
            kind if token.literal.is_empty() => kind.name().into(),
            kind => format!("{} {}", kind.name(), token.literal),
        }
    }
}

/// Like [`BasicFormatter`] but prefixed with the line the token starts on.
pub struct LineFormatter {
    line_breaks: LineBreaks,
}

impl<'src> ToFormatter<LineFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> LineFormatter {
        LineFormatter {
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl TokenFormatter for LineFormatter {
    fn format(&self, token: &Token) -> String {
        let line = self.line_breaks.get_line_from_span(token.span);
        format!("({line}) {}", BasicFormatter.format(token))
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }
}
