pub mod formatter;
mod token;

use std::{iter::Peekable, ops::Range, rc::Rc, str::CharIndices};
pub use token::{lookup_identifier, Span, Token, TokenKind, KEYWORD_HASHMAP};

const PALM_TREE: char = '\u{1F334}';
const DINOSAUR: char = '\u{1F996}';

/// Maps byte offsets back to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<usize>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_breaks = if !text.is_empty() {
            let mut line_breaks = Vec::new();
            let mut cursor = 0;
            for (offset, byte) in text.bytes().enumerate() {
                let offset = offset + 1;
                if byte == b'\n' {
                    line_breaks.push(cursor..offset);
                    cursor = offset;
                }
            }
            if !text.ends_with('\n') {
                line_breaks.push(cursor..text.len() + 1);
            }
            line_breaks
        } else {
            vec![0..1]
        };
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        (self.line_breaks.len() + 1) as u32
    }

    pub fn get_line(&self, offset: usize) -> u32 {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start())
    }
}

/// Single pass scanner producing one [`Token`] per call to [`Lexer::next_token`].
///
/// Lexing never fails: characters that start no token come out as
/// [`TokenKind::Illegal`] and are left for the parser to report.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    emitted_eof: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            emitted_eof: false,
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        LineBreaks::new(self.source)
    }

    pub fn next_token(&mut self) -> Token<'src> {
        self.skip_whitespace();

        let Some((start, c)) = self.chars.next() else {
            let end = self.source.len();
            return Token {
                kind: TokenKind::Eof,
                literal: "",
                span: Span::new(end, end),
            };
        };

        let kind = match c {
            '=' => self.either('=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.either('=', TokenKind::NotEqual, TokenKind::Bang),
            '*' => self.either('*', TokenKind::DoubleAsterisk, TokenKind::Asterisk),
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LeftParenthesis,
            ')' => TokenKind::RightParenthesis,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '"' => return self.lex_string(start),
            PALM_TREE => TokenKind::EmojiPalm,
            DINOSAUR => TokenKind::EmojiDino,
            c if is_letter(c) => return self.lex_identifier(start),
            c if c.is_ascii_digit() => return self.lex_integer(start),
            c if is_emoji(c) => TokenKind::Emoji,
            _ => TokenKind::Illegal,
        };

        let end = self.current_offset();
        Token {
            kind,
            literal: &self.source[start..end],
            span: Span::new(start, end),
        }
    }
}

impl<'src> Lexer<'src> {
    fn current_offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(offset, _)| *offset)
            .unwrap_or(self.source.len())
    }

    /// Consumes `next` if it follows, choosing between a two and one character token.
    fn either(&mut self, next: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.chars.next_if(|(_, c)| *c == next).is_some() {
            double
        } else {
            single
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .chars
            .next_if(|(_, c)| matches!(*c, ' ' | '\t' | '\n' | '\r'))
            .is_some()
        {}
    }

    fn consume_while(&mut self, predicate: impl Fn(char) -> bool) -> usize {
        while self.chars.next_if(|(_, c)| predicate(*c)).is_some() {}
        self.current_offset()
    }

    fn lex_identifier(&mut self, start: usize) -> Token<'src> {
        let end = self.consume_while(is_letter);
        let literal = &self.source[start..end];
        Token {
            kind: lookup_identifier(literal),
            literal,
            span: Span::new(start, end),
        }
    }

    fn lex_integer(&mut self, start: usize) -> Token<'src> {
        let end = self.consume_while(|c| c.is_ascii_digit());
        Token {
            kind: TokenKind::Int,
            literal: &self.source[start..end],
            span: Span::new(start, end),
        }
    }

    /// An unterminated string runs to the end of input.
    fn lex_string(&mut self, start: usize) -> Token<'src> {
        let content_end = self.consume_while(|c| c != '"');
        let end = match self.chars.next() {
            Some((offset, _)) => offset + 1,
            None => content_end,
        };
        Token {
            kind: TokenKind::String,
            literal: &self.source[start + 1..content_end],
            span: Span::new(start, end),
        }
    }
}

/// Yields every token up to and including the first EOF.
impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F // Emoticons
            | 0x1F300..=0x1F5FF // Miscellaneous symbols and pictographs
            | 0x1F680..=0x1F6FF // Transport and map symbols
            | 0x2600..=0x26FF // Miscellaneous symbols
            | 0x2700..=0x27BF // Dingbats
            | 0x1F1E6..=0x1F1FF // Regional indicators
    )
}
