mod span;

pub use span::Span;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("fn", TokenKind::KeywordFunction);
    map.insert("let", TokenKind::KeywordLet);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("return", TokenKind::KeywordReturn);
    map
});

/// Resolves an identifier lexeme to its keyword kind, or [`TokenKind::Ident`].
pub fn lookup_identifier(lexeme: &str) -> TokenKind {
    KEYWORD_HASHMAP
        .get(lexeme)
        .copied()
        .unwrap_or(TokenKind::Ident)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Literals
    Ident,
    Int,
    String,

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    DoubleAsterisk,
    Caret,
    Slash,
    Percent,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,

    // Delimiters
    Comma,
    Semicolon,
    LeftParenthesis,
    RightParenthesis,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Emoji
    EmojiPalm,
    EmojiDino,
    Emoji,

    // Keywords
    KeywordFunction,
    KeywordLet,
    KeywordTrue,
    KeywordFalse,
    KeywordIf,
    KeywordElse,
    KeywordReturn,
}

impl TokenKind {
    /// The upper-case name used by the token listing.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Bang => "BANG",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::DoubleAsterisk => "DOUBLE_ASTERISK",
            TokenKind::Caret => "CARET",
            TokenKind::Slash => "SLASH",
            TokenKind::Percent => "PERCENT",
            TokenKind::LessThan => "LT",
            TokenKind::GreaterThan => "GT",
            TokenKind::Equal => "EQ",
            TokenKind::NotEqual => "NOT_EQ",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::LeftParenthesis => "LPAREN",
            TokenKind::RightParenthesis => "RPAREN",
            TokenKind::LeftBrace => "LBRACE",
            TokenKind::RightBrace => "RBRACE",
            TokenKind::LeftBracket => "LBRACKET",
            TokenKind::RightBracket => "RBRACKET",
            TokenKind::EmojiPalm => "EMOJI_PALM",
            TokenKind::EmojiDino => "EMOJI_DINO",
            TokenKind::Emoji => "EMOJI",
            TokenKind::KeywordFunction => "FUNCTION",
            TokenKind::KeywordLet => "LET",
            TokenKind::KeywordTrue => "TRUE",
            TokenKind::KeywordFalse => "FALSE",
            TokenKind::KeywordIf => "IF",
            TokenKind::KeywordElse => "ELSE",
            TokenKind::KeywordReturn => "RETURN",
        }
    }
}

/// Operators and delimiters display as their symbol, everything else by name.
impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::DoubleAsterisk => "**",
            TokenKind::Caret => "^",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThan => ">",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LeftParenthesis => "(",
            TokenKind::RightParenthesis => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::EmojiPalm => "🌴",
            TokenKind::EmojiDino => "🦖",
            other => other.name(),
        };
        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// The slice of source text this token stands for. String tokens hold
    /// the text between the quotes.
    pub literal: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
