use crate::lexer::TokenKind;

/// Binding strength of an operator; later variants bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    // ==, !=
    Equals,
    // <, >
    LessGreater,
    // +, -
    Sum,
    // *, /, %
    Product,
    // ** (right associative)
    Power,
    // -x, !x
    Prefix,
    // f(x)
    Call,
    // a[i]
    Index,
}

impl Precedence {
    /// The precedence a token has in infix position. Tokens that cannot
    /// continue an expression get [`Precedence::Lowest`].
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Equal | TokenKind::NotEqual => Self::Equals,
            TokenKind::LessThan | TokenKind::GreaterThan => Self::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Self::Sum,
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Self::Product,
            TokenKind::DoubleAsterisk => Self::Power,
            TokenKind::LeftParenthesis => Self::Call,
            TokenKind::LeftBracket => Self::Index,
            _ => Self::Lowest,
        }
    }

    /// The precedence to parse a right operand with. One step looser for
    /// right associative operators so that an equal operator nests rightwards.
    pub fn right_operand(self) -> Self {
        match self {
            Self::Power => Self::Product,
            other => other,
        }
    }
}
