mod error;
pub mod formatter;
mod precedence;

use crate::{
    expression::{Expression, FunctionLiteral, Identifier, InfixOperator, PrefixOperator},
    lexer::{Lexer, Token, TokenKind},
    statement::{BlockStatement, Program, Statement},
};
pub use error::{ParserError, ParserErrorKind};
pub use precedence::Precedence;
use std::{collections::HashMap, rc::Rc};

/// Deepest nesting of expressions the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 1_000;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Builds an expression rooted at the current token.
pub type PrefixParseFn<'src> = fn(&mut Parser<'src>) -> Option<Expression>;
/// Extends an already parsed left operand; the current token is the operator.
pub type InfixParseFn<'src> = fn(&mut Parser<'src>, Expression) -> Option<Expression>;

/// Pratt parser over a two token window (`current`, `peek`).
///
/// Failures never abort the parse. Each one is recorded in [`Parser::errors`]
/// and the construct being built is dropped, after which parsing resumes with
/// the next statement. Callers must check the error list before trusting the
/// returned [`Program`].
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token<'src>,
    peek: Token<'src>,
    errors: Vec<ParserError>,
    prefix_parsers: HashMap<TokenKind, PrefixParseFn<'src>>,
    infix_parsers: HashMap<TokenKind, InfixParseFn<'src>>,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::from_lexer(Lexer::new(source))
    }

    pub fn from_lexer(mut lexer: Lexer<'src>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        let mut parser = Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
            prefix_parsers: HashMap::new(),
            infix_parsers: HashMap::new(),
            depth: 0,
        };

        parser.register_prefix(TokenKind::Ident, Self::parse_identifier);
        parser.register_prefix(TokenKind::Int, Self::parse_integer_literal);
        parser.register_prefix(TokenKind::String, Self::parse_string_literal);
        parser.register_prefix(TokenKind::KeywordTrue, Self::parse_boolean);
        parser.register_prefix(TokenKind::KeywordFalse, Self::parse_boolean);
        parser.register_prefix(TokenKind::Bang, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::Minus, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::LeftParenthesis, Self::parse_grouped_expression);
        parser.register_prefix(TokenKind::LeftBracket, Self::parse_array_literal);
        parser.register_prefix(TokenKind::KeywordIf, Self::parse_if_expression);
        parser.register_prefix(TokenKind::KeywordFunction, Self::parse_function_literal);

        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Asterisk,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::DoubleAsterisk,
            TokenKind::LessThan,
            TokenKind::GreaterThan,
            TokenKind::Equal,
            TokenKind::NotEqual,
        ] {
            parser.register_infix(kind, Self::parse_infix_expression);
        }
        parser.register_infix(TokenKind::LeftParenthesis, Self::parse_call_expression);
        parser.register_infix(TokenKind::LeftBracket, Self::parse_index_expression);

        parser
    }

    pub fn register_prefix(&mut self, kind: TokenKind, parse_fn: PrefixParseFn<'src>) {
        self.prefix_parsers.insert(kind, parse_fn);
    }

    pub fn register_infix(&mut self, kind: TokenKind, parse_fn: InfixParseFn<'src>) {
        self.infix_parsers.insert(kind, parse_fn);
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    pub fn get_source(&self) -> &'src str {
        self.lexer.get_source()
    }
}

// Token window
impl<'src> Parser<'src> {
    fn advance(&mut self) {
        self.current = self.peek;
        self.peek = self.lexer.next_token();
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advances only if the peeked token has the expected kind, recording an
    /// error otherwise.
    fn expect_peek(&mut self, expected: TokenKind) -> Option<()> {
        if self.peek_is(expected) {
            self.advance();
            Some(())
        } else {
            self.record(ParserError {
                kind: ParserErrorKind::UnexpectedToken {
                    expected,
                    actual: self.peek.kind,
                },
                span: self.peek.span,
            });
            None
        }
    }

    fn eat_semicolon(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Drops the rest of the input.
    fn skip_to_end(&mut self) {
        while !self.current_is(TokenKind::Eof) {
            self.advance();
        }
    }

    fn record(&mut self, error: ParserError) {
        tracing::debug!(code = error.code(), %error, "recorded parser error");
        self.errors.push(error);
    }

    fn current_identifier(&self) -> Identifier {
        Identifier {
            name: self.current.literal.into(),
            span: self.current.span,
        }
    }
}

// Statements
impl<'src> Parser<'src> {
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::KeywordLet => self.parse_let_statement(),
            TokenKind::KeywordReturn => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = self.current_identifier();
        self.expect_peek(TokenKind::Assign)?;
        self.advance();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.eat_semicolon();
        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.eat_semicolon();
        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.eat_semicolon();
        Some(Statement::Expression(expr))
    }

    /// Expects the current token to be `{` and stops on the matching `}` or EOF.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut statements = Vec::new();
        self.advance();
        while !self.current_is(TokenKind::RightBrace) && !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        BlockStatement { statements }
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    /// Past [`MAX_NESTING_DEPTH`] the error is recorded and the rest of the
    /// input is skipped, since no useful statement can follow.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.record(ParserError {
                kind: ParserErrorKind::NestingTooDeep(MAX_NESTING_DEPTH),
                span: self.current.span,
            });
            self.skip_to_end();
            return None;
        }

        self.depth += 1;
        let expr = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.parse_expression_inner(precedence)
        });
        self.depth -= 1;
        expr
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = self.prefix_parsers.get(&self.current.kind).copied() else {
            self.record(ParserError {
                kind: ParserErrorKind::NoPrefixParseFunction(self.current.kind),
                span: self.current.span,
            });
            return None;
        };
        let mut lhs = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < Precedence::of(self.peek.kind) {
            let Some(infix) = self.infix_parsers.get(&self.peek.kind).copied() else {
                return Some(lhs);
            };
            self.advance();
            lhs = infix(self, lhs)?;
        }

        Some(lhs)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.current_identifier()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.current.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                self.record(ParserError {
                    kind: ParserErrorKind::InvalidInteger(self.current.literal.into()),
                    span: self.current.span,
                });
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::StringLiteral(self.current.literal.into()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::BooleanLiteral(
            self.current_is(TokenKind::KeywordTrue),
        ))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = PrefixOperator::from_token_kind(self.current.kind)?;
        self.advance();
        let operand = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParenthesis)?;
        Some(expr)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TokenKind::RightBracket)?;
        Some(Expression::ArrayLiteral(elements))
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParenthesis)?;
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParenthesis)?;
        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement();

        let mut alternative = None;
        if self.peek_is(TokenKind::KeywordElse) {
            self.advance();
            self.expect_peek(TokenKind::LeftBrace)?;
            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParenthesis)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement();
        Some(Expression::Function(Rc::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::RightParenthesis) {
            self.advance();
            return Some(parameters);
        }

        self.expect_peek(TokenKind::Ident)?;
        parameters.push(self.current_identifier());
        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(self.current_identifier());
        }

        self.expect_peek(TokenKind::RightParenthesis)?;
        Some(parameters)
    }

    fn parse_infix_expression(&mut self, lhs: Expression) -> Option<Expression> {
        let operator = InfixOperator::from_token_kind(self.current.kind)?;
        let precedence = Precedence::of(self.current.kind);
        self.advance();
        let rhs = self.parse_expression(precedence.right_operand())?;
        Some(Expression::Infix {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
        Some(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, collection: Expression) -> Option<Expression> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightBracket)?;
        Some(Expression::Index {
            collection: Box::new(collection),
            index: Box::new(index),
        })
    }

    /// Comma separated expressions up to `end`. The current token is the opener.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut items = Vec::new();
        if self.peek_is(end) {
            self.advance();
            return Some(items);
        }

        self.advance();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(items)
    }
}
