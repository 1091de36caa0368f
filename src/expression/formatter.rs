use super::Expression;
use crate::statement::{BlockStatement, Statement};

pub trait ExpressionFormatter {
    fn format(&self, expr: &Expression) -> String;
    fn format_statement(&self, stmt: &Statement) -> String;
}

/// Prefix notation, e.g. `(+ 1 (* 2 3))`.
pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_node(expr: &Expression) -> String {
        match expr {
            Expression::Identifier(ident) => format!("{ident}"),
            Expression::IntegerLiteral(v) => format!("{v}"),
            Expression::BooleanLiteral(v) => format!("{v}"),
            Expression::StringLiteral(v) => format!("{v:?}"),
            Expression::ArrayLiteral(elements) => {
                Self::format_list("array", elements.iter().map(Self::format_node))
            }
            Expression::Prefix { operator, operand } => {
                format!("({operator} {})", Self::format_node(operand))
            }
            Expression::Infix { operator, lhs, rhs } => format!(
                "({operator} {} {})",
                Self::format_node(lhs),
                Self::format_node(rhs)
            ),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let mut buffer = format!(
                    "(if {} {}",
                    Self::format_node(condition),
                    Self::format_block(consequence)
                );
                if let Some(alternative) = alternative {
                    buffer.push(' ');
                    buffer.push_str(&Self::format_block(alternative));
                }
                buffer.push(')');
                buffer
            }
            Expression::Function(literal) => {
                let parameters = literal
                    .parameters
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("(fn ({parameters}) {})", Self::format_block(&literal.body))
            }
            Expression::Call { callee, arguments } => {
                let mut buffer = format!("(call {}", Self::format_node(callee));
                for argument in arguments.iter() {
                    buffer.push_str(&format!(" {}", Self::format_node(argument)));
                }
                buffer.push(')');
                buffer
            }
            Expression::Index { collection, index } => format!(
                "(index {} {})",
                Self::format_node(collection),
                Self::format_node(index)
            ),
        }
    }

    fn format_block(block: &BlockStatement) -> String {
        Self::format_list("block", block.statements.iter().map(Self::format_stmt))
    }

    fn format_stmt(stmt: &Statement) -> String {
        match stmt {
            Statement::Let { name, value } => format!("(let {name} {})", Self::format_node(value)),
            Statement::Return(value) => format!("(return {})", Self::format_node(value)),
            Statement::Expression(expr) => Self::format_node(expr),
        }
    }

    fn format_list(head: &str, items: impl Iterator<Item = String>) -> String {
        let mut buffer = format!("({head}");
        for item in items {
            buffer.push(' ');
            buffer.push_str(&item);
        }
        buffer.push(')');
        buffer
    }
}

impl ExpressionFormatter for SExpressionFormatter {
    fn format(&self, expr: &Expression) -> String {
        SExpressionFormatter::format_node(expr)
    }

    fn format_statement(&self, stmt: &Statement) -> String {
        SExpressionFormatter::format_stmt(stmt)
    }
}
