use super::{ParserError, ParserErrorKind};
use crate::{
    expression::formatter::{ExpressionFormatter, SExpressionFormatter as SExpressionNodeFormatter},
    lexer::LineBreaks,
    statement::Program,
};
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ParserFormatter {
    fn format_program(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugFormatter;

impl ParserFormatter for DebugFormatter {
    fn format_program(&self, program: &Program) -> String {
        format!("{program:#?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// One s-expression per statement, errors as `(line) message`.
pub struct SExpressionFormatter {
    line_breaks: LineBreaks,
}

impl SExpressionFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl ParserFormatter for SExpressionFormatter {
    fn format_program(&self, program: &Program) -> String {
        program
            .iter()
            .map(|stmt| SExpressionNodeFormatter.format_statement(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("({line}) {error}")
    }
}

/// Prints programs back as source and errors as annotated reports.
pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ParserFormatter for PrettyFormatter<'src> {
    fn format_program(&self, program: &Program) -> String {
        format!("{program}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = &self.path.to_string_lossy();
        let span = error.span;
        let label = match &error.kind {
            ParserErrorKind::UnexpectedToken { expected, .. } => format!("expected {expected} here"),
            ParserErrorKind::NoPrefixParseFunction(kind) => {
                format!("{kind} cannot start an expression")
            }
            ParserErrorKind::InvalidInteger(_) => "does not fit in a 64-bit integer".into(),
            ParserErrorKind::NestingTooDeep(_) => "nested too deeply".into(),
        };

        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.range()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_code(error.code())
            .with_message(error.to_string())
            .with_label(
                Label::new((path, span.range()))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
