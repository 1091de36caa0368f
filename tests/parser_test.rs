use color_eyre::eyre::{Context, Result};
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use cycad::{
    expression::{Expression, InfixOperator, PrefixOperator},
    parser::{
        formatter::{ParserFormatter, PrettyFormatter, SExpressionFormatter},
        Parser, ParserErrorKind, MAX_NESTING_DEPTH,
    },
    lexer::TokenKind,
    statement::Statement,
};

fn format_parse(input: &str) -> String {
    let formatter = SExpressionFormatter::new(input);
    let mut parser = Parser::new(input);
    let program = parser.parse_program();
    if parser.errors().is_empty() {
        formatter.format_program(&program)
    } else {
        parser
            .errors()
            .iter()
            .map(|error| formatter.format_error(error))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn check(input: &str, expected: &str, test_name: &str) {
    let actual = format_parse(input);
    assert_eq!(actual.trim_end(), expected.trim_end(), "Failed the test {test_name}");
}

/// Canonical source form of a program that must parse cleanly.
fn source(input: &str) -> String {
    let mut parser = Parser::new(input);
    let program = parser.parse_program();
    assert!(parser.errors().is_empty(), "{:?}", parser.errors());
    program.to_string()
}

fn error_messages(input: &str) -> Vec<String> {
    let mut parser = Parser::new(input);
    parser.parse_program();
    parser.errors().iter().map(|error| error.to_string()).collect()
}

#[test]
fn smoke_test() {
    check("", "", "empty");
}

#[test]
fn product_binds_tighter_than_sum() {
    let mut parser = Parser::new("1 + 2 * 3");
    let program = parser.parse_program();
    assert!(parser.errors().is_empty());

    let Some(Statement::Expression(Expression::Infix { operator, lhs, rhs })) =
        program.get_statement(0)
    else {
        panic!("expected an infix expression statement");
    };
    assert_eq!(*operator, InfixOperator::Add);
    assert!(matches!(**lhs, Expression::IntegerLiteral(1)));
    assert!(matches!(
        **rhs,
        Expression::Infix {
            operator: InfixOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn prefix_binds_tighter_than_infix() {
    let mut parser = Parser::new("-1 + 2");
    let program = parser.parse_program();
    let Some(Statement::Expression(Expression::Infix { lhs, .. })) = program.get_statement(0)
    else {
        panic!("expected an infix expression statement");
    };
    assert!(matches!(
        **lhs,
        Expression::Prefix {
            operator: PrefixOperator::Minus,
            ..
        }
    ));
}

#[test]
fn operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b / c % d", "(((a * b) / c) % d)"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("2 ** 3 ** 2", "(2 ** (3 ** 2))"),
        ("2 * 3 ** 2", "(2 * (3 ** 2))"),
        ("2 ** 3 * 2", "((2 ** 3) * 2)"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        ("add(a * b[2], b[1], 2 * [1, 2][1])", "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))"),
    ];
    for (input, expected) in cases {
        assert_eq!(source(input), format!("{expected};"), "input: {input}");
    }
}

#[test]
fn statements() {
    assert_eq!(source("let x = 5;"), "let x = 5;");
    assert_eq!(source("let y = true"), "let y = true;");
    assert_eq!(source("return x + 1;"), "return (x + 1);");
    assert_eq!(source("\"hello world\""), "\"hello world\";");
    assert_eq!(source("let a = 1; let b = 2;"), "let a = 1;\nlet b = 2;");
}

#[test]
fn if_and_functions() {
    assert_eq!(source("if (x < y) { x }"), "if (x < y) { x; };");
    assert_eq!(
        source("if (x < y) { x } else { y }"),
        "if (x < y) { x; } else { y; };"
    );
    assert_eq!(source("fn(x, y) { x + y; }"), "fn(x, y) { (x + y); };");
    assert_eq!(source("fn() {}"), "fn() {};");
    assert_eq!(source("fn(x) { x }(5)"), "fn(x) { x; }(5);");
    assert_eq!(source("[]"), "[];");
}

#[test]
fn s_expressions() {
    check("1 + 2 * 3", "(+ 1 (* 2 3))", "sum of product");
    check("let f = fn(a, b) { return a; };", "(let f (fn (a b) (block (return a))))", "fn");
    check("if (a) { b } else { c }", "(if a (block b) (block c))", "if");
    check("f(1)[0]", "(index (call f 1) 0)", "index of call");
    check("[\"a\", -1]", "(array \"a\" (- 1))", "array");
}

#[test]
fn missing_tokens_are_reported() {
    assert_eq!(
        error_messages("let x 5;"),
        vec!["expected next token to be =, got INT instead"]
    );
    // The rest of a broken statement is parsed again as new statements.
    assert_eq!(
        error_messages("let = 5;"),
        vec![
            "expected next token to be IDENT, got = instead",
            "no prefix parse function for = found"
        ]
    );
    assert_eq!(
        error_messages("if (x { x }").first().map(String::as_str),
        Some("expected next token to be ), got { instead")
    );
    assert_eq!(
        error_messages("fn(1) {}").first().map(String::as_str),
        Some("expected next token to be IDENT, got INT instead")
    );
}

#[test]
fn missing_prefix_parser_is_reported() {
    let mut parser = Parser::new("^ 2");
    parser.parse_program();
    let errors = parser.into_errors();
    assert!(matches!(
        errors.first().map(|error| &error.kind),
        Some(ParserErrorKind::NoPrefixParseFunction(TokenKind::Caret))
    ));
    assert_eq!(errors[0].to_string(), "no prefix parse function for ^ found");
    assert_eq!(errors[0].code(), "PE002");
}

#[test]
fn caret_has_no_infix_meaning() {
    let messages = error_messages("2 ^ 3");
    assert_eq!(messages, vec!["no prefix parse function for ^ found"]);
}

#[test]
fn oversized_integer_is_reported() {
    assert_eq!(
        error_messages("99999999999999999999"),
        vec!["could not parse \"99999999999999999999\" as integer"]
    );
}

#[test]
fn parsing_continues_after_errors() {
    let mut parser = Parser::new("let = 1; let y = 2; let 3;");
    let program = parser.parse_program();
    assert_eq!(parser.errors().len(), 3);
    assert!(program
        .iter()
        .any(|stmt| stmt.to_string() == "let y = 2;"));
}

#[test]
fn errors_carry_lines() {
    check(
        "let x = 1;\nlet = 2;",
        "(2) expected next token to be IDENT, got = instead\n(2) no prefix parse function for = found",
        "line",
    );
}

#[test]
fn pretty_errors_name_the_code() {
    let input = "let = 1;";
    let path = Path::new("input.cyc");
    let mut parser = Parser::new(input);
    parser.parse_program();
    let formatter = PrettyFormatter::new(input, path);
    let report = formatter.format_error(&parser.errors()[0]);
    assert!(report.contains("PE001"));
    assert!(report.contains("input.cyc"));
}

#[test]
fn printed_source_parses_back_to_the_same_program() {
    let inputs = [
        "let f = fn(a) { a }; let a = 3; a; -1",
        "a; (b); [1, 2][0]",
        "let g = fn(x, y) { if (x > y) { return x; } y }; g(1, 2) ** -2",
        "!true; \"s\"; fn() {}",
    ];
    for input in inputs {
        let printed = source(input);
        assert_eq!(source(&printed), printed, "input: {input}");
        assert_eq!(format_parse(&printed), format_parse(input), "input: {input}");
    }
}

#[test]
fn deeply_nested_parentheses_are_rejected_without_crashing() {
    let depth = 100_000;
    let input = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let messages = error_messages(&input);
    assert_eq!(
        messages,
        vec![format!("expression nested deeper than {MAX_NESTING_DEPTH} levels")]
    );

    let mut parser = Parser::new(&input);
    parser.parse_program();
    assert_eq!(parser.errors()[0].code(), "PE004");
}

#[test]
fn nesting_below_the_limit_parses() {
    let depth = MAX_NESTING_DEPTH - 1;
    let input = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(source(&input), "1;");

    let input = format!("{}1", "-".repeat(depth - 1));
    assert!(error_messages(&input).is_empty());
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/parser/in");
    let output_dir = Path::new("./test_data/parser/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "cyc" {
            continue;
        }

        let test_name = AsRef::<Path>::as_ref(
            path.file_name()
                .expect("File name can't be none as the path is to a real file."),
        );

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded);

    Ok(())
}
