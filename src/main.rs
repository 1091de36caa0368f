use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use std::{fs::read_to_string, process::ExitCode};

const EXIT_DATA_ERROR: u8 = 65;
const EXIT_SOFTWARE_ERROR: u8 = 70;

#[derive(Debug, Parser)]
#[clap(name = "cycad", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: CycadCommand,
}

#[derive(Debug, Subcommand)]
pub enum CycadCommand {
    /// Print the token stream.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Print the syntax tree, or the syntax errors.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ProgramFormat,
    },
    /// Evaluate a program and print its result.
    Run {
        path: PathBuf,
        #[clap(long = "errors", value_enum, default_value = "basic")]
        errors: ErrorFormat,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
    Source,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    logging::enable()?;

    let args = CLArgs::parse();
    let code = match args.routine {
        CycadCommand::Tokenize { path, format } => {
            tracing::info!(?path, "tokenizing");
            let src = read_to_string(&path)?;
            tokenize(&src, &format)
        }
        CycadCommand::Parse { path, format } => {
            tracing::info!(?path, "parsing");
            let src = read_to_string(&path)?;
            parse(&src, &path, &format)
        }
        CycadCommand::Run { path, errors } => {
            tracing::info!(?path, "running");
            let src = read_to_string(&path)?;
            run(&src, &path, &errors)
        }
    };
    Ok(code)
}

fn tokenize(src: &str, format: &TokenFormat) -> ExitCode {
    use cycad::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use cycad::lexer::Lexer;

    let lexer = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&lexer)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&lexer)),
    };
    for token in lexer {
        println!("{}", formatter.format(&token));
    }
    ExitCode::SUCCESS
}

fn parse(src: &str, path: &Path, format: &ProgramFormat) -> ExitCode {
    use cycad::parser::formatter::{
        DebugFormatter, ParserFormatter, PrettyFormatter, SExpressionFormatter,
    };
    use cycad::parser::Parser;

    let formatter: Box<dyn ParserFormatter> = match format {
        ProgramFormat::Debug => Box::new(DebugFormatter),
        ProgramFormat::SExpr => Box::new(SExpressionFormatter::new(src)),
        ProgramFormat::Source => Box::new(PrettyFormatter::new(src, path)),
    };

    let mut parser = Parser::new(src);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        for error in parser.errors() {
            eprintln!("{}", formatter.format_error(error));
        }
        return ExitCode::from(EXIT_DATA_ERROR);
    }
    println!("{}", formatter.format_program(&program));
    ExitCode::SUCCESS
}

fn run(src: &str, path: &Path, errors: &ErrorFormat) -> ExitCode {
    use cycad::interpreter::{context::StdioContext, Object, TreeWalkInterpreter};
    use cycad::parser::formatter::{ParserFormatter, PrettyFormatter, SExpressionFormatter};
    use cycad::parser::Parser;

    let mut parser = Parser::new(src);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        let formatter: Box<dyn ParserFormatter> = match errors {
            ErrorFormat::Basic => Box::new(SExpressionFormatter::new(src)),
            ErrorFormat::Pretty => Box::new(PrettyFormatter::new(src, path)),
        };
        for error in parser.errors() {
            eprintln!("{}", formatter.format_error(error));
        }
        return ExitCode::from(EXIT_DATA_ERROR);
    }

    let mut interpreter = TreeWalkInterpreter::new(StdioContext);
    match interpreter.run(&program) {
        Object::Null => ExitCode::SUCCESS,
        error @ Object::Error(_) => {
            eprintln!("{error}");
            ExitCode::from(EXIT_SOFTWARE_ERROR)
        }
        value => {
            println!("{value}");
            ExitCode::SUCCESS
        }
    }
}

mod logging {
    use color_eyre::eyre::Result;
    use std::io;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

    /// Logs to stderr, filtered by `CYCAD_LOG` (default `warn`).
    pub fn enable() -> Result<()> {
        let filter = EnvFilter::try_from_env("CYCAD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        let console_logger = fmt::layer().with_writer(io::stderr).with_target(false);

        let subscriber = Registry::default().with(filter).with(console_logger);
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(())
    }
}
