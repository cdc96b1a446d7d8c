mod language;
mod runtime;
mod tools;

use clap::Parser as CliParser;
use language::lexer;
use language::parser;
use language::scope::ScopeHandle;
use language::token_stream::TokenStream;
use miette::{IntoDiagnostic, WrapErr};
use runtime::scope::ScopeRef;
use runtime::stdlib;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use tools::diagnostics;

#[derive(Debug, CliParser)]
#[command(
    name = "rill",
    version,
    about = "Interpreter for the rill scripting language"
)]
struct Cli {
    /// Script file to run; the program is read from stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Run a program given directly as a string
    #[arg(
        short = 'r',
        long = "run",
        value_name = "PROGRAM",
        conflicts_with = "file"
    )]
    run: Option<String>,

    /// Dump the token stream before parsing
    #[arg(long = "print-tokens", visible_alias = "pt")]
    print_tokens: bool,

    /// Dump the parsed syntax tree before evaluating
    #[arg(long = "print-ast", visible_alias = "pa")]
    print_ast: bool,

    /// Attempt to evaluate even when lexing or parsing reported errors
    #[arg(short = 'E', long = "ignore-errors")]
    ignore_errors: bool,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let (source, filename) = read_source(&cli)?;

    let (tokens, lex_errors) = lexer::tokenize(&source, &filename);

    if cli.print_tokens {
        if tokens.is_empty() {
            println!("no tokens");
        }
        for token in &tokens {
            println!("{token}");
        }
    }

    if lex_errors > 0 && !cli.ignore_errors {
        diagnostics::report_exit_summary(lex_errors);
        process::exit(-1);
    }

    let parse_scope = ScopeHandle::global();
    stdlib::declare_names(&parse_scope);
    let mut stream = TokenStream::new(tokens, &filename);
    let (tree, parse_errors) = parser::parse(&mut stream, parse_scope);
    let static_errors = lex_errors + parse_errors;

    match &tree {
        Some(tree) if cli.print_ast => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let _ = tree.output(&mut out, 0);
            let _ = writeln!(out);
        }
        None if cli.print_ast => println!("no parse tree produced"),
        _ => {}
    }

    if static_errors > 0 && !cli.ignore_errors {
        diagnostics::report_exit_summary(static_errors);
        process::exit(-1);
    }

    if let Some(tree) = tree {
        let globals = ScopeRef::global();
        stdlib::install(&globals);
        if let Err(error) = tree.evaluate(&globals) {
            diagnostics::report_runtime_error(&error);
            process::exit(-1);
        }
    }

    if static_errors > 0 {
        diagnostics::report_exit_summary(static_errors);
        process::exit(-1);
    }

    Ok(())
}

fn read_source(cli: &Cli) -> miette::Result<(String, String)> {
    if let Some(program) = &cli.run {
        return Ok((program.clone(), "(command line)".to_string()));
    }

    if let Some(path) = &cli.file {
        let source = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        return Ok((source, path.display().to_string()));
    }

    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .into_diagnostic()
        .wrap_err("failed to read program from stdin")?;
    Ok((source, "(stdin)".to_string()))
}
