use std::path::{Path, PathBuf};

use anyhow::Result;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use church::{
    bind, lexer, parse,
    prelude::{Error, Span, Spanned},
    unbind,
};
use clap::Parser;
use util::repl;

/// Interactive prompt for the lambda-calculus kernel.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Config {
    /// File the prompt history is read from and saved to.
    #[arg(long, default_value = "/tmp/church.history")]
    history: PathBuf,

    /// Log filter, e.g. `church=trace` to follow the parser.
    #[arg(long, env = "CHURCH_LOG", default_value = "warn")]
    log: String,

    /// Run the given inputs instead of starting the prompt.
    #[arg(short, long)]
    command: Vec<String>,
}

fn build_report(message: String, span: Span) -> Report<Span> {
    Report::build(ReportKind::Error, (), span.start)
        .with_message(&message)
        .with_label(
            Label::new(span)
                .with_message(format!("{}", message.fg(Color::Red)))
                .with_color(Color::Red),
        )
        .finish()
}

type CommandResult<'a> = Result<(), (&'a str, Error)>;

struct Repl {
    history: PathBuf,
}

impl Repl {
    fn tokenize(input: &str) -> CommandResult {
        let tokens = lexer::tokenize(input)
            .map(|t| t.map(Spanned::forget_span))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| (input, Error::from(e)))?;
        println!("{tokens:?}");
        Ok(())
    }

    fn parse(input: &str) -> CommandResult {
        let term = parse(input).map_err(|e| (input, e))?;
        println!("{term:?}");
        Ok(())
    }

    fn bits(input: &str) -> CommandResult {
        let term = parse(input).map_err(|e| (input, e))?;
        let expr = bind(&term).map_err(|e| (input, e))?;
        let bits = expr.bitstring().map_err(|e| (input, e))?;
        println!("{bits}");
        Ok(())
    }

    fn unbind(input: &str) -> CommandResult {
        let term = parse(input).map_err(|e| (input, e))?;
        let expr = bind(&term).map_err(|e| (input, e))?;
        let term = unbind(&expr).map_err(|e| (input, e))?;
        println!("{term:?}");
        Ok(())
    }

    fn equal(input: &str) -> CommandResult {
        let Some((lhs, rhs)) = input.split_once(';') else {
            eprintln!("Usage: :equal term ; term");
            return Ok(());
        };
        let (lhs_term, rhs_term) = (
            parse(lhs).map_err(|e| (lhs, e))?,
            parse(rhs).map_err(|e| (rhs, e))?,
        );
        let lhs_expr = bind(&lhs_term).map_err(|e| (lhs, e))?;
        let rhs_expr = bind(&rhs_term).map_err(|e| (rhs, e))?;
        println!("{}", lhs_expr == rhs_expr);
        Ok(())
    }

    fn step(input: &str) -> CommandResult {
        let term = parse(input).map_err(|e| (input, e))?;
        let expr = bind(&term).map_err(|e| (input, e))?;
        match expr.reduce_root() {
            Some(result) => {
                let result = result.map_err(|e| (input, e))?;
                let term = unbind(&result).map_err(|e| (input, e))?;
                println!("{term:?}");
            }
            None => println!("No redex at the root"),
        }
        Ok(())
    }

    fn show_help() {
        println!(
            "{}",
            r#"
term                -- same as :bits term
:tokenize   term    -- show tokenized term
:parse      term    -- show parsed term
:bits       term    -- show the canonical encoding of the bound term
:unbind     term    -- bind the term and rebuild it with fresh names
:equal  term ; term -- check whether two terms are alpha-equivalent
:step       term    -- apply the function at the root to its argument once
:help               -- show this message
        "#
            .trim()
        );
    }

    fn handle_repl_input<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        let (cmd, input) = if let Some(stripped) = input.strip_prefix(':') {
            stripped
                .trim_start()
                .split_once(' ')
                .unwrap_or((stripped, ""))
        } else {
            ("", input)
        };
        match cmd {
            "to" | "tokenize" => Self::tokenize(input)?,
            "p" | "parse" => Self::parse(input)?,
            "" | "b" | "bits" => Self::bits(input)?,
            "u" | "unbind" => Self::unbind(input)?,
            "eq" | "equal" => Self::equal(input)?,
            "s" | "step" => Self::step(input)?,
            "h" | "he" | "hel" | "help" => Self::show_help(),
            _ => {
                eprintln!("Unknown command {cmd}");
                Self::show_help();
            }
        }
        Ok(())
    }
}

impl repl::Repl for Repl {
    type Error = anyhow::Error;
    fn history(&self) -> Option<&Path> {
        Some(&self.history)
    }
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error> {
        if input.trim().is_empty() {
            return Ok(());
        }
        if let Err((input, e)) = self.handle_repl_input(&input) {
            match e.span() {
                Some(span) => build_report(e.to_string(), span).eprint(Source::from(input))?,
                None => eprintln!("Error: {e}"),
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(&config.log)?)
        .with_writer(std::io::stderr)
        .init();

    let mut repl = Repl {
        history: config.history,
    };
    if !config.command.is_empty() {
        for input in config.command {
            repl::Repl::evaluate(&mut repl, input)?;
        }
        return Ok(());
    }
    println!("Hi, this is a lambda calculus REPL. :h to show help");
    println!();
    repl::start_repl(repl)?;
    Ok(())
}
