use std::path::Path;

use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Readline(ReadlineError),
    #[error("Eval failed: {0:?}")]
    EvalError(E),
}

pub trait Repl {
    type Error: std::fmt::Debug;
    fn history(&self) -> Option<&Path> {
        None
    }
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error>;
}

/// Appends `line` to a pending multi-line input. Returns the finished input, or `None` when the
/// line ends with `\` and continues on the next one.
fn join_line(pending: &mut Option<String>, mut line: String) -> Option<String> {
    let continued = line.ends_with('\\');
    if continued {
        line.pop();
        line.push('\n');
    }
    let input = match pending.take() {
        Some(mut input) => {
            input.push_str(line.as_str());
            input
        }
        None => line,
    };
    if continued {
        *pending = Some(input);
        None
    } else {
        Some(input)
    }
}

pub fn start_repl<R: Repl>(mut repl: R) -> Result<(), Error<R::Error>> {
    let mut editor = Editor::<()>::new();
    if let Some(history) = repl.history() {
        if let Err(e) = editor.load_history(history) {
            tracing::debug!(path = %history.display(), error = %e, "no history loaded");
        }
    }
    let mut pending: Option<String> = None;
    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let input = match join_line(&mut pending, line) {
                    Some(input) => input,
                    None => continue,
                };
                editor.add_history_entry(input.as_str());
                repl.evaluate(input).map_err(Error::EvalError)?;
                if let Some(history) = repl.history() {
                    editor.save_history(history).map_err(Error::Readline)?;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(e) => break Err(Error::Readline(e)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_line() {
        let mut pending = None;
        assert_eq!(join_line(&mut pending, "\\x.\\".to_string()), None);
        assert_eq!(join_line(&mut pending, "  x\\".to_string()), None);
        assert_eq!(
            join_line(&mut pending, "".to_string()),
            Some("\\x.\n  x\n".to_string())
        );
        assert_eq!(pending, None);
        assert_eq!(
            join_line(&mut pending, "f a".to_string()),
            Some("f a".to_string())
        );
    }
}
