//! Line-oriented typed prompts.

use std::io::{BufRead, Write};

use colored::Colorize;

use crate::{
    error::{PromptError, Result},
    schema::{ScalarType, ScalarValue},
};

/// Reads answers line by line and writes prompts to an output stream.
///
/// Works on any [`BufRead`] / [`Write`] pair, so a terminal session and a
/// scripted test drive the same code.
///
/// # Example
///
/// ```rust
/// use schemaprompt::{Prompter, ScalarType, ScalarValue};
///
/// let input = b"abc\n8\n";
/// let mut out = Vec::new();
/// let mut prompter = Prompter::new(&input[..], &mut out);
/// let v = prompter.ask("Workers", Some(&ScalarValue::Int(4)), ScalarType::Int).unwrap();
/// assert_eq!(v, ScalarValue::Int(8));
/// ```
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write a line of operator-facing text.
    pub fn say(&mut self, line: impl std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Show `prompt` and read one line, without the line terminator.
    ///
    /// Returns `None` once input is exhausted.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Ask for one scalar of type `kind`.
    ///
    /// An empty line returns `default` unchanged when one exists. Integer
    /// input that fails to parse is reported and asked again until a valid
    /// answer arrives; there is no attempt limit.
    ///
    /// # Errors
    ///
    /// [`PromptError::UnexpectedEof`] if input ends before an answer is
    /// accepted, [`PromptError::Io`] on stream failures.
    pub fn ask(
        &mut self,
        prompt: &str,
        default: Option<&ScalarValue>,
        kind: ScalarType,
    ) -> Result<ScalarValue> {
        let display = match default {
            Some(d) => format!("{prompt} [{d}]: "),
            None => format!("{prompt}: "),
        };

        loop {
            let Some(answer) = self.read_line(&display)? else {
                return Err(PromptError::UnexpectedEof {
                    prompt: prompt.to_string(),
                });
            };

            if answer.is_empty() {
                if let Some(d) = default {
                    return Ok(d.clone());
                }
            }

            match kind.coerce(&answer) {
                Ok(v) => return Ok(v),
                Err(e) => {
                    debug!("rejected input: {e}");
                    let msg = format!("Invalid input. Please enter a valid {}.", e.expected);
                    self.say(msg.red())?;
                }
            }
        }
    }

    /// Ask a yes/no question; only `yes` or `y` (any case, surrounding
    /// whitespace ignored) count as consent.
    ///
    /// End of input counts as a refusal.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_line(question)?.unwrap_or_default();
        let answer = answer.trim().to_lowercase();
        Ok(answer == "yes" || answer == "y")
    }
}
