//! Oracle abstraction for operator questions.
//!
//! The [`Oracle`] trait decouples the search algorithms from where answers come
//! from. [`ConsoleOracle`] reads lines from a terminal; tests use scripted
//! oracles that return predetermined answers without any input stream.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::types::{Answer, Question};

/// Blocking yes/no question source.
pub trait Oracle {
    /// Block until a valid answer is available for `question`.
    fn ask(&mut self, question: &Question<'_>) -> Result<Answer>;
}

/// Parse one line of operator input. Only `y`/`n` are accepted.
pub fn parse_reply(line: &str) -> Option<Answer> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" => Some(Answer::Yes),
        "n" => Some(Answer::No),
        _ => None,
    }
}

/// Oracle that prompts on `output` and reads answers line by line from `input`.
///
/// Invalid lines are rejected and the question is posed again, with no limit on
/// retries. End of input yields [`Answer::Abort`]. Reads interrupted by a
/// signal are retried by [`BufRead::read_line`]; a kill ends the process.
pub struct ConsoleOracle<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleOracle<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> Oracle for ConsoleOracle<R, W> {
    fn ask(&mut self, question: &Question<'_>) -> Result<Answer> {
        loop {
            write!(self.output, "{} [y/n] ", question.prompt()).context("write prompt")?;
            self.output.flush().context("flush prompt")?;

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    warn!(question = question.kind(), "input closed while waiting for answer");
                    writeln!(self.output).context("write newline")?;
                    return Ok(Answer::Abort);
                }
                Ok(_) => {}
                Err(err) => return Err(err).context("read answer"),
            }

            if let Some(answer) = parse_reply(&line) {
                debug!(question = question.kind(), ?answer, "answer received");
                return Ok(answer);
            }
            debug!(input = %line.trim(), "rejected answer");
            writeln!(self.output, "Please answer y or n.").context("write hint")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, ErrorKind, Read};

    use crate::core::types::Candidate;

    fn console(input: &str) -> ConsoleOracle<&[u8], Vec<u8>> {
        ConsoleOracle::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn parse_reply_is_case_insensitive_and_trimmed() {
        assert_eq!(parse_reply("y\n"), Some(Answer::Yes));
        assert_eq!(parse_reply("  N \r\n"), Some(Answer::No));
        assert_eq!(parse_reply("yes"), None);
        assert_eq!(parse_reply(""), None);
    }

    #[test]
    fn invalid_input_is_reprompted() {
        let mut oracle = console("maybe\n\nQ\nY\n");
        let answer = oracle
            .ask(&Question::KeepGoing { remaining: 3 })
            .expect("ask");
        assert_eq!(answer, Answer::Yes);

        let (_, output) = oracle.into_inner();
        let output = String::from_utf8(output).expect("utf8");
        assert_eq!(output.matches("Continue narrowing? [y/n]").count(), 4);
        assert_eq!(output.matches("Please answer y or n.").count(), 3);
    }

    #[test]
    fn end_of_input_aborts() {
        let candidate = Candidate::new("a");
        let mut oracle = console("what\n");
        let answer = oracle
            .ask(&Question::SymptomPersists {
                candidate: &candidate,
            })
            .expect("ask");
        assert_eq!(answer, Answer::Abort);
    }

    /// Fails the first read with `Interrupted`, then serves `data`.
    struct InterruptedOnce {
        interrupted: bool,
        data: &'static [u8],
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(ErrorKind::Interrupted.into());
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn interrupted_read_is_retried_not_aborted() {
        let input = BufReader::new(InterruptedOnce {
            interrupted: false,
            data: b"n\n",
        });
        let mut oracle = ConsoleOracle::new(input, Vec::new());
        let answer = oracle
            .ask(&Question::KeepGoing { remaining: 2 })
            .expect("ask");
        assert_eq!(answer, Answer::No);
    }

    #[test]
    fn answers_are_consumed_one_line_per_question() {
        let mut oracle = console("n\ny\n");
        let first = oracle.ask(&Question::KeepGoing { remaining: 2 }).expect("ask");
        let second = oracle.ask(&Question::KeepGoing { remaining: 2 }).expect("ask");
        assert_eq!((first, second), (Answer::No, Answer::Yes));
    }
}
