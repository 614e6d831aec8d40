//! Operator I/O seam
//!
//! The controller talks to the operator only through [`Operator`], so a
//! session can be driven from a terminal or from a scripted answer list.

use std::collections::VecDeque;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use tracing::warn;

const INVALID_TEXT_MESSAGE: &str = "Answer is not valid UTF-8 text, try again";

pub trait Operator {
    /// Show `prompt` and read one answer; `None` at end of input
    fn ask(&mut self, prompt: &str) -> Option<String>;

    /// Show a message that needs no answer
    fn notify(&mut self, message: &str);
}

/// Line-oriented terminal operator
pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl ConsoleOperator<StdinLock<'static>, Stdout> {
    /// Operator on the process stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    /// Lines that are not valid UTF-8 are rejected and the prompt is shown
    /// again; only a closed input returns `None`.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        loop {
            if let Err(e) = write!(self.output, "{} ", prompt).and_then(|_| self.output.flush()) {
                warn!("Could not write prompt: {}", e);
            }

            let mut line = Vec::new();
            match self.input.read_until(b'\n', &mut line) {
                Ok(0) => return None,
                Ok(_) => match String::from_utf8(line) {
                    Ok(text) => return Some(text.trim_end_matches(['\r', '\n']).to_string()),
                    Err(_) => self.notify(INVALID_TEXT_MESSAGE),
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("Could not read answer: {}", e);
                    return None;
                }
            }
        }
    }

    fn notify(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{}", message) {
            warn!("Could not write message: {}", e);
        }
    }
}

/// Pre-recorded answers; everything shown is kept in `transcript`
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Prompts and messages in the order they were shown
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Operator for ScriptedOperator {
    fn ask(&mut self, prompt: &str) -> Option<String> {
        self.transcript.push(prompt.to_string());
        self.answers.pop_front()
    }

    fn notify(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}
