//! Operator confirmation before an artifact is deleted.

use crate::error::{CleanError, Result};

use colored::Colorize;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Decides whether one orphan may be deleted.
///
/// Implementations must never answer yes on their own: only an explicit
/// affirmative from the operator counts.
pub trait Confirmer {
    fn ask(&mut self, path: &Path) -> Result<bool>;
}

/// Only a single `y` or `Y` is a yes. Empty, `n` and anything else is a no.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Prompts on a terminal (or any reader/writer pair) and waits for an answer.
pub struct TerminalConfirmer<R, W> {
    input: R,
    output: W,
}

impl TerminalConfirmer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        TerminalConfirmer::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalConfirmer { input, output }
    }

    fn prompt(&mut self, path: &Path) -> io::Result<Option<String>> {
        write!(
            self.output,
            "\n{} unused.\nDelete it? [Y/N] ",
            path.display().to_string().bold()
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> Confirmer for TerminalConfirmer<R, W> {
    fn ask(&mut self, path: &Path) -> Result<bool> {
        let answer = self.prompt(path).map_err(|source| CleanError::Prompt {
            path: path.to_path_buf(),
            source,
        })?;

        // End of input keeps the artifact.
        Ok(answer.as_deref().map(is_affirmative).unwrap_or(false))
    }
}

/// Replays a fixed list of answers and records every path it was asked about.
/// Once the answers run out every further question is answered no.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: VecDeque<String>,
    asked: Vec<PathBuf>,
}

impl ScriptedConfirmer {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConfirmer {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[PathBuf] {
        &self.asked
    }
}

impl Confirmer for ScriptedConfirmer {
    fn ask(&mut self, path: &Path) -> Result<bool> {
        self.asked.push(path.to_path_buf());
        Ok(self
            .answers
            .pop_front()
            .map(|answer| is_affirmative(&answer))
            .unwrap_or(false))
    }
}
