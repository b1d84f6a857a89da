// ABOUTME: Confirmation provider for destructive operations.
// ABOUTME: Only an explicit y or Y counts as yes; no terminal means no.

use std::io::{self, BufRead, IsTerminal, Write};

/// Asks the operator a yes/no question.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// True only for a single `y` or `Y`, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}

/// Prompts on stderr and reads one line from stdin.
///
/// When stdin is not a terminal nothing is read and the answer is no, so
/// piped or scheduled invocations can never confirm.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            tracing::warn!("stdin is not a terminal, refusing to confirm");
            return Ok(false);
        }

        let mut stderr = io::stderr();
        write!(stderr, "{prompt} [y/N] ")?;
        stderr.flush()?;

        let mut answer = String::new();
        // EOF leaves the answer empty
        stdin.lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Fixed answer, for tests and scripted callers.
#[derive(Debug, Clone)]
pub struct FixedConfirm(pub String);

impl FixedConfirm {
    pub fn new(answer: impl Into<String>) -> Self {
        Self(answer.into())
    }
}

impl Confirm for FixedConfirm {
    fn confirm(&self, _prompt: &str) -> io::Result<bool> {
        Ok(is_affirmative(&self.0))
    }
}
