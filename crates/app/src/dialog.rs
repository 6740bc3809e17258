//! Terminal dialogs.

use async_trait::async_trait;
use courier_application::ports::Dialog;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Asks questions on stdout and reads the answers from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalDialog {
    assume_yes: bool,
}

impl TerminalDialog {
    /// Creates a dialog; with `assume_yes` every confirmation succeeds
    /// without reading input.
    #[must_use]
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

async fn ask(question: &str) -> Option<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await.ok()?;
    stdout.flush().await.ok()?;

    let mut line = String::new();
    let read = BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .ok()?;
    // EOF dismisses the question.
    (read > 0).then_some(line)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn answer_or_default(answer: &str, default: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    }
}

#[async_trait]
impl Dialog for TerminalDialog {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ask(&format!("{message} [y/N] "))
            .await
            .is_some_and(|answer| is_yes(&answer))
    }

    async fn prompt(&self, message: &str, default: &str) -> Option<String> {
        let answer = ask(&format!("{message} [{default}] ")).await?;
        Some(answer_or_default(&answer, default))
    }
}
