//! Line-oriented terminal input.
//!
//! A background task reads stdin and forwards trimmed, non-empty lines over
//! a channel. `exit` / `quit` (or EOF) closes the channel, which ends the
//! session wherever the conversation is. Ctrl+C at a prompt counts as
//! leaving too: once planning has listened for it, the process no longer
//! exits on SIGINT by itself.

use std::future::Future;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub struct Console {
    lines: mpsc::Receiver<String>,
}

impl Console {
    pub fn start() -> Self {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut lines = BufReader::new(io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if is_exit(&line) {
                    break;
                }
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        });

        Self { lines: rx }
    }

    /// Print `prompt` and wait for the next line. `None` means the user left.
    pub async fn ask(&mut self, prompt: &str) -> Option<String> {
        self.ask_until(prompt, crate::commands::ctrl_c()).await
    }

    async fn ask_until(&mut self, prompt: &str, interrupt: impl Future<Output = ()>) -> Option<String> {
        print!("  {prompt} ");
        let _ = std::io::stdout().flush();
        tokio::select! {
            line = self.lines.recv() => line,
            _ = interrupt => {
                println!();
                None
            }
        }
    }

    /// Yes/no question; anything but yes counts as no.
    pub async fn confirm(&mut self, prompt: &str) -> Option<bool> {
        let answer = self.ask(&format!("{prompt} (yes/no):")).await?;
        Some(is_yes(&answer))
    }
}

pub fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q")
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words() {
        assert!(is_exit("quit"));
        assert!(is_exit("EXIT"));
        assert!(!is_exit("exit please"));
    }

    #[tokio::test]
    async fn interrupt_at_prompt_means_leaving() {
        let (_tx, rx) = mpsc::channel(1);
        let mut console = Console { lines: rx };
        assert_eq!(console.ask_until("Destination?", std::future::ready(())).await, None);
    }

    #[tokio::test]
    async fn line_is_returned_without_interrupt() {
        let (tx, rx) = mpsc::channel(1);
        let mut console = Console { lines: rx };
        tx.send("Tokyo".to_string()).await.unwrap();
        let answer = console.ask_until("Destination?", std::future::pending()).await;
        assert_eq!(answer.as_deref(), Some("Tokyo"));
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("Yes"));
        assert!(is_yes(" y "));
        assert!(!is_yes("nope"));
    }
}
