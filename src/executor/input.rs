use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::config::TimingConfig;

/// Device-level input primitives. All calls are fire-and-forget: failures are
/// logged but never surfaced, so a flaky device command degrades one step
/// instead of the run.
#[async_trait]
pub trait InputDriver: Send + Sync {
    async fn move_pointer(&self, x: i32, y: i32);
    async fn click(&self, x: i32, y: i32);
    /// Direct key-by-key synthesis; only reliable for ASCII text.
    async fn type_text(&self, text: &str);
    /// Key press, including `+`-joined modifier combos ("cmd+v").
    async fn key_press(&self, key: &str);
    /// Wheel delta; positive scrolls down, negative up.
    async fn scroll(&self, delta: i32);
    /// Clipboard write followed by a paste keystroke; the path for text that
    /// key synthesis cannot produce.
    async fn paste_text(&self, text: &str);
}

/// Production driver over the `cliclick` CLI plus `pbcopy`/`osascript` for the
/// clipboard paste path.
pub struct Cliclick {
    clipboard_pause: Duration,
}

impl Cliclick {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            clipboard_pause: timing.clipboard(),
        }
    }
}

#[async_trait]
impl InputDriver for Cliclick {
    async fn move_pointer(&self, x: i32, y: i32) {
        run_silent("cliclick", &[&format!("m:{x},{y}")]).await;
    }

    async fn click(&self, x: i32, y: i32) {
        run_silent("cliclick", &[&format!("c:{x},{y}")]).await;
    }

    async fn type_text(&self, text: &str) {
        run_silent("cliclick", &[&format!("t:{text}")]).await;
    }

    async fn key_press(&self, key: &str) {
        run_silent("cliclick", &[&format!("kp:{key}")]).await;
    }

    async fn scroll(&self, delta: i32) {
        run_silent("cliclick", &[&format!("w:{delta}")]).await;
    }

    async fn paste_text(&self, text: &str) {
        run_with_stdin("pbcopy", &[], text.as_bytes()).await;
        tokio::time::sleep(self.clipboard_pause).await;
        run_silent(
            "osascript",
            &[
                "-e",
                "tell application \"System Events\" to keystroke \"v\" using command down",
            ],
        )
        .await;
    }
}

/// Runs an OS command best-effort: spawn failures and non-zero exits are
/// logged and swallowed.
pub(crate) async fn run_silent(program: &str, args: &[&str]) {
    match tokio::process::Command::new(program).args(args).status().await {
        Ok(status) if !status.success() => {
            tracing::warn!(program, ?status, "command exited non-zero");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(program, error = %e, "command failed to spawn");
        }
    }
}

/// Same, but feeds `input` to the child's stdin (clipboard writes).
async fn run_with_stdin(program: &str, args: &[&str], input: &[u8]) {
    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn();
    match child {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                if let Err(e) = stdin.write_all(input).await {
                    tracing::warn!(program, error = %e, "failed to write stdin");
                }
            }
            if let Err(e) = child.wait().await {
                tracing::warn!(program, error = %e, "command failed to complete");
            }
        }
        Err(e) => {
            tracing::warn!(program, error = %e, "command failed to spawn");
        }
    }
}
