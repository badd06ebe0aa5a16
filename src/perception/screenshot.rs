use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine as _;

use crate::config::{CaptureConfig, TimingConfig};
use crate::errors::{PilotError, PilotResult};
use crate::executor::input::run_silent;

/// One captured screenshot, ready for the vision models.
#[derive(Debug, Clone)]
pub struct Frame {
    pub path: PathBuf,
    /// `data:image/png;base64,...` URL sent in image parts.
    pub data_url: String,
}

/// Source of screen frames. A capture failure is fatal to the run; callers do
/// not retry.
#[async_trait]
pub trait ScreenSource: Send + Sync {
    async fn capture(&self) -> PilotResult<Frame>;

    /// One-time warm-up before step 1. No-op by default.
    async fn prepare(&self) {}
}

/// Production capture: force the target application to the foreground with
/// three best-effort AppleScript calls, let the window switch settle, then
/// screenshot silently to a fixed path.
pub struct FocusCapture {
    capture: CaptureConfig,
    settle: std::time::Duration,
}

impl FocusCapture {
    pub fn new(capture: CaptureConfig, timing: &TimingConfig) -> Self {
        Self {
            settle: timing.focus_settle(),
            capture,
        }
    }

    /// Activates the target application. Also used once by the runner as a
    /// pre-run warm-up.
    pub async fn activate_target(&self) {
        run_silent(
            "osascript",
            &[
                "-e",
                &format!("tell application \"{}\" to activate", self.capture.target_app),
            ],
        )
        .await;
    }
}

#[async_trait]
impl ScreenSource for FocusCapture {
    async fn prepare(&self) {
        self.activate_target().await;
    }

    async fn capture(&self) -> PilotResult<Frame> {
        // Three idempotent focus calls; each may fail on its own.
        self.activate_target().await;
        run_silent(
            "osascript",
            &[
                "-e",
                &format!(
                    "tell application \"System Events\" to set frontmost of process \"{}\" to true",
                    self.capture.target_app
                ),
            ],
        )
        .await;
        run_silent(
            "osascript",
            &[
                "-e",
                &format!(
                    "tell application \"{}\" to set index of window 1 to 1",
                    self.capture.target_app
                ),
            ],
        )
        .await;

        tokio::time::sleep(self.settle).await;

        let path = &self.capture.screenshot_path;
        let path_str = path.to_string_lossy();
        run_silent("screencapture", &["-x", &path_str]).await;

        if !path.exists() {
            return Err(PilotError::Capture(format!(
                "screenshot file missing: {}",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        let data_url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        );
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "screen captured");

        Ok(Frame {
            path: path.clone(),
            data_url,
        })
    }
}
