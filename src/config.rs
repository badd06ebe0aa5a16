use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::PilotResult;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Vision model that decides the next step from screenshot + goal + history.
    #[serde(default = "default_brain_model")]
    pub brain_model: String,
    /// Specialized model that resolves element descriptions to coordinates.
    #[serde(default = "default_locator_model")]
    pub locator_model: String,
    /// Optional API key stored in config.toml (env SCREENPILOT_API_KEY wins).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            brain_model: default_brain_model(),
            locator_model: default_locator_model(),
            api_key: None,
        }
    }
}

fn default_api_base() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions".into()
}

fn default_brain_model() -> String {
    "qwen3-max".into()
}

fn default_locator_model() -> String {
    "gui-plus".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Application brought to the foreground before every screenshot.
    #[serde(default = "default_target_app")]
    pub target_app: String,
    /// Screenshot file, overwritten each step.
    #[serde(default = "default_screenshot_path")]
    pub screenshot_path: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_app: default_target_app(),
            screenshot_path: default_screenshot_path(),
        }
    }
}

fn default_target_app() -> String {
    "Google Chrome".into()
}

fn default_screenshot_path() -> PathBuf {
    PathBuf::from("/tmp/screenpilot.png")
}

/// Fixed settle and pause intervals, in milliseconds. These are deliberate
/// fixed sleeps, not UI-ready polling; they stay constant for a run's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause after the focus sequence, before the screenshot lands.
    #[serde(default = "d_700")]
    pub focus_settle_ms: u64,
    /// Hover pause between pointer move and press on a click.
    #[serde(default = "d_300")]
    pub hover_ms: u64,
    /// Pause after clicking a field before typing into it.
    #[serde(default = "d_200")]
    pub field_focus_ms: u64,
    /// Pause between clipboard write and the paste keystroke.
    #[serde(default = "d_150")]
    pub clipboard_ms: u64,
    /// Settle after click / type / key-press steps.
    #[serde(default = "d_1500")]
    pub action_settle_ms: u64,
    /// Settle after scroll steps.
    #[serde(default = "d_1000")]
    pub scroll_settle_ms: u64,
    /// One-time warm-up after activating the target app, before step 1.
    #[serde(default = "d_1000")]
    pub warmup_ms: u64,
}

fn d_150() -> u64 {
    150
}
fn d_200() -> u64 {
    200
}
fn d_300() -> u64 {
    300
}
fn d_700() -> u64 {
    700
}
fn d_1000() -> u64 {
    1000
}
fn d_1500() -> u64 {
    1500
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            focus_settle_ms: d_700(),
            hover_ms: d_300(),
            field_focus_ms: d_200(),
            clipboard_ms: d_150(),
            action_settle_ms: d_1500(),
            scroll_settle_ms: d_1000(),
            warmup_ms: d_1000(),
        }
    }
}

impl TimingConfig {
    pub fn focus_settle(&self) -> Duration {
        Duration::from_millis(self.focus_settle_ms)
    }
    pub fn hover(&self) -> Duration {
        Duration::from_millis(self.hover_ms)
    }
    pub fn field_focus(&self) -> Duration {
        Duration::from_millis(self.field_focus_ms)
    }
    pub fn clipboard(&self) -> Duration {
        Duration::from_millis(self.clipboard_ms)
    }
    pub fn action_settle(&self) -> Duration {
        Duration::from_millis(self.action_settle_ms)
    }
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    /// All intervals zeroed. Keeps tests free of real sleeps.
    pub fn instant() -> Self {
        Self {
            focus_settle_ms: 0,
            hover_ms: 0,
            field_focus_ms: 0,
            clipboard_ms: 0,
            action_settle_ms: 0,
            scroll_settle_ms: 0,
            warmup_ms: 0,
        }
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join("config.toml");
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    None
}

/// Loads config.toml from next to the executable or the working directory,
/// falling back to built-in defaults when neither exists.
pub fn load_config() -> PilotResult<AppConfig> {
    let Some(path) = resolve_config_path() else {
        tracing::info!("no config.toml found, using defaults");
        return Ok(AppConfig::default());
    };
    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(
        path = %path.display(),
        brain = %config.models.brain_model,
        locator = %config.models.locator_model,
        "config loaded"
    );
    Ok(config)
}

/// Resolves the API key: environment first (SCREENPILOT_API_KEY), then the
/// optional config.toml value.
pub fn resolve_api_key(config: &AppConfig) -> String {
    std::env::var("SCREENPILOT_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .or_else(|| config.models.api_key.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.models.brain_model, "qwen3-max");
        assert_eq!(cfg.models.locator_model, "gui-plus");
        assert_eq!(cfg.capture.target_app, "Google Chrome");
        assert_eq!(cfg.timing.action_settle_ms, 1500);
        assert_eq!(cfg.timing.scroll_settle_ms, 1000);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg: AppConfig = toml::from_str(
            "[capture]\ntarget_app = \"Safari\"\n\n[timing]\nfocus_settle_ms = 50\n",
        )
        .unwrap();
        assert_eq!(cfg.capture.target_app, "Safari");
        assert_eq!(cfg.timing.focus_settle_ms, 50);
        assert_eq!(cfg.timing.hover_ms, 300);
        assert_eq!(cfg.models.brain_model, "qwen3-max");
    }
}
