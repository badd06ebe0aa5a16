use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decision from the brain model: the reasoning text plus the structured
/// action to execute this step.
#[derive(Debug, Clone)]
pub struct Decision {
    pub thought: String,
    pub action: Action,
}

/// The action vocabulary the brain model may emit. Anything outside the six
/// recognized kinds lands in `Unknown` and fails its step instead of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Click {
        target: String,
    },
    Type {
        target: String,
        text: String,
        needs_enter: bool,
        click_first: bool,
    },
    Scroll {
        direction: ScrollDirection,
        amount: ScrollAmount,
    },
    KeyPress {
        key: String,
    },
    Finish {
        message: String,
    },
    Fail {
        reason: String,
    },
    Unknown {
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Anything other than "up" scrolls down, matching the sign convention of
    /// the wheel primitive (positive deltas scroll down).
    pub fn parse(raw: &str) -> Self {
        if raw == "up" {
            Self::Up
        } else {
            Self::Down
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAmount {
    Small,
    Medium,
    Large,
}

impl ScrollAmount {
    /// Unrecognized amounts default to medium.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "small" => Self::Small,
            "large" => Self::Large,
            _ => Self::Medium,
        }
    }

    pub fn units(self) -> i32 {
        match self {
            Self::Small => 3,
            Self::Medium => 10,
            Self::Large => 20,
        }
    }
}

impl Decision {
    /// Converts a parsed model reply into a `Decision`, applying the wire
    /// defaults: missing fields become empty strings / false, an unrecognized
    /// action name is preserved in `Unknown` for the executor's diagnostic.
    pub fn from_value(value: &Value) -> Self {
        let thought = value["thought"].as_str().unwrap_or("").to_string();
        let target = value["target_description"].as_str().unwrap_or("").to_string();
        let params = &value["parameters"];

        let action = match value["action"].as_str().unwrap_or("") {
            "CLICK" => Action::Click { target },
            "TYPE" => Action::Type {
                target,
                text: params["text"].as_str().unwrap_or("").to_string(),
                needs_enter: params["needs_enter"].as_bool().unwrap_or(false),
                click_first: params["click_first"].as_bool().unwrap_or(false),
            },
            "SCROLL" => Action::Scroll {
                direction: ScrollDirection::parse(params["direction"].as_str().unwrap_or("")),
                amount: ScrollAmount::parse(params["amount"].as_str().unwrap_or("")),
            },
            "KEY_PRESS" => Action::KeyPress {
                key: params["key"].as_str().unwrap_or("").to_string(),
            },
            "FINISH" => Action::Finish {
                message: params["message"].as_str().unwrap_or("Task complete").to_string(),
            },
            "FAIL" => Action::Fail {
                reason: params["reason"].as_str().unwrap_or("Task failed").to_string(),
            },
            other => Action::Unknown {
                name: other.to_string(),
            },
        };

        Self { thought, action }
    }
}

impl Action {
    /// Finish and Fail end the run; everything else continues it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Finish { .. } | Action::Fail { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Click { .. } => "CLICK",
            Action::Type { .. } => "TYPE",
            Action::Scroll { .. } => "SCROLL",
            Action::KeyPress { .. } => "KEY_PRESS",
            Action::Finish { .. } => "FINISH",
            Action::Fail { .. } => "FAIL",
            Action::Unknown { .. } => "UNKNOWN",
        }
    }
}

/// Result of one locator request. `x`/`y` are only meaningful when `found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub found: bool,
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn at(x: i32, y: i32) -> Self {
        Self { found: true, x, y }
    }

    pub fn not_found() -> Self {
        Self {
            found: false,
            x: 0,
            y: 0,
        }
    }
}

/// Terminal classification of a run. Fatal aborts (capture or decision
/// failure) surface as errors from the runner, never as an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    Failed,
    BudgetExhausted,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub outcome: RunOutcome,
    pub history: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn click_decision_carries_target() {
        let d = Decision::from_value(&json!({
            "thought": "the search button is visible",
            "action": "CLICK",
            "target_description": "blue Search button right of the input",
            "parameters": {}
        }));
        assert_eq!(
            d.action,
            Action::Click {
                target: "blue Search button right of the input".into()
            }
        );
    }

    #[test]
    fn click_without_target_defaults_to_empty() {
        let d = Decision::from_value(&json!({"action": "CLICK"}));
        assert_eq!(d.action, Action::Click { target: String::new() });
    }

    #[test]
    fn type_decision_reads_all_parameters() {
        let d = Decision::from_value(&json!({
            "action": "TYPE",
            "target_description": "search field",
            "parameters": {"text": "weather", "needs_enter": true, "click_first": true}
        }));
        assert_eq!(
            d.action,
            Action::Type {
                target: "search field".into(),
                text: "weather".into(),
                needs_enter: true,
                click_first: true,
            }
        );
    }

    #[test]
    fn scroll_defaults_direction_down_amount_medium() {
        let d = Decision::from_value(&json!({
            "action": "SCROLL",
            "parameters": {"direction": "sideways", "amount": "huge"}
        }));
        assert_eq!(
            d.action,
            Action::Scroll {
                direction: ScrollDirection::Down,
                amount: ScrollAmount::Medium,
            }
        );
    }

    #[test]
    fn unrecognized_action_is_preserved_as_unknown() {
        let d = Decision::from_value(&json!({"action": "DRAG", "parameters": {}}));
        assert_eq!(d.action, Action::Unknown { name: "DRAG".into() });
        assert!(!d.action.is_terminal());
    }

    #[test]
    fn finish_and_fail_are_terminal() {
        let finish = Decision::from_value(&json!({"action": "FINISH", "parameters": {}}));
        let fail = Decision::from_value(&json!({"action": "FAIL", "parameters": {}}));
        assert!(finish.action.is_terminal());
        assert!(fail.action.is_terminal());
        assert_eq!(finish.action, Action::Finish { message: "Task complete".into() });
        assert_eq!(fail.action, Action::Fail { reason: "Task failed".into() });
    }

    #[test]
    fn scroll_amount_unit_table() {
        assert_eq!(ScrollAmount::Small.units(), 3);
        assert_eq!(ScrollAmount::Medium.units(), 10);
        assert_eq!(ScrollAmount::Large.units(), 20);
    }
}
