use crate::agent::state::{Action, Decision, ScrollAmount, ScrollDirection};
use crate::config::TimingConfig;
use crate::executor::input::InputDriver;
use crate::llm::locator::LocatorModel;
use crate::perception::screenshot::Frame;

/// Maps a qualitative scroll request to a signed wheel delta. Up is negative.
pub fn scroll_delta(direction: ScrollDirection, amount: ScrollAmount) -> i32 {
    let units = amount.units();
    match direction {
        ScrollDirection::Up => -units,
        ScrollDirection::Down => units,
    }
}

/// Executes one decision against the screen the decision was made from.
/// Returns the step's success flag and a human-readable description that the
/// runner appends to history either way; a failed step is still context for
/// the next decision.
pub async fn execute(
    decision: &Decision,
    frame: &Frame,
    locator: &dyn LocatorModel,
    input: &dyn InputDriver,
    timing: &TimingConfig,
) -> (bool, String) {
    match &decision.action {
        Action::Click { target } => {
            let location = locator.locate(frame, target).await;
            if !location.found {
                return (false, format!("Could not find: {target}"));
            }
            let (x, y) = (location.x, location.y);
            tracing::info!(target = %target, x, y, "clicking");
            // Move first so the UI registers hover focus before the press.
            input.move_pointer(x, y).await;
            tokio::time::sleep(timing.hover()).await;
            input.click(x, y).await;
            (true, format!("Clicked {target} at ({x}, {y})"))
        }

        Action::Type {
            target,
            text,
            needs_enter,
            click_first,
        } => {
            if *click_first && !target.is_empty() {
                let location = locator.locate(frame, target).await;
                if location.found {
                    input.click(location.x, location.y).await;
                    tokio::time::sleep(timing.field_focus()).await;
                } else {
                    // Fall through to blind typing; the field may already
                    // hold focus.
                    tracing::warn!(target = %target, "input field not found, typing blind");
                }
            }

            if text.is_ascii() {
                input.type_text(text).await;
            } else {
                // Key synthesis cannot reliably produce non-Latin scripts.
                tracing::debug!("non-ASCII text, delivering via clipboard paste");
                input.paste_text(text).await;
            }

            if *needs_enter {
                input.key_press("return").await;
            }
            (true, format!("Typed {text}"))
        }

        Action::Scroll { direction, amount } => {
            let delta = scroll_delta(*direction, *amount);
            tracing::info!(delta, "scrolling");
            input.scroll(delta).await;
            let dir = if *direction == ScrollDirection::Up { "up" } else { "down" };
            (true, format!("Scrolled {dir} by {} units", delta.abs()))
        }

        Action::KeyPress { key } => {
            tracing::info!(key = %key, "pressing key");
            input.key_press(key).await;
            (true, format!("Pressed {key}"))
        }

        Action::Finish { message } => (true, message.clone()),

        Action::Fail { reason } => (false, reason.clone()),

        Action::Unknown { name } => (false, format!("Unknown action: {name}")),
    }
}
