use crate::agent::history::StepHistory;
use crate::agent::state::{Action, RunOutcome, RunResult};
use crate::config::TimingConfig;
use crate::errors::PilotResult;
use crate::executor::dispatch::execute;
use crate::executor::input::InputDriver;
use crate::llm::brain::DecisionModel;
use crate::llm::locator::LocatorModel;
use crate::perception::screenshot::ScreenSource;

/// The perception-decision-action loop. Owns the goal, the step budget, and
/// the history for one run; everything else is reached through trait seams so
/// tests can substitute deterministic stubs.
pub struct Runner {
    goal: String,
    max_steps: u32,
    timing: TimingConfig,
    history: StepHistory,
    screen: Box<dyn ScreenSource>,
    brain: Box<dyn DecisionModel>,
    locator: Box<dyn LocatorModel>,
    input: Box<dyn InputDriver>,
}

impl Runner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        goal: String,
        max_steps: u32,
        timing: TimingConfig,
        history: StepHistory,
        screen: Box<dyn ScreenSource>,
        brain: Box<dyn DecisionModel>,
        locator: Box<dyn LocatorModel>,
        input: Box<dyn InputDriver>,
    ) -> Self {
        Self {
            goal,
            max_steps,
            timing,
            history,
            screen,
            brain,
            locator,
            input,
        }
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// Runs the loop to a terminal state. Capture and decision failures are
    /// fatal and abort with `Err`; everything recoverable is folded into
    /// history and the next decision cycle.
    pub async fn run(&mut self) -> PilotResult<RunResult> {
        tracing::info!(
            goal = %self.goal,
            max_steps = self.max_steps,
            session = %self.history.session_id,
            "starting run"
        );

        self.screen.prepare().await;
        tokio::time::sleep(self.timing.warmup()).await;

        let mut outcome = RunOutcome::BudgetExhausted;
        let mut step: u32 = 1;

        while step <= self.max_steps {
            tracing::info!(step, "capturing screen");
            let frame = self.screen.capture().await?;

            let decision = self
                .brain
                .decide(&frame, &self.goal, &self.history.numbered())
                .await?;

            // Terminal actions end the run without a history entry.
            match &decision.action {
                Action::Finish { message } => {
                    tracing::info!(step, message = %message, "task finished");
                    outcome = RunOutcome::Succeeded;
                    break;
                }
                Action::Fail { reason } => {
                    tracing::warn!(step, reason = %reason, "task declared unresolvable");
                    outcome = RunOutcome::Failed;
                    break;
                }
                _ => {}
            }

            let (success, description) = execute(
                &decision,
                &frame,
                self.locator.as_ref(),
                self.input.as_ref(),
                &self.timing,
            )
            .await;
            tracing::info!(step, success, description = %description, "step executed");

            // Failed steps are recorded too; the next decision needs to see
            // what was attempted.
            self.history.push(description);

            match decision.action {
                Action::Click { .. } | Action::Type { .. } | Action::KeyPress { .. } => {
                    tokio::time::sleep(self.timing.action_settle()).await;
                }
                Action::Scroll { .. } => {
                    tokio::time::sleep(self.timing.scroll_settle()).await;
                }
                _ => {}
            }

            step += 1;
        }

        if outcome == RunOutcome::BudgetExhausted {
            tracing::warn!(max_steps = self.max_steps, "step budget exhausted");
        }

        tracing::info!(
            ?outcome,
            steps = self.history.len(),
            "run complete"
        );
        for (i, entry) in self.history.entries().iter().enumerate() {
            tracing::info!(step = i + 1, entry = %entry, "history");
        }

        Ok(RunResult {
            outcome,
            history: self.history.entries().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::state::{Decision, Location};
    use crate::errors::PilotError;
    use crate::perception::screenshot::Frame;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct StubScreen {
        captures: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ScreenSource for StubScreen {
        async fn capture(&self) -> PilotResult<Frame> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PilotError::Capture("screenshot file missing".into()));
            }
            Ok(Frame {
                path: PathBuf::from("/tmp/test.png"),
                data_url: "data:image/png;base64,AA==".into(),
            })
        }
    }

    /// Emits scripted decisions in order; an exhausted script is a decision
    /// failure (the fatal kind).
    struct ScriptedBrain {
        script: Mutex<Vec<Decision>>,
    }

    impl ScriptedBrain {
        fn new(mut actions: Vec<Action>) -> Self {
            actions.reverse();
            Self {
                script: Mutex::new(
                    actions
                        .into_iter()
                        .map(|action| Decision {
                            thought: String::new(),
                            action,
                        })
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl DecisionModel for ScriptedBrain {
        async fn decide(&self, _: &Frame, _: &str, _: &str) -> PilotResult<Decision> {
            self.script
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| PilotError::Decision("script exhausted".into()))
        }
    }

    /// Always decides the same non-terminal action.
    struct RepeatingBrain(Action);

    #[async_trait]
    impl DecisionModel for RepeatingBrain {
        async fn decide(&self, _: &Frame, _: &str, _: &str) -> PilotResult<Decision> {
            Ok(Decision {
                thought: String::new(),
                action: self.0.clone(),
            })
        }
    }

    struct FixedLocator(Location);

    #[async_trait]
    impl LocatorModel for FixedLocator {
        async fn locate(&self, _: &Frame, _: &str) -> Location {
            self.0
        }
    }

    struct NoopDriver;

    #[async_trait]
    impl InputDriver for NoopDriver {
        async fn move_pointer(&self, _: i32, _: i32) {}
        async fn click(&self, _: i32, _: i32) {}
        async fn type_text(&self, _: &str) {}
        async fn key_press(&self, _: &str) {}
        async fn scroll(&self, _: i32) {}
        async fn paste_text(&self, _: &str) {}
    }

    fn runner(
        max_steps: u32,
        screen: StubScreen,
        brain: Box<dyn DecisionModel>,
        locator: Location,
    ) -> Runner {
        Runner::new(
            "open the weather page".into(),
            max_steps,
            TimingConfig::instant(),
            StepHistory::in_memory(),
            Box::new(screen),
            brain,
            Box::new(FixedLocator(locator)),
            Box::new(NoopDriver),
        )
    }

    #[tokio::test]
    async fn budget_exhaustion_runs_exactly_n_steps() {
        let captures = Arc::new(AtomicUsize::new(0));
        let mut r = runner(
            5,
            StubScreen {
                captures: captures.clone(),
                fail: false,
            },
            Box::new(RepeatingBrain(Action::KeyPress { key: "tab".into() })),
            Location::not_found(),
        );
        let result = r.run().await.unwrap();
        assert_eq!(result.outcome, RunOutcome::BudgetExhausted);
        assert_eq!(result.history.len(), 5);
        assert_eq!(captures.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn failed_click_then_finish_succeeds_with_one_history_entry() {
        let captures = Arc::new(AtomicUsize::new(0));
        let mut r = runner(
            20,
            StubScreen {
                captures,
                fail: false,
            },
            Box::new(ScriptedBrain::new(vec![
                Action::Click { target: "missing button".into() },
                Action::Finish { message: "done".into() },
            ])),
            Location::not_found(),
        );
        let result = r.run().await.unwrap();
        assert_eq!(result.outcome, RunOutcome::Succeeded);
        assert_eq!(result.history, vec!["Could not find: missing button".to_string()]);
    }

    #[tokio::test]
    async fn fail_decision_terminates_without_history() {
        let captures = Arc::new(AtomicUsize::new(0));
        let mut r = runner(
            20,
            StubScreen {
                captures,
                fail: false,
            },
            Box::new(ScriptedBrain::new(vec![Action::Fail {
                reason: "target page gone".into(),
            }])),
            Location::not_found(),
        );
        let result = r.run().await.unwrap();
        assert_eq!(result.outcome, RunOutcome::Failed);
        assert!(result.history.is_empty());
    }

    #[tokio::test]
    async fn capture_failure_on_step_one_is_fatal_with_zero_history() {
        let captures = Arc::new(AtomicUsize::new(0));
        let mut r = runner(
            20,
            StubScreen {
                captures: captures.clone(),
                fail: true,
            },
            Box::new(RepeatingBrain(Action::KeyPress { key: "tab".into() })),
            Location::not_found(),
        );
        let err = r.run().await;
        assert!(matches!(err, Err(PilotError::Capture(_))));
        assert!(r.history().is_empty());
        assert_eq!(captures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn decision_failure_is_fatal_but_keeps_prior_history() {
        let captures = Arc::new(AtomicUsize::new(0));
        // One scripted step, then the script runs dry mid-run.
        let mut r = runner(
            20,
            StubScreen {
                captures,
                fail: false,
            },
            Box::new(ScriptedBrain::new(vec![Action::KeyPress { key: "tab".into() }])),
            Location::not_found(),
        );
        let err = r.run().await;
        assert!(matches!(err, Err(PilotError::Decision(_))));
        assert_eq!(r.history(), ["Pressed tab"]);
    }

    #[tokio::test]
    async fn unknown_action_fails_the_step_and_continues() {
        let captures = Arc::new(AtomicUsize::new(0));
        let mut r = runner(
            20,
            StubScreen {
                captures,
                fail: false,
            },
            Box::new(ScriptedBrain::new(vec![
                Action::Unknown { name: "DRAG".into() },
                Action::Finish { message: "done".into() },
            ])),
            Location::not_found(),
        );
        let result = r.run().await.unwrap();
        assert_eq!(result.outcome, RunOutcome::Succeeded);
        assert_eq!(result.history, vec!["Unknown action: DRAG".to_string()]);
    }
}
