use crate::actor::MoveError;
use crate::direction::{Direction, Side, Spin};
use crate::grid::CellPos;
use log::info;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::time::Instant;

/// Action phase - whether the action is starting or finishing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionPhase {
    Start,
    Finish,
}

/// Commands issued to an actor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Turn { facing: Direction },
    Rotate { spin: Spin },
    MoveTo { cell: CellPos },
    Forward { steps: u32 },
    Strafe { side: Side },
    FollowPath { steps: usize },
    Snap { cell: CellPos },
    SetSpeed { ms_per_tile: u32 },
}

/// How a finished action ended
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Arrived { cell: CellPos },
    Refused { reason: String },
}

impl From<&Result<CellPos, MoveError>> for Outcome {
    fn from(result: &Result<CellPos, MoveError>) -> Self {
        match result {
            Ok(cell) => Outcome::Arrived { cell: *cell },
            Err(e) => Outcome::Refused {
                reason: e.to_string(),
            },
        }
    }
}

/// Logged action with timestamp and phase
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggedAction {
    /// Milliseconds since the log was created
    pub timestamp_ms: u64,
    pub action: Action,
    pub phase: ActionPhase,
    /// Only set on finish entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

pub struct ActionLog {
    start_time: Instant,
    actions: Vec<LoggedAction>,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog {
            start_time: Instant::now(),
            actions: Vec::new(),
        }
    }

    fn push(&mut self, action: Action, phase: ActionPhase, outcome: Option<Outcome>) {
        let timestamp_ms = self.start_time.elapsed().as_millis() as u64;
        self.actions.push(LoggedAction {
            timestamp_ms,
            action,
            phase,
            outcome,
        });
    }

    /// Log the start of an action
    pub fn log_start(&mut self, action: Action) {
        self.push(action, ActionPhase::Start, None);
    }

    /// Log the finish of an action together with its outcome
    pub fn log_finish(&mut self, action: Action, outcome: Outcome) {
        self.push(action, ActionPhase::Finish, Some(outcome));
    }

    /// Log an action that completes immediately (turns, speed changes)
    pub fn log_instant(&mut self, action: Action, outcome: Outcome) {
        self.log_start(action.clone());
        self.log_finish(action, outcome);
    }

    pub fn actions(&self) -> &[LoggedAction] {
        &self.actions
    }

    /// Save log to a pretty-printed JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.actions)?;
        std::fs::write(path, json)
    }

    /// Write every entry to the log at info level
    pub fn print(&self) {
        info!("=== Action Log ({} events) ===", self.actions.len());
        for (i, logged) in self.actions.iter().enumerate() {
            let phase_str = match logged.phase {
                ActionPhase::Start => "START ",
                ActionPhase::Finish => "FINISH",
            };
            match &logged.outcome {
                Some(outcome) => info!(
                    "[{:6}ms] #{:3} {} {:?} -> {:?}",
                    logged.timestamp_ms,
                    i + 1,
                    phase_str,
                    logged.action,
                    outcome
                ),
                None => info!(
                    "[{:6}ms] #{:3} {} {:?}",
                    logged.timestamp_ms,
                    i + 1,
                    phase_str,
                    logged.action
                ),
            }
        }
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut arrived = 0;
        let mut refused = 0;
        let mut turns = 0;

        // Only finish events carry an outcome
        for logged in &self.actions {
            if logged.phase != ActionPhase::Finish {
                continue;
            }
            match (&logged.action, &logged.outcome) {
                (Action::Turn { .. } | Action::Rotate { .. }, _) => turns += 1,
                (Action::SetSpeed { .. }, _) => {}
                (_, Some(Outcome::Arrived { .. })) => arrived += 1,
                (_, Some(Outcome::Refused { .. })) => refused += 1,
                (_, None) => {}
            }
        }

        let duration = self.actions.last().map_or(0, |last| last.timestamp_ms);

        format!(
            "Session Duration: {}ms\n\
             Total Events: {}\n\
             Moves: {} completed, {} refused\n\
             Turns: {}",
            duration,
            self.actions.len(),
            arrived,
            refused,
            turns
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_finished_actions() {
        let mut log = ActionLog::new();
        let forward = Action::Forward { steps: 1 };
        log.log_start(forward.clone());
        log.log_finish(forward, Outcome::from(&Ok::<_, MoveError>(CellPos::new(1, 0))));

        let path = Action::FollowPath { steps: 3 };
        log.log_start(path.clone());
        log.log_finish(
            path,
            Outcome::from(&Err::<CellPos, _>(MoveError::OutOfBounds(CellPos::new(9, 9)))),
        );

        log.log_instant(
            Action::Rotate {
                spin: Spin::Clockwise,
            },
            Outcome::Arrived {
                cell: CellPos::new(1, 1),
            },
        );

        assert_eq!(log.actions().len(), 6);
        let summary = log.summary();
        assert!(summary.contains("Total Events: 6"), "{summary}");
        assert!(summary.contains("Moves: 1 completed, 1 refused"), "{summary}");
        assert!(summary.contains("Turns: 1"), "{summary}");
    }

    #[test]
    fn test_turns_and_clicks_are_counted() {
        let mut log = ActionLog::new();
        log.log_instant(
            Action::Turn {
                facing: Direction::West,
            },
            Outcome::Arrived {
                cell: CellPos::new(0, 0),
            },
        );

        let click = Action::MoveTo {
            cell: CellPos::new(1, 1),
        };
        log.log_start(click.clone());
        log.log_finish(
            click,
            Outcome::from(&Err::<CellPos, _>(MoveError::Blocked(CellPos::new(1, 1)))),
        );

        let summary = log.summary();
        assert!(summary.contains("Moves: 0 completed, 1 refused"), "{summary}");
        assert!(summary.contains("Turns: 1"), "{summary}");
    }

    #[test]
    fn test_refusal_reason_is_readable() {
        let outcome = Outcome::from(&Err::<CellPos, _>(MoveError::Busy));
        assert_eq!(
            outcome,
            Outcome::Refused {
                reason: "a move is already in progress".to_string()
            }
        );
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("action_log.json");

        let mut log = ActionLog::new();
        log.log_start(Action::Snap {
            cell: CellPos::new(2, 2),
        });
        log.save_to_file(&path).unwrap();

        let saved: Vec<LoggedAction> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].phase, ActionPhase::Start);
        assert!(saved[0].outcome.is_none());
    }
}
