use crate::api::BackendCommand;
use crate::error::SyncError;
use crate::types::BotStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Stop,
}

impl ControlCommand {
    pub fn label(&self) -> &'static str {
        match self {
            ControlCommand::Start => "start",
            ControlCommand::Stop => "stop",
        }
    }
}

impl From<ControlCommand> for BackendCommand {
    fn from(cmd: ControlCommand) -> Self {
        match cmd {
            ControlCommand::Start => BackendCommand::Start,
            ControlCommand::Stop => BackendCommand::Stop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControlPhase {
    #[default]
    Idle,
    /// Sent, waiting for the backend to confirm
    Pending(ControlCommand),
    /// Last command failed; cleared only by acknowledgement or manual refresh
    Faulted(String),
}

/// Start/stop state machine on top of the backend-reported status.
///
/// `stopped -> (start, pending) -> running -> (stop, pending) -> stopped`, with an
/// error state reachable from either side. Status is never changed optimistically:
/// a confirmed command only triggers a status refresh.
#[derive(Debug, Default)]
pub struct BotControl {
    phase: ControlPhase,
}

impl BotControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &ControlPhase {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, ControlPhase::Pending(_))
    }

    pub fn can_start(&self, status: Option<BotStatus>) -> bool {
        self.phase == ControlPhase::Idle && status == Some(BotStatus::Stopped)
    }

    pub fn can_stop(&self, status: Option<BotStatus>) -> bool {
        self.phase == ControlPhase::Idle && status == Some(BotStatus::Running)
    }

    /// Status to show in the badge; a local fault overrides the backend
    pub fn display_status(&self, status: Option<BotStatus>) -> Option<BotStatus> {
        match self.phase {
            ControlPhase::Faulted(_) => Some(BotStatus::Error),
            _ => status,
        }
    }

    pub fn begin(
        &mut self,
        command: ControlCommand,
        status: Option<BotStatus>,
    ) -> Result<(), SyncError> {
        if self.is_pending() {
            return Err(SyncError::CommandInFlight);
        }
        let allowed = match command {
            ControlCommand::Start => self.can_start(status),
            ControlCommand::Stop => self.can_stop(status),
        };
        if !allowed {
            return Err(SyncError::InvalidInput(format!(
                "cannot {} the bot while it is {}",
                command.label(),
                self.display_status(status)
                    .map(|s| s.label().to_lowercase())
                    .unwrap_or_else(|| "loading".to_string())
            )));
        }
        self.phase = ControlPhase::Pending(command);
        Ok(())
    }

    pub fn complete(&mut self, result: &Result<String, SyncError>) {
        self.phase = match result {
            Ok(_) => ControlPhase::Idle,
            Err(e) => ControlPhase::Faulted(e.to_string()),
        };
    }

    /// Clear a fault. Returns true when there was one to clear.
    pub fn acknowledge(&mut self) -> bool {
        if matches!(self.phase, ControlPhase::Faulted(_)) {
            self.phase = ControlPhase::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_stop_cycle() {
        let mut control = BotControl::new();
        assert!(control.can_start(Some(BotStatus::Stopped)));
        assert!(!control.can_stop(Some(BotStatus::Stopped)));

        control.begin(ControlCommand::Start, Some(BotStatus::Stopped)).unwrap();
        assert!(control.is_pending());
        assert!(!control.can_start(Some(BotStatus::Stopped)));

        control.complete(&Ok("started".into()));
        assert_eq!(control.phase(), &ControlPhase::Idle);
        assert!(control.can_stop(Some(BotStatus::Running)));

        control.begin(ControlCommand::Stop, Some(BotStatus::Running)).unwrap();
        control.complete(&Ok("stopped".into()));
        assert!(control.can_start(Some(BotStatus::Stopped)));
    }

    #[test]
    fn test_duplicate_submission_rejected() {
        let mut control = BotControl::new();
        control.begin(ControlCommand::Start, Some(BotStatus::Stopped)).unwrap();
        assert_eq!(
            control.begin(ControlCommand::Start, Some(BotStatus::Stopped)),
            Err(SyncError::CommandInFlight)
        );
        assert_eq!(
            control.begin(ControlCommand::Stop, Some(BotStatus::Running)),
            Err(SyncError::CommandInFlight)
        );
    }

    #[test]
    fn test_wrong_direction_rejected() {
        let mut control = BotControl::new();
        assert!(matches!(
            control.begin(ControlCommand::Stop, Some(BotStatus::Stopped)),
            Err(SyncError::InvalidInput(_))
        ));
        assert!(matches!(
            control.begin(ControlCommand::Start, None),
            Err(SyncError::InvalidInput(_))
        ));
        assert!(!control.can_start(Some(BotStatus::Error)));
        assert!(!control.can_stop(Some(BotStatus::Error)));
    }

    #[test]
    fn test_fault_requires_acknowledgement() {
        let mut control = BotControl::new();
        control.begin(ControlCommand::Start, Some(BotStatus::Stopped)).unwrap();
        control.complete(&Err(SyncError::CommandRejected("wallet locked".into())));

        assert_eq!(
            control.display_status(Some(BotStatus::Stopped)),
            Some(BotStatus::Error)
        );
        assert!(!control.can_start(Some(BotStatus::Stopped)));

        assert!(control.acknowledge());
        assert!(!control.acknowledge());
        assert!(control.can_start(Some(BotStatus::Stopped)));
    }
}
