//! Per-Device Command Lifecycle
//!
//! Defines the stages a device passes through while a command executes and
//! the transitions between them that are legal. Stages only move forward.

/// Stages of one device's command execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing evaluated yet
    Start,
    /// PIN challenge evaluated
    PinGate,
    /// Item snapshot fetched from the registry
    FetchItem,
    /// Response states computed
    ResponseStates,
    /// Acknowledgment challenge evaluated
    AckGate,
    /// Current state checked against the requested target
    Precheck,
    /// Target item and value resolved
    ConvertValue,
    /// Command sent to the registry
    Dispatch,
    /// Waiting for the backend to propagate the new state
    Wait,
    /// Item snapshot fetched again after dispatch
    Refetch,
    /// Observed state checked against the requested target
    Postcheck,
    /// Terminal: command succeeded
    Success,
    /// Terminal: command failed
    Error,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Success | Stage::Error)
    }
}

/// Result of a stage transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and the stage changed
    Success(Stage),
    /// Transition is not allowed from the current stage
    Invalid { from: Stage, to: Stage },
}

/// Tracks the stage of a single device's execution
#[derive(Debug)]
pub struct Lifecycle {
    device_id: String,
    current: Stage,
    visited: Vec<Stage>,
}

impl Lifecycle {
    /// Create a lifecycle in the Start stage
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            current: Stage::Start,
            visited: vec![Stage::Start],
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Get current stage
    pub fn stage(&self) -> Stage {
        self.current
    }

    /// Every stage entered so far, in order
    pub fn visited(&self) -> &[Stage] {
        &self.visited
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_terminal()
    }

    /// Move to the next stage if the transition is legal
    pub fn advance(&mut self, to: Stage) -> TransitionResult {
        if !is_valid_transition(self.current, to) {
            return TransitionResult::Invalid {
                from: self.current,
                to,
            };
        }
        self.current = to;
        self.visited.push(to);
        TransitionResult::Success(to)
    }
}

/// Check if moving from one stage to another is allowed
pub fn is_valid_transition(from: Stage, to: Stage) -> bool {
    use Stage::*;

    match (from, to) {
        // Terminal stages are final
        (Success | Error, _) => false,

        (Start, PinGate) => true,

        // Item fetch is skipped for commands that never read state
        (PinGate, FetchItem | ResponseStates) => true,
        (FetchItem, ResponseStates) => true,
        (ResponseStates, AckGate) => true,

        // Pre-check only runs when the command validates state changes
        (AckGate, Precheck | ConvertValue) => true,
        (Precheck, ConvertValue) => true,

        // A command without a value has nothing to dispatch
        (ConvertValue, Dispatch | Success) => true,

        (Dispatch, Wait | Refetch | Postcheck) => true,
        (Wait, Refetch | Postcheck) => true,
        (Refetch, Postcheck) => true,
        (Postcheck, Success) => true,

        // Failures are reachable from every stage that can reject or do I/O
        (
            PinGate | FetchItem | AckGate | Precheck | ConvertValue | Dispatch | Refetch
            | Postcheck,
            Error,
        ) => true,

        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_stage() {
        let lifecycle = Lifecycle::new("Item1");
        assert_eq!(lifecycle.stage(), Stage::Start);
        assert_eq!(lifecycle.device_id(), "Item1");
        assert!(!lifecycle.is_finished());
    }

    #[test]
    fn test_full_verified_flow() {
        let mut lifecycle = Lifecycle::new("Alarm");

        for stage in [
            Stage::PinGate,
            Stage::FetchItem,
            Stage::ResponseStates,
            Stage::AckGate,
            Stage::Precheck,
            Stage::ConvertValue,
            Stage::Dispatch,
            Stage::Wait,
            Stage::Refetch,
            Stage::Postcheck,
            Stage::Success,
        ] {
            let result = lifecycle.advance(stage);
            assert_eq!(result, TransitionResult::Success(stage));
        }

        assert!(lifecycle.is_finished());
        assert_eq!(lifecycle.visited().len(), 12);
    }

    #[test]
    fn test_minimal_flow() {
        let mut lifecycle = Lifecycle::new("Lamp");
        lifecycle.advance(Stage::PinGate);
        lifecycle.advance(Stage::ResponseStates);
        lifecycle.advance(Stage::AckGate);
        lifecycle.advance(Stage::ConvertValue);
        lifecycle.advance(Stage::Dispatch);
        lifecycle.advance(Stage::Postcheck);

        let result = lifecycle.advance(Stage::Success);
        assert!(matches!(result, TransitionResult::Success(Stage::Success)));
    }

    #[test]
    fn test_pin_failure_never_fetches() {
        let mut lifecycle = Lifecycle::new("Lock");
        lifecycle.advance(Stage::PinGate);
        lifecycle.advance(Stage::Error);

        let result = lifecycle.advance(Stage::FetchItem);
        assert!(matches!(result, TransitionResult::Invalid { from: Stage::Error, .. }));
        assert_eq!(lifecycle.visited(), &[Stage::Start, Stage::PinGate, Stage::Error]);
    }

    #[test]
    fn test_no_backtracking() {
        assert!(!is_valid_transition(Stage::AckGate, Stage::PinGate));
        assert!(!is_valid_transition(Stage::Dispatch, Stage::ConvertValue));
        assert!(!is_valid_transition(Stage::Postcheck, Stage::Dispatch));
    }

    #[test]
    fn test_dispatch_requires_gates() {
        assert!(!is_valid_transition(Stage::Start, Stage::Dispatch));
        assert!(!is_valid_transition(Stage::PinGate, Stage::Dispatch));
        assert!(!is_valid_transition(Stage::ResponseStates, Stage::Error));
        assert!(is_valid_transition(Stage::AckGate, Stage::Error));
    }
}
