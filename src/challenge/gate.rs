//! Challenge Gate
//!
//! Two independent gates evaluated in a fixed order for each device before
//! anything is written: the PIN gate first, then the acknowledgment gate.

use crate::command::ExecutionError;
use intent_bridge_shared::{commands, ChallengeType, Challenge, Device, StateMap};
use tracing::info;

/// PIN gate, active when the device declares a PIN
pub fn check_pin(device: &Device, challenge: Option<&Challenge>) -> Result<(), ExecutionError> {
    let Some(expected) = device.custom_data.pin() else {
        return Ok(());
    };

    let supplied = challenge
        .and_then(|c| c.pin.as_deref())
        .filter(|pin| !pin.is_empty());
    let kind = match supplied {
        Some(pin) if pin == expected => return Ok(()),
        Some(_) => ChallengeType::ChallengeFailedPinNeeded,
        None => ChallengeType::PinNeeded,
    };

    info!("[CHALLENGE] {} rejected by PIN gate: {:?}", device.id, kind);
    Err(ExecutionError::Challenge { kind, states: None })
}

/// Acknowledgment gate, active when the command is safety-significant and the
/// device requires acknowledgment.
///
/// A failure carries `states` so the caller can show them with the prompt.
pub fn check_ack(
    command_type: &str,
    device: &Device,
    challenge: Option<&Challenge>,
    states: &StateMap,
) -> Result<(), ExecutionError> {
    if !commands::supports_ack(command_type) || !device.custom_data.ack_needed {
        return Ok(());
    }
    if challenge.is_some_and(|c| c.ack) {
        return Ok(());
    }

    info!("[CHALLENGE] {} needs acknowledgment for {}", device.id, command_type);
    Err(ExecutionError::Challenge {
        kind: ChallengeType::AckNeeded,
        states: Some(states.clone()),
    })
}
