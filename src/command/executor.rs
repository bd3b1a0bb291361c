//! Command executor - runs one command across a batch of devices

use super::{CommandDescriptor, ExecutionError};
use crate::challenge;
use crate::registry::ItemRegistry;
use futures::future::join_all;
use intent_bridge_shared::{
    lifecycle::{Lifecycle, Stage, TransitionResult},
    Challenge, Device, Outcome, Params, StateMap,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Executes commands against the item registry.
///
/// Holds no state between calls; every device of a batch runs its own
/// lifecycle concurrently with the others.
#[derive(Clone)]
pub struct CommandExecutor {
    registry: Arc<dyn ItemRegistry>,
}

impl CommandExecutor {
    /// Create a new command executor
    pub fn new(registry: Arc<dyn ItemRegistry>) -> Self {
        Self { registry }
    }

    /// Execute a command on every device and return one outcome per device,
    /// in the order the devices were given.
    pub async fn execute(
        &self,
        descriptor: &dyn CommandDescriptor,
        devices: &[Device],
        params: &Params,
        challenge: Option<&Challenge>,
    ) -> Vec<Outcome> {
        let start_time = Instant::now();
        info!(
            "[EXECUTE] {} on {} device(s)",
            descriptor.command_type(),
            devices.len()
        );

        let runs = devices
            .iter()
            .map(|device| self.execute_device(descriptor, device, params, challenge));
        let outcomes = join_all(runs).await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(
            "[EXECUTE] {} finished: {} ok, {} failed in {}ms",
            descriptor.command_type(),
            outcomes.len() - failed,
            failed,
            start_time.elapsed().as_millis()
        );
        outcomes
    }

    /// Run the full lifecycle for one device. Never fails: every error
    /// becomes the device's outcome.
    async fn execute_device(
        &self,
        descriptor: &dyn CommandDescriptor,
        device: &Device,
        params: &Params,
        challenge: Option<&Challenge>,
    ) -> Outcome {
        let mut lifecycle = Lifecycle::new(device.id.as_str());

        match self
            .run(&mut lifecycle, descriptor, device, params, challenge)
            .await
        {
            Ok(states) => {
                advance(&mut lifecycle, Stage::Success);
                debug!("[EXECUTE] {} succeeded", device.id);
                Outcome::success(device.id.as_str(), states)
            }
            Err(err) => {
                let failed_at = lifecycle.stage();
                advance(&mut lifecycle, Stage::Error);
                warn!(
                    "[EXECUTE] {} failed at {:?}: {} ({})",
                    device.id,
                    failed_at,
                    err,
                    err.error_code()
                );
                err.into_outcome(&device.id)
            }
        }
    }

    async fn run(
        &self,
        lifecycle: &mut Lifecycle,
        descriptor: &dyn CommandDescriptor,
        device: &Device,
        params: &Params,
        challenge: Option<&Challenge>,
    ) -> Result<StateMap, ExecutionError> {
        advance(lifecycle, Stage::PinGate);
        challenge::check_pin(device, challenge)?;

        // The pre-check needs the current state even when the command itself
        // does not
        let validate = descriptor.should_validate_state_change();
        let mut item = None;
        if descriptor.requires_item(device) || validate {
            advance(lifecycle, Stage::FetchItem);
            item = Some(self.registry.fetch_item(&device.id).await?);
        }

        advance(lifecycle, Stage::ResponseStates);
        let mut states = descriptor.response_states(params, item.as_ref(), device);
        if !states.is_empty() {
            states.insert("online".into(), Value::Bool(true));
        }

        advance(lifecycle, Stage::AckGate);
        challenge::check_ack(descriptor.command_type(), device, challenge, &states)?;

        if validate {
            advance(lifecycle, Stage::Precheck);
            descriptor.validate_state_change(params, item.as_ref(), device)?;
        }

        advance(lifecycle, Stage::ConvertValue);
        let item_name = descriptor.item_name(item.as_ref(), device, params)?;
        let Some(value) = descriptor.convert_params_to_value(params, item.as_ref(), device)? else {
            debug!("[EXECUTE] {} has no value to send", device.id);
            return Ok(states);
        };

        advance(lifecycle, Stage::Dispatch);
        debug!("[EXECUTE] {} -> {} = {}", device.id, item_name, value);
        self.registry.send_command(&item_name, &value).await?;

        let wait = descriptor.wait_for_state_change(device);
        if !wait.is_zero() {
            advance(lifecycle, Stage::Wait);
            debug!("[EXECUTE] {} waiting {:?} for state change", device.id, wait);
            tokio::time::sleep(wait).await;
        }

        if descriptor.should_fetch_latest_state() {
            advance(lifecycle, Stage::Refetch);
            item = Some(self.registry.fetch_item(&device.id).await?);
        }

        advance(lifecycle, Stage::Postcheck);
        descriptor.check_update_failed(params, item.as_ref(), device)?;

        if let Some(observed) = descriptor.new_states(params, item.as_ref(), device) {
            states = observed;
        }
        Ok(states)
    }
}

fn advance(lifecycle: &mut Lifecycle, stage: Stage) {
    if let TransitionResult::Invalid { from, to } = lifecycle.advance(stage) {
        error!(
            "[EXECUTE] {} invalid lifecycle transition: {:?} -> {:?}",
            lifecycle.device_id(),
            from,
            to
        );
    }
}
