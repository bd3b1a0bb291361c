//! Command descriptor contract
//!
//! One implementation per supported command type. Every hook is pure and
//! synchronous; the executor owns all I/O and ordering. Only
//! `command_type` and `convert_params_to_value` must be provided, the
//! remaining hooks default to "no requirement".

use super::ExecutionError;
use intent_bridge_shared::{Device, Item, Params, StateMap};
use serde_json::{Map, Value};
use std::time::Duration;

pub trait CommandDescriptor: Send + Sync {
    /// Intent identifier handled by this descriptor
    fn command_type(&self) -> &'static str;

    /// Check that the parameters carry the keys and types this command needs
    fn validate_params(&self, _params: &Params) -> bool {
        true
    }

    /// Whether this descriptor handles the given intent
    fn applies_to(&self, command: &str, params: &Params) -> bool {
        command == self.command_type() && self.validate_params(params)
    }

    /// Whether the device item must be fetched before execution
    fn requires_item(&self, _device: &Device) -> bool {
        false
    }

    /// Registry item that receives the converted value
    fn item_name(
        &self,
        item: Option<&Item>,
        device: &Device,
        _params: &Params,
    ) -> Result<String, ExecutionError> {
        Ok(item
            .filter(|item| !item.name.is_empty())
            .map_or_else(|| device.id.clone(), |item| item.name.clone()))
    }

    /// Registry value for the intent parameters. `None` leaves nothing to send.
    fn convert_params_to_value(
        &self,
        params: &Params,
        item: Option<&Item>,
        device: &Device,
    ) -> Result<Option<String>, ExecutionError>;

    /// States reported back to the caller
    fn response_states(
        &self,
        _params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> StateMap {
        StateMap::new()
    }

    /// Whether to compare the current state against the target before sending
    fn should_validate_state_change(&self) -> bool {
        false
    }

    /// Reject commands whose target state is already reached
    fn validate_state_change(
        &self,
        _params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<(), ExecutionError> {
        Ok(())
    }

    /// Delay between dispatch and post-check
    fn wait_for_state_change(&self, device: &Device) -> Duration {
        device.custom_data.state_change_wait()
    }

    /// Whether to fetch the item again after dispatch for the post-check
    fn should_fetch_latest_state(&self) -> bool {
        false
    }

    /// Reject commands the backend accepted but did not carry out
    fn check_update_failed(
        &self,
        _params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<(), ExecutionError> {
        Ok(())
    }

    /// Observed states replacing the response states after a re-fetch
    fn new_states(
        &self,
        _params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Option<StateMap> {
        None
    }
}

pub(crate) fn param_bool(params: &Params, key: &str) -> Option<bool> {
    params.get(key).and_then(Value::as_bool)
}

pub(crate) fn param_f64(params: &Params, key: &str) -> Option<f64> {
    params.get(key).and_then(Value::as_f64)
}

pub(crate) fn param_str<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

pub(crate) fn param_object<'a>(params: &'a Params, key: &str) -> Option<&'a Map<String, Value>> {
    params.get(key).and_then(Value::as_object)
}

/// Registry text for a number: integral values carry no fraction
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
