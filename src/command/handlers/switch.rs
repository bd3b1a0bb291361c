//! Plain switch-style commands

use super::on_off;
use crate::command::descriptor::{param_bool, CommandDescriptor};
use crate::command::ExecutionError;
use intent_bridge_shared::{commands, Device, Item, Params, StateMap};
use serde_json::Value;

pub struct OnOff;

impl CommandDescriptor for OnOff {
    fn command_type(&self) -> &'static str {
        commands::ON_OFF
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_bool(params, "on").is_some()
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        Ok(Some(on_off(param_bool(params, "on").unwrap_or(false))))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        let mut states = StateMap::new();
        if let Some(on) = param_bool(params, "on") {
            states.insert("on".into(), Value::Bool(on));
        }
        states
    }
}

pub struct LockUnlock;

impl CommandDescriptor for LockUnlock {
    fn command_type(&self) -> &'static str {
        commands::LOCK_UNLOCK
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_bool(params, "lock").is_some()
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        Ok(Some(on_off(param_bool(params, "lock").unwrap_or(false))))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        let mut states = StateMap::new();
        if let Some(lock) = param_bool(params, "lock") {
            states.insert("isLocked".into(), Value::Bool(lock));
        }
        states
    }
}

/// Scenes are switches that are only ever turned on, unless deactivated
pub struct ActivateScene;

impl CommandDescriptor for ActivateScene {
    fn command_type(&self) -> &'static str {
        commands::ACTIVATE_SCENE
    }

    fn validate_params(&self, params: &Params) -> bool {
        params.get("deactivate").map_or(true, Value::is_boolean)
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        let deactivate = param_bool(params, "deactivate").unwrap_or(false);
        Ok(Some(on_off(!deactivate)))
    }
}
