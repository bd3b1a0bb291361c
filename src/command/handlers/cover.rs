//! Blinds, shutters and other movable covers
//!
//! Rollershutter items understand `UP`/`DOWN`/`MOVE`/`STOP` and take an
//! inverted percentage (100 is fully closed). Any other item type, including
//! none at all, is driven as a plain switch.

use super::on_off;
use crate::command::descriptor::{param_bool, param_f64, CommandDescriptor};
use crate::command::{format_number, ExecutionError};
use intent_bridge_shared::{commands, Device, Item, Params, StateMap};
use serde_json::Value;

const ROLLERSHUTTER: &str = "Rollershutter";

fn is_rollershutter(device: &Device) -> bool {
    device.custom_data.item_type == ROLLERSHUTTER
}

pub struct OpenClose;

impl CommandDescriptor for OpenClose {
    fn command_type(&self) -> &'static str {
        commands::OPEN_CLOSE
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_f64(params, "openPercent").is_some()
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        let Some(open_percent) = param_f64(params, "openPercent") else {
            return Ok(None);
        };
        if !is_rollershutter(device) {
            return Ok(Some(on_off(open_percent != 0.0)));
        }
        let value = if open_percent == 0.0 {
            "DOWN".to_string()
        } else if open_percent == 100.0 {
            "UP".to_string()
        } else {
            format_number(100.0 - open_percent)
        };
        Ok(Some(value))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        let mut states = StateMap::new();
        if let Some(open_percent) = params.get("openPercent") {
            states.insert("openPercent".into(), open_percent.clone());
        }
        states
    }
}

pub struct StartStop;

impl CommandDescriptor for StartStop {
    fn command_type(&self) -> &'static str {
        commands::START_STOP
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_bool(params, "start").is_some()
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        let start = param_bool(params, "start").unwrap_or(false);
        if !is_rollershutter(device) {
            return Ok(Some(on_off(start)));
        }
        Ok(Some(String::from(if start { "MOVE" } else { "STOP" })))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        let mut states = StateMap::new();
        if let Some(start) = param_bool(params, "start") {
            states.insert("isRunning".into(), Value::Bool(start));
            states.insert("isPaused".into(), Value::Bool(!start));
        }
        states
    }
}
