//! Thermostat commands
//!
//! Both commands address a member of the thermostat group and report the
//! group's current state with the requested value applied.

use super::fetched;
use crate::catalog::thermostat::{self, MODE, SETPOINT};
use crate::command::descriptor::{param_f64, param_str, CommandDescriptor};
use crate::command::{format_number, ExecutionError};
use intent_bridge_shared::{commands, Device, Item, Params, StateMap};
use serde_json::Value;

/// Name of the group member with the given role
fn member_name(item: Option<&Item>, role: &str) -> Result<String, ExecutionError> {
    thermostat::members(fetched(item)?)
        .remove(role)
        .map(|member| member.name)
        .ok_or_else(|| ExecutionError::not_supported(format!("thermostat has no {role} member")))
}

fn state_with(item: Option<&Item>, key: &str, value: Value) -> StateMap {
    let mut states = item.map(thermostat::state).unwrap_or_default();
    states.insert(key.into(), value);
    states
}

pub struct ThermostatTemperatureSetpoint;

impl CommandDescriptor for ThermostatTemperatureSetpoint {
    fn command_type(&self) -> &'static str {
        commands::THERMOSTAT_TEMPERATURE_SETPOINT
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_f64(params, SETPOINT).is_some()
    }

    fn requires_item(&self, _device: &Device) -> bool {
        true
    }

    fn item_name(
        &self,
        item: Option<&Item>,
        _device: &Device,
        _params: &Params,
    ) -> Result<String, ExecutionError> {
        member_name(item, SETPOINT)
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        let Some(setpoint) = param_f64(params, SETPOINT) else {
            return Ok(None);
        };
        let value = if thermostat::uses_fahrenheit(fetched(item)?) {
            thermostat::to_fahrenheit(setpoint)
        } else {
            setpoint
        };
        Ok(Some(format_number(value)))
    }

    fn response_states(&self, params: &Params, item: Option<&Item>, _device: &Device) -> StateMap {
        let setpoint = params.get(SETPOINT).cloned().unwrap_or(Value::Null);
        state_with(item, SETPOINT, setpoint)
    }
}

pub struct ThermostatSetMode;

impl CommandDescriptor for ThermostatSetMode {
    fn command_type(&self) -> &'static str {
        commands::THERMOSTAT_SET_MODE
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_str(params, MODE).is_some()
    }

    fn requires_item(&self, _device: &Device) -> bool {
        true
    }

    fn item_name(
        &self,
        item: Option<&Item>,
        _device: &Device,
        _params: &Params,
    ) -> Result<String, ExecutionError> {
        member_name(item, MODE)
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        let Some(mode) = param_str(params, MODE) else {
            return Ok(None);
        };
        Ok(Some(thermostat::denormalize_mode(fetched(item)?, mode)))
    }

    fn response_states(&self, params: &Params, item: Option<&Item>, _device: &Device) -> StateMap {
        let mode = params.get(MODE).cloned().unwrap_or(Value::Null);
        state_with(item, MODE, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::thermostat::AMBIENT;
    use crate::command::CommandExecutor;
    use crate::registry::{MemoryRegistry, SentCommand};
    use intent_bridge_shared::ErrorCode;
    use serde_json::{json, Map};
    use std::sync::Arc;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn thermostat_item(config: Value) -> Item {
        Item::new("Heating", "Group", "NULL")
            .with_ga("Thermostat", config.as_object().cloned().unwrap_or_default())
            .with_member(Item::new("Heating_Mode", "String", "OFF").with_ga(MODE, Map::new()))
            .with_member(Item::new("Heating_Temp", "Number", "19.5").with_ga(AMBIENT, Map::new()))
            .with_member(Item::new("Heating_Set", "Number", "20").with_ga(SETPOINT, Map::new()))
    }

    #[test]
    fn test_setpoint_value() {
        let device = Device::new("Heating");
        let p = params(json!({ "thermostatTemperatureSetpoint": 21.5 }));

        let celsius = thermostat_item(json!({}));
        assert_eq!(
            ThermostatTemperatureSetpoint
                .convert_params_to_value(&p, Some(&celsius), &device)
                .unwrap()
                .as_deref(),
            Some("21.5")
        );
        assert_eq!(
            ThermostatTemperatureSetpoint
                .item_name(Some(&celsius), &device, &p)
                .unwrap(),
            "Heating_Set"
        );

        let fahrenheit = thermostat_item(json!({ "useFahrenheit": true }));
        assert_eq!(
            ThermostatTemperatureSetpoint
                .convert_params_to_value(&p, Some(&fahrenheit), &device)
                .unwrap()
                .as_deref(),
            Some("70.7")
        );
    }

    #[test]
    fn test_setpoint_states() {
        let p = params(json!({ "thermostatTemperatureSetpoint": 22 }));
        let states = ThermostatTemperatureSetpoint.response_states(
            &p,
            Some(&thermostat_item(json!({}))),
            &Device::new("Heating"),
        );
        assert_eq!(
            Value::Object(states),
            json!({
                "thermostatMode": "off",
                "thermostatTemperatureAmbient": 19.5,
                "thermostatTemperatureSetpoint": 22
            })
        );
    }

    #[test]
    fn test_set_mode() {
        let device = Device::new("Heating");
        let item = thermostat_item(json!({ "modes": "off=OFF,heat=HEATING" }));
        let p = params(json!({ "thermostatMode": "heat" }));

        assert_eq!(
            ThermostatSetMode.item_name(Some(&item), &device, &p).unwrap(),
            "Heating_Mode"
        );
        assert_eq!(
            ThermostatSetMode
                .convert_params_to_value(&p, Some(&item), &device)
                .unwrap()
                .as_deref(),
            Some("HEATING")
        );
        assert_eq!(
            ThermostatSetMode.response_states(&p, Some(&item), &device)["thermostatMode"],
            json!("heat")
        );
    }

    #[test]
    fn test_missing_member() {
        let item = Item::new("Heating", "Group", "NULL");
        let err = ThermostatSetMode
            .item_name(Some(&item), &Device::new("Heating"), &Params::new())
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotSupported);
    }

    #[tokio::test]
    async fn test_setpoint_end_to_end() {
        let registry = Arc::new(MemoryRegistry::with_items([thermostat_item(json!({}))]));
        let executor = CommandExecutor::new(registry.clone());

        let outcomes = executor
            .execute(
                &ThermostatTemperatureSetpoint,
                &[Device::new("Heating")],
                &params(json!({ "thermostatTemperatureSetpoint": 23 })),
                None,
            )
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[0].states.as_ref().unwrap()["online"], json!(true));
        assert_eq!(
            registry.sent().await,
            vec![SentCommand {
                item_name: "Heating_Set".into(),
                value: "23".into()
            }]
        );
    }
}
