//! Security system arming
//!
//! Arming is validated against the current state before anything is sent,
//! and the group is fetched again afterwards to confirm the backend actually
//! armed or disarmed. The reported states are the observed ones.

use super::{fetched, on_off};
use crate::catalog::security_system;
use crate::command::descriptor::{param_bool, param_str, CommandDescriptor};
use crate::command::ExecutionError;
use intent_bridge_shared::{commands, Device, ErrorCode, Item, Params, StateMap};
use serde_json::Value;

pub struct ArmDisarm;

impl ArmDisarm {
    fn arm(params: &Params) -> bool {
        param_bool(params, "arm").unwrap_or(false)
    }

    fn arm_level(params: &Params) -> Option<&str> {
        param_str(params, "armLevel").filter(|level| !level.is_empty())
    }

    /// Observed `(armed, level)` of the group
    fn observed(item: &Item, device: &Device) -> Option<(bool, Option<String>)> {
        let members = security_system::members(item);
        let armed = security_system::is_armed(&members, device.custom_data.inverted)?;
        let level = security_system::arm_level(&members).map(String::from);
        Some((armed, level))
    }
}

impl CommandDescriptor for ArmDisarm {
    fn command_type(&self) -> &'static str {
        commands::ARM_DISARM
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_bool(params, "arm").is_some()
            && params.get("armLevel").map_or(true, Value::is_string)
    }

    fn requires_item(&self, _device: &Device) -> bool {
        true
    }

    fn item_name(
        &self,
        item: Option<&Item>,
        _device: &Device,
        params: &Params,
    ) -> Result<String, ExecutionError> {
        security_system::member_to_send_arm_command(fetched(item)?, Self::arm_level(params))
            .ok_or_else(|| ExecutionError::not_supported("security system has no armed member"))
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        if let Some(level) = Self::arm_level(params) {
            return Ok(Some(level.to_string()));
        }
        Ok(Some(on_off(Self::arm(params) != device.custom_data.inverted)))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        let mut states = StateMap::new();
        states.insert("isArmed".into(), Value::Bool(Self::arm(params)));
        if let Some(level) = Self::arm_level(params) {
            states.insert("currentArmLevel".into(), Value::from(level));
        }
        states
    }

    fn should_validate_state_change(&self) -> bool {
        true
    }

    fn validate_state_change(
        &self,
        params: &Params,
        item: Option<&Item>,
        device: &Device,
    ) -> Result<(), ExecutionError> {
        let (armed, current_level) = Self::observed(fetched(item)?, device)
            .ok_or_else(|| ExecutionError::not_supported("security system has no armed member"))?;
        let arm = Self::arm(params);

        // Changing the level of an armed system is allowed
        if let Some(level) = Self::arm_level(params) {
            if arm && armed && current_level.as_deref() == Some(level) {
                return Err(ExecutionError::already(
                    ErrorCode::AlreadyInState,
                    format!("already armed at level {level}"),
                ));
            }
            return Ok(());
        }

        match (arm, armed) {
            (true, true) => Err(ExecutionError::already(ErrorCode::AlreadyArmed, "already armed")),
            (false, false) => Err(ExecutionError::already(
                ErrorCode::AlreadyDisarmed,
                "already disarmed",
            )),
            _ => Ok(()),
        }
    }

    fn should_fetch_latest_state(&self) -> bool {
        true
    }

    fn check_update_failed(
        &self,
        params: &Params,
        item: Option<&Item>,
        device: &Device,
    ) -> Result<(), ExecutionError> {
        let arm = Self::arm(params);
        let failure = || ExecutionError::Postcondition {
            code: if arm {
                ErrorCode::ArmFailure
            } else {
                ErrorCode::DisarmFailure
            },
        };

        let (armed, current_level) = item
            .and_then(|item| Self::observed(item, device))
            .ok_or_else(failure)?;
        let level_applied = Self::arm_level(params)
            .map_or(true, |level| current_level.as_deref() == Some(level));

        if armed == arm && level_applied {
            Ok(())
        } else {
            Err(failure())
        }
    }

    fn new_states(
        &self,
        params: &Params,
        item: Option<&Item>,
        device: &Device,
    ) -> Option<StateMap> {
        let (armed, current_level) = Self::observed(item?, device)?;
        let mut states = StateMap::new();
        states.insert("online".into(), Value::Bool(true));
        states.insert("isArmed".into(), Value::Bool(armed));
        if let (Some(_), Some(level)) = (Self::arm_level(params), current_level) {
            states.insert("currentArmLevel".into(), Value::from(level));
        }
        Some(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::security_system::{ARMED, ARM_LEVEL};
    use crate::command::CommandExecutor;
    use crate::registry::{MemoryRegistry, SentCommand};
    use intent_bridge_shared::{ChallengeType, Challenge, DeviceConfig, Outcome};
    use serde_json::{json, Map};
    use std::sync::Arc;

    fn alarm(armed: &str, level: &str) -> Item {
        Item::new("Alarm", "Group", "NULL")
            .with_ga("SecuritySystem", Map::new())
            .with_member(Item::new("Alarm_Armed", "Switch", armed).with_ga(ARMED, Map::new()))
            .with_member(Item::new("Alarm_Level", "String", level).with_ga(ARM_LEVEL, Map::new()))
    }

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn states(value: Value) -> StateMap {
        value.as_object().cloned().unwrap()
    }

    fn error_code(result: Result<(), ExecutionError>) -> Option<ErrorCode> {
        result.err().map(|err| err.error_code())
    }

    #[test]
    fn test_convert_value() {
        let device = Device::new("Alarm");
        let inverted = Device::new("Alarm").with_config(DeviceConfig {
            inverted: true,
            ..Default::default()
        });
        let convert = |p: Value, d: &Device| {
            ArmDisarm
                .convert_params_to_value(&params(p), None, d)
                .unwrap()
        };

        assert_eq!(convert(json!({ "arm": true }), &device).as_deref(), Some("ON"));
        assert_eq!(convert(json!({ "arm": false }), &device).as_deref(), Some("OFF"));
        assert_eq!(convert(json!({ "arm": true }), &inverted).as_deref(), Some("OFF"));
        assert_eq!(
            convert(json!({ "arm": true, "armLevel": "L2" }), &device).as_deref(),
            Some("L2")
        );
    }

    #[test]
    fn test_item_name() {
        let device = Device::new("Alarm");
        let item = alarm("OFF", "L1");

        let name = ArmDisarm.item_name(Some(&item), &device, &params(json!({ "arm": true })));
        assert_eq!(name.unwrap(), "Alarm_Armed");

        let name = ArmDisarm.item_name(
            Some(&item),
            &device,
            &params(json!({ "arm": true, "armLevel": "L2" })),
        );
        assert_eq!(name.unwrap(), "Alarm_Level");

        let bare = Item::new("Alarm", "Group", "NULL");
        let err = ArmDisarm
            .item_name(Some(&bare), &device, &params(json!({ "arm": true })))
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotSupported);
    }

    #[test]
    fn test_validate_state_change() {
        let device = Device::new("Alarm");
        let validate = |p: Value, item: &Item| {
            error_code(ArmDisarm.validate_state_change(&params(p), Some(item), &device))
        };

        assert_eq!(
            validate(json!({ "arm": true }), &alarm("ON", "L1")),
            Some(ErrorCode::AlreadyArmed)
        );
        assert_eq!(
            validate(json!({ "arm": false }), &alarm("OFF", "L1")),
            Some(ErrorCode::AlreadyDisarmed)
        );
        assert_eq!(
            validate(json!({ "arm": true, "armLevel": "L1" }), &alarm("ON", "L1")),
            Some(ErrorCode::AlreadyInState)
        );
        assert_eq!(validate(json!({ "arm": true, "armLevel": "L2" }), &alarm("ON", "L1")), None);
        assert_eq!(validate(json!({ "arm": true }), &alarm("OFF", "L1")), None);
        assert_eq!(validate(json!({ "arm": false }), &alarm("ON", "L1")), None);
    }

    #[test]
    fn test_validate_respects_inversion() {
        let device = Device::new("Alarm").with_config(DeviceConfig {
            inverted: true,
            ..Default::default()
        });
        let result = ArmDisarm.validate_state_change(
            &params(json!({ "arm": true })),
            Some(&alarm("OFF", "L1")),
            &device,
        );
        assert_eq!(error_code(result), Some(ErrorCode::AlreadyArmed));
    }

    #[test]
    fn test_check_update_failed() {
        let device = Device::new("Alarm");
        let check = |p: Value, item: &Item| {
            error_code(ArmDisarm.check_update_failed(&params(p), Some(item), &device))
        };

        assert_eq!(check(json!({ "arm": true }), &alarm("ON", "L1")), None);
        assert_eq!(
            check(json!({ "arm": true }), &alarm("OFF", "L1")),
            Some(ErrorCode::ArmFailure)
        );
        assert_eq!(
            check(json!({ "arm": false }), &alarm("ON", "L1")),
            Some(ErrorCode::DisarmFailure)
        );
        assert_eq!(
            check(json!({ "arm": true, "armLevel": "L2" }), &alarm("ON", "L1")),
            Some(ErrorCode::ArmFailure)
        );
    }

    #[tokio::test]
    async fn test_arm_end_to_end() {
        let registry = Arc::new(MemoryRegistry::with_items([alarm("OFF", "L1")]));
        let executor = CommandExecutor::new(registry.clone());

        let outcomes = executor
            .execute(
                &ArmDisarm,
                &[Device::new("Alarm")],
                &params(json!({ "arm": true })),
                None,
            )
            .await;

        assert_eq!(
            outcomes,
            vec![Outcome::success(
                "Alarm",
                states(json!({ "online": true, "isArmed": true }))
            )]
        );
        assert_eq!(registry.fetch_count("Alarm").await, 2);
        assert_eq!(
            registry.sent().await,
            vec![SentCommand {
                item_name: "Alarm_Armed".into(),
                value: "ON".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_arm_level_end_to_end() {
        let registry = Arc::new(MemoryRegistry::with_items([alarm("ON", "L1")]));
        let executor = CommandExecutor::new(registry.clone());

        let outcomes = executor
            .execute(
                &ArmDisarm,
                &[Device::new("Alarm")],
                &params(json!({ "arm": true, "armLevel": "L2" })),
                None,
            )
            .await;

        assert_eq!(
            outcomes,
            vec![Outcome::success(
                "Alarm",
                states(json!({ "online": true, "isArmed": true, "currentArmLevel": "L2" }))
            )]
        );
        assert_eq!(registry.send_count("Alarm_Level").await, 1);
    }

    #[tokio::test]
    async fn test_already_armed_never_dispatches() {
        let registry = Arc::new(MemoryRegistry::with_items([alarm("ON", "L1")]));
        let executor = CommandExecutor::new(registry.clone());

        let outcomes = executor
            .execute(
                &ArmDisarm,
                &[Device::new("Alarm")],
                &params(json!({ "arm": true })),
                None,
            )
            .await;

        assert_eq!(outcomes, vec![Outcome::error("Alarm", ErrorCode::AlreadyArmed)]);
        assert_eq!(registry.fetch_count("Alarm").await, 1);
        assert!(registry.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_ignored_command_reports_arm_failure() {
        let registry = Arc::new(MemoryRegistry::with_items([alarm("OFF", "L1")]).frozen());
        let executor = CommandExecutor::new(registry.clone());

        let outcomes = executor
            .execute(
                &ArmDisarm,
                &[Device::new("Alarm")],
                &params(json!({ "arm": true })),
                None,
            )
            .await;

        assert_eq!(outcomes, vec![Outcome::error("Alarm", ErrorCode::ArmFailure)]);
        assert_eq!(registry.send_count("Alarm_Armed").await, 1);
        assert_eq!(registry.fetch_count("Alarm").await, 2);
    }

    #[tokio::test]
    async fn test_ack_challenge_carries_requested_states() {
        let registry = Arc::new(MemoryRegistry::with_items([alarm("OFF", "L1")]));
        let executor = CommandExecutor::new(registry.clone());
        let device = Device::new("Alarm").with_config(DeviceConfig {
            ack_needed: true,
            ..Default::default()
        });

        let outcomes = executor
            .execute(&ArmDisarm, &[device.clone()], &params(json!({ "arm": true })), None)
            .await;
        assert_eq!(
            outcomes,
            vec![Outcome::challenge(
                "Alarm",
                ChallengeType::AckNeeded,
                Some(states(json!({ "isArmed": true, "online": true })))
            )]
        );
        assert!(registry.sent().await.is_empty());

        let outcomes = executor
            .execute(
                &ArmDisarm,
                &[device],
                &params(json!({ "arm": true })),
                Some(&Challenge::ack()),
            )
            .await;
        assert!(outcomes[0].is_success());
    }
}
