//! Volume and playback commands
//!
//! A TV is a group whose volume and transport items are named in the device
//! config (`volume`, `mediastate`). Every other device receives the command
//! on its own item.

use super::fetched;
use crate::catalog::member_by_name;
use crate::command::descriptor::{param_f64, CommandDescriptor};
use crate::command::{format_number, ExecutionError};
use intent_bridge_shared::{commands, device_types, Device, Item, Params, StateMap};
use serde_json::Value;

fn is_tv(device: &Device) -> bool {
    device.custom_data.is_device_type(device_types::TV)
}

/// Item receiving volume commands
fn volume_item(device: &Device) -> Result<String, ExecutionError> {
    if !is_tv(device) {
        return Ok(device.id.clone());
    }
    device
        .custom_data
        .volume
        .clone()
        .ok_or_else(|| ExecutionError::not_supported("TV has no volume item configured"))
}

/// Reported volume; integral levels stay integers
fn volume_states(volume: f64) -> StateMap {
    let current = if volume.fract() == 0.0 {
        Value::from(volume as i64)
    } else {
        Value::from(volume)
    };
    let mut states = StateMap::new();
    states.insert("currentVolume".into(), current);
    states.insert("isMuted".into(), Value::Bool(volume == 0.0));
    states
}

pub struct SetVolume;

impl CommandDescriptor for SetVolume {
    fn command_type(&self) -> &'static str {
        commands::SET_VOLUME
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_f64(params, "volumeLevel").is_some()
    }

    fn item_name(
        &self,
        _item: Option<&Item>,
        device: &Device,
        _params: &Params,
    ) -> Result<String, ExecutionError> {
        volume_item(device)
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        Ok(param_f64(params, "volumeLevel").map(format_number))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        param_f64(params, "volumeLevel")
            .map(volume_states)
            .unwrap_or_default()
    }
}

/// Volume step relative to the current level, clamped to 0..=100
pub struct VolumeRelative;

impl VolumeRelative {
    fn target(
        params: &Params,
        item: Option<&Item>,
        device: &Device,
    ) -> Result<f64, ExecutionError> {
        let item = fetched(item)?;
        let current = if is_tv(device) {
            let name = volume_item(device)?;
            member_by_name(item, &name)
                .ok_or_else(|| ExecutionError::not_supported(format!("TV has no member {name}")))?
                .state
                .as_str()
        } else {
            item.state.as_str()
        };
        let current: f64 = current.trim().parse().map_err(|_| {
            ExecutionError::not_supported(format!("volume state {current:?} is not numeric"))
        })?;
        let step = param_f64(params, "volumeRelativeLevel").unwrap_or(0.0);
        Ok((current + step).clamp(0.0, 100.0))
    }
}

impl CommandDescriptor for VolumeRelative {
    fn command_type(&self) -> &'static str {
        commands::VOLUME_RELATIVE
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_f64(params, "volumeRelativeLevel").is_some()
    }

    fn requires_item(&self, _device: &Device) -> bool {
        true
    }

    fn item_name(
        &self,
        _item: Option<&Item>,
        device: &Device,
        _params: &Params,
    ) -> Result<String, ExecutionError> {
        volume_item(device)
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        item: Option<&Item>,
        device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        Self::target(params, item, device).map(|volume| Some(format_number(volume)))
    }

    fn response_states(&self, params: &Params, item: Option<&Item>, device: &Device) -> StateMap {
        Self::target(params, item, device)
            .map(volume_states)
            .unwrap_or_default()
    }
}

/// Parameterless transport command sending a fixed value
pub struct MediaTransport {
    command_type: &'static str,
    value: &'static str,
}

pub const MEDIA_PAUSE: MediaTransport = MediaTransport {
    command_type: commands::MEDIA_PAUSE,
    value: "PAUSE",
};
pub const MEDIA_STOP: MediaTransport = MediaTransport {
    command_type: commands::MEDIA_STOP,
    value: "PAUSE",
};
pub const MEDIA_RESUME: MediaTransport = MediaTransport {
    command_type: commands::MEDIA_RESUME,
    value: "PLAY",
};
pub const MEDIA_NEXT: MediaTransport = MediaTransport {
    command_type: commands::MEDIA_NEXT,
    value: "NEXT",
};
pub const MEDIA_PREVIOUS: MediaTransport = MediaTransport {
    command_type: commands::MEDIA_PREVIOUS,
    value: "PREVIOUS",
};

impl CommandDescriptor for MediaTransport {
    fn command_type(&self) -> &'static str {
        self.command_type
    }

    fn item_name(
        &self,
        _item: Option<&Item>,
        device: &Device,
        _params: &Params,
    ) -> Result<String, ExecutionError> {
        if !is_tv(device) {
            return Ok(device.id.clone());
        }
        device
            .custom_data
            .media_state
            .clone()
            .ok_or_else(|| ExecutionError::not_supported("TV has no mediastate item configured"))
    }

    fn convert_params_to_value(
        &self,
        _params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        Ok(Some(self.value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandExecutor;
    use crate::registry::{MemoryRegistry, SentCommand};
    use intent_bridge_shared::{DeviceConfig, ErrorCode, Outcome};
    use serde_json::json;
    use std::sync::Arc;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn tv(volume: Option<&str>, media_state: Option<&str>) -> Device {
        Device::new("TV").with_config(DeviceConfig {
            device_type: device_types::TV.into(),
            volume: volume.map(String::from),
            media_state: media_state.map(String::from),
            ..Default::default()
        })
    }

    fn tv_item() -> Item {
        Item::new("TV", "Group", "NULL")
            .with_member(Item::new("TV_Volume", "Dimmer", "20"))
            .with_member(Item::new("TV_Transport", "Player", "PLAY"))
    }

    #[test]
    fn test_set_volume() {
        let p = params(json!({ "volumeLevel": 0 }));
        let device = Device::new("Speaker");

        assert_eq!(SetVolume.item_name(None, &device, &p).unwrap(), "Speaker");
        assert_eq!(
            SetVolume.convert_params_to_value(&p, None, &device).unwrap().as_deref(),
            Some("0")
        );
        assert_eq!(
            Value::Object(SetVolume.response_states(&p, None, &device)),
            json!({ "currentVolume": 0, "isMuted": true })
        );
    }

    #[test]
    fn test_tv_routing() {
        let p = params(json!({ "volumeLevel": 30 }));

        let device = tv(Some("TV_Volume"), Some("TV_Transport"));
        assert_eq!(SetVolume.item_name(None, &device, &p).unwrap(), "TV_Volume");
        assert_eq!(MEDIA_NEXT.item_name(None, &device, &p).unwrap(), "TV_Transport");

        let unconfigured = tv(None, None);
        assert!(matches!(
            SetVolume.item_name(None, &unconfigured, &p),
            Err(ExecutionError::Precondition { .. })
        ));
        assert!(matches!(
            MEDIA_PAUSE.item_name(None, &unconfigured, &p),
            Err(ExecutionError::Precondition { .. })
        ));
    }

    #[test]
    fn test_volume_relative() {
        let device = Device::new("Speaker");
        let item = Item::new("Speaker", "Dimmer", "95");

        let up = params(json!({ "volumeRelativeLevel": 10 }));
        assert_eq!(
            VolumeRelative
                .convert_params_to_value(&up, Some(&item), &device)
                .unwrap()
                .as_deref(),
            Some("100")
        );

        let down = params(json!({ "volumeRelativeLevel": -5 }));
        assert_eq!(
            Value::Object(VolumeRelative.response_states(&down, Some(&item), &device)),
            json!({ "currentVolume": 90, "isMuted": false })
        );
    }

    #[test]
    fn test_volume_reported_as_given() {
        let device = Device::new("Speaker");
        let states =
            SetVolume.response_states(&params(json!({ "volumeLevel": 40 })), None, &device);
        assert_eq!(states["currentVolume"], json!(40));
        assert!(states["currentVolume"].is_i64());

        let states =
            SetVolume.response_states(&params(json!({ "volumeLevel": 12.5 })), None, &device);
        assert_eq!(states["currentVolume"], json!(12.5));
    }

    #[test]
    fn test_volume_relative_on_tv() {
        let device = tv(Some("TV_Volume"), None);
        let p = params(json!({ "volumeRelativeLevel": 5 }));
        assert_eq!(
            VolumeRelative
                .convert_params_to_value(&p, Some(&tv_item()), &device)
                .unwrap()
                .as_deref(),
            Some("25")
        );
    }

    #[test]
    fn test_volume_relative_non_numeric_state() {
        let device = Device::new("Speaker");
        let item = Item::new("Speaker", "Dimmer", "NULL");
        let p = params(json!({ "volumeRelativeLevel": 5 }));

        let err = VolumeRelative
            .convert_params_to_value(&p, Some(&item), &device)
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotSupported);
        assert!(VolumeRelative.response_states(&p, Some(&item), &device).is_empty());
    }

    #[test]
    fn test_media_values() {
        let device = Device::new("Player");
        let values: Vec<_> = [MEDIA_PAUSE, MEDIA_STOP, MEDIA_RESUME, MEDIA_NEXT, MEDIA_PREVIOUS]
            .iter()
            .map(|d| {
                d.convert_params_to_value(&Params::new(), None, &device)
                    .unwrap()
                    .unwrap()
            })
            .collect();
        assert_eq!(values, ["PAUSE", "PAUSE", "PLAY", "NEXT", "PREVIOUS"]);
    }

    #[tokio::test]
    async fn test_media_on_tv_end_to_end() {
        let registry = Arc::new(MemoryRegistry::with_items([tv_item()]));
        let executor = CommandExecutor::new(registry.clone());

        let outcomes = executor
            .execute(
                &MEDIA_RESUME,
                &[tv(Some("TV_Volume"), Some("TV_Transport"))],
                &Params::new(),
                None,
            )
            .await;

        assert_eq!(outcomes, vec![Outcome::success("TV", StateMap::new())]);
        assert!(registry.fetched().await.is_empty());
        assert_eq!(
            registry.sent().await,
            vec![SentCommand {
                item_name: "TV_Transport".into(),
                value: "PLAY".into()
            }]
        );
    }
}
