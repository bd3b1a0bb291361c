//! Intent Bridge Shared Protocol Types
//!
//! This crate provides the data types exchanged between the command execution
//! engine, the item registry boundary and the outer intent envelope.

pub mod error;
pub mod lifecycle;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

pub use error::RemoteError;

/// Intent parameters keyed by name
pub type Params = Map<String, Value>;

/// User-visible state snapshot reported back for a device
pub type StateMap = Map<String, Value>;

/// Command type identifiers
pub mod commands {
    pub const ON_OFF: &str = "action.devices.commands.OnOff";
    pub const LOCK_UNLOCK: &str = "action.devices.commands.LockUnlock";
    pub const ARM_DISARM: &str = "action.devices.commands.ArmDisarm";
    pub const ACTIVATE_SCENE: &str = "action.devices.commands.ActivateScene";
    pub const BRIGHTNESS_ABSOLUTE: &str = "action.devices.commands.BrightnessAbsolute";
    pub const COLOR_ABSOLUTE: &str = "action.devices.commands.ColorAbsolute";
    pub const SET_VOLUME: &str = "action.devices.commands.setVolume";
    pub const VOLUME_RELATIVE: &str = "action.devices.commands.volumeRelative";
    pub const OPEN_CLOSE: &str = "action.devices.commands.OpenClose";
    pub const START_STOP: &str = "action.devices.commands.StartStop";
    pub const MEDIA_PAUSE: &str = "action.devices.commands.mediaPause";
    pub const MEDIA_STOP: &str = "action.devices.commands.mediaStop";
    pub const MEDIA_RESUME: &str = "action.devices.commands.mediaResume";
    pub const MEDIA_NEXT: &str = "action.devices.commands.mediaNext";
    pub const MEDIA_PREVIOUS: &str = "action.devices.commands.mediaPrevious";
    pub const THERMOSTAT_TEMPERATURE_SETPOINT: &str =
        "action.devices.commands.ThermostatTemperatureSetpoint";
    pub const THERMOSTAT_TEMPERATURE_SET_RANGE: &str =
        "action.devices.commands.ThermostatTemperatureSetRange";
    pub const THERMOSTAT_SET_MODE: &str = "action.devices.commands.ThermostatSetMode";
    pub const TEMPERATURE_RELATIVE: &str = "action.devices.commands.TemperatureRelative";
    pub const FILL: &str = "action.devices.commands.Fill";

    /// Commands with a safety-significant physical effect. Only these can be
    /// gated behind an explicit acknowledgment.
    pub const ACK_SUPPORTED: [&str; 10] = [
        ARM_DISARM,
        FILL,
        LOCK_UNLOCK,
        ON_OFF,
        OPEN_CLOSE,
        ACTIVATE_SCENE,
        THERMOSTAT_TEMPERATURE_SETPOINT,
        THERMOSTAT_TEMPERATURE_SET_RANGE,
        THERMOSTAT_SET_MODE,
        TEMPERATURE_RELATIVE,
    ];

    /// Check if a command type may require acknowledgment
    pub fn supports_ack(command_type: &str) -> bool {
        ACK_SUPPORTED.contains(&command_type)
    }
}

/// Device type identifiers the engine routes on
pub mod device_types {
    pub const SECURITY_SYSTEM: &str = "action.devices.types.SECURITYSYSTEM";
    pub const THERMOSTAT: &str = "action.devices.types.THERMOSTAT";
    pub const TV: &str = "action.devices.types.TV";
}

/// Deployment-time configuration attached to a device.
///
/// Every recognized key is listed here; anything else in the payload is
/// dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceConfig {
    /// PIN that must accompany every command
    #[serde(alias = "tfaPin", deserialize_with = "string_or_number")]
    pub pin_needed: Option<String>,
    /// Whether safety-significant commands need an explicit acknowledgment
    #[serde(alias = "tfaAck")]
    pub ack_needed: bool,
    /// Seconds to wait after dispatch before verifying the new state
    pub wait_for_state_change: Option<f64>,
    pub device_type: String,
    pub item_type: String,
    /// Arm state is sent and read negated
    pub inverted: bool,
    /// Item receiving volume commands for composite media devices
    pub volume: Option<String>,
    /// Item receiving transport commands for composite media devices
    #[serde(rename = "mediastate")]
    pub media_state: Option<String>,
}

impl DeviceConfig {
    /// The configured PIN, if the PIN gate is active
    pub fn pin(&self) -> Option<&str> {
        self.pin_needed.as_deref().filter(|pin| !pin.is_empty())
    }

    /// Bounded delay between dispatch and post-check. Values that are not a
    /// representable positive duration mean no wait.
    pub fn state_change_wait(&self) -> Duration {
        self.wait_for_state_change
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or_default()
    }

    pub fn is_device_type(&self, device_type: &str) -> bool {
        self.device_type == device_type
    }
}

/// A caller-visible addressable target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_data: DeviceConfig,
}

impl Device {
    /// Create a device without custom configuration
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            custom_data: DeviceConfig::default(),
        }
    }

    /// Attach custom configuration
    pub fn with_config(mut self, config: DeviceConfig) -> Self {
        self.custom_data = config;
        self
    }
}

/// Credentials supplied by the caller for challenged commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Challenge {
    #[serde(deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    pub ack: bool,
}

impl Challenge {
    pub fn pin(pin: impl Into<String>) -> Self {
        Self {
            pin: Some(pin.into()),
            ack: false,
        }
    }

    pub fn ack() -> Self {
        Self {
            pin: None,
            ack: true,
        }
    }
}

/// One command intent targeting a batch of devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
    pub devices: Vec<Device>,
}

/// `ga` metadata namespace of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataEntry {
    pub value: String,
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ga: Option<MetadataEntry>,
}

/// Registry snapshot of a device or device member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ItemMetadata>,
    #[serde(deserialize_with = "null_as_default")]
    pub members: Vec<Item>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        item_type: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            item_type: item_type.into(),
            state: state.into(),
            ..Default::default()
        }
    }

    /// Tag the item with a `ga` metadata value
    pub fn with_ga(mut self, value: impl Into<String>, config: Map<String, Value>) -> Self {
        self.metadata = Some(ItemMetadata {
            ga: Some(MetadataEntry {
                value: value.into(),
                config,
            }),
        });
        self
    }

    pub fn with_member(mut self, member: Item) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn ga(&self) -> Option<&MetadataEntry> {
        self.metadata.as_ref().and_then(|m| m.ga.as_ref())
    }

    /// The `ga` metadata value, e.g. a member role
    pub fn ga_value(&self) -> Option<&str> {
        self.ga().map(|ga| ga.value.as_str())
    }

    /// A key from the `ga` metadata config
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.ga().and_then(|ga| ga.config.get(key))
    }

    pub fn config_bool(&self, key: &str) -> bool {
        self.config_value(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config_value(key).and_then(Value::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Per-device result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Error,
}

/// Challenge still required from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeType {
    PinNeeded,
    ChallengeFailedPinNeeded,
    AckNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeNeeded {
    #[serde(rename = "type")]
    pub kind: ChallengeType,
}

/// Semantic error codes reported per device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ChallengeNeeded,
    DeviceNotFound,
    NotSupported,
    DeviceOffline,
    AlreadyInState,
    AlreadyArmed,
    AlreadyDisarmed,
    ArmFailure,
    DisarmFailure,
    /// Code supplied by the remote layer, reported verbatim
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::ChallengeNeeded => "challengeNeeded",
            ErrorCode::DeviceNotFound => "deviceNotFound",
            ErrorCode::NotSupported => "notSupported",
            ErrorCode::DeviceOffline => "deviceOffline",
            ErrorCode::AlreadyInState => "alreadyInState",
            ErrorCode::AlreadyArmed => "alreadyArmed",
            ErrorCode::AlreadyDisarmed => "alreadyDisarmed",
            ErrorCode::ArmFailure => "armFailure",
            ErrorCode::DisarmFailure => "disarmFailure",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "challengeNeeded" => ErrorCode::ChallengeNeeded,
            "deviceNotFound" => ErrorCode::DeviceNotFound,
            "notSupported" => ErrorCode::NotSupported,
            "deviceOffline" => ErrorCode::DeviceOffline,
            "alreadyInState" => ErrorCode::AlreadyInState,
            "alreadyArmed" => ErrorCode::AlreadyArmed,
            "alreadyDisarmed" => ErrorCode::AlreadyDisarmed,
            "armFailure" => ErrorCode::ArmFailure,
            "disarmFailure" => ErrorCode::DisarmFailure,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(ErrorCode::from(code.as_str()))
    }
}

/// Result record for one device of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub ids: Vec<String>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<StateMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_needed: Option<ChallengeNeeded>,
}

impl Outcome {
    /// Create a successful outcome
    pub fn success(device_id: impl Into<String>, states: StateMap) -> Self {
        Self {
            ids: vec![device_id.into()],
            status: Status::Success,
            states: Some(states),
            error_code: None,
            challenge_needed: None,
        }
    }

    /// Create a failed outcome
    pub fn error(device_id: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            ids: vec![device_id.into()],
            status: Status::Error,
            states: None,
            error_code: Some(code),
            challenge_needed: None,
        }
    }

    /// Create an outcome asking the caller for a challenge response
    pub fn challenge(
        device_id: impl Into<String>,
        kind: ChallengeType,
        states: Option<StateMap>,
    ) -> Self {
        Self {
            ids: vec![device_id.into()],
            status: Status::Error,
            states,
            error_code: Some(ErrorCode::ChallengeNeeded),
            challenge_needed: Some(ChallengeNeeded { kind }),
        }
    }

    /// The device this outcome reports on
    pub fn device_id(&self) -> &str {
        self.ids.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// PINs arrive as strings or bare numbers depending on who wrote the config
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
