//! Command descriptors for the supported command types

mod arm_disarm;
mod cover;
mod light;
mod media;
mod switch;
mod thermostat;

pub use arm_disarm::ArmDisarm;
pub use cover::{OpenClose, StartStop};
pub use light::{BrightnessAbsolute, ColorAbsolute};
pub use media::{MediaTransport, SetVolume, VolumeRelative};
pub use switch::{ActivateScene, LockUnlock, OnOff};
pub use thermostat::{ThermostatSetMode, ThermostatTemperatureSetpoint};

use super::{CommandDescriptor, ExecutionError};
use intent_bridge_shared::{Item, Params};

/// Every supported descriptor, in lookup order
static DESCRIPTORS: [&dyn CommandDescriptor; 17] = [
    &OnOff,
    &LockUnlock,
    &ArmDisarm,
    &ActivateScene,
    &BrightnessAbsolute,
    &SetVolume,
    &VolumeRelative,
    &ColorAbsolute,
    &OpenClose,
    &StartStop,
    &media::MEDIA_PAUSE,
    &media::MEDIA_STOP,
    &media::MEDIA_RESUME,
    &media::MEDIA_NEXT,
    &media::MEDIA_PREVIOUS,
    &ThermostatTemperatureSetpoint,
    &ThermostatSetMode,
];

/// First descriptor that handles `command` with these parameters
pub fn find_descriptor(command: &str, params: &Params) -> Option<&'static dyn CommandDescriptor> {
    DESCRIPTORS
        .iter()
        .copied()
        .find(|descriptor| descriptor.applies_to(command, params))
}

/// The fetched item, for descriptors that cannot work without one
fn fetched(item: Option<&Item>) -> Result<&Item, ExecutionError> {
    item.ok_or_else(|| ExecutionError::not_supported("item state unavailable"))
}

fn on_off(on: bool) -> String {
    String::from(if on { "ON" } else { "OFF" })
}
