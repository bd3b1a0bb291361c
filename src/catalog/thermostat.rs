//! Thermostat groups
//!
//! Temperatures are reported in Celsius. Items flagged with `useFahrenheit`
//! (or tagged `Fahrenheit`) store Fahrenheit values and are converted both
//! ways. Item mode values map to intent modes through the `modes` config,
//! e.g. `modes="off=OFF,heat=HEATING,cool=COOLING"`.

use super::{members as collect, Members};
use intent_bridge_shared::{Item, StateMap};
use serde_json::Value;

pub const AMBIENT: &str = "thermostatTemperatureAmbient";
pub const SETPOINT: &str = "thermostatTemperatureSetpoint";
pub const MODE: &str = "thermostatMode";
pub const HUMIDITY: &str = "thermostatHumidityAmbient";

const SUPPORTED: [&str; 4] = [AMBIENT, SETPOINT, MODE, HUMIDITY];

pub fn members(item: &Item) -> Members {
    collect(item, &SUPPORTED)
}

pub fn uses_fahrenheit(item: &Item) -> bool {
    item.config_bool("useFahrenheit") || item.has_tag("Fahrenheit")
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    round_tenth(celsius * 9.0 / 5.0 + 32.0)
}

pub fn to_celsius(fahrenheit: f64) -> f64 {
    round_tenth((fahrenheit - 32.0) * 5.0 / 9.0)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `(intent mode, item value)` pairs from the `modes` config
fn mode_map(item: &Item) -> Vec<(String, String)> {
    let Some(modes) = item.config_str("modes") else {
        return Vec::new();
    };
    modes
        .split(',')
        .filter_map(|pair| {
            let (mode, value) = pair.split_once('=')?;
            Some((mode.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Intent mode for an item mode value. Unmapped values pass through lowercased.
pub fn normalize_mode(item: &Item, value: &str) -> String {
    mode_map(item)
        .into_iter()
        .find(|(_, v)| v.eq_ignore_ascii_case(value))
        .map(|(mode, _)| mode)
        .unwrap_or_else(|| value.to_lowercase())
}

/// Item mode value for an intent mode. Unmapped modes pass through.
pub fn denormalize_mode(item: &Item, mode: &str) -> String {
    mode_map(item)
        .into_iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(mode))
        .map(|(_, value)| value)
        .unwrap_or_else(|| mode.to_string())
}

/// Current thermostat state from member snapshots. Members that are missing
/// or hold non-numeric states are left out.
pub fn state(item: &Item) -> StateMap {
    let members = members(item);
    let fahrenheit = uses_fahrenheit(item);
    let mut state = StateMap::new();

    if let Some(mode) = members.get(MODE) {
        state.insert(MODE.into(), Value::from(normalize_mode(item, &mode.state)));
    }
    for key in [AMBIENT, SETPOINT] {
        let Some(value) = members.get(key).and_then(|m| m.state.parse::<f64>().ok()) else {
            continue;
        };
        let celsius = if fahrenheit { to_celsius(value) } else { value };
        state.insert(key.into(), Value::from(celsius));
    }
    if let Some(humidity) = members.get(HUMIDITY).and_then(|m| m.state.parse::<f64>().ok()) {
        state.insert(HUMIDITY.into(), Value::from(humidity));
    }
    state
}
