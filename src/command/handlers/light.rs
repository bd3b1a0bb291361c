use crate::command::descriptor::{param_f64, param_object, CommandDescriptor};
use crate::command::{format_number, ExecutionError};
use intent_bridge_shared::{commands, Device, Item, Params, StateMap};
use serde_json::{Map, Value};

pub struct BrightnessAbsolute;

impl CommandDescriptor for BrightnessAbsolute {
    fn command_type(&self) -> &'static str {
        commands::BRIGHTNESS_ABSOLUTE
    }

    fn validate_params(&self, params: &Params) -> bool {
        param_f64(params, "brightness").is_some()
    }

    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        Ok(param_f64(params, "brightness").map(format_number))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        let mut states = StateMap::new();
        if let Some(brightness) = params.get("brightness") {
            states.insert("brightness".into(), brightness.clone());
        }
        states
    }
}

pub struct ColorAbsolute;

impl ColorAbsolute {
    fn spectrum_hsv(params: &Params) -> Option<&Map<String, Value>> {
        param_object(params, "color").and_then(|color| param_object(color, "spectrumHSV"))
    }

    fn component(hsv: &Map<String, Value>, key: &str) -> f64 {
        param_f64(hsv, key).unwrap_or(0.0)
    }
}

impl CommandDescriptor for ColorAbsolute {
    fn command_type(&self) -> &'static str {
        commands::COLOR_ABSOLUTE
    }

    fn validate_params(&self, params: &Params) -> bool {
        Self::spectrum_hsv(params).is_some()
    }

    /// `hue,saturation,value` with saturation and value scaled to percent
    fn convert_params_to_value(
        &self,
        params: &Params,
        _item: Option<&Item>,
        _device: &Device,
    ) -> Result<Option<String>, ExecutionError> {
        let hsv = Self::spectrum_hsv(params)
            .ok_or_else(|| ExecutionError::not_supported("color without spectrumHSV"))?;
        let value = [
            Self::component(hsv, "hue"),
            Self::component(hsv, "saturation") * 100.0,
            Self::component(hsv, "value") * 100.0,
        ]
        .map(format_number)
        .join(",");
        Ok(Some(value))
    }

    fn response_states(&self, params: &Params, _item: Option<&Item>, _device: &Device) -> StateMap {
        let mut states = StateMap::new();
        let (Some(hsv), Some(color)) = (Self::spectrum_hsv(params), params.get("color")) else {
            return states;
        };
        let value = Self::component(hsv, "value");
        states.insert("on".into(), Value::Bool(value > 0.0));
        states.insert("brightness".into(), Value::from(value));
        states.insert("color".into(), color.clone());
        states
    }
}
