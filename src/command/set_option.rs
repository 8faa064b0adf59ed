use super::CommandKind;
use crate::protocol::{OptionDescriptor, OptionType};

/// One option value to hand to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSetting {
    pub name: String,
    /// `None` sends the option without a value, as buttons are sent
    pub value: Option<String>,
}

impl OptionSetting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        OptionSetting {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Press a `button` option.
    pub fn button(name: impl Into<String>) -> Self {
        OptionSetting {
            name: name.into(),
            value: None,
        }
    }

    fn line(&self) -> String {
        match &self.value {
            Some(value) => format!("setoption name {} value {value}", self.name),
            None => format!("setoption name {}", self.name),
        }
    }
}

/// The engine's advertised default, ready to send back.
impl From<&OptionDescriptor> for OptionSetting {
    fn from(option: &OptionDescriptor) -> Self {
        if option.kind() == Some(OptionType::Button) {
            return OptionSetting::button(option.name.clone());
        }
        OptionSetting {
            name: option.name.clone(),
            value: option.default.clone(),
        }
    }
}

/// `setoption`: one line per value, written back to back.
///
/// Engines do not acknowledge option changes; follow with
/// [`IsReady`](super::IsReady) to know they were applied.
#[derive(Debug, Clone, Default)]
pub struct SetOption {
    pub values: Vec<OptionSetting>,
}

impl SetOption {
    #[must_use]
    pub fn with(mut self, setting: OptionSetting) -> Self {
        self.values.push(setting);
        self
    }
}

impl FromIterator<OptionSetting> for SetOption {
    fn from_iter<I: IntoIterator<Item = OptionSetting>>(iter: I) -> Self {
        SetOption {
            values: iter.into_iter().collect(),
        }
    }
}

impl CommandKind for SetOption {
    const NAME: &'static str = "setoption";

    fn request_lines(&self) -> Vec<String> {
        self.values.iter().map(OptionSetting::line).collect()
    }
}
