use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::LocatorError;
use crate::locator::Locator;

/// Choice slots the poll editor renders without any "add choice" activation.
///
/// The add control for choice index `i` lives at `poll_add_choice[i - DEFAULT_POLL_SLOTS]`.
pub const DEFAULT_POLL_SLOTS: usize = 2;

const TWITTER_DEFAULT: &str = include_str!("../assets/twitter.yaml");

/// Required single-element locators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocatorName {
    ComposeTrigger,
    TextInput,
    SubmitControl,
    PollTrigger,
    FileInput,
}

impl LocatorName {
    pub const ALL: [LocatorName; 5] = [
        LocatorName::ComposeTrigger,
        LocatorName::TextInput,
        LocatorName::SubmitControl,
        LocatorName::PollTrigger,
        LocatorName::FileInput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorName::ComposeTrigger => "compose_trigger",
            LocatorName::TextInput => "text_input",
            LocatorName::SubmitControl => "submit_control",
            LocatorName::PollTrigger => "poll_trigger",
            LocatorName::FileInput => "file_input",
        }
    }
}

impl fmt::Display for LocatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three poll-length selectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationField {
    Days,
    Hours,
    Minutes,
}

impl DurationField {
    pub const ALL: [DurationField; 3] = [
        DurationField::Days,
        DurationField::Hours,
        DurationField::Minutes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationField::Days => "days",
            DurationField::Hours => "hours",
            DurationField::Minutes => "minutes",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollDurationLocators {
    pub days: Locator,
    pub hours: Locator,
    pub minutes: Locator,
}

/// Static mapping from semantic UI-element names to locators.
///
/// Built once at startup and shared read-only (`Arc<LocatorRegistry>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatorRegistry {
    compose_trigger: Locator,
    text_input: Locator,
    submit_control: Locator,
    poll_trigger: Locator,
    #[serde(default = "default_file_input")]
    file_input: Locator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    submit_confirmation: Option<Locator>,
    poll_option_inputs: Vec<Locator>,
    #[serde(default)]
    poll_add_choice: Vec<Locator>,
    poll_duration: PollDurationLocators,
}

fn default_file_input() -> Locator {
    Locator::css("input[type=\"file\"]")
}

impl LocatorRegistry {
    /// Registry for the twitter.com home composer, bundled with the crate.
    pub fn twitter_default() -> Result<Self, LocatorError> {
        Self::from_yaml_str(TWITTER_DEFAULT)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, LocatorError> {
        let registry: Self = serde_yaml::from_str(raw)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, LocatorError> {
        let registry: Self = serde_json::from_str(raw)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Load a registry document; `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, LocatorError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LocatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let registry = if is_json {
            Self::from_json_str(&raw)?
        } else {
            Self::from_yaml_str(&raw)?
        };
        debug!(
            path = %path.display(),
            max_poll_options = registry.max_poll_options(),
            "Loaded locator registry"
        );
        Ok(registry)
    }

    pub fn validate(&self) -> Result<(), LocatorError> {
        let options = self.poll_option_inputs.len();
        if options < DEFAULT_POLL_SLOTS {
            return Err(LocatorError::Registry(format!(
                "poll_option_inputs needs at least {} entries, found {}",
                DEFAULT_POLL_SLOTS, options
            )));
        }

        let needed = options - DEFAULT_POLL_SLOTS;
        if self.poll_add_choice.len() < needed {
            return Err(LocatorError::Registry(format!(
                "poll_add_choice needs {} entries to reach {} poll options, found {}",
                needed,
                options,
                self.poll_add_choice.len()
            )));
        }

        Ok(())
    }

    pub fn named(&self, name: LocatorName) -> &Locator {
        match name {
            LocatorName::ComposeTrigger => &self.compose_trigger,
            LocatorName::TextInput => &self.text_input,
            LocatorName::SubmitControl => &self.submit_control,
            LocatorName::PollTrigger => &self.poll_trigger,
            LocatorName::FileInput => &self.file_input,
        }
    }

    /// Optional element whose appearance confirms a submitted post
    pub fn submit_confirmation(&self) -> Option<&Locator> {
        self.submit_confirmation.as_ref()
    }

    /// Largest poll the registry can express
    pub fn max_poll_options(&self) -> usize {
        self.poll_option_inputs.len()
    }

    pub fn poll_option(&self, index: usize) -> Option<&Locator> {
        self.poll_option_inputs.get(index)
    }

    /// Add-choice control that must be activated before choice `index` can be filled.
    ///
    /// Returns `None` for the default slots.
    pub fn poll_add_choice_for(&self, index: usize) -> Option<&Locator> {
        index
            .checked_sub(DEFAULT_POLL_SLOTS)
            .and_then(|slot| self.poll_add_choice.get(slot))
    }

    pub fn poll_duration(&self, field: DurationField) -> &Locator {
        match field {
            DurationField::Days => &self.poll_duration.days,
            DurationField::Hours => &self.poll_duration.hours,
            DurationField::Minutes => &self.poll_duration.minutes,
        }
    }

    /// Flattened `(label, locator)` listing, in document order
    pub fn entries(&self) -> Vec<(String, &Locator)> {
        let mut entries: Vec<(String, &Locator)> = LocatorName::ALL
            .iter()
            .map(|name| (name.as_str().to_string(), self.named(*name)))
            .collect();
        if let Some(confirmation) = &self.submit_confirmation {
            entries.push(("submit_confirmation".to_string(), confirmation));
        }
        for (idx, locator) in self.poll_option_inputs.iter().enumerate() {
            entries.push((format!("poll_option_inputs[{idx}]"), locator));
        }
        for (idx, locator) in self.poll_add_choice.iter().enumerate() {
            entries.push((format!("poll_add_choice[{idx}]"), locator));
        }
        for field in DurationField::ALL {
            entries.push((
                format!("poll_duration.{}", field.as_str()),
                self.poll_duration(field),
            ));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
compose_trigger: "//div[@id='compose']"
text_input: "//div[@id='text']"
submit_control: "css=#submit"
poll_trigger: "//button[@id='poll']"
poll_option_inputs:
  - "//input[@name='Choice1']"
  - "//input[@name='Choice2']"
  - "//input[@name='Choice3']"
poll_add_choice:
  - "//button[@id='add']"
poll_duration:
  days: "//select[@id='days']"
  hours: "//select[@id='hours']"
  minutes: "//select[@id='minutes']"
"#;

    #[test]
    fn bundled_twitter_registry_is_valid() {
        let registry = LocatorRegistry::twitter_default().unwrap();
        assert_eq!(registry.max_poll_options(), 4);
        assert!(registry.submit_confirmation().is_some());
        assert!(registry.named(LocatorName::ComposeTrigger).is_xpath());
    }

    #[test]
    fn defaults_file_input_when_absent() {
        let registry = LocatorRegistry::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(
            registry.named(LocatorName::FileInput),
            &Locator::css("input[type=\"file\"]")
        );
        assert!(registry.submit_confirmation().is_none());
    }

    #[test]
    fn add_choice_is_offset_by_default_slots() {
        let registry = LocatorRegistry::from_yaml_str(MINIMAL).unwrap();
        assert!(registry.poll_add_choice_for(0).is_none());
        assert!(registry.poll_add_choice_for(1).is_none());
        assert_eq!(
            registry.poll_add_choice_for(2),
            Some(&Locator::xpath("//button[@id='add']"))
        );
        assert!(registry.poll_add_choice_for(3).is_none());
    }

    #[test]
    fn rejects_missing_add_controls() {
        let raw = MINIMAL.replace("poll_add_choice:\n  - \"//button[@id='add']\"\n", "");
        let err = LocatorRegistry::from_yaml_str(&raw).unwrap_err();
        assert!(matches!(err, LocatorError::Registry(_)));
    }

    #[test]
    fn rejects_single_option_family() {
        let raw = r#"{
            "compose_trigger": "//a", "text_input": "//b", "submit_control": "//c",
            "poll_trigger": "//d", "poll_option_inputs": ["//e"],
            "poll_duration": {"days": "//f", "hours": "//g", "minutes": "//h"}
        }"#;
        assert!(matches!(
            LocatorRegistry::from_json_str(raw),
            Err(LocatorError::Registry(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        let raw = format!("{MINIMAL}\nsurprise: \"//x\"\n");
        assert!(matches!(
            LocatorRegistry::from_yaml_str(&raw),
            Err(LocatorError::Parse(_))
        ));
    }

    #[test]
    fn loads_json_by_extension() {
        let registry = LocatorRegistry::from_yaml_str(MINIMAL).unwrap();
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(serde_json::to_string(&registry).unwrap().as_bytes())
            .unwrap();

        let loaded = LocatorRegistry::load(file.path()).unwrap();
        assert_eq!(loaded, registry);
    }

    #[test]
    fn entries_cover_every_locator() {
        let registry = LocatorRegistry::twitter_default().unwrap();
        let labels: Vec<String> = registry.entries().into_iter().map(|(l, _)| l).collect();
        assert!(labels.contains(&"poll_option_inputs[3]".to_string()));
        assert!(labels.contains(&"poll_add_choice[1]".to_string()));
        assert!(labels.contains(&"poll_duration.minutes".to_string()));
        assert_eq!(labels.len(), 5 + 1 + 4 + 2 + 3);
    }
}
