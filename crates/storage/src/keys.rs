//! Settings keys and their value shapes

use crate::StorageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Fixed keys of the settings document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    Preferences,
    Profile,
    Layout,
    Dimensions,
    /// Favourite motivation card ids
    Favorites,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 5] = [
        SettingsKey::Preferences,
        SettingsKey::Profile,
        SettingsKey::Layout,
        SettingsKey::Dimensions,
        SettingsKey::Favorites,
    ];

    /// Storage key name
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsKey::Preferences => "mindmate_settings",
            SettingsKey::Profile => "mindmate_profile",
            SettingsKey::Layout => "mindmate_layout",
            SettingsKey::Dimensions => "mindmate_dimensions",
            SettingsKey::Favorites => "motivation_favorites",
        }
    }

    /// Default value for this key
    pub fn default_value(&self) -> Value {
        let value = match self {
            SettingsKey::Preferences => serde_json::to_value(Preferences::default()),
            SettingsKey::Profile => serde_json::to_value(Profile::default()),
            SettingsKey::Layout => serde_json::to_value(Layout::default()),
            SettingsKey::Dimensions => serde_json::to_value(Dimensions::default()),
            SettingsKey::Favorites => serde_json::to_value(Vec::<u32>::new()),
        };
        value.unwrap_or(Value::Null)
    }

    /// Check that a value has this key's shape
    pub fn validate(&self, value: &Value) -> Result<(), StorageError> {
        let result = match self {
            SettingsKey::Preferences => Preferences::deserialize(value).map(drop),
            SettingsKey::Profile => Profile::deserialize(value).map(drop),
            SettingsKey::Layout => Layout::deserialize(value).map(drop),
            SettingsKey::Dimensions => Dimensions::deserialize(value).map(drop),
            SettingsKey::Favorites => Vec::<u32>::deserialize(value).map(drop),
        };
        result.map_err(|e| StorageError::InvalidValue {
            key: self.as_str(),
            reason: e.to_string(),
        })
    }
}

impl FromStr for SettingsKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| StorageError::UnknownKey(s.to_string()))
    }
}

/// App preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub notifications: bool,
    pub dark_mode: bool,
    pub sound_enabled: bool,
    pub auto_reminders: bool,
    /// Daily reminder time, "HH:MM"
    pub reminder_time: String,
    pub language: String,
    pub theme: String,
    pub font_size: String,
    pub animations: bool,
    pub stress_tracking: bool,
    pub mood_logging: bool,
    pub data_sharing: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            dark_mode: true,
            sound_enabled: true,
            auto_reminders: true,
            reminder_time: "09:00".to_string(),
            language: "English".to_string(),
            theme: "Dark Purple".to_string(),
            font_size: "medium".to_string(),
            animations: true,
            stress_tracking: true,
            mood_logging: true,
            data_sharing: false,
        }
    }
}

/// User profile card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub bio: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Your Name".to_string(),
            email: "your@email.com".to_string(),
            bio: "Mindfulness enthusiast".to_string(),
        }
    }
}

/// Which dashboard panels are expanded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Layout {
    pub chat_expanded: bool,
    pub video_expanded: bool,
    pub motivation_expanded: bool,
    pub sifra_expanded: bool,
    pub camera_expanded: bool,
    pub therapist_expanded: bool,
}

/// Panel size sliders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dimensions {
    /// Percent of the column
    pub chat_width: u32,
    /// Pixels
    pub chat_height: u32,
    pub sifra_width: u32,
    pub sifra_height: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            chat_width: 100,
            chat_height: 400,
            sifra_width: 100,
            sifra_height: 400,
        }
    }
}
