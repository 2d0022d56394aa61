//! Settings, theme and role state shared by the HR screens.
//!
//! These are plain values owned by a [`Preferences`] context; callers that
//! share it across tasks wrap it in a lock. Last writer wins.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::HrError;

pub const THEME_KEY: &str = "theme";
pub const DEFAULT_ROLE: &str = "User";

/// String-keyed bag of JSON settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct SettingStore {
    values: BTreeMap<String, Value>,
}

impl SettingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `default` unless the key already holds a value.
    pub fn register(&mut self, key: impl Into<String>, default: Value) -> bool {
        let key = key.into();
        if self.values.contains_key(&key) {
            return false;
        }
        self.values.insert(key, default);
        true
    }

    pub fn update(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        debug!(%key, "setting updated");
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn all(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => system_prefers_dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = HrError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(HrError::invalid_value("theme", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleProvider {
    role: String,
}

impl Default for RoleProvider {
    fn default() -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

impl RoleProvider {
    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn switch_role(&mut self, role: impl Into<String>) {
        self.role = role.into();
    }
}

/// Composition of the settings, theme and role providers.
#[derive(Clone, Debug)]
pub struct Preferences {
    settings: SettingStore,
    default_theme: ThemeMode,
    role: RoleProvider,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl Preferences {
    pub fn new(default_theme: ThemeMode) -> Self {
        let mut settings = SettingStore::new();
        settings.register(THEME_KEY, Value::from(default_theme.as_str()));
        Self {
            settings,
            default_theme,
            role: RoleProvider::default(),
        }
    }

    /// Current theme. A missing or unreadable setting falls back to the
    /// default theme.
    pub fn theme(&self) -> ThemeMode {
        self.settings
            .get(THEME_KEY)
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(self.default_theme)
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.settings.update(THEME_KEY, Value::from(theme.as_str()));
    }

    pub fn is_dark_mode(&self, system_prefers_dark: bool) -> bool {
        self.theme().is_dark(system_prefers_dark)
    }

    pub fn settings(&self) -> &SettingStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingStore {
        &mut self.settings
    }

    pub fn role(&self) -> &str {
        self.role.role()
    }

    pub fn switch_role(&mut self, role: impl Into<String>) {
        self.role.switch_role(role);
    }
}
