use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::HrError, model::EntityKind};

/// How `employee_count` on departments and positions is produced.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Return the literal stored in the fixture.
    #[default]
    Stored,
    /// Count employees whose department/position label matches by name.
    Derived,
}

impl FromStr for CountMode {
    type Err = HrError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stored" => Ok(CountMode::Stored),
            "derived" => Ok(CountMode::Derived),
            other => Err(HrError::invalid_value("count mode", other)),
        }
    }
}

/// Artificial delays applied by a fixture service before it resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latency {
    pub list: Duration,
    pub get: Duration,
    pub write: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Employee => Self {
                list: Duration::from_millis(300),
                get: Duration::from_millis(200),
                write: Duration::from_millis(500),
            },
            EntityKind::Department | EntityKind::Position => Self {
                list: Duration::from_millis(500),
                get: Duration::from_millis(300),
                write: Duration::from_millis(500),
            },
        }
    }

    pub(crate) async fn wait(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HrConfig {
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub simulate_latency: bool,
    pub count_mode: CountMode,
}

impl Default for HrConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            search_debounce_ms: 300,
            simulate_latency: true,
            count_mode: CountMode::Stored,
        }
    }
}

impl HrConfig {
    pub fn latency(&self, kind: EntityKind) -> Latency {
        if self.simulate_latency {
            Latency::for_kind(kind)
        } else {
            Latency::none()
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
