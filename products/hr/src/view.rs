use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::HrError;

/// Which renderer a list controller's items are drawn with.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Card,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Card,
            ViewMode::Card => ViewMode::List,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Card => "card",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = HrError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" | "table" => Ok(ViewMode::List),
            "card" | "cards" | "grid" => Ok(ViewMode::Card),
            other => Err(HrError::invalid_value("view mode", other)),
        }
    }
}
