use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;

pub(crate) const THEME_KEY: &str = "luxestay-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    #[display("light")]
    Light,
    #[display("dark")]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            s => Err(format!("Invalid theme: {s}")),
        }
    }
}

/// A persisted key/value preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Setting {
    pub id: String,
    pub value: serde_json::Value,
}

impl_document!(Setting, "settings", "setting");
