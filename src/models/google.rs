//! Google Gemini model identifiers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Google Gemini models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum GoogleModel {
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    #[strum(serialize = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    /// Any other model id, passed through verbatim.
    #[strum(default)]
    Custom(String),
}

impl GoogleModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Custom(s) => s,
        }
    }
}

impl Default for GoogleModel {
    fn default() -> Self {
        Self::Gemini25Flash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_parse_to_variants() {
        assert_eq!(
            "gemini-2.5-flash".parse::<GoogleModel>().unwrap(),
            GoogleModel::Gemini25Flash
        );
    }

    #[test]
    fn unknown_ids_are_kept_verbatim() {
        let model: GoogleModel = "gemini-exp-1206".parse().unwrap();
        assert_eq!(model, GoogleModel::Custom("gemini-exp-1206".into()));
        assert_eq!(model.as_str(), "gemini-exp-1206");
    }
}
