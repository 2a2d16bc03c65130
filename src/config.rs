use crate::error::{AnalyticsError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_SPRINT_UPDATE_ATTEMPTS: u32 = 3;
const MAX_SPRINT_UPDATE_ATTEMPTS_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayLabelStyle {
    #[default]
    #[schemars(description = "Full weekday names: 'Sunday', 'Monday', ...")]
    Full,

    #[schemars(description = "Three-letter weekday names: 'Sun', 'Mon', ...")]
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PieOrder {
    #[default]
    #[schemars(description = "Largest slice first; ties broken by category name")]
    ValueDesc,

    #[schemars(description = "Categories in the order they first occur in time")]
    FirstSeen,
}

/// Tunables for the analytics engine. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalyticsConfig {
    #[schemars(
        description = "How many times a sprint read-modify-write is attempted before reporting a concurrent update. Range 1-10."
    )]
    pub max_sprint_update_attempts: u32,

    #[schemars(description = "Label style for the day buckets of the week series")]
    pub day_labels: DayLabelStyle,

    #[schemars(description = "Slice ordering of pie datasets")]
    pub pie_order: PieOrder,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_sprint_update_attempts: DEFAULT_MAX_SPRINT_UPDATE_ATTEMPTS,
            day_labels: DayLabelStyle::Full,
            pie_order: PieOrder::ValueDesc,
        }
    }
}

impl AnalyticsConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SPRINT_UPDATE_ATTEMPTS_LIMIT).contains(&self.max_sprint_update_attempts) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "max_sprint_update_attempts must be between 1 and {} (got {})",
                MAX_SPRINT_UPDATE_ATTEMPTS_LIMIT, self.max_sprint_update_attempts
            )));
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalyticsConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}
