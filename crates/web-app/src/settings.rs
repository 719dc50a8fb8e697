use fittrack_domain::Lookback;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::log::LevelFilterDef;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Number of earlier workout dates searched for the last record of an exercise, 0 for all.
    pub last_record_lookback: usize,
    #[serde(with = "LevelFilterDef")]
    pub log_level: LevelFilter,
}

impl Settings {
    #[must_use]
    pub fn lookback(&self) -> Lookback {
        Lookback::from_dates(self.last_record_lookback)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_record_lookback: Lookback::DEFAULT_DATES,
            log_level: LevelFilter::Info,
        }
    }
}
