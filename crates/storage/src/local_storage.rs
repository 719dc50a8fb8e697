use std::collections::VecDeque;

use fittrack_web_app::{Settings, SettingsRepository, log};
use gloo_storage::{Storage, errors::StorageError};
use serde::{Serialize, de::DeserializeOwned};

const KEY_SETTINGS: &str = "settings";
const KEY_LOG: &str = "log";

pub const MAX_LOG_ENTRIES: usize = 100;

pub struct LocalStorage;

fn read_or_default<T: DeserializeOwned>(key: &str, default: T) -> Result<T, StorageError> {
    match gloo_storage::LocalStorage::get(key) {
        Ok(value) => Ok(value),
        Err(StorageError::KeyNotFound(_)) => Ok(default),
        Err(err) => Err(err),
    }
}

fn write<T: Serialize>(key: &str, value: T) -> Result<(), StorageError> {
    gloo_storage::LocalStorage::set(key, value)
}

impl SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        read_or_default(KEY_SETTINGS, Settings::default()).map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        write(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        read_or_default(KEY_LOG, VecDeque::new())
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        entries.push_front(entry);
        entries.truncate(MAX_LOG_ENTRIES);
        write(KEY_LOG, entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
