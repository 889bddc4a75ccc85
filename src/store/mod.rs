//! File-backed stores for the projection history and the currency
//! preference. Mutations only touch memory; the owning layer decides when
//! to call `save()`.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ProjectionResult;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no history record with id {0}")]
    NotFound(u64),
    #[error("unknown currency code {0:?}")]
    UnknownCurrency(String),
}

/// A stored projection, identified for later annotation or deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRecord {
    pub id: u64,
    pub result: ProjectionResult,
}

/// Projection history, most recent first, persisted as a JSON array.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<ProjectionRecord>,
}

impl HistoryStore {
    /// Loads the history file at `path`; a missing file is an empty history.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self { path, records })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let encoded =
            serde_json::to_string_pretty(&self.records).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, encoded).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// All records, most recent first.
    pub fn records(&self) -> &[ProjectionRecord] {
        &self.records
    }

    /// Prepends a result and assigns it the next free id.
    pub fn add(&mut self, result: ProjectionResult) -> &ProjectionRecord {
        let id = self.records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        self.records.insert(0, ProjectionRecord { id, result });
        &self.records[0]
    }

    pub fn update_note(&mut self, id: u64, note: &str) -> Result<&ProjectionRecord, StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.result.note = note.to_string();
        Ok(record)
    }

    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.records.remove(idx);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub name: String,
}

fn currency(code: &str, symbol: &str, name: &str) -> Currency {
    Currency {
        code: code.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
    }
}

/// The closed set of currencies a caller may pick from. First entry is the
/// default.
pub fn default_currencies() -> Vec<Currency> {
    vec![
        currency("CNY", "¥", "Chinese Yuan"),
        currency("USD", "$", "US Dollar"),
        currency("EUR", "€", "Euro"),
        currency("GBP", "£", "British Pound"),
        currency("JPY", "¥", "Japanese Yen"),
        currency("HKD", "HK$", "Hong Kong Dollar"),
        currency("KRW", "₩", "South Korean Won"),
        currency("AUD", "A$", "Australian Dollar"),
    ]
}

/// Persisted currency preference. Holds only the selection; the available
/// set is built in.
#[derive(Debug)]
pub struct CurrencyStore {
    path: PathBuf,
    selected: Currency,
    available: Vec<Currency>,
}

impl CurrencyStore {
    /// Loads the preference at `path`. A missing or unreadable-as-JSON file
    /// falls back to the default currency rather than failing.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let available = default_currencies();
        let selected = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|_| available[0].clone()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => available[0].clone(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self {
            path,
            selected,
            available,
        })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let encoded =
            serde_json::to_string_pretty(&self.selected).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, encoded).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn selected(&self) -> &Currency {
        &self.selected
    }

    pub fn available(&self) -> &[Currency] {
        &self.available
    }

    pub fn select(&mut self, code: &str) -> Result<&Currency, StoreError> {
        let currency = self
            .available
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .ok_or_else(|| StoreError::UnknownCurrency(code.to_string()))?;
        self.selected = currency;
        Ok(&self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompoundingFrequency, project};

    fn sample_result() -> ProjectionResult {
        project(1000.0, 5.0, 3, CompoundingFrequency::Annual)
    }

    #[test]
    fn missing_history_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HistoryStore::load(dir.path().join("history.json")).expect("load");
        assert!(store.records().is_empty());
    }

    #[test]
    fn add_assigns_increasing_ids_and_prepends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = HistoryStore::load(dir.path().join("history.json")).expect("load");

        let first = store.add(sample_result()).id;
        let second = store.add(sample_result()).id;
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        // Most recent first.
        assert_eq!(store.records()[0].id, 2);
        assert_eq!(store.records()[1].id, 1);
    }

    #[test]
    fn history_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::load(&path).expect("load");
        store.add(sample_result());
        store.update_note(1, "nest egg").expect("note");
        store.add(sample_result());
        store.save().expect("save");

        let reloaded = HistoryStore::load(&path).expect("reload");
        assert_eq!(reloaded.records().len(), 2);
        assert_eq!(reloaded.records()[0].id, 2);
        assert_eq!(reloaded.records()[1].result.note, "nest egg");
        assert_eq!(
            reloaded.records()[1].result.final_amount,
            store.records()[1].result.final_amount
        );
    }

    #[test]
    fn ids_stay_unique_after_deleting_the_newest_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = HistoryStore::load(dir.path().join("history.json")).expect("load");

        store.add(sample_result());
        store.add(sample_result());
        store.delete(2).expect("delete");
        // Max surviving id is 1, so the next record picks up id 2 again,
        // which is fine because the old id 2 is gone.
        let id = store.add(sample_result()).id;
        assert_eq!(id, 2);
        assert_eq!(store.records().len(), 2);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = HistoryStore::load(dir.path().join("history.json")).expect("load");

        assert!(matches!(
            store.update_note(7, "x"),
            Err(StoreError::NotFound(7))
        ));
        assert!(matches!(store.delete(7), Err(StoreError::NotFound(7))));
    }

    #[test]
    fn clear_then_save_empties_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::load(&path).expect("load");
        store.add(sample_result());
        store.save().expect("save");
        store.clear();
        store.save().expect("save after clear");

        let reloaded = HistoryStore::load(&path).expect("reload");
        assert!(reloaded.records().is_empty());
    }

    #[test]
    fn currency_defaults_to_the_first_built_in() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CurrencyStore::load(dir.path().join("currency.json")).expect("load");
        assert_eq!(store.selected().code, "CNY");
        assert_eq!(store.available().len(), 8);
    }

    #[test]
    fn selected_currency_survives_a_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("currency.json");

        let mut store = CurrencyStore::load(&path).expect("load");
        store.select("EUR").expect("select");
        store.save().expect("save");

        let reloaded = CurrencyStore::load(&path).expect("reload");
        assert_eq!(reloaded.selected().code, "EUR");
        assert_eq!(reloaded.selected().symbol, "€");
    }

    #[test]
    fn unknown_currency_code_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = CurrencyStore::load(dir.path().join("currency.json")).expect("load");
        let err = store.select("XTS").expect_err("must reject");
        assert!(matches!(err, StoreError::UnknownCurrency(_)));
        assert_eq!(store.selected().code, "CNY");
    }

    #[test]
    fn garbled_currency_file_falls_back_to_the_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("currency.json");
        std::fs::write(&path, "not json").expect("write");

        let store = CurrencyStore::load(&path).expect("load");
        assert_eq!(store.selected().code, "CNY");
    }

    #[test]
    fn garbled_history_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").expect("write");

        let err = HistoryStore::load(&path).expect_err("must fail");
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
