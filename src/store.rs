//! JSON file persistence for the administratively configured deduction caps

use crate::core::{DeductionError, DeductionKind, DeductionProvider};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A persisted cap and when it was last written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDeduction {
    pub value: Decimal,
    pub updated_at: DateTime<Utc>,
}

type Settings = BTreeMap<DeductionKind, StoredDeduction>;

/// Deduction caps kept in a JSON file.
///
/// Every read goes back to the file so a calculation always sees the most
/// recent administrative update. Writes replace the file atomically.
#[derive(Debug, Clone)]
pub struct JsonDeductionStore {
    path: PathBuf,
}

impl JsonDeductionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonDeductionStore { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored caps; a missing file holds none.
    pub fn entries(&self) -> Result<BTreeMap<DeductionKind, StoredDeduction>, DeductionError> {
        self.load()
    }

    /// Seed default values for caps that have never been set. Returns the kinds
    /// that were written.
    pub fn init(&mut self) -> Result<Vec<DeductionKind>, DeductionError> {
        let mut settings = self.load()?;
        let now = Utc::now();
        let mut seeded = Vec::new();
        for kind in DeductionKind::ALL {
            if !settings.contains_key(&kind) {
                settings.insert(
                    kind,
                    StoredDeduction {
                        value: kind.default_value(),
                        updated_at: now,
                    },
                );
                seeded.push(kind);
            }
        }
        if !seeded.is_empty() {
            self.save(&settings)?;
            log::info!("Seeded {} default deductions in {}", seeded.len(), self.path.display());
        }
        Ok(seeded)
    }

    fn load(&self) -> Result<Settings, DeductionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Deduction store {} does not exist yet", self.path.display());
                return Ok(Settings::new());
            }
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        serde_json::from_str(&contents).map_err(|e| storage_error(&self.path, e))
    }

    fn save(&self, settings: &Settings) -> Result<(), DeductionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
        }
        let json = serde_json::to_string_pretty(settings).map_err(|e| storage_error(&self.path, e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(|e| storage_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| storage_error(&self.path, e))
    }
}

impl DeductionProvider for JsonDeductionStore {
    fn cap(&self, kind: DeductionKind) -> Result<Decimal, DeductionError> {
        self.load()?
            .get(&kind)
            .map(|stored| stored.value)
            .ok_or(DeductionError::NotFound(kind))
    }

    fn set_cap(&mut self, kind: DeductionKind, value: Decimal) -> Result<(), DeductionError> {
        let mut settings = self.load()?;
        settings.insert(
            kind,
            StoredDeduction {
                value,
                updated_at: Utc::now(),
            },
        );
        self.save(&settings)
    }
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> DeductionError {
    DeductionError::Storage(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::set_deduction;
    use rust_decimal_macros::dec;

    fn store_in(dir: &tempfile::TempDir) -> JsonDeductionStore {
        JsonDeductionStore::new(dir.path().join("deductions.json"))
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(
            store.cap(DeductionKind::Personal),
            Err(DeductionError::NotFound(DeductionKind::Personal))
        );
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn init_seeds_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let seeded = store.init().unwrap();
        assert_eq!(seeded, vec![DeductionKind::Personal, DeductionKind::KReceipt]);
        assert_eq!(store.cap(DeductionKind::Personal), Ok(dec!(60000)));
        assert_eq!(store.cap(DeductionKind::KReceipt), Ok(dec!(50000)));
    }

    #[test]
    fn init_keeps_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set_cap(DeductionKind::Personal, dec!(75000)).unwrap();

        let seeded = store.init().unwrap();
        assert_eq!(seeded, vec![DeductionKind::KReceipt]);
        assert_eq!(store.cap(DeductionKind::Personal), Ok(dec!(75000)));
        assert!(store.init().unwrap().is_empty());
    }

    #[test]
    fn updates_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.init().unwrap();

        set_deduction(&mut store, DeductionKind::KReceipt, dec!(70000)).unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.cap(DeductionKind::KReceipt), Ok(dec!(70000)));
        assert_eq!(reopened.cap(DeductionKind::Personal), Ok(dec!(60000)));
    }

    #[test]
    fn reads_observe_writes_from_other_handles() {
        let dir = tempfile::tempdir().unwrap();
        let reader = store_in(&dir);
        let mut writer = store_in(&dir);
        writer.init().unwrap();

        assert_eq!(reader.cap(DeductionKind::Personal), Ok(dec!(60000)));
        writer.set_cap(DeductionKind::Personal, dec!(90000)).unwrap();
        assert_eq!(reader.cap(DeductionKind::Personal), Ok(dec!(90000)));
    }

    #[test]
    fn rejected_update_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.init().unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(set_deduction(&mut store, DeductionKind::Personal, dec!(5000)).is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(
            store.cap(DeductionKind::Personal),
            Err(DeductionError::Storage(_))
        ));
    }

    #[test]
    fn file_uses_kind_names_as_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.init().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(json["personal"]["value"], "60000");
        assert_eq!(json["k-receipt"]["value"], "50000");
        assert!(json["personal"]["updated_at"].is_string());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDeductionStore::new(dir.path().join("admin").join("caps.json"));
        store.set_cap(DeductionKind::KReceipt, dec!(1000)).unwrap();
        assert_eq!(store.cap(DeductionKind::KReceipt), Ok(dec!(1000)));
    }
}
