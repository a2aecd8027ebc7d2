//! Whole-store JSON snapshots.
//!
//! A snapshot is the serialized [`MemoryStore`] itself — tables plus id
//! counters — so a restored store continues assigning ids where the saved
//! one stopped.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::MemoryStore;

/// Serialize the full store to pretty-printed JSON at `path`.
pub fn save_snapshot(store: &MemoryStore, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(store).context("serialize store snapshot")?;
    fs::write(path, json).with_context(|| format!("write snapshot: {}", path.display()))?;
    Ok(())
}

/// Load a store previously written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<MemoryStore> {
    let s =
        fs::read_to_string(path).with_context(|| format!("read snapshot: {}", path.display()))?;
    let store: MemoryStore = serde_json::from_str(&s).context("parse snapshot json")?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProfileStore, StockStore};
    use borsa_schemas::{NewProfile, NewStock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn snapshot_restores_tables_and_id_counters() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut store = MemoryStore::new();
        let profile_id = store
            .insert_profile(NewProfile {
                name: "Backup".into(),
                currency: "USD".into(),
                created_at: created,
            })
            .unwrap();
        store
            .insert_stock(NewStock {
                profile_id,
                symbol: "ALG".into(),
                name: "Algeria Telecom".into(),
                zakat_rate_pct: 2.5,
                notes: Some("core position".into()),
                created_at: created,
            })
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("borsa.json");
        save_snapshot(&store, &path).unwrap();

        let mut restored = load_snapshot(&path).unwrap();
        assert_eq!(restored, store);

        // Id assignment resumes after the saved counters.
        let next = restored
            .insert_profile(NewProfile {
                name: "After".into(),
                currency: "USD".into(),
                created_at: created,
            })
            .unwrap();
        assert_eq!(next, profile_id + 1);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("absent.json"));
        assert!(err.is_err());
    }
}
