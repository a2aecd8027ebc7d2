//! Profile lifecycle: creation, activation (exactly one active), and the
//! first-run bootstrap that guarantees an active profile exists.

use borsa_schemas::NewProfile;
use borsa_store::ProfileStore;
use chrono::{DateTime, Utc};

use crate::CatalogError;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Create a profile. New profiles start inactive; activate explicitly
/// with [`set_active_profile`].
pub fn create_profile<S: ProfileStore>(
    store: &mut S,
    name: &str,
    currency: &str,
    created_at: DateTime<Utc>,
) -> Result<i64, CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::EmptyName);
    }
    let currency = if currency.trim().is_empty() {
        DEFAULT_CURRENCY
    } else {
        currency
    };
    let id = store.insert_profile(NewProfile {
        name: name.to_string(),
        currency: currency.to_string(),
        created_at,
    })?;
    Ok(id)
}

/// Make `profile_id` the single active profile.
pub fn set_active_profile<S: ProfileStore>(
    store: &mut S,
    profile_id: i64,
) -> Result<(), CatalogError> {
    if store.profile(profile_id)?.is_none() {
        return Err(CatalogError::NotFound {
            entity: "profile",
            id: profile_id,
        });
    }
    store.deactivate_all_profiles()?;
    store.set_active_profile(profile_id)?;
    Ok(())
}

/// Return the active profile id, bootstrapping a default profile on an
/// empty store and activating the newest profile if none is active.
pub fn ensure_active_profile<S: ProfileStore>(
    store: &mut S,
    now: DateTime<Utc>,
) -> Result<i64, CatalogError> {
    if let Some(active) = store.active_profile()? {
        return Ok(active.id);
    }
    let id = match store.profiles()?.first() {
        Some(existing) => existing.id,
        None => create_profile(store, "Default Portfolio", DEFAULT_CURRENCY, now)?,
    };
    set_active_profile(store, id)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use borsa_store::MemoryStore;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut store = MemoryStore::new();
        assert_eq!(
            create_profile(&mut store, "  ", "USD", day(1)),
            Err(CatalogError::EmptyName)
        );
        assert_eq!(store.profile_count().unwrap(), 0);
    }

    #[test]
    fn blank_currency_falls_back_to_default() {
        let mut store = MemoryStore::new();
        let id = create_profile(&mut store, "Main", "", day(1)).unwrap();
        assert_eq!(store.profile(id).unwrap().unwrap().currency, "USD");
    }

    #[test]
    fn activation_is_exclusive() {
        let mut store = MemoryStore::new();
        let a = create_profile(&mut store, "A", "USD", day(1)).unwrap();
        let b = create_profile(&mut store, "B", "EUR", day(2)).unwrap();

        set_active_profile(&mut store, a).unwrap();
        set_active_profile(&mut store, b).unwrap();

        assert_eq!(store.active_profile().unwrap().unwrap().id, b);
        assert!(!store.profile(a).unwrap().unwrap().is_active);
    }

    #[test]
    fn activating_missing_profile_fails() {
        let mut store = MemoryStore::new();
        assert_eq!(
            set_active_profile(&mut store, 9),
            Err(CatalogError::NotFound {
                entity: "profile",
                id: 9
            })
        );
    }

    #[test]
    fn ensure_bootstraps_default_profile_on_empty_store() {
        let mut store = MemoryStore::new();
        let id = ensure_active_profile(&mut store, day(1)).unwrap();
        let active = store.active_profile().unwrap().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.name, "Default Portfolio");
    }

    #[test]
    fn ensure_activates_existing_profile_instead_of_creating() {
        let mut store = MemoryStore::new();
        let id = create_profile(&mut store, "Main", "USD", day(1)).unwrap();
        let ensured = ensure_active_profile(&mut store, day(5)).unwrap();
        assert_eq!(ensured, id);
        assert_eq!(store.profile_count().unwrap(), 1);
    }

    #[test]
    fn ensure_is_a_noop_when_a_profile_is_active() {
        let mut store = MemoryStore::new();
        let id = create_profile(&mut store, "Main", "USD", day(1)).unwrap();
        set_active_profile(&mut store, id).unwrap();
        assert_eq!(ensure_active_profile(&mut store, day(9)).unwrap(), id);
    }
}
