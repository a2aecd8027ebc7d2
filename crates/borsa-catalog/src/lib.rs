//! borsa-catalog
//!
//! Profile and stock bookkeeping on top of the store traits. Pure
//! scoping: nothing here reads or writes lot inventory — profiles and
//! stocks only partition the ledger.

mod profiles;
mod stocks;

pub use profiles::{create_profile, ensure_active_profile, set_active_profile, DEFAULT_CURRENCY};
pub use stocks::{create_stock, rename_stock, DEFAULT_ZAKAT_RATE_PCT};

use borsa_store::StoreError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced by catalog operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// Profile or stock names must not be empty.
    EmptyName,
    /// A stock with this symbol already exists in the profile.
    DuplicateSymbol { symbol: String },
    /// A referenced row was absent.
    NotFound { entity: &'static str, id: i64 },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::DuplicateSymbol { symbol } => {
                write!(f, "stock with symbol '{symbol}' already exists")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => CatalogError::NotFound { entity, id },
        }
    }
}
