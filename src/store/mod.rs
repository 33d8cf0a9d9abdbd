//! Journal stores: the same rules over two back ends.
//!
//! `MemoryStore` keeps the tables in process; `PgStore` leaves constraint
//! enforcement to Postgres (see `migrations/`).

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::hooks::ProvisionOutcome;
use crate::policy::Requester;
use crate::types::profile::{NewProfile, Profile, ProfileUpdate};
use crate::types::subject::AuthSubject;
use crate::types::trade::{Trade, TradeFields, TradeFilter, TradeId};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn JournalStore>;

/// Every operation is a single atomic step evaluated against `requester`.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Advisory: true if no profile holds `candidate` (case-insensitive).
    /// Sees every profile regardless of requester.
    async fn check_username(&self, candidate: &str) -> Result<bool, StoreError>;

    /// Record an auth subject as the provider created it. Recording the same
    /// subject again is a no-op. Service only.
    async fn register_subject(&self, requester: &Requester, subject: &AuthSubject) -> Result<(), StoreError>;

    /// Make sure a registered subject has a profile, built from the recorded
    /// subject: username from signup metadata or the email. A subject that
    /// already has one is left alone. Service only.
    async fn provision_profile(&self, requester: &Requester, subject_id: Uuid) -> Result<ProvisionOutcome, StoreError>;

    /// Remove a subject together with its profile and trades. Service only.
    async fn subject_deleted(&self, requester: &Requester, subject_id: Uuid) -> Result<(), StoreError>;

    async fn insert_profile(&self, requester: &Requester, profile: NewProfile) -> Result<Profile, StoreError>;

    async fn get_profile(&self, requester: &Requester, id: Uuid) -> Result<Profile, StoreError>;

    async fn update_profile(
        &self,
        requester: &Requester,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError>;

    async fn insert_trade(&self, requester: &Requester, fields: TradeFields) -> Result<Trade, StoreError>;

    async fn get_trade(&self, requester: &Requester, id: TradeId) -> Result<Trade, StoreError>;

    /// Requester's trades, newest `date_opened` first.
    async fn list_trades(&self, requester: &Requester, filter: &TradeFilter) -> Result<Vec<Trade>, StoreError>;

    /// Replace the editable fields of a trade; `updated_at` is refreshed.
    async fn update_trade(
        &self,
        requester: &Requester,
        id: TradeId,
        fields: TradeFields,
    ) -> Result<Trade, StoreError>;

    async fn delete_trade(&self, requester: &Requester, id: TradeId) -> Result<(), StoreError>;
}
