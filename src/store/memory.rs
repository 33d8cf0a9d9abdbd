//! In-process tables behind one lock. Each operation takes the lock once, so
//! the uniqueness check and the write it guards happen together.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ConstraintKind, StoreError};
use crate::hooks::{self, ProvisionOutcome};
use crate::policy::{self, Requester};
use crate::store::JournalStore;
use crate::types::profile::{NewProfile, Profile, ProfileUpdate};
use crate::types::subject::AuthSubject;
use crate::types::trade::{Trade, TradeFields, TradeFilter, TradeId};
use crate::validation;

#[derive(Default)]
struct Tables {
    subjects: HashMap<Uuid, AuthSubject>,
    profiles: HashMap<Uuid, Profile>,
    /// lower(username) -> profile id
    usernames: HashMap<String, Uuid>,
    trades: BTreeMap<TradeId, Trade>,
    last_trade_id: TradeId,
}

impl Tables {
    fn insert_profile_row(&mut self, new: NewProfile) -> Result<Profile, StoreError> {
        validation::validate_new_profile(&new)?;
        if !self.subjects.contains_key(&new.id) {
            return Err(StoreError::violation("id", ConstraintKind::ForeignKey));
        }
        if self.profiles.contains_key(&new.id) {
            return Err(StoreError::violation("id", ConstraintKind::Unique));
        }
        let key = new.username.to_lowercase();
        if self.usernames.contains_key(&key) {
            return Err(StoreError::violation("username", ConstraintKind::Unique));
        }

        let now = hooks::now();
        let profile = Profile {
            id: new.id,
            email: new.email,
            username: new.username,
            country: new.country,
            date_of_birth: new.date_of_birth,
            avatar_url: new.avatar_url,
            created_at: now,
            updated_at: now,
        };
        self.usernames.insert(key, profile.id);
        self.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn owned_trade(&self, requester: &Requester, id: TradeId) -> Result<&Trade, StoreError> {
        self.trades
            .get(&id)
            .filter(|t| policy::owns_trade(requester, t.user_id))
            .ok_or(StoreError::NotPermitted)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn check_username(&self, candidate: &str) -> Result<bool, StoreError> {
        let guard = self.tables.read().await;
        Ok(!guard.usernames.contains_key(&candidate.to_lowercase()))
    }

    async fn register_subject(&self, requester: &Requester, subject: &AuthSubject) -> Result<(), StoreError> {
        policy::require_service(requester)?;
        let mut guard = self.tables.write().await;
        if !guard.subjects.contains_key(&subject.id) {
            guard.subjects.insert(subject.id, subject.clone());
            info!(subject_id = %subject.id, "subject registered");
        }
        Ok(())
    }

    async fn provision_profile(&self, requester: &Requester, subject_id: Uuid) -> Result<ProvisionOutcome, StoreError> {
        policy::require_service(requester)?;
        let mut guard = self.tables.write().await;

        if guard.profiles.contains_key(&subject_id) {
            debug!(%subject_id, "profile already present, provisioning skipped");
            return Ok(ProvisionOutcome::AlreadyExists);
        }
        let new = match guard.subjects.get(&subject_id) {
            Some(recorded) => hooks::provisioned_profile(recorded),
            None => return Err(StoreError::violation("id", ConstraintKind::ForeignKey)),
        };
        let profile = guard.insert_profile_row(new)?;
        info!(%subject_id, username = %profile.username, "profile provisioned");
        Ok(ProvisionOutcome::Created)
    }

    async fn subject_deleted(&self, requester: &Requester, subject_id: Uuid) -> Result<(), StoreError> {
        policy::require_service(requester)?;
        let mut guard = self.tables.write().await;

        if guard.subjects.remove(&subject_id).is_none() {
            return Ok(());
        }
        if let Some(profile) = guard.profiles.remove(&subject_id) {
            guard.usernames.remove(&profile.username.to_lowercase());
        }
        let before = guard.trades.len();
        guard.trades.retain(|_, t| t.user_id != subject_id);
        info!(
            %subject_id,
            trades_removed = before - guard.trades.len(),
            "subject removed"
        );
        Ok(())
    }

    async fn insert_profile(&self, requester: &Requester, profile: NewProfile) -> Result<Profile, StoreError> {
        if !policy::can_insert_profile(requester, profile.id) {
            return Err(StoreError::NotPermitted);
        }
        let mut guard = self.tables.write().await;
        guard.insert_profile_row(profile)
    }

    async fn get_profile(&self, requester: &Requester, id: Uuid) -> Result<Profile, StoreError> {
        if !policy::can_read_profile(requester, id) {
            return Err(StoreError::NotPermitted);
        }
        let guard = self.tables.read().await;
        guard.profiles.get(&id).cloned().ok_or(StoreError::NotPermitted)
    }

    async fn update_profile(
        &self,
        requester: &Requester,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        if !policy::can_update_profile(requester, id) {
            return Err(StoreError::NotPermitted);
        }
        let mut guard = self.tables.write().await;
        let current = guard.profiles.get(&id).cloned().ok_or(StoreError::NotPermitted)?;
        validation::validate_profile_update(&update)?;

        let mut updated = current.clone();
        if let Some(username) = update.username {
            let new_key = username.to_lowercase();
            if guard.usernames.get(&new_key).is_some_and(|owner| *owner != id) {
                return Err(StoreError::violation("username", ConstraintKind::Unique));
            }
            guard.usernames.remove(&current.username.to_lowercase());
            guard.usernames.insert(new_key, id);
            updated.username = username;
        }
        if let Some(country) = update.country {
            updated.country = country;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            updated.date_of_birth = date_of_birth;
        }
        if let Some(avatar_url) = update.avatar_url {
            updated.avatar_url = avatar_url;
        }
        updated.updated_at = hooks::touch(current.updated_at);

        guard.profiles.insert(id, updated.clone());
        Ok(updated)
    }

    async fn insert_trade(&self, requester: &Requester, fields: TradeFields) -> Result<Trade, StoreError> {
        let user_id = policy::require_user(requester)?;
        let fields = validation::normalize_trade(fields)?;
        let mut guard = self.tables.write().await;
        if !guard.subjects.contains_key(&user_id) {
            return Err(StoreError::violation("user_id", ConstraintKind::ForeignKey));
        }

        guard.last_trade_id += 1;
        let now = hooks::now();
        let trade = Trade {
            id: guard.last_trade_id,
            user_id,
            fields,
            created_at: now,
            updated_at: now,
        };
        guard.trades.insert(trade.id, trade.clone());
        debug!(trade_id = trade.id, %user_id, "trade inserted");
        Ok(trade)
    }

    async fn get_trade(&self, requester: &Requester, id: TradeId) -> Result<Trade, StoreError> {
        let guard = self.tables.read().await;
        guard.owned_trade(requester, id).cloned()
    }

    async fn list_trades(&self, requester: &Requester, filter: &TradeFilter) -> Result<Vec<Trade>, StoreError> {
        let user_id = policy::require_user(requester)?;
        let guard = self.tables.read().await;
        let mut trades: Vec<Trade> = guard
            .trades
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.asset_class.is_none_or(|ac| t.fields.asset_class == ac))
            .cloned()
            .collect();
        trades.sort_by(|a, b| {
            b.fields
                .date_opened
                .cmp(&a.fields.date_opened)
                .then(b.id.cmp(&a.id))
        });
        trades.truncate(filter.effective_limit());
        Ok(trades)
    }

    async fn update_trade(
        &self,
        requester: &Requester,
        id: TradeId,
        fields: TradeFields,
    ) -> Result<Trade, StoreError> {
        let mut guard = self.tables.write().await;
        let current = guard.owned_trade(requester, id)?.clone();
        let fields = validation::normalize_trade(fields)?;

        let updated = Trade {
            id,
            user_id: current.user_id,
            fields,
            created_at: current.created_at,
            updated_at: hooks::touch(current.updated_at),
        };
        guard.trades.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_trade(&self, requester: &Requester, id: TradeId) -> Result<(), StoreError> {
        let mut guard = self.tables.write().await;
        guard.owned_trade(requester, id)?;
        guard.trades.remove(&id);
        debug!(trade_id = id, "trade deleted");
        Ok(())
    }
}
