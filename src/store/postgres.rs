//! Postgres-backed store. Owner-scoped statements run in a transaction that
//! carries the requester's id, and also filter on it explicitly.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ConstraintKind, StoreError};
use crate::hooks::ProvisionOutcome;
use crate::persistence::{self, map_db_error};
use crate::policy::{self, Requester};
use crate::store::JournalStore;
use crate::types::profile::{NewProfile, Profile, ProfileUpdate};
use crate::types::subject::AuthSubject;
use crate::types::trade::{Trade, TradeFields, TradeFilter, TradeId};
use crate::validation;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = persistence::create_pool_and_migrate(database_url, max_connections).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_trade(row: persistence::TradeRow) -> Result<Trade, StoreError> {
    Ok(persistence::trade_row_to_trade(row)?)
}

#[async_trait]
impl JournalStore for PgStore {
    async fn check_username(&self, candidate: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        persistence::username_available(&mut conn, candidate)
            .await
            .map_err(map_db_error)
    }

    async fn register_subject(&self, requester: &Requester, subject: &AuthSubject) -> Result<(), StoreError> {
        policy::require_service(requester)?;
        let mut conn = self.pool.acquire().await?;
        persistence::insert_subject(&mut conn, subject)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    /// `handle_new_user` derives the profile from the stored subject row; the
    /// column constraints report a malformed or taken username.
    async fn provision_profile(&self, requester: &Requester, subject_id: Uuid) -> Result<ProvisionOutcome, StoreError> {
        policy::require_service(requester)?;
        let mut tx = self.pool.begin().await?;

        if persistence::profile_exists(&mut tx, subject_id)
            .await
            .map_err(map_db_error)?
        {
            debug!(%subject_id, "profile already present, provisioning skipped");
            return Ok(ProvisionOutcome::AlreadyExists);
        }

        let written = persistence::provision_from_subject(&mut tx, subject_id)
            .await
            .map_err(map_db_error)?;
        if !written {
            // Either a concurrent writer won, or the subject was never registered.
            let exists = persistence::profile_exists(&mut tx, subject_id)
                .await
                .map_err(map_db_error)?;
            tx.commit().await?;
            return if exists {
                Ok(ProvisionOutcome::AlreadyExists)
            } else {
                Err(StoreError::violation("id", ConstraintKind::ForeignKey))
            };
        }
        tx.commit().await?;
        info!(%subject_id, "profile provisioned");
        Ok(ProvisionOutcome::Created)
    }

    async fn subject_deleted(&self, requester: &Requester, subject_id: Uuid) -> Result<(), StoreError> {
        policy::require_service(requester)?;
        let mut conn = self.pool.acquire().await?;
        let removed = persistence::delete_subject(&mut conn, subject_id)
            .await
            .map_err(map_db_error)?;
        if removed > 0 {
            info!(%subject_id, "subject removed");
        }
        Ok(())
    }

    async fn insert_profile(&self, requester: &Requester, profile: NewProfile) -> Result<Profile, StoreError> {
        if !policy::can_insert_profile(requester, profile.id) {
            return Err(StoreError::NotPermitted);
        }
        validation::validate_new_profile(&profile)?;

        let mut tx = persistence::begin_as(&self.pool, profile.id).await?;
        let row = persistence::insert_profile(&mut tx, &profile)
            .await
            .map_err(map_db_error)?;
        tx.commit().await?;
        Ok(persistence::profile_row_to_profile(row))
    }

    async fn get_profile(&self, requester: &Requester, id: Uuid) -> Result<Profile, StoreError> {
        if !policy::can_read_profile(requester, id) {
            return Err(StoreError::NotPermitted);
        }
        let owner = policy::require_user(requester)?;

        let mut tx = persistence::begin_as(&self.pool, owner).await?;
        let row = persistence::get_profile(&mut tx, id, owner)
            .await
            .map_err(map_db_error)?;
        tx.commit().await?;
        row.map(persistence::profile_row_to_profile)
            .ok_or(StoreError::NotPermitted)
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
        let owner = policy::require_user(requester)?;
        validation::validate_profile_update(&update)?;

        let mut tx = persistence::begin_as(&self.pool, owner).await?;
        let row = persistence::update_profile(&mut tx, id, owner, &update)
            .await
            .map_err(map_db_error)?;
        tx.commit().await?;
        row.map(persistence::profile_row_to_profile)
            .ok_or(StoreError::NotPermitted)
    }

    async fn insert_trade(&self, requester: &Requester, fields: TradeFields) -> Result<Trade, StoreError> {
        let user_id = policy::require_user(requester)?;
        let fields = validation::normalize_trade(fields)?;

        let mut tx = persistence::begin_as(&self.pool, user_id).await?;
        let row = persistence::insert_trade(&mut tx, user_id, &fields)
            .await
            .map_err(map_db_error)?;
        tx.commit().await?;
        debug!(trade_id = row.id, %user_id, "trade inserted");
        row_to_trade(row)
    }

    async fn get_trade(&self, requester: &Requester, id: TradeId) -> Result<Trade, StoreError> {
        let user_id = policy::require_user(requester)?;
        let mut tx = persistence::begin_as(&self.pool, user_id).await?;
        let row = persistence::get_trade(&mut tx, id, user_id)
            .await
            .map_err(map_db_error)?;
        tx.commit().await?;
        row_to_trade(row.ok_or(StoreError::NotPermitted)?)
    }

    async fn list_trades(&self, requester: &Requester, filter: &TradeFilter) -> Result<Vec<Trade>, StoreError> {
        let user_id = policy::require_user(requester)?;
        let mut tx = persistence::begin_as(&self.pool, user_id).await?;
        let rows = persistence::list_trades_for_user(
            &mut tx,
            user_id,
            filter.asset_class,
            filter.effective_limit(),
        )
        .await
        .map_err(map_db_error)?;
        tx.commit().await?;
        rows.into_iter().map(row_to_trade).collect()
    }

    async fn update_trade(
        &self,
        requester: &Requester,
        id: TradeId,
        fields: TradeFields,
    ) -> Result<Trade, StoreError> {
        let user_id = policy::require_user(requester)?;
        let fields = validation::normalize_trade(fields)?;

        let mut tx = persistence::begin_as(&self.pool, user_id).await?;
        let row = persistence::update_trade(&mut tx, id, user_id, &fields)
            .await
            .map_err(map_db_error)?;
        tx.commit().await?;
        row_to_trade(row.ok_or(StoreError::NotPermitted)?)
    }

    async fn delete_trade(&self, requester: &Requester, id: TradeId) -> Result<(), StoreError> {
        let user_id = policy::require_user(requester)?;
        let mut tx = persistence::begin_as(&self.pool, user_id).await?;
        let removed = persistence::delete_trade(&mut tx, id, user_id)
            .await
            .map_err(map_db_error)?;
        if removed == 0 {
            return Err(StoreError::NotPermitted);
        }
        tx.commit().await?;
        debug!(trade_id = id, "trade deleted");
        Ok(())
    }
}
