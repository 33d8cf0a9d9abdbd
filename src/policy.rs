//! Row-level ownership predicates.
//!
//! Profiles are readable by their owner only. Trades are visible to and
//! mutable by their owner only. `Service` is the elevated identity used by
//! auth lifecycle hooks and owns no rows.

use uuid::Uuid;

use crate::error::StoreError;

/// Identity an operation runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    User(Uuid),
    Service,
}

impl Requester {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Requester::User(id) => Some(*id),
            _ => None,
        }
    }
}

pub fn require_user(requester: &Requester) -> Result<Uuid, StoreError> {
    requester.user_id().ok_or(StoreError::NotPermitted)
}

pub fn require_service(requester: &Requester) -> Result<(), StoreError> {
    match requester {
        Requester::Service => Ok(()),
        _ => Err(StoreError::NotPermitted),
    }
}

fn is_owner(requester: &Requester, owner: Uuid) -> bool {
    requester.user_id() == Some(owner)
}

pub fn can_read_profile(requester: &Requester, profile_id: Uuid) -> bool {
    is_owner(requester, profile_id)
}

pub fn can_insert_profile(requester: &Requester, row_id: Uuid) -> bool {
    is_owner(requester, row_id)
}

pub fn can_update_profile(requester: &Requester, profile_id: Uuid) -> bool {
    is_owner(requester, profile_id)
}

/// Same predicate for select, insert, update and delete.
pub fn owns_trade(requester: &Requester, trade_user_id: Uuid) -> bool {
    is_owner(requester, trade_user_id)
}
