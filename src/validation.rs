//! Column rules checked before a row is written.
//!
//! Uniqueness is not checked here: it belongs to the store, inside the
//! same atomic step as the write.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ConstraintKind, StoreError};
use crate::types::profile::{NewProfile, ProfileUpdate};
use crate::types::trade::TradeFields;

pub const MIN_RATING: i16 = 0;
pub const MAX_RATING: i16 = 5;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("username pattern compiles"));

pub fn validate_username(username: &str) -> Result<(), StoreError> {
    if username.is_empty() {
        return Err(StoreError::violation("username", ConstraintKind::Required));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(StoreError::violation("username", ConstraintKind::Format));
    }
    Ok(())
}

pub fn validate_new_profile(profile: &NewProfile) -> Result<(), StoreError> {
    if profile.email.trim().is_empty() {
        return Err(StoreError::violation("email", ConstraintKind::Required));
    }
    validate_username(&profile.username)
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), StoreError> {
    match &update.username {
        Some(username) => validate_username(username),
        None => Ok(()),
    }
}

/// Check a trade's fields and collapse `tags` into a set (first occurrence wins).
pub fn normalize_trade(mut fields: TradeFields) -> Result<TradeFields, StoreError> {
    if fields.instrument.trim().is_empty() {
        return Err(StoreError::violation("instrument", ConstraintKind::Required));
    }
    if let Some(rating) = fields.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(StoreError::violation("rating", ConstraintKind::Range));
        }
    }
    let mut seen = Vec::with_capacity(fields.tags.len());
    for tag in fields.tags.drain(..) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    fields.tags = seen;
    Ok(fields)
}
