//! Maps Postgres constraint failures back to the column they guard.

use crate::error::{ConstraintKind, StoreError};

/// insufficient_privilege, raised when a row-level-security check fails.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

fn constraint_field(name: &str) -> Option<(&'static str, ConstraintKind)> {
    let mapped = match name {
        "profiles_pkey" => ("id", ConstraintKind::Unique),
        "profiles_id_fkey" => ("id", ConstraintKind::ForeignKey),
        "profiles_email_check" => ("email", ConstraintKind::Required),
        "profiles_username_format" => ("username", ConstraintKind::Format),
        "profiles_username_lower_key" => ("username", ConstraintKind::Unique),
        "trades_user_id_fkey" => ("user_id", ConstraintKind::ForeignKey),
        "trades_asset_class_check" => ("asset_class", ConstraintKind::Format),
        "trades_instrument_check" => ("instrument", ConstraintKind::Required),
        "trades_direction_check" => ("direction", ConstraintKind::Format),
        "trades_option_type_check" => ("option_type", ConstraintKind::Format),
        "trades_rating_check" => ("rating", ConstraintKind::Range),
        _ => return None,
    };
    Some(mapped)
}

/// Turn a statement error into a `StoreError`. Unknown failures stay fatal.
pub fn map_db_error(err: sqlx::Error) -> StoreError {
    let mapped = match err.as_database_error() {
        Some(db_err) if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) => {
            return StoreError::NotPermitted;
        }
        Some(db_err) => db_err.constraint().and_then(constraint_field),
        None => None,
    };
    match mapped {
        Some((field, kind)) => StoreError::violation(field, kind),
        None => StoreError::Database(err),
    }
}
