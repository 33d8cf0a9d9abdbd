//! Profile persistence: insert, read, partial update, username check.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::types::profile::{NewProfile, Profile, ProfileUpdate};

const PROFILE_COLUMNS: &str =
    "id, email, username, country, date_of_birth, avatar_url, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn profile_row_to_profile(row: ProfileRow) -> Profile {
    Profile {
        id: row.id,
        email: row.email,
        username: row.username,
        country: row.country,
        date_of_birth: row.date_of_birth,
        avatar_url: row.avatar_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Insert a profile. Fails on any conflict, including the id.
pub async fn insert_profile(conn: &mut PgConnection, profile: &NewProfile) -> Result<ProfileRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO profiles (id, email, username, country, date_of_birth, avatar_url) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PROFILE_COLUMNS}"
    );
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.username)
        .bind(profile.country.as_deref())
        .bind(profile.date_of_birth)
        .bind(profile.avatar_url.as_deref())
        .fetch_one(conn)
        .await
}

pub async fn profile_exists(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
        .bind(id)
        .fetch_one(conn)
        .await
}

/// Read a profile as `owner`. `None` if missing or not the owner's.
pub async fn get_profile(conn: &mut PgConnection, id: Uuid, owner: Uuid) -> Result<Option<ProfileRow>, sqlx::Error> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 AND id = $2");
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(id)
        .bind(owner)
        .fetch_optional(conn)
        .await
}

/// Apply a partial update as `owner`. Each optional column is bound as a
/// (present, value) pair so a present `None` clears it. `updated_at` is set
/// by trigger.
pub async fn update_profile(
    conn: &mut PgConnection,
    id: Uuid,
    owner: Uuid,
    update: &ProfileUpdate,
) -> Result<Option<ProfileRow>, sqlx::Error> {
    let sql = format!(
        "UPDATE profiles SET \
         username = COALESCE($3, username), \
         country = CASE WHEN $4 THEN $5 ELSE country END, \
         date_of_birth = CASE WHEN $6 THEN $7 ELSE date_of_birth END, \
         avatar_url = CASE WHEN $8 THEN $9 ELSE avatar_url END \
         WHERE id = $1 AND id = $2 RETURNING {PROFILE_COLUMNS}"
    );
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(id)
        .bind(owner)
        .bind(update.username.as_deref())
        .bind(update.country.is_some())
        .bind(update.country.as_ref().and_then(|c| c.as_deref()))
        .bind(update.date_of_birth.is_some())
        .bind(update.date_of_birth.flatten())
        .bind(update.avatar_url.is_some())
        .bind(update.avatar_url.as_ref().and_then(|a| a.as_deref()))
        .fetch_optional(conn)
        .await
}

/// Calls the `check_username` SQL function, which sees every profile.
pub async fn username_available(conn: &mut PgConnection, candidate: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT check_username($1)")
        .bind(candidate)
        .fetch_one(conn)
        .await
}
