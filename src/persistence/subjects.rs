//! Auth subject persistence and profile provisioning.

use serde_json::json;
use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::types::subject::AuthSubject;

/// Record a subject; a subject that already exists is left untouched.
pub async fn insert_subject(conn: &mut PgConnection, subject: &AuthSubject) -> Result<(), sqlx::Error> {
    let metadata = if subject.user_metadata.is_object() {
        subject.user_metadata.clone()
    } else {
        json!({})
    };
    sqlx::query(
        "INSERT INTO auth_subjects (id, email, raw_user_meta_data) VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(subject.id)
    .bind(&subject.email)
    .bind(Json(metadata))
    .execute(conn)
    .await?;
    Ok(())
}

/// Delete a subject; profile and trades cascade. Returns rows removed (0 or 1).
pub async fn delete_subject(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM auth_subjects WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Run `handle_new_user` for a registered subject. Returns whether a profile
/// was written; `false` if one already existed or the subject is unknown.
pub async fn provision_from_subject(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT handle_new_user($1)")
        .bind(id)
        .fetch_one(conn)
        .await
}
