use {crate::domain::audit::AuditEntry, crate::domain::error::OrchestratorError};

pub async fn insert_audit_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &AuditEntry,
) -> Result<(), OrchestratorError> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (id, booking_id, event_id, action, actor, detail)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.booking_id)
    .bind(&entry.event_id)
    .bind(&entry.action)
    .bind(&entry.actor)
    .bind(&entry.detail)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
