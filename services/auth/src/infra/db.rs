use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, Insert, QueryFilter, SqlErr, Statement,
    TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use atelier_auth_schema::{credentials, outbox_events, password_resets, refresh_tokens};
use atelier_domain::user::UserRole;

use crate::domain::repository::{CredentialStore, NotificationGateway};
use crate::domain::types::{
    Credential, NewCredential, OutgoingEmail, PasswordResetRecord, RefreshTokenRecord,
};
use crate::error::AuthServiceError;

// ── Credential store ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCredentialStore {
    pub db: DatabaseConnection,
}

impl CredentialStore for DbCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AuthServiceError> {
        let model = credentials::Entity::find()
            .filter(credentials::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find credential by email")?;
        Ok(model.map(credential_from_model).transpose()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AuthServiceError> {
        let model = credentials::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find credential by id")?;
        Ok(model.map(credential_from_model).transpose()?)
    }

    async fn create_credential(
        &self,
        credential: &NewCredential,
    ) -> Result<Credential, AuthServiceError> {
        let now = Utc::now();
        let model = credentials::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(credential.email.clone()),
            password_hash: Set(credential.password_hash.clone()),
            first_name: Set(credential.first_name.clone()),
            last_name: Set(credential.last_name.clone()),
            role: Set(i16::from(credential.role.as_u8())),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AuthServiceError::EmailInUse,
            _ => AuthServiceError::Internal(anyhow::Error::new(e).context("insert credential")),
        })?;
        Ok(credential_from_model(model)?)
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        let password_hash = password_hash.to_owned();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    set_password_hash(txn, user_id, password_hash).await?;
                    refresh_tokens::Entity::delete_many()
                        .filter(refresh_tokens::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .context("update password and revoke refresh token")?;
        Ok(())
    }

    async fn upsert_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        upsert_refresh_token_query(user_id, token_hash, expires_at)
            .exec_without_returning(&self.db)
            .await
            .context("upsert refresh token")?;
        Ok(())
    }

    async fn find_valid_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        let model = refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::TokenHash.eq(token_hash))
            .filter(refresh_tokens::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await
            .context("find valid refresh token")?;
        Ok(model.map(|m| RefreshTokenRecord {
            user_id: m.user_id,
            token_hash: m.token_hash,
            expires_at: m.expires_at,
        }))
    }

    async fn delete_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete refresh tokens")?;
        Ok(())
    }

    async fn create_password_reset(
        &self,
        record: &PasswordResetRecord,
    ) -> Result<(), AuthServiceError> {
        let record = record.clone();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    password_resets::Entity::delete_many()
                        .filter(password_resets::Column::UserId.eq(record.user_id))
                        .exec(txn)
                        .await?;
                    insert_password_reset(txn, &record).await
                })
            })
            .await
            .context("create password reset")?;
        Ok(())
    }

    async fn consume_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<Uuid>, AuthServiceError> {
        let stmt = consume_password_reset_statement(self.db.get_database_backend(), token_hash);
        let Some(row) = self
            .db
            .query_one(stmt)
            .await
            .context("consume password reset")?
        else {
            return Ok(None);
        };
        let user_id: Uuid = row
            .try_get("", "user_id")
            .context("read password reset owner")?;
        let expires_at: DateTime<Utc> = row
            .try_get("", "expires_at")
            .context("read password reset expiry")?;
        Ok((expires_at > Utc::now()).then_some(user_id))
    }
}

/// `INSERT .. ON CONFLICT (user_id) DO UPDATE`: one row per owner, replaced in a
/// single statement. `created_at` keeps the first issuance.
fn upsert_refresh_token_query(
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Insert<refresh_tokens::ActiveModel> {
    let now = Utc::now();
    let model = refresh_tokens::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(token_hash.to_owned()),
        expires_at: Set(expires_at),
        created_at: Set(now),
        updated_at: Set(now),
    };
    refresh_tokens::Entity::insert(model).on_conflict(
        OnConflict::column(refresh_tokens::Column::UserId)
            .update_columns([
                refresh_tokens::Column::TokenHash,
                refresh_tokens::Column::ExpiresAt,
                refresh_tokens::Column::UpdatedAt,
            ])
            .to_owned(),
    )
}

/// Fetch-and-delete in one statement, so two concurrent consumers cannot both
/// see the row. Postgres only: `$1` placeholder and `RETURNING`.
fn consume_password_reset_statement(backend: DbBackend, token_hash: &str) -> Statement {
    Statement::from_sql_and_values(
        backend,
        "DELETE FROM password_resets WHERE token_hash = $1 RETURNING user_id, expires_at",
        [token_hash.into()],
    )
}

async fn set_password_hash(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    password_hash: String,
) -> Result<(), DbErr> {
    credentials::Entity::update_many()
        .col_expr(credentials::Column::PasswordHash, Expr::value(password_hash))
        .col_expr(credentials::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(credentials::Column::Id.eq(user_id))
        .exec(txn)
        .await?;
    Ok(())
}

async fn insert_password_reset(
    txn: &DatabaseTransaction,
    record: &PasswordResetRecord,
) -> Result<(), DbErr> {
    password_resets::ActiveModel {
        id: Set(record.id),
        user_id: Set(record.user_id),
        token_hash: Set(record.token_hash.clone()),
        expires_at: Set(record.expires_at),
        created_at: Set(record.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn credential_from_model(model: credentials::Model) -> anyhow::Result<Credential> {
    let role = u8::try_from(model.role)
        .ok()
        .and_then(UserRole::from_u8)
        .with_context(|| format!("unknown role {} on credential {}", model.role, model.id))?;
    Ok(Credential {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        first_name: model.first_name,
        last_name: model.last_name,
        role,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Outbox notification gateway ───────────────────────────────────────────────

/// Writes outgoing emails to `outbox_events`; an external worker delivers them.
#[derive(Clone)]
pub struct OutboxNotificationGateway {
    pub db: DatabaseConnection,
}

impl NotificationGateway for OutboxNotificationGateway {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), AuthServiceError> {
        outbox_events::Entity::insert(outbox_row(email, Utc::now()))
            .on_conflict(
                OnConflict::column(outbox_events::Column::IdempotencyKey)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert email outbox event")?;
        Ok(())
    }
}

/// Due immediately; the idempotency key makes a re-queued email a no-op.
fn outbox_row(email: &OutgoingEmail, now: DateTime<Utc>) -> outbox_events::ActiveModel {
    outbox_events::ActiveModel {
        id: Set(email.id),
        user_id: Set(email.user_id),
        kind: Set(outbox_events::KIND_EMAIL.to_owned()),
        payload: Set(json!({
            "to": email.to,
            "template": email.template.key(),
            "data": email.data,
        })),
        idempotency_key: Set(format!("{}:{}", outbox_events::KIND_EMAIL, email.id)),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        delivered_at: Set(None),
        failed_at: Set(None),
    }
}
