//! Database repository for users.

use crate::types::{UserId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{Plan, UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: Option<String>,
    pub plan: Plan,
    pub api_key: String,
    pub discord_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            plan: user.plan,
            api_key: user.api_key,
            discord_id: user.discord_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Look up the owner of an ingestion API key
    #[instrument(skip(self, api_key), err)]
    pub async fn get_by_api_key(&mut self, api_key: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, plan, api_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.plan)
        .bind(&request.api_key)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(UserDBResponse::from(user))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                plan = COALESCE($2, plan),
                discord_id = CASE WHEN $3 THEN $4 ELSE discord_id END,
                api_key = COALESCE($5, api_key),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.plan)
        .bind(request.discord_id.is_some())
        .bind(request.discord_id.clone().flatten())
        .bind(&request.api_key)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(UserDBResponse::from(user))
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod tests {
    use super::*;
    use crate::crypto::generate_api_key;
    use sqlx::PgPool;

    fn create_request(email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            email: email.to_string(),
            password_hash: None,
            api_key: generate_api_key(),
            plan: Plan::Free,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_lookup_by_api_key(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let request = create_request("panda@example.com");
        let created = repo.create(&request).await.unwrap();
        assert_eq!(created.plan, Plan::Free);
        assert_eq!(created.discord_id, None);

        let found = repo.get_by_api_key(&request.api_key).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(repo.get_by_api_key("pp_unknown").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&create_request("dup@example.com")).await.unwrap();
        let err = repo.create(&create_request("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_links_and_unlinks_discord(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        let user = repo.create(&create_request("discord@example.com")).await.unwrap();

        let linked = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    discord_id: Some(Some("123456789012345678".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(linked.discord_id.as_deref(), Some("123456789012345678"));

        // Untouched when not requested
        let upgraded = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    plan: Some(Plan::Pro),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(upgraded.plan, Plan::Pro);
        assert_eq!(upgraded.discord_id.as_deref(), Some("123456789012345678"));

        let unlinked = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    discord_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unlinked.discord_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_user_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        let err = repo.update(Uuid::new_v4(), &UserUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_and_case_insensitive_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        let a = repo.create(&create_request("a@example.com")).await.unwrap();
        repo.create(&create_request("b@example.com")).await.unwrap();

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert!(repo.get_by_id(a.id).await.unwrap().is_none());
        assert!(repo.get_user_by_email("B@EXAMPLE.COM").await.unwrap().is_some());
    }
}
