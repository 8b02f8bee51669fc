//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Address, OAuthBinding, User};
use crate::domain::repository::{AddressRepository, OAuthBindingRepository, UserRepository};
use crate::domain::value_object::{
    AddressId, Email, Mobile, UserId, UserName, UserPassword,
};
use crate::error::{AccountError, AccountResult};

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAccountRepository {
    async fn create(&self, user: &User) -> AccountResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                user_name_canonical,
                password_hash,
                mobile,
                email,
                email_verified,
                default_address_id,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.password_hash.as_str())
        .bind(user.mobile.as_str())
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(user.email_verified)
        .bind(user.default_address_id.map(|id| id.into_uuid()))
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                user_name,
                password_hash,
                mobile,
                email,
                email_verified,
                default_address_id,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AccountResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                user_name,
                password_hash,
                mobile,
                email,
                email_verified,
                default_address_id,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE user_name_canonical = $1
            "#,
        )
        .bind(user_name.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_mobile(&self, mobile: &Mobile) -> AccountResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                user_name,
                password_hash,
                mobile,
                email,
                email_verified,
                default_address_id,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE mobile = $1
            "#,
        )
        .bind(mobile.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn count_by_user_name(&self, user_name: &str) -> AccountResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE user_name_canonical = $1",
        )
        .bind(user_name.to_lowercase())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_by_mobile(&self, mobile: &str) -> AccountResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE mobile = $1")
            .bind(mobile)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update(&self, user: &User) -> AccountResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                user_name = $2,
                user_name_canonical = $3,
                password_hash = $4,
                email = $5,
                email_verified = $6,
                default_address_id = $7,
                last_login_at = $8,
                updated_at = $9
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.password_hash.as_str())
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(user.email_verified)
        .bind(user.default_address_id.map(|id| id.into_uuid()))
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Address Repository Implementation
// ============================================================================

impl AddressRepository for PgAccountRepository {
    async fn create(&self, address: &Address) -> AccountResult<()> {
        sqlx::query(
            r#"
            INSERT INTO addresses (
                address_id,
                user_id,
                title,
                receiver,
                province,
                city,
                district,
                place,
                mobile,
                tel,
                email,
                is_deleted,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(address.address_id.as_uuid())
        .bind(address.user_id.as_uuid())
        .bind(&address.title)
        .bind(&address.receiver)
        .bind(&address.province)
        .bind(&address.city)
        .bind(&address.district)
        .bind(&address.place)
        .bind(address.mobile.as_str())
        .bind(&address.tel)
        .bind(&address.email)
        .bind(address.is_deleted)
        .bind(address.created_at)
        .bind(address.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, address_id: &AddressId) -> AccountResult<Option<Address>> {
        let row = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT
                address_id,
                user_id,
                title,
                receiver,
                province,
                city,
                district,
                place,
                mobile,
                tel,
                email,
                is_deleted,
                created_at,
                updated_at
            FROM addresses
            WHERE address_id = $1
            "#,
        )
        .bind(address_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_address()))
    }

    async fn find_live_by_user(&self, user_id: &UserId) -> AccountResult<Vec<Address>> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT
                address_id,
                user_id,
                title,
                receiver,
                province,
                city,
                district,
                place,
                mobile,
                tel,
                email,
                is_deleted,
                created_at,
                updated_at
            FROM addresses
            WHERE user_id = $1 AND is_deleted = FALSE
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_address()).collect())
    }

    async fn count_live_by_user(&self, user_id: &UserId) -> AccountResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM addresses WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update(&self, address: &Address) -> AccountResult<()> {
        sqlx::query(
            r#"
            UPDATE addresses SET
                title = $2,
                receiver = $3,
                province = $4,
                city = $5,
                district = $6,
                place = $7,
                mobile = $8,
                tel = $9,
                email = $10,
                is_deleted = $11,
                updated_at = $12
            WHERE address_id = $1
            "#,
        )
        .bind(address.address_id.as_uuid())
        .bind(&address.title)
        .bind(&address.receiver)
        .bind(&address.province)
        .bind(&address.city)
        .bind(&address.district)
        .bind(&address.place)
        .bind(address.mobile.as_str())
        .bind(&address.tel)
        .bind(&address.email)
        .bind(address.is_deleted)
        .bind(address.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// OAuth Binding Repository Implementation
// ============================================================================

impl OAuthBindingRepository for PgAccountRepository {
    async fn create(&self, binding: &OAuthBinding) -> AccountResult<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_bindings (openid, user_id, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&binding.openid)
        .bind(binding.user_id.as_uuid())
        .bind(binding.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_openid(&self, openid: &str) -> AccountResult<Option<OAuthBinding>> {
        let row = sqlx::query_as::<_, OAuthBindingRow>(
            r#"
            SELECT openid, user_id, created_at
            FROM oauth_bindings
            WHERE openid = $1
            "#,
        )
        .bind(openid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_binding()))
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    password_hash: String,
    mobile: String,
    email: Option<String>,
    email_verified: bool,
    default_address_id: Option<Uuid>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AccountResult<User> {
        let password_hash = UserPassword::from_db(self.password_hash)
            .map_err(|e| AccountError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(&self.user_name),
            password_hash,
            mobile: Mobile::from_db(self.mobile),
            email: self.email.map(Email::from_db),
            email_verified: self.email_verified,
            default_address_id: self.default_address_id.map(AddressId::from_uuid),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    address_id: Uuid,
    user_id: Uuid,
    title: String,
    receiver: String,
    province: String,
    city: String,
    district: String,
    place: String,
    mobile: String,
    tel: Option<String>,
    email: Option<String>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AddressRow {
    fn into_address(self) -> Address {
        Address {
            address_id: AddressId::from_uuid(self.address_id),
            user_id: UserId::from_uuid(self.user_id),
            title: self.title,
            receiver: self.receiver,
            province: self.province,
            city: self.city,
            district: self.district,
            place: self.place,
            mobile: Mobile::from_db(self.mobile),
            tel: self.tel,
            email: self.email,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OAuthBindingRow {
    openid: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl OAuthBindingRow {
    fn into_binding(self) -> OAuthBinding {
        OAuthBinding {
            openid: self.openid,
            user_id: UserId::from_uuid(self.user_id),
            created_at: self.created_at,
        }
    }
}
