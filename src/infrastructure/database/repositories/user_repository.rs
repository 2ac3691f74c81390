use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};

use crate::domain::{CreateUserDto, DomainError, User, UserRepositoryInterface};
use crate::infrastructure::database::entities::user;
use crate::shared::{AppError, AppResult};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email_address: model.email_address,
        hashed_password: model.hashed_password,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn insert_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict("email_address".to_string()).into()
        }
        _ => e.into(),
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> AppResult<User> {
        let now = Utc::now();

        let new_user = user::ActiveModel {
            first_name: Set(dto.first_name),
            last_name: Set(dto.last_name),
            email_address: Set(dto.email_address),
            hashed_password: Set(dto.hashed_password),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = new_user.insert(&self.db).await.map_err(insert_err)?;

        Ok(user_model_to_domain(model))
    }

    async fn get_user_by_email(&self, email_address: &str) -> AppResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::EmailAddress.eq(email_address))
            .one(&self.db)
            .await?;

        Ok(model.map(user_model_to_domain))
    }

    async fn count_users(&self) -> AppResult<u64> {
        Ok(user::Entity::find().count(&self.db).await?)
    }
}
