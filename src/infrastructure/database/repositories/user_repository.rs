use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        email: model.email,
        password_hash: model.password_hash,
        role: model.role,
        language: model.language,
    }
}

fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

fn is_unique_violation(e: &DbErr) -> bool {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
        return true;
    }
    let msg = e.to_string();
    msg.contains("UNIQUE") || msg.contains("duplicate")
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for SeaOrmUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<()> {
        let new_user = user::ActiveModel {
            email: Set(dto.email.clone()),
            password_hash: Set(dto.password_hash),
            role: Set(dto.role),
            language: Set(dto.language),
        };

        user::Entity::insert(new_user)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Conflict(format!("email {} already registered", dto.email))
                } else {
                    db_err(e)
                }
            })?;

        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db.ping().await.map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database, Schema};

    /// `usuarios` as deployed databases already have it: four columns, no id.
    const USUARIOS_DDL: &str = "CREATE TABLE usuarios (
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        rol TEXT NOT NULL,
        lenguage TEXT NOT NULL
    )";

    async fn repository() -> SeaOrmUserRepository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.execute_unprepared(USUARIOS_DDL).await.unwrap();
        SeaOrmUserRepository::new(db)
    }

    async fn repository_from_entity() -> SeaOrmUserRepository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let backend = db.get_database_backend();
        let stmt = Schema::new(backend).create_table_from_entity(user::Entity);
        db.execute(backend.build(&stmt)).await.unwrap();
        SeaOrmUserRepository::new(db)
    }

    fn dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: "admin".to_string(),
            language: "es".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_find_by_email() {
        let repo = repository().await;
        repo.create_user(dto("ana@example.com")).await.unwrap();

        let user = repo
            .get_user_by_email("ana@example.com")
            .await
            .unwrap()
            .expect("user stored");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.password_hash, "$2b$04$hash");
        assert_eq!(user.role, "admin");
        assert_eq!(user.language, "es");
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let repo = repository().await;
        assert!(repo.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = repository().await;
        repo.create_user(dto("ana@example.com")).await.unwrap();

        let err = repo.create_user(dto("ana@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");

        let count = user::Entity::find().all(&repo.db).await.unwrap().len();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn ping_succeeds_on_live_connection() {
        let repo = repository().await;
        repo.ping().await.unwrap();
    }

    #[tokio::test]
    async fn existing_table_without_id_column_supports_lookup() {
        let repo = repository().await;
        repo.create_user(dto("ana@example.com")).await.unwrap();

        let user = repo.get_user_by_email("ana@example.com").await;
        assert!(matches!(user, Ok(Some(ref u)) if u.email == "ana@example.com"), "got {user:?}");
    }

    #[tokio::test]
    async fn entity_generated_table_behaves_the_same() {
        let repo = repository_from_entity().await;
        repo.create_user(dto("ana@example.com")).await.unwrap();

        let err = repo.create_user(dto("ana@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");
        assert!(repo.get_user_by_email("ana@example.com").await.unwrap().is_some());
    }
}
