//! User entity for database

use sea_orm::entity::prelude::*;

/// Row of the `usuarios` table. Column names follow the existing schema.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,
    /// bcrypt hash, never the plaintext
    #[sea_orm(column_name = "password")]
    pub password_hash: String,
    #[sea_orm(column_name = "rol")]
    pub role: String,
    #[sea_orm(column_name = "lenguage")]
    pub language: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
