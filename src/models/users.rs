use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

pub const ROLE_USER: &str = "USER";
pub const ROLE_MODERATOR: &str = "MODERATOR";
pub const ROLE_ADMIN: &str = "ADMIN";

pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_SUSPENDED: &str = "SUSPENDED";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    pub name: Option<String>,

    pub phone: Option<String>,

    #[serde(skip_serializing)] // Ne jamais exposer le hash en JSON
    pub password_hash: Option<String>, // None pour les comptes créés via une annonce anonyme

    pub role: String,   // "USER" | "MODERATOR" | "ADMIN"

    pub status: String, // "ACTIVE" | "SUSPENDED"

    pub email_notifications: bool,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::listings::Entity")]
    Listings,

    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,

    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
