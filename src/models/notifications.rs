use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

pub const TYPE_MESSAGE: &str = "MESSAGE";
pub const TYPE_FAVORITE: &str = "FAVORITE";
pub const TYPE_PRICE_CHANGE: &str = "PRICE_CHANGE";
pub const TYPE_STATUS_UPDATE: &str = "STATUS_UPDATE";
pub const TYPE_SYSTEM: &str = "SYSTEM";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub notification_type: String, // "MESSAGE" | "FAVORITE" | "PRICE_CHANGE" | "STATUS_UPDATE" | "SYSTEM"

    pub content: String,

    pub read: bool,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
