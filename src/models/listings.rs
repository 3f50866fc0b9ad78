use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_INACTIVE: &str = "INACTIVE";

pub const CONDITION_NEW: &str = "NEW";
pub const CONDITION_USED: &str = "USED";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub category_id: i32,

    pub location_id: i32,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String, // dérivé du titre, suffixé d'un timestamp en cas de collision

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub price: Decimal,

    pub currency: String, // "RON" | "EUR" | "USD" | "GBP"

    pub condition: Option<String>, // "NEW" | "USED"

    pub status: String, // "PENDING" | "ACTIVE" | "INACTIVE"

    pub premium: bool,

    pub views: i32,

    pub created_at: Option<DateTime>,

    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,

    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::LocationId",
        to = "super::locations::Column::Id"
    )]
    Location,

    #[sea_orm(has_many = "super::listing_images::Entity")]
    Images,

    #[sea_orm(has_many = "super::listing_validations::Entity")]
    Validations,

    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::listing_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
