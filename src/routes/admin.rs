use actix_web::{get, patch, web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::middleware::ModeratorUser;
use crate::models::dto::AdminStats;
use crate::models::{listings, messages, users};
use crate::services::notification_service::NotificationService;

#[derive(Deserialize)]
pub struct ModerationQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct SetListingStatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub status: Option<String>,
}

fn is_listing_status(status: &str) -> bool {
    status == listings::STATUS_PENDING
        || status == listings::STATUS_ACTIVE
        || status == listings::STATUS_INACTIVE
}

async fn collect_stats(db: &DatabaseConnection) -> Result<AdminStats, DbErr> {
    let total_users = users::Entity::find().count(db).await?;
    let total_listings = listings::Entity::find().count(db).await?;
    let total_messages = messages::Entity::find().count(db).await?;

    let pending_listings = listings::Entity::find()
        .filter(listings::Column::Status.eq(listings::STATUS_PENDING))
        .count(db)
        .await?;
    let active_listings = listings::Entity::find()
        .filter(listings::Column::Status.eq(listings::STATUS_ACTIVE))
        .count(db)
        .await?;
    let inactive_listings = listings::Entity::find()
        .filter(listings::Column::Status.eq(listings::STATUS_INACTIVE))
        .count(db)
        .await?;

    Ok(AdminStats {
        total_users,
        total_listings,
        total_messages,
        pending_listings,
        active_listings,
        inactive_listings,
    })
}

/// GET /api/admin/stats - Tableau de bord (MODERATEUR)
#[get("/stats")]
pub async fn get_stats(
    _moderator: ModeratorUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match collect_stats(db.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to collect stats: {}", e)
        })),
    }
}

/// GET /api/admin/listings?status=... - File de modération (MODERATEUR)
/// Sans paramètre: les annonces PENDING
#[get("/listings")]
pub async fn get_listings_for_moderation(
    _moderator: ModeratorUser,
    query: web::Query<ModerationQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let status = query
        .status
        .clone()
        .unwrap_or_else(|| listings::STATUS_PENDING.to_string());

    if !is_listing_status(&status) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid status. Must be one of: PENDING, ACTIVE, INACTIVE"
        }));
    }

    let result = listings::Entity::find()
        .filter(listings::Column::Status.eq(&status))
        .order_by_desc(listings::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    match result {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch listings: {}", e)
        })),
    }
}

/// PATCH /api/admin/listings/{id}/status - Forcer un statut (MODERATEUR)
#[patch("/listings/{id}/status")]
pub async fn set_listing_status(
    _moderator: ModeratorUser,
    path: web::Path<i32>,
    body: web::Json<SetListingStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if !is_listing_status(&body.status) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid status. Must be one of: PENDING, ACTIVE, INACTIVE"
        }));
    }

    let listing_id = path.into_inner();

    let listing = match listings::Entity::find_by_id(listing_id).one(db.get_ref()).await {
        Ok(Some(listing)) => listing,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Listing not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let owner_id = listing.user_id;
    let title = listing.title.clone();

    let mut active: listings::ActiveModel = listing.into();
    active.status = Set(body.status.clone());
    active.updated_at = Set(Some(chrono::Utc::now().naive_utc()));

    let updated = match active.update(db.get_ref()).await {
        Ok(updated) => updated,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to update listing: {}", e)
            }));
        }
    };

    // Le propriétaire est prévenu du changement (best-effort)
    if let Err(e) =
        NotificationService::notify_status_update(db.get_ref(), owner_id, &title, &updated.status)
            .await
    {
        eprintln!("⚠️  Failed to create status notification: {}", e);
    }

    HttpResponse::Ok().json(updated)
}

/// GET /api/admin/users - Liste des comptes (MODERATEUR)
#[get("/users")]
pub async fn get_users(
    _moderator: ModeratorUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let result = users::Entity::find()
        .order_by_desc(users::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    match result {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch users: {}", e)
        })),
    }
}

/// PATCH /api/admin/users/{id} - Rôle et statut d'un compte
/// Le statut est accessible aux modérateurs, le rôle aux seuls admins
#[patch("/users/{id}")]
pub async fn update_user(
    moderator: ModeratorUser,
    path: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let target_id = path.into_inner();

    if let Some(ref role) = body.role {
        if role != users::ROLE_USER && role != users::ROLE_MODERATOR && role != users::ROLE_ADMIN {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid role. Must be one of: USER, MODERATOR, ADMIN"
            }));
        }

        if !moderator.0.is_admin() {
            return HttpResponse::Forbidden().json(serde_json::json!({
                "error": "Only admins can change roles"
            }));
        }
    }

    if let Some(ref status) = body.status {
        if status != users::STATUS_ACTIVE && status != users::STATUS_SUSPENDED {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid status. Must be one of: ACTIVE, SUSPENDED"
            }));
        }
    }

    // Pas d'auto-rétrogradation ni d'auto-suspension
    if target_id == moderator.0.user_id {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "You cannot change your own role or status"
        }));
    }

    let user = match users::Entity::find_by_id(target_id).one(db.get_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let mut active: users::ActiveModel = user.into();

    if let Some(ref role) = body.role {
        active.role = Set(role.clone());
    }
    if let Some(ref status) = body.status {
        active.status = Set(status.clone());
    }

    match active.update(db.get_ref()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update user: {}", e)
        })),
    }
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(get_stats)
            .service(get_listings_for_moderation)
            .service(set_listing_status)
            .service(get_users)
            .service(update_user)
    );
}
