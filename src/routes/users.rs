use actix_web::{get, patch, web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::models::{listings, locations, users};
use crate::services::search_service::SearchService;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email_notifications: Option<bool>,
}

/// GET /api/users/me/profile - Son propre profil (PROTÉGÉE)
#[get("/me/profile")]
pub async fn get_profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match users::Entity::find_by_id(auth_user.user_id).one(db.get_ref()).await {
        // password_hash n'est jamais sérialisé (skip_serializing sur le modèle)
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "User not found"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// PATCH /api/users/me - Modifier son profil (PROTÉGÉE)
#[patch("/me")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user = match users::Entity::find_by_id(auth_user.user_id).one(db.get_ref()).await {
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

    if let Some(ref name) = body.name {
        active.name = Set(Some(name.trim().to_string()));
    }
    if let Some(ref phone) = body.phone {
        active.phone = Set(Some(phone.trim().to_string()));
    }
    if let Some(email_notifications) = body.email_notifications {
        active.email_notifications = Set(email_notifications);
    }

    match active.update(db.get_ref()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update profile: {}", e)
        })),
    }
}

/// GET /api/users/{id}/listings - Annonces actives d'un vendeur (PUBLIC)
#[get("/{id}/listings")]
pub async fn get_user_listings(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();

    match users::Entity::find_by_id(user_id).one(db.get_ref()).await {
        Ok(Some(_)) => {}
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
    }

    let rows = listings::Entity::find()
        .find_also_related(locations::Entity)
        .filter(listings::Column::UserId.eq(user_id))
        .filter(listings::Column::Status.eq(listings::STATUS_ACTIVE))
        .order_by_desc(listings::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    match rows {
        Ok(rows) => match SearchService::build_summaries(db.get_ref(), rows).await {
            Ok(summaries) => HttpResponse::Ok().json(summaries),
            Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch listings: {}", e)
            })),
        },
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch listings: {}", e)
        })),
    }
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(get_profile)
            .service(update_profile)
            .service(get_user_listings)
    );
}
