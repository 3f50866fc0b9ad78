use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::middleware::AuthUser;
use crate::models::{favorites, listings, locations};
use crate::services::notification_service::NotificationService;
use crate::services::search_service::SearchService;

#[derive(Deserialize)]
pub struct AddFavoriteRequest {
    pub listing_id: i32,
}

/// POST /api/favorites - Ajouter une annonce aux favoris (PROTÉGÉE)
#[post("")]
pub async fn add_favorite(
    auth_user: AuthUser,
    body: web::Json<AddFavoriteRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. L'annonce doit exister
    let listing = match listings::Entity::find_by_id(body.listing_id).one(db.get_ref()).await {
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

    // 2. Une seule ligne par paire utilisateur-annonce
    match favorites::Entity::find()
        .filter(favorites::Column::UserId.eq(auth_user.user_id))
        .filter(favorites::Column::ListingId.eq(body.listing_id))
        .one(db.get_ref())
        .await
    {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "Listing already in favorites"
            }));
        }
        Ok(None) => {}
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    }

    // 3. Créer le favori
    let new_favorite = favorites::ActiveModel {
        user_id: Set(auth_user.user_id),
        listing_id: Set(body.listing_id),
        created_at: Set(Some(chrono::Utc::now().naive_utc())),
        ..Default::default()
    };

    let favorite = match new_favorite.insert(db.get_ref()).await {
        Ok(favorite) => favorite,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to add favorite: {}", e)
            }));
        }
    };

    // 4. Notification FAVORITE pour le vendeur (pas pour ses propres annonces)
    if listing.user_id != auth_user.user_id {
        if let Err(e) =
            NotificationService::notify_favorited(db.get_ref(), listing.user_id, &listing.title)
                .await
        {
            eprintln!("⚠️  Failed to create favorite notification: {}", e);
        }
    }

    HttpResponse::Created().json(favorite)
}

/// DELETE /api/favorites/{listing_id} - Retirer un favori (PROTÉGÉE)
#[delete("/{listing_id}")]
pub async fn remove_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let listing_id = path.into_inner();

    let result = favorites::Entity::delete_many()
        .filter(favorites::Column::UserId.eq(auth_user.user_id))
        .filter(favorites::Column::ListingId.eq(listing_id))
        .exec(db.get_ref())
        .await;

    match result {
        Ok(deleted) if deleted.rows_affected == 0 => {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "Favorite not found"
            }))
        }
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Favorite removed"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to remove favorite: {}", e)
        })),
    }
}

/// GET /api/favorites - Ses annonces favorites (PROTÉGÉE)
#[get("")]
pub async fn get_favorites(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let rows = favorites::Entity::find()
        .find_also_related(listings::Entity)
        .filter(favorites::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(favorites::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch favorites: {}", e)
            }));
        }
    };

    let favorite_listings: Vec<listings::Model> = rows
        .into_iter()
        .filter_map(|(_, listing)| listing)
        .collect();

    // Localisations du lot en UNE requête (lookup HashMap)
    let location_ids: Vec<i32> = favorite_listings
        .iter()
        .map(|l| l.location_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let location_map: HashMap<i32, locations::Model> = if location_ids.is_empty() {
        HashMap::new()
    } else {
        match locations::Entity::find()
            .filter(locations::Column::Id.is_in(location_ids))
            .all(db.get_ref())
            .await
        {
            Ok(found) => found.into_iter().map(|l| (l.id, l)).collect(),
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": format!("Failed to fetch locations: {}", e)
                }));
            }
        }
    };

    let pairs: Vec<(listings::Model, Option<locations::Model>)> = favorite_listings
        .into_iter()
        .map(|listing| {
            let location = location_map.get(&listing.location_id).cloned();
            (listing, location)
        })
        .collect();

    match SearchService::build_summaries(db.get_ref(), pairs).await {
        Ok(summaries) => HttpResponse::Ok().json(summaries),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch favorites: {}", e)
        })),
    }
}

pub fn favorites_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/favorites")
            .service(add_favorite)
            .service(get_favorites)
            .service(remove_favorite)
    );
}
