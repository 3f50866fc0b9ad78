use actix_web::{get, post, web, HttpResponse};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::middleware::ModeratorUser;
use crate::models::categories;
use crate::services::category_cache::CategoryCache;
use crate::utils::slug;

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>, // dérivé du nom si absent
    pub parent_id: Option<i32>,
    pub icon: Option<String>,
}

/// GET /api/categories - Arbre des catégories, servi depuis le cache (PUBLIC)
#[get("")]
pub async fn get_categories(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CategoryCache>,
) -> HttpResponse {
    match cache.tree(db.get_ref()).await {
        Ok(tree) => HttpResponse::Ok().json(tree),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch categories: {}", e)
        })),
    }
}

/// POST /api/categories - Créer une catégorie (MODERATEUR)
#[post("")]
pub async fn create_category(
    _moderator: ModeratorUser,
    body: web::Json<CreateCategoryRequest>,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CategoryCache>,
) -> HttpResponse {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Name is required"
        }));
    }

    let category_slug = match &body.slug {
        Some(provided) => slug::slugify(provided),
        None => slug::slugify(&name),
    };

    // 1. L'arbre a 2 niveaux: le parent doit être une catégorie principale
    if let Some(parent_id) = body.parent_id {
        match categories::Entity::find_by_id(parent_id).one(db.get_ref()).await {
            Ok(Some(parent)) => {
                if parent.parent_id.is_some() {
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "Parent must be a main category"
                    }));
                }
            }
            Ok(None) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Unknown parent category: {}", parent_id)
                }));
            }
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": format!("Database error: {}", e)
                }));
            }
        }
    }

    // 2. Slug globalement unique
    match categories::Entity::find()
        .filter(categories::Column::Slug.eq(&category_slug))
        .one(db.get_ref())
        .await
    {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": format!("Category slug already exists: {}", category_slug)
            }));
        }
        Ok(None) => {}
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    }

    // 3. Créer et invalider le cache
    let new_category = categories::ActiveModel {
        parent_id: Set(body.parent_id),
        name: Set(name),
        slug: Set(category_slug),
        icon: Set(body.icon.clone()),
        ..Default::default()
    };

    match new_category.insert(db.get_ref()).await {
        Ok(category) => {
            cache.invalidate();
            HttpResponse::Created().json(category)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create category: {}", e)
        })),
    }
}

pub fn categories_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .service(get_categories)
            .service(create_category)
    );
}
