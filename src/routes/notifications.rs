use actix_web::{get, patch, post, web, HttpResponse};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::middleware::AuthUser;
use crate::models::notifications;

/// GET /api/notifications - Ses notifications, récentes en premier (PROTÉGÉE)
#[get("")]
pub async fn get_notifications(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let result = notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    match result {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch notifications: {}", e)
        })),
    }
}

/// GET /api/notifications/unread-count (PROTÉGÉE)
#[get("/unread-count")]
pub async fn get_unread_count(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let count = notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(auth_user.user_id))
        .filter(notifications::Column::Read.eq(false))
        .count(db.get_ref())
        .await;

    match count {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({ "unread": count })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to count notifications: {}", e)
        })),
    }
}

/// PATCH /api/notifications/{id}/read - Marquer comme lue (PROTÉGÉE)
#[patch("/{id}/read")]
pub async fn mark_read(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let notification_id = path.into_inner();

    let notification = match notifications::Entity::find_by_id(notification_id)
        .one(db.get_ref())
        .await
    {
        Ok(Some(notification)) => notification,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Notification not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if notification.user_id != auth_user.user_id {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You can only update your own notifications"
        }));
    }

    let mut active: notifications::ActiveModel = notification.into();
    active.read = Set(true);

    match active.update(db.get_ref()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update notification: {}", e)
        })),
    }
}

/// POST /api/notifications/read-all - Tout marquer comme lu (PROTÉGÉE)
#[post("/read-all")]
pub async fn mark_all_read(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::Read, Expr::value(true))
        .filter(notifications::Column::UserId.eq(auth_user.user_id))
        .filter(notifications::Column::Read.eq(false))
        .exec(db.get_ref())
        .await;

    match result {
        Ok(updated) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "updated": updated.rows_affected
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update notifications: {}", e)
        })),
    }
}

pub fn notifications_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .service(get_notifications)
            .service(get_unread_count)
            .service(mark_read)
            .service(mark_all_read)
    );
}
