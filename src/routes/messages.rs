use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::models::{listings, messages, users};
use crate::services::notification_service::NotificationService;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: i32,
    pub listing_id: Option<i32>,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ConversationQuery {
    pub listing_id: Option<i32>,
}

/// POST /api/messages - Envoyer un message (PROTÉGÉE)
#[post("")]
pub async fn send_message(
    auth_user: AuthUser,
    body: web::Json<SendMessageRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let content = body.content.trim().to_string();
    if content.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Message content is required"
        }));
    }

    if body.receiver_id == auth_user.user_id {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "You cannot send a message to yourself"
        }));
    }

    // 1. Le destinataire doit exister
    match users::Entity::find_by_id(body.receiver_id).one(db.get_ref()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Receiver not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    }

    // 2. L'annonce référencée (si fournie) doit exister
    if let Some(listing_id) = body.listing_id {
        match listings::Entity::find_by_id(listing_id).one(db.get_ref()).await {
            Ok(Some(_)) => {}
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
        }
    }

    // 3. Créer le message
    let new_message = messages::ActiveModel {
        sender_id: Set(auth_user.user_id),
        receiver_id: Set(body.receiver_id),
        listing_id: Set(body.listing_id),
        content: Set(content),
        read: Set(false),
        deleted_for_sender: Set(false),
        deleted_for_receiver: Set(false),
        created_at: Set(Some(chrono::Utc::now().naive_utc())),
        ..Default::default()
    };

    let message = match new_message.insert(db.get_ref()).await {
        Ok(message) => message,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to send message: {}", e)
            }));
        }
    };

    // 4. Notification MESSAGE pour le destinataire (best-effort)
    let sender_name = match users::Entity::find_by_id(auth_user.user_id).one(db.get_ref()).await {
        Ok(Some(user)) => user.name.unwrap_or(user.email),
        _ => auth_user.email.clone(),
    };

    if let Err(e) =
        NotificationService::notify_new_message(db.get_ref(), message.receiver_id, &sender_name)
            .await
    {
        eprintln!("⚠️  Failed to create message notification: {}", e);
    }

    HttpResponse::Created().json(message)
}

/// GET /api/messages - Boîte de réception (PROTÉGÉE)
/// Messages reçus non supprimés côté destinataire + messages envoyés
/// non supprimés côté expéditeur
#[get("")]
pub async fn get_inbox(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let inbox = messages::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(messages::Column::ReceiverId.eq(auth_user.user_id))
                        .add(messages::Column::DeletedForReceiver.eq(false)),
                )
                .add(
                    Condition::all()
                        .add(messages::Column::SenderId.eq(auth_user.user_id))
                        .add(messages::Column::DeletedForSender.eq(false)),
                ),
        )
        .order_by_desc(messages::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    match inbox {
        Ok(inbox) => HttpResponse::Ok().json(inbox),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch messages: {}", e)
        })),
    }
}

/// GET /api/messages/unread-count - Compteur non lus (PROTÉGÉE)
#[get("/unread-count")]
pub async fn get_unread_count(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let count = messages::Entity::find()
        .filter(messages::Column::ReceiverId.eq(auth_user.user_id))
        .filter(messages::Column::Read.eq(false))
        .filter(messages::Column::DeletedForReceiver.eq(false))
        .count(db.get_ref())
        .await;

    match count {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({ "unread": count })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to count messages: {}", e)
        })),
    }
}

/// GET /api/messages/conversation/{user_id} - Fil avec un utilisateur (PROTÉGÉE)
/// La consultation marque comme lus les messages reçus du correspondant
#[get("/conversation/{user_id}")]
pub async fn get_conversation(
    auth_user: AuthUser,
    path: web::Path<i32>,
    query: web::Query<ConversationQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let other_id = path.into_inner();

    let mut thread_query = messages::Entity::find().filter(
        Condition::any()
            .add(
                Condition::all()
                    .add(messages::Column::SenderId.eq(auth_user.user_id))
                    .add(messages::Column::ReceiverId.eq(other_id))
                    .add(messages::Column::DeletedForSender.eq(false)),
            )
            .add(
                Condition::all()
                    .add(messages::Column::SenderId.eq(other_id))
                    .add(messages::Column::ReceiverId.eq(auth_user.user_id))
                    .add(messages::Column::DeletedForReceiver.eq(false)),
            ),
    );

    if let Some(listing_id) = query.listing_id {
        thread_query = thread_query.filter(messages::Column::ListingId.eq(listing_id));
    }

    let thread = thread_query
        .order_by_asc(messages::Column::CreatedAt)
        .all(db.get_ref())
        .await;

    let thread = match thread {
        Ok(thread) => thread,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch conversation: {}", e)
            }));
        }
    };

    // Marquer comme lus les messages reçus dans ce fil (best-effort)
    let mut mark_read = messages::Entity::update_many()
        .col_expr(messages::Column::Read, Expr::value(true))
        .filter(messages::Column::ReceiverId.eq(auth_user.user_id))
        .filter(messages::Column::SenderId.eq(other_id))
        .filter(messages::Column::Read.eq(false));

    if let Some(listing_id) = query.listing_id {
        mark_read = mark_read.filter(messages::Column::ListingId.eq(listing_id));
    }

    if let Err(e) = mark_read.exec(db.get_ref()).await {
        eprintln!("⚠️  Failed to mark conversation as read: {}", e);
    }

    HttpResponse::Ok().json(thread)
}

/// DELETE /api/messages/{id} - Suppression côté appelant uniquement (PROTÉGÉE)
#[delete("/{id}")]
pub async fn delete_message(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let message_id = path.into_inner();

    let message = match messages::Entity::find_by_id(message_id).one(db.get_ref()).await {
        Ok(Some(message)) => message,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Message not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    // Chaque côté ne masque que sa propre vue, la ligne survit pour l'autre
    let active: messages::ActiveModel = if message.sender_id == auth_user.user_id {
        let mut active: messages::ActiveModel = message.into();
        active.deleted_for_sender = Set(true);
        active
    } else if message.receiver_id == auth_user.user_id {
        let mut active: messages::ActiveModel = message.into();
        active.deleted_for_receiver = Set(true);
        active
    } else {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You can only delete your own messages"
        }));
    };

    match active.update(db.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Message deleted"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete message: {}", e)
        })),
    }
}

pub fn messages_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/messages")
            .service(send_message)
            .service(get_inbox)
            .service(get_unread_count)
            .service(get_conversation)
            .service(delete_message)
    );
}
