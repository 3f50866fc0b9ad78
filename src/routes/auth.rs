use actix_web::{post, get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait};
use serde::{Deserialize, Serialize};

use crate::models::users::{self, Entity as Users, Column as UserColumn, ActiveModel as UserActiveModel};
use crate::services::notification_service::NotificationService;
use crate::utils::{password, jwt};
use crate::middleware::AuthUser;

// DTO pour l'inscription
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// DTO pour changer le mot de passe
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// Réponse après login/register
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

// Réponse pour /auth/me
#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: i32,
    pub email: String,
    pub role: String,
}

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let email = body.email.trim().to_lowercase();

    if email.is_empty() || !email.contains('@') {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid email address"
        }));
    }

    if body.password.len() < 8 {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Password must be at least 8 characters"
        }));
    }

    // 1. Vérifier si l'email est déjà utilisé
    let existing_user = match Users::find()
        .filter(UserColumn::Email.eq(&email))
        .one(db.get_ref())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    // Un compte créé via une annonce anonyme n'a pas de mot de passe:
    // l'inscription le réclame au lieu de refuser l'email
    if let Some(ref user) = existing_user {
        if user.password_hash.is_some() {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "Email already registered"
            }));
        }
    }

    // 2. Hash le mot de passe
    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 3. Créer le compte (ou compléter le compte sans mot de passe)
    let result = match existing_user {
        Some(user) => {
            let mut active: UserActiveModel = user.into();
            active.password_hash = Set(Some(password_hash));
            if body.name.is_some() {
                active.name = Set(body.name.clone());
            }
            active.update(db.get_ref()).await
        }
        None => {
            UserActiveModel {
                email: Set(email.clone()),
                name: Set(body.name.clone()),
                phone: Set(None),
                password_hash: Set(Some(password_hash)),
                role: Set(users::ROLE_USER.to_string()),
                status: Set(users::STATUS_ACTIVE.to_string()),
                email_notifications: Set(true),
                created_at: Set(Some(chrono::Utc::now().naive_utc())),
                ..Default::default()
            }
            .insert(db.get_ref())
            .await
        }
    };

    let user = match result {
        Ok(user) => user,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create user: {}", e)
            }));
        }
    };

    // 4. Notification de bienvenue (best-effort)
    if let Err(e) = NotificationService::notify(
        db.get_ref(),
        user.id,
        crate::models::notifications::TYPE_SYSTEM,
        "Welcome! Your account has been created.".to_string(),
    )
    .await
    {
        eprintln!("⚠️  Failed to create welcome notification: {}", e);
    }

    // 5. Générer le JWT
    let token = match jwt::generate_token(user.id, &user.email, &user.role) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let email = body.email.trim().to_lowercase();

    // 1. Trouver l'utilisateur
    let user = match Users::find()
        .filter(UserColumn::Email.eq(&email))
        .one(db.get_ref())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    // 2. Vérifier le mot de passe (un compte créé via annonce n'en a pas)
    let password_hash = match user.password_hash {
        Some(ref hash) => hash,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
    };

    let is_valid = match password::verify_password(&body.password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    // 3. Un compte suspendu ne peut pas se connecter
    if user.status == users::STATUS_SUSPENDED {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Account suspended"
        }));
    }

    // 4. Générer le JWT
    let token = match jwt::generate_token(user.id, &user.email, &user.role) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

/// GET /auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth_user.user_id,
        email: auth_user.email,
        role: auth_user.role,
    })
}

/// POST /auth/change-password - Changer son mot de passe (PROTÉGÉE)
#[post("/change-password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if body.new_password.len() < 8 {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Password must be at least 8 characters"
        }));
    }

    // 1. Récupérer l'utilisateur
    let user = match Users::find_by_id(auth_user.user_id)
        .one(db.get_ref())
        .await
    {
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

    // 2. Vérifier l'ancien mot de passe
    let current_password_hash = match user.password_hash {
        Some(ref hash) => hash,
        None => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "User has no password"
            }));
        }
    };

    let is_valid = match password::verify_password(&body.current_password, current_password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Current password is incorrect"
        }));
    }

    // 3. Hasher le nouveau mot de passe
    let new_password_hash = match password::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 4. Mettre à jour le mot de passe dans la BD
    let mut active_model: UserActiveModel = user.into();
    active_model.password_hash = Set(Some(new_password_hash));

    match active_model.update(db.get_ref()).await {
        Ok(_) => {
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Password changed successfully"
            }))
        }
        Err(e) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to update password: {}", e)
            }))
        }
    }
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
            .service(change_password)
    );
}
