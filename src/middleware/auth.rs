use actix_web::{dev::Payload, Error, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::models::users;
use crate::utils::jwt;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
/// Les routes au parcours mixte (création d'annonce) prennent Option<AuthUser>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_moderator(&self) -> bool {
        self.role == users::ROLE_MODERATOR || self.role == users::ROLE_ADMIN
    }

    pub fn is_admin(&self) -> bool {
        self.role == users::ROLE_ADMIN
    }
}

fn unauthorized(message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

fn extract_claims(req: &HttpRequest) -> Result<jwt::Claims, Error> {
    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    // 2. Convertir le header en string
    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format (expected: Bearer <token>)"))?;

    // 4. Vérifier le token JWT
    jwt::verify_token(token).map_err(|e| unauthorized(&format!("Invalid token: {}", e)))
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_claims(req).map(|claims| AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }))
    }
}

/// Extracteur pour le back-office: exige le rôle MODERATOR ou ADMIN
#[derive(Debug, Clone)]
pub struct ModeratorUser(pub AuthUser);

impl FromRequest for ModeratorUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = extract_claims(req).and_then(|claims| {
            let user = AuthUser {
                user_id: claims.sub,
                email: claims.email,
                role: claims.role,
            };

            if !user.is_moderator() {
                let response = HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Moderator or admin role required"
                }));
                return Err(actix_web::error::InternalError::from_response("", response).into());
            }

            Ok(ModeratorUser(user))
        });

        ready(result)
    }
}
