//pour les payloads et les réponses structurées
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ---------------------------------------------------------------------------
// Requêtes
// ---------------------------------------------------------------------------

// Une seule route de création pour les deux parcours:
// - authentifié: l'annonce est ACTIVE immédiatement
// - anonyme: contact_email obligatoire, l'annonce reste PENDING
//   jusqu'à la validation du token envoyé par email
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    pub title: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,

    pub price: Decimal,

    pub currency: String, // "RON", "EUR", "USD", "GBP"

    pub condition: Option<String>, // "NEW" | "USED"

    pub category_id: i32,

    #[validate(length(min = 2, message = "County is required"))]
    pub county: String,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[serde(default)]
    pub premium: bool,

    #[serde(default)]
    pub images: Vec<ImagePayload>,

    // Contact du vendeur anonyme (ignoré pour une soumission authentifiée)
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,

    pub contact_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    pub url: String,

    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: Option<String>,

    pub price: Option<Decimal>,

    pub condition: Option<String>,

    pub status: Option<String>, // le propriétaire peut basculer ACTIVE <-> INACTIVE
}

// ---------------------------------------------------------------------------
// Réponses
// ---------------------------------------------------------------------------

/// Forme normalisée d'une image dans toutes les réponses API
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub url: String,
    pub is_primary: bool,
    pub display_order: i32,
}

#[derive(Debug, Serialize)]
pub struct ListingSummary {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub currency: String,
    // Conversion d'affichage (table de taux statique), le prix stocké ne change pas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_currency: Option<String>,
    pub condition: Option<String>,
    pub status: String,
    pub premium: bool,
    pub views: i32,
    pub county: Option<String>,
    pub city: Option<String>,
    pub category_slug: Option<String>,
    pub primary_image: Option<ImageInfo>,
    pub created_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct SellerInfo {
    pub id: i32,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct ListingDetail {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_currency: Option<String>,
    pub condition: Option<String>,
    pub status: String,
    pub premium: bool,
    pub views: i32,
    pub county: Option<String>,
    pub city: Option<String>,
    pub category: Option<CategoryInfo>,
    pub seller: Option<SellerInfo>,
    pub images: Vec<ImageInfo>,
    pub created_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_listings: u64,
    pub total_messages: u64,
    pub pending_listings: u64,
    pub active_listings: u64,
    pub inactive_listings: u64,
}
