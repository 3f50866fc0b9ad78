use actix_web::{delete, get, patch, web, HttpResponse};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use validator::Validate;

use crate::data::counties;
use crate::middleware::AuthUser;
use crate::models::dto::{
    CategoryInfo, CreateListingRequest, ListingDetail, ListingSummary, SellerInfo,
    UpdateListingRequest,
};
use crate::models::{categories, listings, locations, users};
use crate::services::currency_service::{Currency, CurrencyConverter};
use crate::services::email_service::EmailService;
use crate::services::listing_service::{ListingService, ListingSubmitter, ValidationOutcome};
use crate::services::search_service::{SearchFilters, SearchService};

#[derive(Deserialize)]
pub struct DisplayQuery {
    pub display_currency: Option<String>,
}

#[derive(Deserialize)]
pub struct ValidateQuery {
    pub token: String,
}

/// Applique la conversion d'affichage sur un lot de résumés
/// Le prix stocké reste intact, seuls display_price/display_currency changent
pub fn apply_display_currency(
    converter: &CurrencyConverter,
    summaries: &mut [ListingSummary],
    target: Currency,
) {
    for summary in summaries.iter_mut() {
        if let Some(from) = Currency::from_code(&summary.currency) {
            summary.display_price = Some(converter.display_price(summary.price, from, target));
            summary.display_currency = Some(target.code().to_string());
        }
    }
}

/// Résout le paramètre display_currency (None = pas de conversion)
fn parse_display_currency(code: Option<&str>) -> Result<Option<Currency>, HttpResponse> {
    match code {
        None => Ok(None),
        Some(code) => match Currency::from_code(code) {
            Some(currency) => Ok(Some(currency)),
            None => Err(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid display currency. Must be one of: RON, EUR, USD, GBP"
            }))),
        },
    }
}

/// POST /api/listings - Créer une annonce (parcours authentifié OU anonyme)
pub async fn create_listing(
    auth_user: Option<AuthUser>,
    request: web::Json<CreateListingRequest>,
    db: web::Data<DatabaseConnection>,
    email_service: web::Data<EmailService>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    if request.price <= Decimal::ZERO {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Price must be greater than 0"
        }));
    }

    if Currency::from_code(&request.currency).is_none() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid currency. Must be one of: RON, EUR, USD, GBP"
        }));
    }

    if let Some(ref condition) = request.condition {
        if condition != listings::CONDITION_NEW && condition != listings::CONDITION_USED {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid condition. Must be one of: NEW, USED"
            }));
        }
    }

    if !counties::is_valid_county(&request.county) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Unknown county: {}", request.county)
        }));
    }

    // La catégorie doit exister (l'arbre n'est pas modifiable par ce parcours)
    match categories::Entity::find_by_id(request.category_id)
        .one(db.get_ref())
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Unknown category: {}", request.category_id)
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    }

    // Parcours unique: la branche se décide ici, pas dans deux routes
    let submitter = match auth_user {
        Some(user) => ListingSubmitter::Authenticated(user.user_id),
        None => {
            let contact_email = match request.contact_email.clone() {
                Some(email) => email,
                None => {
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "contact_email is required for anonymous submissions"
                    }));
                }
            };

            ListingSubmitter::Anonymous {
                email: contact_email,
                name: request.contact_name.clone(),
            }
        }
    };

    let created = match ListingService::create_listing(
        db.get_ref(),
        submitter,
        request.into_inner(),
    )
    .await
    {
        Ok(created) => created,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create listing: {}", e)
            }));
        }
    };

    // Email de validation pour le parcours anonyme (best-effort: l'annonce
    // est déjà en base, un échec d'envoi dégrade juste le message)
    let mut message = if created.requires_validation {
        "Listing created. Check your email to confirm it within 24 hours.".to_string()
    } else {
        "Listing created and active.".to_string()
    };

    if created.requires_validation {
        if let Some(ref contact_email) = created.contact_email {
            if let Err(e) = email_service.send_validation_email(
                contact_email,
                created.contact_name.as_deref(),
                &created.listing.title,
                &created.validation_token,
            ) {
                eprintln!("⚠️  Failed to send validation email: {}", e);
                message = "Listing created, but the confirmation email could not be sent. \
                           Please contact support."
                    .to_string();
            }
        }
    }

    HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": message,
        "listing": {
            "id": created.listing.id,
            "title": created.listing.title,
            "slug": created.listing.slug,
            "status": created.listing.status,
        }
    }))
}

/// GET /api/listings - Dernières annonces actives
#[get("")]
pub async fn get_listings(
    query: web::Query<DisplayQuery>,
    db: web::Data<DatabaseConnection>,
    converter: web::Data<CurrencyConverter>,
) -> HttpResponse {
    let display = match parse_display_currency(query.display_currency.as_deref()) {
        Ok(display) => display,
        Err(response) => return response,
    };

    let filters = SearchFilters::default();

    match SearchService::search(db.get_ref(), &filters).await {
        Ok(mut summaries) => {
            if let Some(target) = display {
                apply_display_currency(converter.get_ref(), &mut summaries, target);
            }
            HttpResponse::Ok().json(summaries)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch listings: {}", e)
        })),
    }
}

/// GET /api/listings/mine - Mes annonces, tous statuts (PROTÉGÉE)
#[get("/mine")]
pub async fn get_my_listings(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let rows = listings::Entity::find()
        .find_also_related(locations::Entity)
        .filter(listings::Column::UserId.eq(auth_user.user_id))
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

/// GET /api/listings/validate?token=... - Confirmer une annonce anonyme (PUBLIC)
#[get("/validate")]
pub async fn validate_listing(
    query: web::Query<ValidateQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match ListingService::validate_token(db.get_ref(), &query.token).await {
        Ok(ValidationOutcome::Activated(listing)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Listing confirmed and active.",
            "listing": {
                "id": listing.id,
                "slug": listing.slug,
                "status": listing.status,
            }
        })),
        Ok(ValidationOutcome::AlreadyValidated) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Listing was already confirmed."
        })),
        Ok(ValidationOutcome::Expired) => HttpResponse::Gone().json(serde_json::json!({
            "error": "Validation token expired. Please submit the listing again."
        })),
        Ok(ValidationOutcome::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Unknown validation token"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to validate listing: {}", e)
        })),
    }
}

/// GET /api/listings/slug/{slug} - Détail d'une annonce par slug
#[get("/slug/{slug}")]
pub async fn get_listing_by_slug(
    path: web::Path<String>,
    query: web::Query<DisplayQuery>,
    auth_user: Option<AuthUser>,
    db: web::Data<DatabaseConnection>,
    converter: web::Data<CurrencyConverter>,
) -> HttpResponse {
    let listing_slug = path.into_inner();

    let listing = match listings::Entity::find()
        .filter(listings::Column::Slug.eq(&listing_slug))
        .one(db.get_ref())
        .await
    {
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

    serve_detail(listing, query.into_inner(), auth_user, db, converter).await
}

/// GET /api/listings/{id} - Détail d'une annonce
#[get("/{id}")]
pub async fn get_listing(
    path: web::Path<i32>,
    query: web::Query<DisplayQuery>,
    auth_user: Option<AuthUser>,
    db: web::Data<DatabaseConnection>,
    converter: web::Data<CurrencyConverter>,
) -> HttpResponse {
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

    serve_detail(listing, query.into_inner(), auth_user, db, converter).await
}

async fn serve_detail(
    listing: listings::Model,
    query: DisplayQuery,
    auth_user: Option<AuthUser>,
    db: web::Data<DatabaseConnection>,
    converter: web::Data<CurrencyConverter>,
) -> HttpResponse {
    let display = match parse_display_currency(query.display_currency.as_deref()) {
        Ok(display) => display,
        Err(response) => return response,
    };

    // Une annonce non active n'est visible que par son auteur ou un modérateur
    if listing.status != listings::STATUS_ACTIVE {
        let allowed = auth_user
            .as_ref()
            .map(|u| u.user_id == listing.user_id || u.is_moderator())
            .unwrap_or(false);

        if !allowed {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Listing not found"
            }));
        }
    }

    // Compteur de vues (best-effort, uniquement sur les annonces publiques)
    if listing.status == listings::STATUS_ACTIVE {
        if let Err(e) = ListingService::increment_views(db.get_ref(), listing.id).await {
            eprintln!("⚠️  Failed to increment views for listing {}: {}", listing.id, e);
        }
    }

    match build_detail(db.get_ref(), listing, display, converter.get_ref()).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch listing: {}", e)
        })),
    }
}

async fn build_detail(
    db: &DatabaseConnection,
    listing: listings::Model,
    display: Option<Currency>,
    converter: &CurrencyConverter,
) -> Result<ListingDetail, sea_orm::DbErr> {
    let location = locations::Entity::find_by_id(listing.location_id).one(db).await?;
    let category = categories::Entity::find_by_id(listing.category_id).one(db).await?;
    let seller = users::Entity::find_by_id(listing.user_id).one(db).await?;

    let mut images_map = ListingService::images_for_listings(db, &[listing.id]).await?;
    let images = images_map.remove(&listing.id).unwrap_or_default();

    let display_price = display.and_then(|target| {
        Currency::from_code(&listing.currency)
            .map(|from| converter.display_price(listing.price, from, target))
    });

    Ok(ListingDetail {
        id: listing.id,
        title: listing.title,
        slug: listing.slug,
        description: listing.description,
        price: listing.price,
        currency: listing.currency,
        display_price,
        display_currency: display.map(|c| c.code().to_string()),
        condition: listing.condition,
        status: listing.status,
        premium: listing.premium,
        views: listing.views,
        county: location.as_ref().map(|l| l.county.clone()),
        city: location.map(|l| l.city),
        category: category.map(|c| CategoryInfo {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }),
        seller: seller.map(|u| SellerInfo {
            id: u.id,
            name: u.name,
            phone: u.phone,
        }),
        images,
        created_at: listing.created_at,
    })
}

/// PATCH /api/listings/{id} - Modifier son annonce (PROTÉGÉE)
#[patch("/{id}")]
pub async fn update_listing(
    auth_user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateListingRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    if let Some(price) = request.price {
        if price <= Decimal::ZERO {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Price must be greater than 0"
            }));
        }
    }

    if let Some(ref condition) = request.condition {
        if condition != listings::CONDITION_NEW && condition != listings::CONDITION_USED {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid condition. Must be one of: NEW, USED"
            }));
        }
    }

    // Le propriétaire peut activer/désactiver, jamais repasser en PENDING
    if let Some(ref status) = request.status {
        if status != listings::STATUS_ACTIVE && status != listings::STATUS_INACTIVE {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid status. Must be one of: ACTIVE, INACTIVE"
            }));
        }
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

    if listing.user_id != auth_user.user_id && !auth_user.is_moderator() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You can only edit your own listings"
        }));
    }

    match ListingService::update_listing(db.get_ref(), listing, request.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update listing: {}", e)
        })),
    }
}

/// DELETE /api/listings/{id} - Supprimer son annonce (PROTÉGÉE)
#[delete("/{id}")]
pub async fn delete_listing(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
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

    if listing.user_id != auth_user.user_id && !auth_user.is_moderator() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You can only delete your own listings"
        }));
    }

    match ListingService::delete_listing(db.get_ref(), listing_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Listing deleted"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete listing: {}", e)
        })),
    }
}

pub fn listings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/listings")
            .route("", web::post().to(create_listing))
            .service(get_listings)
            .service(get_my_listings)
            .service(validate_listing)
            .service(get_listing_by_slug)
            .service(update_listing)
            .service(delete_listing)
            .service(get_listing)
    );
}
