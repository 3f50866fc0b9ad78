use sea_orm::*;
use sea_orm::sea_query::Expr;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::dto::{CreateListingRequest, ImageInfo, ImagePayload, UpdateListingRequest};
use crate::models::{favorites, listing_images, listing_validations, listings, locations, messages, users};
use crate::services::notification_service::NotificationService;
use crate::utils::slug;

/// Durée de vie d'un token de validation
const VALIDATION_TOKEN_HOURS: i64 = 24;

/// Les deux parcours de soumission d'une même route POST /api/listings
pub enum ListingSubmitter {
    Authenticated(i32),
    Anonymous {
        email: String,
        name: Option<String>,
    },
}

pub struct CreatedListing {
    pub listing: listings::Model,
    pub validation_token: String,
    /// true pour une soumission anonyme: l'annonce reste PENDING
    /// jusqu'au clic sur le lien envoyé par email
    pub requires_validation: bool,
    pub contact_email: Option<String>,
    pub contact_name: Option<String>,
}

pub enum ValidationOutcome {
    Activated(listings::Model),
    AlreadyValidated,
    Expired,
    NotFound,
}

pub struct ListingService;

impl ListingService {
    /// Crée une annonce: vendeur, localisation, slug, annonce, images et
    /// token de validation dans UNE SEULE transaction - aucune ligne ne
    /// survit si une étape échoue
    pub async fn create_listing(
        db: &DatabaseConnection,
        submitter: ListingSubmitter,
        request: CreateListingRequest,
    ) -> Result<CreatedListing, DbErr> {
        let txn = db.begin().await?;
        let now = chrono::Utc::now().naive_utc();

        // 1. Résoudre le vendeur (compte existant ou créé à la volée)
        let (user, authenticated) = Self::resolve_submitter(&txn, submitter, now).await?;

        // 2. Upsert de la localisation (paire judet/oras unique)
        let location = Self::upsert_location(&txn, &request.county, &request.city).await?;

        // 3. Slug dérivé du titre, suffixé d'un timestamp en cas de collision
        let base_slug = slug::slugify(&request.title);
        let collision = listings::Entity::find()
            .filter(listings::Column::Slug.eq(&base_slug))
            .one(&txn)
            .await?
            .is_some();

        let listing_slug = if collision {
            slug::with_timestamp_suffix(&base_slug)
        } else {
            base_slug
        };

        // 4. Créer l'annonce (ACTIVE pour un vendeur authentifié, sinon PENDING)
        let status = if authenticated {
            listings::STATUS_ACTIVE
        } else {
            listings::STATUS_PENDING
        };

        let new_listing = listings::ActiveModel {
            user_id: Set(user.id),
            category_id: Set(request.category_id),
            location_id: Set(location.id),
            title: Set(request.title.clone()),
            slug: Set(listing_slug),
            description: Set(request.description.clone()),
            price: Set(request.price),
            currency: Set(request.currency.to_ascii_uppercase()),
            condition: Set(request.condition.clone()),
            status: Set(status.to_string()),
            premium: Set(request.premium),
            views: Set(0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        let listing = new_listing.insert(&txn).await?;

        // 5. Images (au moins une: placeholder par défaut, une seule primaire)
        Self::insert_images(&txn, listing.id, &request.images).await?;

        // 6. Token de validation (déjà validé pour un vendeur authentifié)
        let token = Uuid::new_v4().to_string();
        let validation = listing_validations::ActiveModel {
            listing_id: Set(listing.id),
            token: Set(token.clone()),
            expires_at: Set(now + chrono::Duration::hours(VALIDATION_TOKEN_HOURS)),
            validated: Set(authenticated),
            created_at: Set(Some(now)),
            ..Default::default()
        };
        validation.insert(&txn).await?;

        txn.commit().await?;

        Ok(CreatedListing {
            listing,
            validation_token: token,
            requires_validation: !authenticated,
            contact_email: if authenticated { None } else { Some(user.email) },
            contact_name: if authenticated { None } else { user.name },
        })
    }

    async fn resolve_submitter<C: ConnectionTrait>(
        db: &C,
        submitter: ListingSubmitter,
        now: chrono::NaiveDateTime,
    ) -> Result<(users::Model, bool), DbErr> {
        match submitter {
            ListingSubmitter::Authenticated(user_id) => {
                let user = users::Entity::find_by_id(user_id)
                    .one(db)
                    .await?
                    .ok_or_else(|| DbErr::Custom(format!("User not found: {}", user_id)))?;

                Ok((user, true))
            }
            ListingSubmitter::Anonymous { email, name } => {
                let email = email.trim().to_lowercase();

                if let Some(user) = users::Entity::find()
                    .filter(users::Column::Email.eq(&email))
                    .one(db)
                    .await?
                {
                    return Ok((user, false));
                }

                let user = users::ActiveModel {
                    email: Set(email),
                    name: Set(name),
                    phone: Set(None),
                    password_hash: Set(None), // compte sans mot de passe, créé via l'annonce
                    role: Set(users::ROLE_USER.to_string()),
                    status: Set(users::STATUS_ACTIVE.to_string()),
                    email_notifications: Set(true),
                    created_at: Set(Some(now)),
                    ..Default::default()
                }
                .insert(db)
                .await?;

                Ok((user, false))
            }
        }
    }

    pub async fn upsert_location<C: ConnectionTrait>(
        db: &C,
        county: &str,
        city: &str,
    ) -> Result<locations::Model, DbErr> {
        let county = county.trim();
        let city = city.trim();

        let existing = locations::Entity::find()
            .filter(locations::Column::County.eq(county))
            .filter(locations::Column::City.eq(city))
            .one(db)
            .await?;

        if let Some(location) = existing {
            return Ok(location);
        }

        locations::ActiveModel {
            county: Set(county.to_string()),
            city: Set(city.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn insert_images<C: ConnectionTrait>(
        db: &C,
        listing_id: i32,
        images: &[ImagePayload],
    ) -> Result<(), DbErr> {
        if images.is_empty() {
            // exactement UNE image par défaut
            listing_images::ActiveModel {
                listing_id: Set(listing_id),
                image_url: Set(listing_images::DEFAULT_IMAGE_URL.to_string()),
                display_order: Set(0),
                is_primary: Set(true),
                ..Default::default()
            }
            .insert(db)
            .await?;

            return Ok(());
        }

        let flags = primary_flags(images);

        for (index, image) in images.iter().enumerate() {
            listing_images::ActiveModel {
                listing_id: Set(listing_id),
                image_url: Set(image.url.clone()),
                display_order: Set(index as i32),
                is_primary: Set(flags[index]),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        Ok(())
    }

    /// Confirme un token envoyé par email et fait passer l'annonce
    /// PENDING → ACTIVE. Revalider un token déjà validé est idempotent.
    pub async fn validate_token(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<ValidationOutcome, DbErr> {
        let validation = listing_validations::Entity::find()
            .filter(listing_validations::Column::Token.eq(token))
            .one(db)
            .await?;

        let validation = match validation {
            Some(validation) => validation,
            None => return Ok(ValidationOutcome::NotFound),
        };

        if validation.validated {
            return Ok(ValidationOutcome::AlreadyValidated);
        }

        if validation.expires_at < chrono::Utc::now().naive_utc() {
            return Ok(ValidationOutcome::Expired);
        }

        let listing_id = validation.listing_id;

        let txn = db.begin().await?;

        let mut active_validation: listing_validations::ActiveModel = validation.into();
        active_validation.validated = Set(true);
        active_validation.update(&txn).await?;

        let listing = listings::Entity::find_by_id(listing_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::Custom(format!("Listing not found: {}", listing_id)))?;

        let owner_id = listing.user_id;
        let title = listing.title.clone();

        let mut active_listing: listings::ActiveModel = listing.into();
        active_listing.status = Set(listings::STATUS_ACTIVE.to_string());
        active_listing.updated_at = Set(Some(chrono::Utc::now().naive_utc()));
        let updated = active_listing.update(&txn).await?;

        NotificationService::notify_status_update(&txn, owner_id, &title, listings::STATUS_ACTIVE)
            .await?;

        txn.commit().await?;

        Ok(ValidationOutcome::Activated(updated))
    }

    /// Met à jour une annonce; un changement de prix déclenche des
    /// notifications PRICE_CHANGE vers les utilisateurs qui l'ont en favori
    pub async fn update_listing(
        db: &DatabaseConnection,
        listing: listings::Model,
        request: UpdateListingRequest,
    ) -> Result<listings::Model, DbErr> {
        let old_price = listing.price;

        let mut active: listings::ActiveModel = listing.into();

        if let Some(title) = request.title {
            active.title = Set(title);
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(condition) = request.condition {
            active.condition = Set(Some(condition));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Some(chrono::Utc::now().naive_utc()));

        let updated = active.update(db).await?;

        if let Some(new_price) = request.price {
            if new_price != old_price {
                // best-effort: l'annonce est déjà à jour, on logge et on continue
                if let Err(e) = NotificationService::notify_price_change(
                    db,
                    updated.id,
                    &updated.title,
                    old_price,
                    new_price,
                    &updated.currency,
                )
                .await
                {
                    eprintln!("⚠️  Failed to send price change notifications: {}", e);
                }
            }
        }

        Ok(updated)
    }

    /// Supprime une annonce et ses lignes dépendantes dans une transaction
    /// L'ordre compte pour l'intégrité référentielle: validations, images,
    /// favoris, messages liés, puis l'annonce elle-même
    pub async fn delete_listing(db: &DatabaseConnection, listing_id: i32) -> Result<(), DbErr> {
        let txn = db.begin().await?;

        listing_validations::Entity::delete_many()
            .filter(listing_validations::Column::ListingId.eq(listing_id))
            .exec(&txn)
            .await?;

        listing_images::Entity::delete_many()
            .filter(listing_images::Column::ListingId.eq(listing_id))
            .exec(&txn)
            .await?;

        favorites::Entity::delete_many()
            .filter(favorites::Column::ListingId.eq(listing_id))
            .exec(&txn)
            .await?;

        messages::Entity::delete_many()
            .filter(messages::Column::ListingId.eq(listing_id))
            .exec(&txn)
            .await?;

        listings::Entity::delete_by_id(listing_id).exec(&txn).await?;

        txn.commit().await?;

        Ok(())
    }

    /// Incrémente le compteur de vues sans relire la ligne
    pub async fn increment_views(db: &DatabaseConnection, listing_id: i32) -> Result<(), DbErr> {
        listings::Entity::update_many()
            .col_expr(
                listings::Column::Views,
                Expr::col(listings::Column::Views).add(1),
            )
            .filter(listings::Column::Id.eq(listing_id))
            .exec(db)
            .await?;

        Ok(())
    }

    /// Images de plusieurs annonces en UNE requête, fusionnées en mémoire
    pub async fn images_for_listings(
        db: &DatabaseConnection,
        listing_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ImageInfo>>, DbErr> {
        if listing_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = listing_images::Entity::find()
            .filter(listing_images::Column::ListingId.is_in(listing_ids.to_vec()))
            .order_by_asc(listing_images::Column::DisplayOrder)
            .all(db)
            .await?;

        let mut images: HashMap<i32, Vec<ImageInfo>> = HashMap::new();
        for row in rows {
            images.entry(row.listing_id).or_default().push(ImageInfo {
                url: row.image_url,
                is_primary: row.is_primary,
                display_order: row.display_order,
            });
        }

        Ok(images)
    }
}

/// Une seule image primaire: celle marquée par le client, sinon la première
fn primary_flags(images: &[ImagePayload]) -> Vec<bool> {
    let primary_index = images.iter().position(|i| i.is_primary).unwrap_or(0);
    (0..images.len()).map(|i| i == primary_index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str, is_primary: bool) -> ImagePayload {
        ImagePayload {
            url: url.to_string(),
            is_primary,
        }
    }

    #[test]
    fn test_primary_flags_first_wins_when_none_flagged() {
        let flags = primary_flags(&[image("a.jpg", false), image("b.jpg", false)]);
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_primary_flags_respects_client_flag() {
        let flags = primary_flags(&[image("a.jpg", false), image("b.jpg", true)]);
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn test_primary_flags_exactly_one_primary() {
        // deux images marquées primaires: seule la première le reste
        let flags = primary_flags(&[
            image("a.jpg", true),
            image("b.jpg", true),
            image("c.jpg", false),
        ]);
        assert_eq!(flags.iter().filter(|&&f| f).count(), 1);
        assert_eq!(flags, vec![true, false, false]);
    }
}
