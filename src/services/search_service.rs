use rust_decimal::Decimal;
use sea_orm::*;
use sea_orm::sea_query::{extension::postgres::PgExpr, Condition, Expr};
use std::collections::{HashMap, HashSet};

use crate::models::dto::{ImageInfo, ListingSummary};
use crate::models::{categories, listings, locations};
use crate::services::listing_service::ListingService;

/// Pas de pagination: les résultats sont plafonnés
pub const SEARCH_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Recent,
    PriceAsc,
    PriceDesc,
    Popular,
}

impl SortKey {
    /// Clé inconnue ou absente: tri par date de création (défaut)
    pub fn parse(value: Option<&str>) -> SortKey {
        match value {
            Some("price_asc") => SortKey::PriceAsc,
            Some("price_desc") => SortKey::PriceDesc,
            Some("popular") => SortKey::Popular,
            _ => SortKey::Recent,
        }
    }
}

#[derive(Debug)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub premium_only: bool,
    pub sort: SortKey,
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            query: None,
            category: None,
            min_price: None,
            max_price: None,
            county: None,
            city: None,
            premium_only: false,
            sort: SortKey::Recent,
        }
    }
}

impl SearchFilters {
    /// Refusé AVANT toute requête SQL
    pub fn validate(&self) -> Result<(), String> {
        if let Some(min) = self.min_price {
            if min < Decimal::ZERO {
                return Err("minPrice cannot be negative".to_string());
            }
        }

        if let Some(max) = self.max_price {
            if max < Decimal::ZERO {
                return Err("maxPrice cannot be negative".to_string());
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err("minPrice cannot be greater than maxPrice".to_string());
            }
        }

        Ok(())
    }
}

pub struct SearchService;

impl SearchService {
    pub async fn search(
        db: &DatabaseConnection,
        filters: &SearchFilters,
    ) -> Result<Vec<ListingSummary>, DbErr> {
        // 1. Résoudre la catégorie (un slug principal couvre aussi ses sous-catégories)
        let category_ids = match &filters.category {
            Some(category_slug) => {
                let ids = Self::category_ids_for_slug(db, category_slug).await?;
                if ids.is_empty() {
                    // slug inconnu: aucun résultat, pas de requête annonces
                    return Ok(Vec::new());
                }
                Some(ids)
            }
            None => None,
        };

        // 2. Assembler la requête (uniquement des annonces ACTIVE)
        let mut query = listings::Entity::find()
            .find_also_related(locations::Entity)
            .filter(listings::Column::Status.eq(listings::STATUS_ACTIVE));

        if let Some(text) = filters.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", text);
            query = query.filter(
                Condition::any()
                    .add(Expr::col((listings::Entity, listings::Column::Title)).ilike(pattern.clone()))
                    .add(Expr::col((listings::Entity, listings::Column::Description)).ilike(pattern)),
            );
        }

        if let Some(ids) = category_ids {
            query = query.filter(listings::Column::CategoryId.is_in(ids));
        }

        if let Some(min) = filters.min_price {
            query = query.filter(listings::Column::Price.gte(min));
        }

        if let Some(max) = filters.max_price {
            query = query.filter(listings::Column::Price.lte(max));
        }

        if let Some(county) = filters.county.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            query = query.filter(locations::Column::County.eq(county));
        }

        if let Some(city) = filters.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            query = query.filter(locations::Column::City.eq(city));
        }

        if filters.premium_only {
            query = query.filter(listings::Column::Premium.eq(true));
        }

        // 3. Tri
        query = match filters.sort {
            SortKey::Recent => query.order_by_desc(listings::Column::CreatedAt),
            SortKey::PriceAsc => query.order_by_asc(listings::Column::Price),
            SortKey::PriceDesc => query.order_by_desc(listings::Column::Price),
            SortKey::Popular => query.order_by_desc(listings::Column::Views),
        };

        // 4. Exécution
        let rows = query.limit(SEARCH_LIMIT).all(db).await?;

        // 5. Images + catégories puis fusion en mémoire
        Self::build_summaries(db, rows).await
    }

    /// Transforme des lignes (annonce, localisation) en résumés API:
    /// les images du jeu de résultats sont chargées en UNE requête,
    /// les slugs de catégories en UNE autre, puis fusionnés en mémoire
    pub async fn build_summaries(
        db: &DatabaseConnection,
        rows: Vec<(listings::Model, Option<locations::Model>)>,
    ) -> Result<Vec<ListingSummary>, DbErr> {
        let listing_ids: Vec<i32> = rows.iter().map(|(listing, _)| listing.id).collect();
        let mut images = ListingService::images_for_listings(db, &listing_ids).await?;

        let category_ids: Vec<i32> = rows
            .iter()
            .map(|(listing, _)| listing.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let category_slugs: HashMap<i32, String> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            categories::Entity::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.slug))
                .collect()
        };

        let results = rows
            .into_iter()
            .map(|(listing, location)| {
                let listing_images = images.remove(&listing.id).unwrap_or_default();
                let primary_image = pick_primary(listing_images);

                ListingSummary {
                    id: listing.id,
                    title: listing.title,
                    slug: listing.slug,
                    price: listing.price,
                    currency: listing.currency,
                    display_price: None,
                    display_currency: None,
                    condition: listing.condition,
                    status: listing.status,
                    premium: listing.premium,
                    views: listing.views,
                    county: location.as_ref().map(|l| l.county.clone()),
                    city: location.map(|l| l.city),
                    category_slug: category_slugs.get(&listing.category_id).cloned(),
                    primary_image,
                    created_at: listing.created_at,
                }
            })
            .collect();

        Ok(results)
    }

    async fn category_ids_for_slug(
        db: &DatabaseConnection,
        category_slug: &str,
    ) -> Result<Vec<i32>, DbErr> {
        let category = categories::Entity::find()
            .filter(categories::Column::Slug.eq(category_slug))
            .one(db)
            .await?;

        match category {
            None => Ok(Vec::new()),
            Some(category) => {
                let mut ids = vec![category.id];

                if category.parent_id.is_none() {
                    let children = categories::Entity::find()
                        .filter(categories::Column::ParentId.eq(category.id))
                        .all(db)
                        .await?;

                    ids.extend(children.into_iter().map(|c| c.id));
                }

                Ok(ids)
            }
        }
    }
}

/// L'image marquée primaire, sinon la première par ordre d'affichage
pub fn pick_primary(images: Vec<ImageInfo>) -> Option<ImageInfo> {
    let primary_position = images.iter().position(|i| i.is_primary);

    match primary_position {
        Some(position) => images.into_iter().nth(position),
        None => images.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse(Some("price_asc")), SortKey::PriceAsc);
        assert_eq!(SortKey::parse(Some("price_desc")), SortKey::PriceDesc);
        assert_eq!(SortKey::parse(Some("popular")), SortKey::Popular);
        assert_eq!(SortKey::parse(Some("recent")), SortKey::Recent);
        assert_eq!(SortKey::parse(Some("garbage")), SortKey::Recent);
        assert_eq!(SortKey::parse(None), SortKey::Recent);
    }

    #[test]
    fn test_validate_rejects_inverted_price_range() {
        let filters = SearchFilters {
            min_price: Some(Decimal::from(500)),
            max_price: Some(Decimal::from(100)),
            ..Default::default()
        };

        assert!(filters.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_prices() {
        let filters = SearchFilters {
            min_price: Some(Decimal::from(-1)),
            ..Default::default()
        };

        assert!(filters.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_equal_bounds() {
        let filters = SearchFilters {
            min_price: Some(Decimal::from(100)),
            max_price: Some(Decimal::from(100)),
            ..Default::default()
        };

        assert!(filters.validate().is_ok());
    }

    #[test]
    fn test_pick_primary_prefers_flagged() {
        let images = vec![
            ImageInfo {
                url: "a.jpg".to_string(),
                is_primary: false,
                display_order: 0,
            },
            ImageInfo {
                url: "b.jpg".to_string(),
                is_primary: true,
                display_order: 1,
            },
        ];

        assert_eq!(pick_primary(images).unwrap().url, "b.jpg");
    }

    #[test]
    fn test_pick_primary_falls_back_to_first() {
        let images = vec![
            ImageInfo {
                url: "a.jpg".to_string(),
                is_primary: false,
                display_order: 0,
            },
            ImageInfo {
                url: "b.jpg".to_string(),
                is_primary: false,
                display_order: 1,
            },
        ];

        assert_eq!(pick_primary(images).unwrap().url, "a.jpg");
    }
}
