use actix_web::{get, web, HttpResponse};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::routes::listings::apply_display_currency;
use crate::services::currency_service::{Currency, CurrencyConverter};
use crate::services::search_service::{SearchFilters, SearchService, SortKey};

// Les noms de paramètres gardent le camelCase du frontend
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,

    pub category: Option<String>,

    #[serde(alias = "minPrice")]
    pub min_price: Option<Decimal>,

    #[serde(alias = "maxPrice")]
    pub max_price: Option<Decimal>,

    pub county: Option<String>,

    pub city: Option<String>,

    #[serde(default)]
    pub premium: bool,

    pub sort: Option<String>,

    pub display_currency: Option<String>,
}

/// GET /api/search - Recherche d'annonces actives (PUBLIC)
#[get("")]
pub async fn search_listings(
    query: web::Query<SearchQuery>,
    db: web::Data<DatabaseConnection>,
    converter: web::Data<CurrencyConverter>,
) -> HttpResponse {
    let query = query.into_inner();

    let display = match query.display_currency.as_deref() {
        None => None,
        Some(code) => match Currency::from_code(code) {
            Some(currency) => Some(currency),
            None => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Invalid display currency. Must be one of: RON, EUR, USD, GBP"
                }));
            }
        },
    };

    let filters = SearchFilters {
        query: query.q,
        category: query.category,
        min_price: query.min_price,
        max_price: query.max_price,
        county: query.county,
        city: query.city,
        premium_only: query.premium,
        sort: SortKey::parse(query.sort.as_deref()),
    };

    // Bornes de prix refusées avant toute requête SQL
    if let Err(message) = filters.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": message
        }));
    }

    match SearchService::search(db.get_ref(), &filters).await {
        Ok(mut results) => {
            if let Some(target) = display {
                apply_display_currency(converter.get_ref(), &mut results, target);
            }

            HttpResponse::Ok().json(serde_json::json!({
                "count": results.len(),
                "results": results
            }))
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Search failed: {}", e)
        })),
    }
}

pub fn search_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/search")
            .service(search_listings)
    );
}
