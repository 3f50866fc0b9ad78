pub mod admin;
pub mod auth;
pub mod categories;
pub mod favorites;
pub mod health;
pub mod listings;
pub mod messages;
pub mod notifications;
pub mod search;
pub mod upload;
pub mod users;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(users::users_routes)
            .configure(listings::listings_routes)
            .configure(search::search_routes)
            .configure(categories::categories_routes)
            .configure(messages::messages_routes)
            .configure(favorites::favorites_routes)
            .configure(notifications::notifications_routes)
            .configure(upload::upload_routes)
            .configure(admin::admin_routes)
    );
}
