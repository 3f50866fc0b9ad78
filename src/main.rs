mod data;
mod db;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use actix_web::{web, App, HttpServer};
use std::env;
use std::time::Duration;

use services::category_cache::CategoryCache;
use services::currency_service::CurrencyConverter;
use services::email_service::EmailService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    println!("🔌 Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "public/uploads".to_string());
    std::fs::create_dir_all(&upload_dir)?;

    // Cache read-through des catégories (TTL 5 minutes)
    let category_cache = web::Data::new(CategoryCache::new(Duration::from_secs(300)));
    let currency_converter = web::Data::new(CurrencyConverter::new());
    let email_service = web::Data::new(EmailService::from_env());

    println!("🚀 Starting server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(category_cache.clone())
            .app_data(currency_converter.clone())
            .app_data(email_service.clone())
            .configure(routes::configure_routes)
            // Les images uploadées sont servies statiquement
            .service(actix_files::Files::new("/uploads", upload_dir.clone()))
    })
        .bind((host, port))?
        .run()
        .await
}
