pub mod category_cache;
pub mod currency_service;
pub mod email_service;
pub mod listing_service;
pub mod notification_service;
pub mod search_service;
