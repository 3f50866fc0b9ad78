use sea_orm::*;
use rust_decimal::Decimal;

use crate::models::{favorites, notifications};

pub struct NotificationService;

impl NotificationService {
    /// Insère une notification pour un utilisateur
    pub async fn notify<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        notification_type: &str,
        content: String,
    ) -> Result<(), DbErr> {
        let notification = notifications::ActiveModel {
            user_id: Set(user_id),
            notification_type: Set(notification_type.to_string()),
            content: Set(content),
            read: Set(false),
            created_at: Set(Some(chrono::Utc::now().naive_utc())),
            ..Default::default()
        };

        notification.insert(db).await?;
        Ok(())
    }

    pub async fn notify_new_message<C: ConnectionTrait>(
        db: &C,
        receiver_id: i32,
        sender_name: &str,
    ) -> Result<(), DbErr> {
        Self::notify(
            db,
            receiver_id,
            notifications::TYPE_MESSAGE,
            format!("New message from {}", sender_name),
        )
        .await
    }

    pub async fn notify_favorited<C: ConnectionTrait>(
        db: &C,
        owner_id: i32,
        listing_title: &str,
    ) -> Result<(), DbErr> {
        Self::notify(
            db,
            owner_id,
            notifications::TYPE_FAVORITE,
            format!("Someone added \"{}\" to their favorites", listing_title),
        )
        .await
    }

    pub async fn notify_status_update<C: ConnectionTrait>(
        db: &C,
        owner_id: i32,
        listing_title: &str,
        status: &str,
    ) -> Result<(), DbErr> {
        Self::notify(
            db,
            owner_id,
            notifications::TYPE_STATUS_UPDATE,
            format!("Your listing \"{}\" is now {}", listing_title, status),
        )
        .await
    }

    /// Prévient tous les utilisateurs qui ont l'annonce en favori
    pub async fn notify_price_change(
        db: &DatabaseConnection,
        listing_id: i32,
        listing_title: &str,
        old_price: Decimal,
        new_price: Decimal,
        currency: &str,
    ) -> Result<(), DbErr> {
        let favoriters = favorites::Entity::find()
            .filter(favorites::Column::ListingId.eq(listing_id))
            .all(db)
            .await?;

        for favorite in favoriters {
            Self::notify(
                db,
                favorite.user_id,
                notifications::TYPE_PRICE_CHANGE,
                format!(
                    "Price for \"{}\" changed from {} {} to {} {}",
                    listing_title, old_price, currency, new_price, currency
                ),
            )
            .await?;
        }

        Ok(())
    }
}
