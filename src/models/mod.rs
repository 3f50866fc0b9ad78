// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (comptes classiques + comptes créés via annonce anonyme)
//   - categories : Arbre de catégories (2 niveaux: catégorie principale → sous-catégorie)
//   - locations : Paires (judet, oras) uniques, créées à la demande
//   - listings : Annonces
//   - listing_images : Images des annonces (ordre d'affichage + image principale)
//   - listing_validations : Tokens de validation des annonces anonymes (expire 24h)
//   - messages : Messagerie entre utilisateurs (soft-delete par côté)
//   - favorites : Jointure utilisateur-annonce
//   - notifications : Notifications typées (MESSAGE, FAVORITE, PRICE_CHANGE, ...)
//   - dto : Data Transfer Objects pour les réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod users;
pub mod categories;
pub mod locations;
pub mod listings;
pub mod listing_images;
pub mod listing_validations;
pub mod messages;
pub mod favorites;
pub mod notifications;
pub mod dto;
