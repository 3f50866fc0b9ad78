// ============================================================================
// MODÈLE : LISTING VALIDATIONS
// ============================================================================
//
// Description:
//   Tokens de validation des annonces soumises par des visiteurs non
//   authentifiés. Une annonce anonyme reste PENDING tant que le lien
//   envoyé par email n'a pas été ouvert.
//
// Colonnes de la table listing_validations:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - listing_id (INTEGER, NOT NULL, FK vers listings)
//   - token (VARCHAR, UNIQUE, NOT NULL) - UUID v4
//   - expires_at (TIMESTAMP, NOT NULL) - created_at + 24 heures
//   - validated (BOOLEAN, DEFAULT FALSE, NOT NULL)
//   - created_at (TIMESTAMP, DEFAULT CURRENT_TIMESTAMP)
//
// Workflow:
//   1. Visiteur soumet une annonce via POST /api/listings (sans session)
//   2. Backend crée l'annonce avec status = PENDING
//   3. Backend génère un token UUID v4 et l'insère dans cette table
//   4. Backend envoie un email avec le lien contenant le token
//   5. Visiteur clique sur le lien
//   6. Frontend appelle GET /api/listings/validate?token=xxx
//   7. Backend vérifie: token existe, not expired
//   8. Backend met validated = true et l'annonce passe PENDING → ACTIVE
//
// Points d'attention:
//   - Soumission authentifiée: la ligne est créée avec validated = true
//     et l'annonce est ACTIVE immédiatement (pas d'email)
//   - Token expire après 24 heures (86400 secondes)
//   - Revalider un token déjà validé est un succès idempotent
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing_validations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub listing_id: i32,

    #[sea_orm(unique)]
    pub token: String,

    pub expires_at: DateTime,

    pub validated: bool,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listings::Entity",
        from = "Column::ListingId",
        to = "super::listings::Column::Id"
    )]
    Listing,
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
