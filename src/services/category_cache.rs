use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder, ColumnTrait, QueryFilter};
use serde::Serialize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::models::categories;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub children: Vec<CategoryNode>,
}

struct CachedTree {
    fetched_at: Instant,
    tree: Vec<CategoryNode>,
}

/// Cache read-through de l'arbre des catégories
/// Injecté via web::Data, rechargé à l'expiration du TTL
/// et invalidé explicitement quand une catégorie est créée
pub struct CategoryCache {
    ttl: Duration,
    inner: RwLock<Option<CachedTree>>,
}

impl CategoryCache {
    pub fn new(ttl: Duration) -> Self {
        CategoryCache {
            ttl,
            inner: RwLock::new(None),
        }
    }

    pub async fn tree(&self, db: &DatabaseConnection) -> Result<Vec<CategoryNode>, DbErr> {
        // 1. Servir depuis le cache tant que le TTL n'est pas écoulé
        {
            let guard = self.inner.read().unwrap();
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.tree.clone());
                }
            }
        }

        // 2. Recharger depuis la base
        let rows = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(db)
            .await?;

        let tree = build_tree(rows);

        *self.inner.write().unwrap() = Some(CachedTree {
            fetched_at: Instant::now(),
            tree: tree.clone(),
        });

        Ok(tree)
    }

    /// Recherche un noeud par slug (catégorie principale ou sous-catégorie)
    pub async fn find_by_slug(
        &self,
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<categories::Model>, DbErr> {
        categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(db)
            .await
    }

    pub fn invalidate(&self) {
        *self.inner.write().unwrap() = None;
    }
}

/// Assemble l'arbre à 2 niveaux à partir des lignes de la table
/// Une sous-catégorie dont le parent n'existe plus est ignorée
fn build_tree(rows: Vec<categories::Model>) -> Vec<CategoryNode> {
    let (mains, subs): (Vec<_>, Vec<_>) = rows.into_iter().partition(|c| c.parent_id.is_none());

    let mut tree: Vec<CategoryNode> = mains.into_iter().map(node_from).collect();

    for sub in subs {
        if let Some(parent) = tree.iter_mut().find(|n| Some(n.id) == sub.parent_id) {
            parent.children.push(node_from(sub));
        }
    }

    tree
}

fn node_from(category: categories::Model) -> CategoryNode {
    CategoryNode {
        id: category.id,
        name: category.name,
        slug: category.slug,
        icon: category.icon,
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, parent_id: Option<i32>, name: &str, slug: &str) -> categories::Model {
        categories::Model {
            id,
            parent_id,
            name: name.to_string(),
            slug: slug.to_string(),
            icon: None,
        }
    }

    #[test]
    fn test_build_tree_two_levels() {
        let rows = vec![
            category(1, None, "Auto", "auto"),
            category(2, None, "Imobiliare", "imobiliare"),
            category(3, Some(1), "Piese auto", "piese-auto"),
            category(4, Some(2), "Apartamente", "apartamente"),
            category(5, Some(1), "Autoturisme", "autoturisme"),
        ];

        let tree = build_tree(rows);

        assert_eq!(tree.len(), 2);
        let auto = tree.iter().find(|n| n.slug == "auto").unwrap();
        assert_eq!(auto.children.len(), 2);
        let imobiliare = tree.iter().find(|n| n.slug == "imobiliare").unwrap();
        assert_eq!(imobiliare.children.len(), 1);
        assert_eq!(imobiliare.children[0].slug, "apartamente");
    }

    #[test]
    fn test_build_tree_ignores_orphans() {
        let rows = vec![
            category(1, None, "Auto", "auto"),
            category(9, Some(42), "Orphan", "orphan"),
        ];

        let tree = build_tree(rows);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_invalidate_clears_cache() {
        let cache = CategoryCache::new(Duration::from_secs(300));
        *cache.inner.write().unwrap() = Some(CachedTree {
            fetched_at: Instant::now(),
            tree: vec![],
        });

        cache.invalidate();

        assert!(cache.inner.read().unwrap().is_none());
    }
}
