//! In-memory catalog backed by generated users and products.
//!
//! Used for dry runs (no database) and as the catalog collaborator in tests.

use crate::generator::FakeDataGenerator;
use crate::generators::network::generate_user_agent;
use async_trait::async_trait;
use datagen_core::{Catalog, CatalogError, Identity, Product, User};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A fixed pool of users and products sampled with the caller's RNG.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCatalog {
    users: Vec<User>,
    products: Vec<Product>,
}

impl GeneratedCatalog {
    /// Generate `user_count` users and `product_count` products from `seed`.
    pub fn generate(seed: u64, user_count: u64, product_count: u64) -> Self {
        let mut generator = FakeDataGenerator::new(seed);
        let users = generator.users(user_count).collect();
        let products = (0..product_count).map(|_| generator.next_product()).collect();
        Self { users, products }
    }

    /// Build a catalog from explicit pools.
    pub fn from_parts(users: Vec<User>, products: Vec<Product>) -> Self {
        Self { users, products }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

#[async_trait]
impl Catalog for GeneratedCatalog {
    async fn sample_identity(&self, rng: &mut StdRng) -> Result<Identity, CatalogError> {
        let user = self
            .users
            .choose(rng)
            .ok_or_else(|| CatalogError::Empty("users".to_string()))?;
        Ok(Identity::for_user(user, generate_user_agent(rng)))
    }

    async fn sample_products(
        &self,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<Product>, CatalogError> {
        if self.products.is_empty() {
            return Err(CatalogError::Empty("products".to_string()));
        }
        Ok(self.products.choose_multiple(rng, count).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_sample_identity_from_pool() {
        let catalog = GeneratedCatalog::generate(42, 5, 5);
        let mut rng = StdRng::seed_from_u64(1);

        let identity = catalog.sample_identity(&mut rng).await.unwrap();
        assert!(catalog
            .users()
            .iter()
            .any(|u| u.id == identity.user_id && u.username == identity.username));
    }

    #[tokio::test]
    async fn test_sample_products_without_replacement() {
        let catalog = GeneratedCatalog::generate(42, 1, 20);
        let mut rng = StdRng::seed_from_u64(1);

        let sample = catalog.sample_products(10, &mut rng).await.unwrap();
        assert_eq!(sample.len(), 10);
        let ids: std::collections::HashSet<_> = sample.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn test_sample_larger_than_pool_returns_pool() {
        let catalog = GeneratedCatalog::generate(42, 1, 3);
        let mut rng = StdRng::seed_from_u64(1);

        let sample = catalog.sample_products(10, &mut rng).await.unwrap();
        assert_eq!(sample.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_pools_are_errors() {
        let catalog = GeneratedCatalog::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            catalog.sample_identity(&mut rng).await,
            Err(CatalogError::Empty("users".to_string()))
        );
        assert!(matches!(
            catalog.sample_products(3, &mut rng).await,
            Err(CatalogError::Empty(_))
        ));
    }

    #[tokio::test]
    async fn test_same_seed_same_sample() {
        let catalog = GeneratedCatalog::generate(42, 10, 30);

        let mut rng1 = StdRng::seed_from_u64(9);
        let mut rng2 = StdRng::seed_from_u64(9);

        let a = catalog.sample_products(5, &mut rng1).await.unwrap();
        let b = catalog.sample_products(5, &mut rng2).await.unwrap();
        assert_eq!(a, b);
    }
}
