//! Seeded generator producing users and products.

use crate::generators::network::{generate_ipv4_public, generate_user_agent};
use crate::generators::person::{generate_address, generate_name, generate_username};
use crate::generators::product::generate_product;
use crate::generators::uuid::generate_uuid_v4;
use chrono::Utc;
use datagen_core::{Identity, Product, User};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generator that produces deterministic fake users and products.
///
/// The generator owns a seeded RNG, so two generators built from the same
/// seed produce identical sequences (timestamps aside).
pub struct FakeDataGenerator {
    rng: StdRng,
    /// Current user index, folded into usernames to keep them unique
    index: u64,
}

impl FakeDataGenerator {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            index: 0,
        }
    }

    /// Get the current user index.
    pub fn current_index(&self) -> u64 {
        self.index
    }

    /// Generate the next user.
    pub fn next_user(&mut self) -> User {
        let index = self.index;
        let name = generate_name(&mut self.rng);
        let username = generate_username(&mut self.rng, &name, index);
        let now = Utc::now();

        let user = User {
            id: generate_uuid_v4(&mut self.rng),
            username,
            first_name: name.first_name,
            last_name: name.last_name,
            gender: name.gender.to_string(),
            address: generate_address(&mut self.rng),
            ip_address: generate_ipv4_public(&mut self.rng),
            created_at: now,
            updated_at: now,
        };

        self.index += 1;
        user
    }

    /// Generate `count` users lazily.
    pub fn users(&mut self, count: u64) -> UserIterator<'_> {
        UserIterator {
            generator: self,
            remaining: count,
        }
    }

    /// Generate the next product.
    pub fn next_product(&mut self) -> Product {
        generate_product(&mut self.rng)
    }

    /// Generate an identity for a user with a random user agent.
    pub fn identity_for(&mut self, user: &User) -> Identity {
        Identity::for_user(user, generate_user_agent(&mut self.rng))
    }
}

/// Iterator that lazily generates users.
pub struct UserIterator<'a> {
    generator: &'a mut FakeDataGenerator,
    remaining: u64,
}

impl Iterator for UserIterator<'_> {
    type Item = User;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.next_user())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for UserIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_generation() {
        let mut gen1 = FakeDataGenerator::new(42);
        let mut gen2 = FakeDataGenerator::new(42);

        let user1 = gen1.next_user();
        let user2 = gen2.next_user();

        assert_eq!(user1.id, user2.id);
        assert_eq!(user1.username, user2.username);
        assert_eq!(user1.address, user2.address);
        assert_eq!(user1.ip_address, user2.ip_address);
        assert_eq!(gen1.next_product(), gen2.next_product());
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut gen1 = FakeDataGenerator::new(1);
        let mut gen2 = FakeDataGenerator::new(2);

        assert_ne!(gen1.next_user().id, gen2.next_user().id);
    }

    #[test]
    fn test_users_iterator_advances_index() {
        let mut generator = FakeDataGenerator::new(42);
        let users: Vec<_> = generator.users(10).collect();

        assert_eq!(users.len(), 10);
        assert_eq!(generator.current_index(), 10);

        let names: std::collections::HashSet<_> = users.iter().map(|u| &u.username).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_identity_carries_user_fields() {
        let mut generator = FakeDataGenerator::new(42);
        let user = generator.next_user();
        let identity = generator.identity_for(&user);

        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, user.username);
        assert_eq!(identity.ip_address, user.ip_address);
        assert!(!identity.user_agent.is_empty());
    }
}
