//! Fake data for the e-commerce activity generator.
//!
//! This crate produces deterministic users, identities and products. Every
//! generator takes an explicit RNG; there is no process-wide random state, so
//! the same seed always yields the same data.
//!
//! # Architecture
//!
//! ```text
//!   seed (u64)
//!       │
//!       ▼
//! ┌───────────────────┐        ┌──────────────────────┐
//! │ FakeDataGenerator │──────▶ │ GeneratedCatalog     │
//! │  - rng (StdRng)   │ pools  │  impl Catalog        │
//! │  - index          │        │  (users + products)  │
//! └─────────┬─────────┘        └──────────────────────┘
//!           │
//!           ▼
//!     User / Product
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_faker::FakeDataGenerator;
//!
//! let mut generator = FakeDataGenerator::new(42);
//! let user = generator.next_user();
//! assert!(!user.username.is_empty());
//! ```

pub mod catalog;
pub mod generator;
pub mod generators;

// Re-exports for convenience
pub use catalog::GeneratedCatalog;
pub use generator::{FakeDataGenerator, UserIterator};
