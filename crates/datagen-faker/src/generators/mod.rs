//! Individual value generators.
//!
//! Each generator draws from the RNG it is handed and keeps no state of its
//! own.

pub mod network;
pub mod person;
pub mod product;
pub mod uuid;

use rand::Rng;

/// Pick one entry from a non-empty static word list.
pub(crate) fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words[rng.gen_range(0..words.len())]
}
