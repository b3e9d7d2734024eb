//! Catalog products.

use super::pick;
use super::uuid::generate_uuid_v4;
use datagen_core::Product;
use rand::Rng;

/// `(main_category, sub_categories, product nouns)`.
const CATEGORIES: &[(&str, &[&str], &[&str])] = &[
    (
        "appliances",
        &["Kitchen & Home Appliances", "Heating & Cooling Appliances"],
        &["Mixer Grinder", "Air Fryer", "Room Heater", "Tower Fan", "Electric Kettle"],
    ),
    (
        "tv, audio & cameras",
        &["Headphones", "Televisions", "Cameras"],
        &["Wireless Earbuds", "Smart TV", "Soundbar", "Action Camera", "Bluetooth Speaker"],
    ),
    (
        "men's clothing",
        &["T-shirts & Polos", "Jeans", "Shirts"],
        &["Cotton T-Shirt", "Slim Fit Jeans", "Oxford Shirt", "Polo Shirt"],
    ),
    (
        "women's clothing",
        &["Western Wear", "Ethnic Wear", "Lingerie & Nightwear"],
        &["Maxi Dress", "Kurta Set", "Cardigan", "Pyjama Set"],
    ),
    (
        "sports & fitness",
        &["Yoga", "Cardio Equipment", "Running"],
        &["Yoga Mat", "Skipping Rope", "Running Shoes", "Dumbbell Set"],
    ),
    (
        "home & kitchen",
        &["Kitchen & Dining", "Bedroom Linen", "Home Storage"],
        &["Non-Stick Pan", "Bedsheet Set", "Storage Box", "Water Bottle"],
    ),
    (
        "toys & baby products",
        &["Toys & Games", "Baby Products"],
        &["Building Blocks", "Puzzle Set", "Baby Wipes", "Remote Control Car"],
    ),
];

const BRANDS: &[&str] = &[
    "Acme", "Northwind", "Zenith", "Orbit", "Lumen", "Vertex", "Harbor", "Nimbus", "Summit",
];

const ADJECTIVES: &[&str] = &[
    "Classic", "Premium", "Compact", "Ultra", "Everyday", "Pro", "Lite", "Deluxe", "Smart",
];

/// Generate a product with a category-consistent name.
pub fn generate_product<R: Rng + ?Sized>(rng: &mut R) -> Product {
    let (main_category, sub_categories, nouns) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
    let sub_category = pick(rng, sub_categories);
    let name = format!(
        "{} {} {}",
        pick(rng, BRANDS),
        pick(rng, ADJECTIVES),
        pick(rng, nouns)
    );
    // Whole currency units with two decimals, like scraped catalog prices.
    let price = f64::from(rng.gen_range(19_900u32..=9_999_900)) / 100.0;

    Product {
        id: generate_uuid_v4(rng),
        name,
        main_category: main_category.to_string(),
        sub_category: sub_category.to_string(),
        price: Some(price),
    }
}
