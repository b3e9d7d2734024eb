//! Names, usernames and postal addresses.

use super::pick;
use rand::Rng;

const MALE_FIRST_NAMES: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Daniel", "Matthew", "Anthony", "Mark", "Steven", "Andrew", "Joshua", "Kevin",
    "Brian", "George", "Edward", "Ronald", "Timothy", "Jason", "Jeffrey", "Ryan", "Jacob",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Barbara", "Susan", "Jessica", "Sarah",
    "Karen", "Lisa", "Nancy", "Betty", "Margaret", "Sandra", "Ashley", "Emily", "Donna",
    "Michelle", "Carol", "Amanda", "Melissa", "Deborah", "Stephanie", "Rebecca", "Laura",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
];

const STREET_NAMES: &[&str] = &[
    "Maple", "Oak", "Cedar", "Pine", "Elm", "Washington", "Lake", "Hill", "Park", "Sunset",
    "Highland", "Ridge", "River", "Meadow", "Forest", "Spring", "Church", "Mill", "Walnut",
];

const STREET_SUFFIXES: &[&str] = &[
    "Street", "Avenue", "Road", "Lane", "Drive", "Court", "Way", "Boulevard", "Place",
];

const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Portland", "OR"),
    ("Austin", "TX"),
    ("Columbus", "OH"),
    ("Denver", "CO"),
    ("Madison", "WI"),
    ("Raleigh", "NC"),
    ("Tucson", "AZ"),
    ("Omaha", "NE"),
    ("Albany", "NY"),
    ("Savannah", "GA"),
    ("Boise", "ID"),
];

/// A first/last name pair chosen to match a gender marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub gender: &'static str,
    pub first_name: String,
    pub last_name: String,
}

/// Generate a gender marker (`M` or `F`) and a matching name.
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> PersonName {
    let (gender, first_names) = if rng.gen_bool(0.5) {
        ("M", MALE_FIRST_NAMES)
    } else {
        ("F", FEMALE_FIRST_NAMES)
    };

    PersonName {
        gender,
        first_name: pick(rng, first_names).to_string(),
        last_name: pick(rng, LAST_NAMES).to_string(),
    }
}

/// Generate a lowercase ASCII username derived from a name.
///
/// The row index is folded in so usernames stay unique across a population.
pub fn generate_username<R: Rng + ?Sized>(rng: &mut R, name: &PersonName, index: u64) -> String {
    let first = name.first_name.to_ascii_lowercase();
    let last = name.last_name.to_ascii_lowercase();
    let initial = first.chars().next().unwrap_or('x');

    match rng.gen_range(0..4) {
        0 => format!("{first}.{last}{index}"),
        1 => format!("{initial}{last}{index}"),
        2 => format!("{last}.{first}{index}"),
        _ => format!("{first}{}_{index}", rng.gen_range(10..100)),
    }
}

/// Generate a single-line US-style postal address.
pub fn generate_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number = rng.gen_range(1..9999);
    let street = pick(rng, STREET_NAMES);
    let suffix = pick(rng, STREET_SUFFIXES);
    let (city, state) = CITIES[rng.gen_range(0..CITIES.len())];
    let zip = rng.gen_range(10000..99999);

    format!("{number} {street} {suffix}, {city}, {state} {zip}")
}
