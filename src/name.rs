//! Display name generation
//!
//! Produces a readable fallback name when a client joins without one.

use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "Amber", "Brisk", "Calm", "Daring", "Eager", "Fuzzy", "Gentle", "Hasty",
    "Ivory", "Jolly", "Keen", "Lively", "Mellow", "Nimble", "Polite", "Quiet",
    "Rapid", "Silent", "Tidy", "Witty",
];

const ANIMALS: &[&str] = &[
    "Badger", "Crane", "Dolphin", "Falcon", "Gecko", "Heron", "Ibis", "Jackal",
    "Koala", "Lemur", "Marten", "Narwhal", "Otter", "Puffin", "Quokka", "Raven",
    "Stork", "Tapir", "Vole", "Wombat",
];

/// Generate a random display name like "Quiet Otter"
pub fn generate_display_name() -> String {
    let mut rng = rand::thread_rng();
    // Both slices are non-empty constants, choose() cannot return None
    let adjective = ADJECTIVES.choose(&mut rng).unwrap_or(&"Quiet");
    let animal = ANIMALS.choose(&mut rng).unwrap_or(&"Otter");
    format!("{} {}", adjective, animal)
}
