use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::config::{PlayerDef, SEED_ROSTER};

/// A squad member. Identity is `id`; only `name` ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: String,
    pub number: u32,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<String>, number: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            number,
            name: name.into(),
        }
    }
}

impl From<&PlayerDef> for Player {
    fn from(def: &PlayerDef) -> Self {
        Player::new(def.number.to_string(), def.number, def.name)
    }
}

/// The seeded squad in roster order.
pub fn seed_players() -> Vec<Player> {
    SEED_ROSTER.iter().map(Player::from).collect()
}
