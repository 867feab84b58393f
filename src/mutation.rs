use alloc::string::String;

use crate::player::Player;

/// A single relocation, applied locally and replayed on peers.
///
/// The JSON form is internally tagged with an upper-case `type`:
/// `{"type":"MOVE","id":"15","row":0,"col":1,"player":{..}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(tag = "type", rename_all = "UPPERCASE"))]
pub enum Mutation {
    /// Player goes back to the roster list.
    Return {
        id: String,
        #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
        player: Option<Player>,
    },
    /// Player is placed in a grid cell.
    Move {
        id: String,
        row: usize,
        col: usize,
        player: Player,
    },
}

impl Mutation {
    /// Id of the player this mutation relocates.
    pub fn player_id(&self) -> &str {
        match self {
            Mutation::Return { id, .. } | Mutation::Move { id, .. } => id,
        }
    }

    /// Upper-case tag, as used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Return { .. } => "RETURN",
            Mutation::Move { .. } => "MOVE",
        }
    }
}

#[cfg(feature = "std")]
impl Mutation {
    /// Encode as the JSON broadcast payload.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).map_err(|e| anyhow::anyhow!("Mutation encode error: {}", e))
    }

    /// Decode a JSON broadcast payload.
    pub fn from_json(payload: &str) -> anyhow::Result<Self> {
        serde_json::from_str(payload).map_err(|e| anyhow::anyhow!("Malformed mutation payload: {}", e))
    }
}
