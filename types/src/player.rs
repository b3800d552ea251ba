use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

use crate::ValidationError;

/// A registered player, identified by name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Player(String);

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Player {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The fixed set of players allowed to appear in a finishing order.
///
/// Built once at startup from configuration and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    players: BTreeSet<Player>,
}

impl Roster {
    pub fn new<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut players = BTreeSet::new();
        for name in names {
            let player = Player::new(name);
            if players.contains(&player) {
                return Err(ValidationError::DuplicateRosterEntry(player.0));
            }
            players.insert(player);
        }
        if players.is_empty() {
            return Err(ValidationError::EmptyRoster);
        }
        Ok(Self { players })
    }

    /// Resolve a submitted name to a roster member.
    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.get(&Player::new(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
