use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

use crate::{Player, Roster, ValidationError, DATE_FORMAT, MAX_PLAYERS, MIN_PLAYERS};

/// Calendar date a session was played on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionDate(NaiveDate);

impl FromStr for SessionDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for SessionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Players of one session ordered from first place to last.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FinishingOrder {
    players: Vec<Player>,
}

impl FinishingOrder {
    /// Validate submitted names against the roster.
    ///
    /// Membership is checked first, then the player count, then duplicates.
    /// The submitted order is kept as is.
    pub fn new<I, S>(roster: &Roster, names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut players = Vec::new();
        for name in names {
            let name = name.as_ref();
            let player = roster
                .get(name)
                .ok_or_else(|| ValidationError::UnknownPlayer(name.to_string()))?;
            players.push(player.clone());
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(ValidationError::PlayerCount(players.len()));
        }

        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if !seen.insert(player) {
                return Err(ValidationError::DuplicatePlayer(player.to_string()));
            }
        }

        Ok(Self { players })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player at a 0-based rank (0 = winner).
    pub fn at(&self, rank: usize) -> Option<&Player> {
        self.players.get(rank)
    }
}

/// A validated submission, ready to be recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub date: SessionDate,
    pub order: FinishingOrder,
}

impl Submission {
    pub fn new<I, S>(roster: &Roster, date: &str, names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let order = FinishingOrder::new(roster, names)?;
        let date = date.parse()?;
        Ok(Self { date, order })
    }
}

/// A recorded session as read back from storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub id: i64,
    pub date: SessionDate,
    pub players: Vec<Player>,
}
