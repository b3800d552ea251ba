use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr, time::Duration};
use tally_types::{Player, Roster, ValidationError};
use thiserror::Error;
use tracing::Level;

pub mod api;
pub mod auth;
pub mod error;
pub mod service;
pub mod session;

pub use api::Api;
pub use auth::{Credentials, PasswordHash};
pub use error::ApiError;
pub use service::Service;
pub use session::SessionStore;

/// Configuration for the [service::Service], as read from YAML.
#[derive(Deserialize, Serialize)]
pub struct Config {
    pub port: u16,
    pub database: String,
    pub log_level: String,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    pub players: Vec<PlayerConfig>,
}

/// One roster entry. Exactly one player must be the organizer.
#[derive(Deserialize, Serialize)]
pub struct PlayerConfig {
    pub name: String,
    pub password_hash: String,
    #[serde(default)]
    pub organizer: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("player name must not be empty")]
    EmptyPlayerName,
    #[error("invalid roster: {0}")]
    InvalidRoster(#[from] ValidationError),
    #[error("password_hash for {player} is invalid")]
    InvalidPasswordHash { player: String },
    #[error("no player is marked as organizer")]
    NoOrganizer,
    #[error("only one organizer is allowed ({first} and {second} are both marked)")]
    MultipleOrganizers { first: String, second: String },
}

pub struct ValidatedConfig {
    pub port: u16,
    pub database: PathBuf,
    pub log_level: Level,
    pub session_ttl: Duration,

    pub roster: Roster,
    pub credentials: Credentials,
    pub organizer: Player,
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        if self.session_ttl_secs == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "session_ttl_secs",
                value: self.session_ttl_secs,
            });
        }

        if self.players.iter().any(|p| p.name.trim().is_empty()) {
            return Err(ConfigError::EmptyPlayerName);
        }
        let roster = Roster::new(self.players.iter().map(|p| p.name.clone()))?;

        let mut organizer: Option<Player> = None;
        let mut credentials = Credentials::default();
        for player in self.players {
            let hash = PasswordHash::from_str(&player.password_hash).map_err(|_| {
                ConfigError::InvalidPasswordHash {
                    player: player.name.clone(),
                }
            })?;
            let name = Player::new(player.name);
            if player.organizer {
                if let Some(first) = &organizer {
                    return Err(ConfigError::MultipleOrganizers {
                        first: first.to_string(),
                        second: name.to_string(),
                    });
                }
                organizer = Some(name.clone());
            }
            credentials.insert(name, hash);
        }
        let organizer = organizer.ok_or(ConfigError::NoOrganizer)?;

        Ok(ValidatedConfig {
            port: self.port,
            database: PathBuf::from(self.database),
            log_level,
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            roster,
            credentials,
            organizer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn hash(password: &str) -> String {
        let mut rng = StdRng::seed_from_u64(7);
        auth::hash_password_with_rounds(&mut rng, password, auth::MIN_ROUNDS)
            .unwrap()
            .to_string()
    }

    fn config(players: &[(&str, bool)]) -> Config {
        Config {
            port: 8080,
            database: "tally.db".to_string(),
            log_level: "info".to_string(),
            session_ttl_secs: default_session_ttl_secs(),
            players: players
                .iter()
                .map(|(name, organizer)| PlayerConfig {
                    name: name.to_string(),
                    password_hash: hash("secret"),
                    organizer: *organizer,
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_config() {
        let validated = config(&[("Jay", true), ("Yash", false)]).validate().unwrap();
        assert_eq!(validated.organizer, Player::from("Jay"));
        assert_eq!(validated.roster.len(), 2);
        assert_eq!(validated.log_level, Level::INFO);
        assert_eq!(validated.session_ttl, Duration::from_secs(86_400));
        assert_eq!(
            validated.credentials.verify("Yash", "secret"),
            Some(Player::from("Yash"))
        );
    }

    #[test]
    fn test_validate_requires_single_organizer() {
        assert!(matches!(
            config(&[("Jay", false), ("Yash", false)]).validate(),
            Err(ConfigError::NoOrganizer)
        ));
        assert!(matches!(
            config(&[("Jay", true), ("Yash", true)]).validate(),
            Err(ConfigError::MultipleOrganizers { first, second })
                if first == "Jay" && second == "Yash"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        assert!(matches!(
            config(&[("Jay", true), ("Jay", false)]).validate(),
            Err(ConfigError::InvalidRoster(
                ValidationError::DuplicateRosterEntry(_)
            ))
        ));
        assert!(matches!(
            config(&[("Jay", true), (" ", false)]).validate(),
            Err(ConfigError::EmptyPlayerName)
        ));

        let mut bad_level = config(&[("Jay", true)]);
        bad_level.log_level = "loud".to_string();
        assert!(matches!(
            bad_level.validate(),
            Err(ConfigError::InvalidLogLevel { value }) if value == "loud"
        ));

        let mut bad_ttl = config(&[("Jay", true)]);
        bad_ttl.session_ttl_secs = 0;
        assert!(matches!(
            bad_ttl.validate(),
            Err(ConfigError::InvalidNonZero { field: "session_ttl_secs", .. })
        ));

        let mut bad_hash = config(&[("Jay", true)]);
        bad_hash.players[0].password_hash = "plaintext".to_string();
        assert!(matches!(
            bad_hash.validate(),
            Err(ConfigError::InvalidPasswordHash { player }) if player == "Jay"
        ));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = format!(
            "port: 9000\n\
             database: /tmp/tally.db\n\
             log_level: debug\n\
             players:\n  \
               - name: Jay\n    password_hash: \"{}\"\n    organizer: true\n  \
               - name: Yash\n    password_hash: \"{}\"\n",
            hash("a"),
            hash("b"),
        );
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.session_ttl_secs, 86_400);
        assert!(!config.players[1].organizer);

        let validated = config.validate().unwrap();
        assert_eq!(validated.port, 9000);
        assert_eq!(validated.database, PathBuf::from("/tmp/tally.db"));
        assert_eq!(validated.log_level, Level::DEBUG);
    }

    #[test]
    fn test_example_config() {
        let config: Config = serde_yaml::from_str(include_str!("../tally.example.yaml")).unwrap();
        let validated = config.validate().unwrap();
        assert_eq!(validated.roster.len(), 6);
        assert_eq!(validated.organizer, Player::from("Jay"));
        assert_eq!(
            validated.credentials.verify("Jay", "masterofthefuture"),
            Some(Player::from("Jay"))
        );
        assert_eq!(
            validated.credentials.verify("Krishna", "gameon"),
            Some(Player::from("Krishna"))
        );
        assert_eq!(validated.credentials.verify("Krishna", "gameoff"), None);
    }
}
