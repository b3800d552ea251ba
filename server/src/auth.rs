//! Password hashes and the credential lookup built from configuration.
//!
//! Hashes are PBKDF2-HMAC-SHA256 in PHC string form:
//! `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`.

use pbkdf2::{
    password_hash::{
        rand_core::CryptoRngCore, PasswordHash as PhcHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Params, Pbkdf2,
};
use std::{collections::HashMap, fmt, str::FromStr};
use tally_types::Player;
use thiserror::Error;

/// PBKDF2 rounds used for newly generated hashes
pub const DEFAULT_ROUNDS: u32 = 600_000;

/// Hashes with fewer rounds than this are rejected when parsed
pub const MIN_ROUNDS: u32 = 1_000;

const OUTPUT_LENGTH: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("malformed password hash: {0}")]
    Malformed(String),
    #[error("unsupported algorithm {0} (expected pbkdf2-sha256)")]
    Algorithm(String),
    #[error("{0} rounds is below the minimum of {MIN_ROUNDS}")]
    TooFewRounds(u32),
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// A validated PHC hash string.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

/// Hash `password` under a fresh random salt with [DEFAULT_ROUNDS].
pub fn hash_password<R: CryptoRngCore>(
    rng: &mut R,
    password: &str,
) -> Result<PasswordHash, HashError> {
    hash_password_with_rounds(rng, password, DEFAULT_ROUNDS)
}

/// Hash `password` with an explicit round count.
pub fn hash_password_with_rounds<R: CryptoRngCore>(
    rng: &mut R,
    password: &str,
    rounds: u32,
) -> Result<PasswordHash, HashError> {
    let salt = SaltString::generate(rng);
    let params = Params {
        rounds,
        output_length: OUTPUT_LENGTH,
    };
    let hash = Pbkdf2
        .hash_password_customized(
            password.as_bytes(),
            Some(Algorithm::Pbkdf2Sha256.ident()),
            None,
            params,
            &salt,
        )
        .map_err(|e| HashError::Hashing(e.to_string()))?;
    Ok(PasswordHash(hash.to_string()))
}

impl PasswordHash {
    pub fn verify(&self, password: &str) -> bool {
        match PhcHash::new(&self.0) {
            Ok(hash) => Pbkdf2.verify_password(password.as_bytes(), &hash).is_ok(),
            Err(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PasswordHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hash = PhcHash::new(s).map_err(|e| HashError::Malformed(e.to_string()))?;
        if hash.algorithm != Algorithm::Pbkdf2Sha256.ident() {
            return Err(HashError::Algorithm(hash.algorithm.as_str().to_string()));
        }
        let params = Params::try_from(&hash).map_err(|e| HashError::Malformed(e.to_string()))?;
        if params.rounds < MIN_ROUNDS {
            return Err(HashError::TooFewRounds(params.rounds));
        }
        if hash.salt.is_none() || hash.hash.is_none() {
            return Err(HashError::Malformed("missing salt or hash".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Immutable name to password hash lookup.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    hashes: HashMap<Player, PasswordHash>,
}

impl Credentials {
    pub fn insert(&mut self, player: Player, hash: PasswordHash) {
        self.hashes.insert(player, hash);
    }

    /// Return the player if `username` exists and `password` matches.
    pub fn verify(&self, username: &str, password: &str) -> Option<Player> {
        let (player, hash) = self.hashes.get_key_value(&Player::new(username))?;
        hash.verify(password).then(|| player.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const ROUNDS: u32 = MIN_ROUNDS;

    #[test]
    fn test_hash_and_verify() {
        let mut rng = StdRng::seed_from_u64(42);
        let hash = hash_password_with_rounds(&mut rng, "masterofthefuture", ROUNDS).unwrap();
        assert!(hash.verify("masterofthefuture"));
        assert!(!hash.verify("masterofthepast"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn test_salts_differ() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = hash_password_with_rounds(&mut rng, "gameon", ROUNDS).unwrap();
        let second = hash_password_with_rounds(&mut rng, "gameon", ROUNDS).unwrap();
        assert_ne!(first, second);
        assert!(first.verify("gameon") && second.verify("gameon"));
    }

    #[test]
    fn test_phc_format() {
        let mut rng = StdRng::seed_from_u64(1);
        let hash = hash_password_with_rounds(&mut rng, "letmein", ROUNDS).unwrap();
        let encoded = hash.to_string();
        assert!(encoded.starts_with("$pbkdf2-sha256$i=1000,l=32$"), "{encoded}");

        let parsed: PasswordHash = encoded.parse().unwrap();
        assert_eq!(parsed, hash);
        assert!(parsed.verify("letmein"));
    }

    #[test]
    fn test_default_rounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let hash = hash_password(&mut rng, "securepass").unwrap();
        assert!(hash.as_str().contains("$i=600000,"));
        assert!(hash.verify("securepass"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "plaintext".parse::<PasswordHash>(),
            Err(HashError::Malformed(_))
        ));
        assert!(matches!(
            "$pbkdf2-sha512$i=600000,l=32$NOLYZLEjSLxGNFDLiVqolw$Q7OF1Ke9Vj4RIVTx+NCtC+p4D1IMpkOy98/OebmKoG8"
                .parse::<PasswordHash>(),
            Err(HashError::Algorithm(alg)) if alg == "pbkdf2-sha512"
        ));

        let mut rng = StdRng::seed_from_u64(2);
        let weak = hash_password_with_rounds(&mut rng, "pass1234", 10).unwrap();
        assert_eq!(
            weak.as_str().parse::<PasswordHash>(),
            Err(HashError::TooFewRounds(10))
        );
    }

    #[test]
    fn test_credentials_verify() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut credentials = Credentials::default();
        credentials.insert(
            "Jay".into(),
            hash_password_with_rounds(&mut rng, "pass1234", ROUNDS).unwrap(),
        );

        assert_eq!(
            credentials.verify("Jay", "pass1234"),
            Some(Player::from("Jay"))
        );
        assert_eq!(credentials.verify("Jay", "pass12345"), None);
        assert_eq!(credentials.verify("Mallory", "pass1234"), None);
    }
}
