//! Prints a PBKDF2 password hash for the `password_hash` field of a player
//! entry in the server configuration.

use anyhow::Result;
use clap::Parser;
use tally_server::auth::{hash_password_with_rounds, DEFAULT_ROUNDS, MIN_ROUNDS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hash a player password for the config file")]
struct Args {
    /// Password to hash
    password: String,

    /// PBKDF2 rounds
    #[arg(
        long,
        default_value_t = DEFAULT_ROUNDS,
        value_parser = clap::value_parser!(u32).range(MIN_ROUNDS as i64..)
    )]
    rounds: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let hash = hash_password_with_rounds(&mut rand::thread_rng(), &args.password, args.rounds)?;
    println!("{hash}");
    Ok(())
}
