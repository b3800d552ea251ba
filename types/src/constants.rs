/// Fewest players a recorded session may have
pub const MIN_PLAYERS: usize = 2;

/// Most players a recorded session may have
pub const MAX_PLAYERS: usize = 6;

/// Paid by last place to first place
pub const FIRST_BOUNTY: u64 = 300;

/// Paid by second-to-last place to second place
pub const SECOND_BOUNTY: u64 = 200;

/// Paid by third-to-last place to third place (six players only)
pub const THIRD_BOUNTY: u64 = 100;

/// Format accepted for session dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";
