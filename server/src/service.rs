use tally_ledger::{Ledger, Recorded};
use tally_types::{BalancesView, Player, Rankings, Roster, Submission};
use tracing::{debug, info, warn};

use crate::{ApiError, Credentials, SessionStore, ValidatedConfig};

pub const SUBMIT_FORBIDDEN: &str = "You are not authorized to submit results.";
pub const RESET_FORBIDDEN: &str = "You are not authorized to reset the tournament.";

/// The settlement service: credentials, sessions and the ledger behind them.
///
/// Handlers in [crate::api] are thin wrappers around these methods.
pub struct Service {
    ledger: Ledger,
    sessions: SessionStore,
    roster: Roster,
    credentials: Credentials,
    organizer: Player,
}

impl Service {
    pub fn new(config: ValidatedConfig, ledger: Ledger) -> Self {
        Self {
            ledger,
            sessions: SessionStore::new(config.session_ttl),
            roster: config.roster,
            credentials: config.credentials,
            organizer: config.organizer,
        }
    }

    pub fn is_organizer(&self, player: &Player) -> bool {
        *player == self.organizer
    }

    /// Check credentials and open a session. Returns the session token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let Some(player) = self.credentials.verify(username, password) else {
            warn!(username, "login failed");
            return Err(ApiError::InvalidCredentials);
        };
        let token = self
            .sessions
            .create(player.clone())
            .ok_or(ApiError::Internal("session store unavailable"))?;
        info!(%player, "logged in");
        Ok(token)
    }

    pub fn logout(&self, token: &str) {
        if self.sessions.remove(token) {
            info!("logged out");
        }
    }

    /// Resolve a session token to the logged in player.
    pub fn authenticate(&self, token: &str) -> Option<Player> {
        let player = self.sessions.resolve(token);
        debug!(found = player.is_some(), "resolved session");
        player
    }

    /// Validate, settle and record one session on behalf of `user`.
    ///
    /// `names` is the finishing order, winner first. An error means nothing
    /// was stored, so the caller may resubmit.
    pub fn submit<S: AsRef<str>>(
        &self,
        user: &Player,
        date: &str,
        names: &[S],
    ) -> Result<Recorded, ApiError> {
        if !self.is_organizer(user) {
            return Err(ApiError::Forbidden(SUBMIT_FORBIDDEN));
        }
        let submission = Submission::new(&self.roster, date, names)?;
        let recorded = self.ledger.record(&submission)?;
        for transfer in &recorded.transfers {
            info!(
                debtor = %transfer.debtor,
                creditor = %transfer.creditor,
                amount = transfer.amount,
                "transfer"
            );
        }
        Ok(recorded)
    }

    pub fn reset(&self, user: &Player) -> Result<(), ApiError> {
        if !self.is_organizer(user) {
            return Err(ApiError::Forbidden(RESET_FORBIDDEN));
        }
        self.ledger.reset()?;
        info!(%user, "reset ledger");
        Ok(())
    }

    pub fn balances(&self) -> Result<BalancesView, ApiError> {
        Ok(self.ledger.balances()?)
    }

    pub fn rankings(&self) -> Result<Rankings, ApiError> {
        Ok(self.ledger.rankings()?)
    }
}
