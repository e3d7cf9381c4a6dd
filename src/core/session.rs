//! Per-user conversation session state.
//!
//! Each state variant carries only the data that state needs, so reading
//! a partial request from the wrong state is unrepresentable. Sessions
//! are keyed per user in a sharded map: one user's dialogue never
//! contends on another user's lock.

use dashmap::DashMap;

use crate::domain::{CurrencyCode, UserId};

/// Where a user currently is in a multi-turn dialogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// No dialogue in progress; also the terminal state.
    #[default]
    Idle,
    /// Waiting for `<amount> <code>` to start a conversion.
    AwaitingAmount,
    /// Amount and source collected; waiting for the target currency.
    AwaitingTargetCurrency { amount: f64, from: CurrencyCode },
    /// Favorite-driven flow: waiting for the source currency.
    AwaitingFavoriteSource,
    /// Favorite-driven flow: waiting for the target currency.
    AwaitingFavoriteTarget { from: CurrencyCode },
    /// Favorite-driven flow: waiting for the amount.
    AwaitingFavoriteAmount {
        from: CurrencyCode,
        to: CurrencyCode,
    },
    /// Waiting for `<expr> <from> to <to>`.
    AwaitingCalcExpression,
    /// Waiting for `<code> <|> <threshold>`.
    AwaitingAlertCondition,
}

impl SessionState {
    /// Whether the dialogue may move from `self` to `next`.
    ///
    /// Cancellation (any state back to `Idle`) and explicit restarts
    /// (any state to `AwaitingAmount`, which discards the prior partial
    /// request) are always allowed; everything else must follow one of
    /// the collection flows. Retries stay in place and are not
    /// transitions.
    #[must_use]
    pub fn allows(&self, next: &SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            // Escape hatches available from every state.
            (_, Idle) | (_, AwaitingAmount) => true,
            // Flow entry points.
            (Idle, AwaitingFavoriteSource)
            | (Idle, AwaitingCalcExpression)
            | (Idle, AwaitingAlertCondition)
            // Direct `100 USD` shortcut from Idle.
            | (Idle, AwaitingTargetCurrency { .. }) => true,
            // Step-by-step collection.
            (AwaitingAmount, AwaitingTargetCurrency { .. })
            | (AwaitingFavoriteSource, AwaitingFavoriteTarget { .. })
            | (AwaitingFavoriteTarget { .. }, AwaitingFavoriteAmount { .. }) => true,
            _ => false,
        }
    }
}

/// Sharded per-user session storage.
///
/// Sessions are created lazily on first interaction and removed when a
/// dialogue completes or is cancelled. No TTL is enforced for abandoned
/// sessions; an accepted limitation.
#[derive(Default)]
pub struct SessionMap {
    sessions: DashMap<UserId, SessionState>,
}

impl SessionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a user, `Idle` if none exists.
    #[must_use]
    pub fn state(&self, user: UserId) -> SessionState {
        self.sessions
            .get(&user)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Move a user to a new state.
    ///
    /// Illegal transitions indicate an engine bug, not bad user input:
    /// user input that fails validation never reaches this method.
    pub fn transition(&self, user: UserId, next: SessionState) {
        debug_assert!(
            self.state(user).allows(&next),
            "illegal session transition: {:?} -> {:?}",
            self.state(user),
            next
        );
        if next == SessionState::Idle {
            self.sessions.remove(&user);
        } else {
            self.sessions.insert(user, next);
        }
    }

    /// Discard a user's session entirely.
    pub fn clear(&self, user: UserId) {
        self.sessions.remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn default_state_is_idle() {
        let sessions = SessionMap::new();
        assert_eq!(sessions.state(UserId(1)), SessionState::Idle);
    }

    #[test]
    fn transitions_are_per_user() {
        let sessions = SessionMap::new();
        sessions.transition(UserId(1), SessionState::AwaitingAmount);
        assert_eq!(sessions.state(UserId(1)), SessionState::AwaitingAmount);
        assert_eq!(sessions.state(UserId(2)), SessionState::Idle);
    }

    #[test]
    fn idle_transition_removes_session() {
        let sessions = SessionMap::new();
        sessions.transition(UserId(1), SessionState::AwaitingAmount);
        sessions.transition(UserId(1), SessionState::Idle);
        assert_eq!(sessions.state(UserId(1)), SessionState::Idle);
    }

    #[test]
    fn allowed_transition_table() {
        use SessionState::*;
        let target = AwaitingTargetCurrency {
            amount: 100.0,
            from: code("USD"),
        };
        assert!(Idle.allows(&AwaitingAmount));
        assert!(Idle.allows(&target));
        assert!(AwaitingAmount.allows(&target));
        assert!(target.allows(&Idle));
        assert!(AwaitingFavoriteSource.allows(&AwaitingFavoriteTarget { from: code("USD") }));
        assert!(
            AwaitingFavoriteTarget { from: code("USD") }.allows(&AwaitingFavoriteAmount {
                from: code("USD"),
                to: code("EUR"),
            })
        );
        // Cancel and restart are always allowed.
        assert!(AwaitingCalcExpression.allows(&Idle));
        assert!(AwaitingAlertCondition.allows(&AwaitingAmount));
        // Skipping collection steps is not.
        assert!(!Idle.allows(&AwaitingFavoriteTarget { from: code("USD") }));
        assert!(!AwaitingAmount.allows(&AwaitingFavoriteAmount {
            from: code("USD"),
            to: code("EUR"),
        }));
    }
}
