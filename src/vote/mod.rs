//! Vote reconciliation for posts and comments.
//!
//! Each click is applied to the local [`VoteBoard`] immediately (the
//! optimistic prediction), then confirmed against the server. The server's
//! counts always win: a confirmation overwrites the prediction, a failure
//! rolls the target back to its pre-click snapshot, and a response that has
//! been overtaken by a newer click is discarded. Requests carry a per-target
//! monotonic sequence number so overlapping confirmations cannot clobber the
//! last user intent.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::api::{ApiError, TreeHoleApi};
use crate::models::{VoteKind, VoteOutcome, VoteState, VoteTarget};
use crate::notify::Notifier;

pub const LOGIN_PROMPT: &str = "Please log in to vote.";
pub const VOTE_FAILED: &str = "Vote failed. Please try again.";
pub const NETWORK_FAILED: &str = "Network error. Please try again.";

/// Apply one click to a vote state.
///
/// Clicking the active direction toggles the vote off; clicking from no vote
/// adds one; clicking the opposite direction switches, reclaiming the old
/// vote's point for a net swing of two.
pub fn transition(state: VoteState, intent: VoteKind) -> VoteState {
    match state.user_vote {
        Some(current) if current == intent => {
            VoteState::new(state.score - intent.delta(), None)
        }
        // Switching: the previous vote is the opposite kind by elimination.
        Some(_) => VoteState::new(
            state.score + intent.delta() - intent.opposite().delta(),
            Some(intent),
        ),
        None => VoteState::new(state.score + intent.delta(), Some(intent)),
    }
}

/// Visual weight of the displayed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

/// What the UI shows for one target. A pure projection of [`VoteState`]:
/// at most one button is active because `user_vote` holds at most one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreView {
    pub score_text: String,
    pub tone: Tone,
    pub upvote_active: bool,
    pub downvote_active: bool,
    /// A request is in flight; the UI should keep the buttons disabled.
    pub pending: bool,
}

fn project(state: &VoteState, pending: bool) -> ScoreView {
    ScoreView {
        score_text: state.score.to_string(),
        tone: match state.score {
            s if s > 0 => Tone::Positive,
            s if s < 0 => Tone::Negative,
            _ => Tone::Neutral,
        },
        upvote_active: state.user_vote == Some(VoteKind::Upvote),
        downvote_active: state.user_vote == Some(VoteKind::Downvote),
        pending,
    }
}

/// An optimistic update awaiting its server confirmation.
#[derive(Debug, Clone)]
pub struct PendingVote {
    pub target: VoteTarget,
    seq: u64,
    snapshot: VoteState,
}

/// How a confirmation was applied.
#[derive(Debug)]
pub enum Settlement {
    /// Server counts overwrote the prediction.
    Confirmed(VoteOutcome),
    /// The request failed; the pre-click snapshot was restored.
    RolledBack(ApiError),
    /// A newer click superseded this request; nothing was touched.
    Stale,
}

#[derive(Debug)]
struct Entry {
    state: VoteState,
    issued: u64,
    settled: u64,
}

/// Typed per-target vote store. Entries are seeded from server-rendered
/// values at load time and mutated only through `begin`/`settle`.
#[derive(Debug, Default)]
pub struct VoteBoard {
    entries: HashMap<VoteTarget, Entry>,
}

impl VoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, target: VoteTarget, state: VoteState) {
        self.entries.insert(
            target,
            Entry {
                state,
                issued: 0,
                settled: 0,
            },
        );
    }

    pub fn state(&self, target: &VoteTarget) -> Option<VoteState> {
        self.entries.get(target).map(|entry| entry.state)
    }

    pub fn view(&self, target: &VoteTarget) -> Option<ScoreView> {
        self.entries
            .get(target)
            .map(|entry| project(&entry.state, entry.issued > entry.settled))
    }

    /// Apply the optimistic transition and hand back the ticket that the
    /// eventual server response must settle with. Returns `None` for a
    /// target that was never seeded.
    pub fn begin(&mut self, target: &VoteTarget, intent: VoteKind) -> Option<PendingVote> {
        let entry = self.entries.get_mut(target)?;
        let snapshot = entry.state;
        entry.state = transition(snapshot, intent);
        entry.issued += 1;
        debug!(
            "optimistic {:?} on {}: {:?} -> {:?} (seq {})",
            intent, target, snapshot, entry.state, entry.issued
        );
        Some(PendingVote {
            target: target.clone(),
            seq: entry.issued,
            snapshot,
        })
    }

    /// Reconcile a server response against the board. Responses older than
    /// the newest issued request for the target are discarded.
    pub fn settle(
        &mut self,
        pending: &PendingVote,
        result: Result<VoteOutcome, ApiError>,
    ) -> Settlement {
        let Some(entry) = self.entries.get_mut(&pending.target) else {
            return Settlement::Stale;
        };
        if pending.seq < entry.issued {
            debug!(
                "discarding stale response for {} (seq {} < {})",
                pending.target, pending.seq, entry.issued
            );
            return Settlement::Stale;
        }
        entry.settled = entry.settled.max(pending.seq);
        match result {
            Ok(outcome) => {
                entry.state = outcome.confirmed_state();
                Settlement::Confirmed(outcome)
            }
            Err(err) => {
                entry.state = pending.snapshot;
                Settlement::RolledBack(err)
            }
        }
    }
}

/// Full click-to-confirmation cycle for one vote button press.
///
/// Unauthenticated sessions are stopped before any request is sent. On
/// failure the optimistic change is rolled back and the user is notified;
/// nothing is retried.
pub async fn cast_vote(
    board: &mut VoteBoard,
    api: &dyn TreeHoleApi,
    notifier: &dyn Notifier,
    target: &VoteTarget,
    intent: VoteKind,
) {
    if !api.has_credentials() {
        notifier.warning(LOGIN_PROMPT);
        return;
    }

    let Some(pending) = board.begin(target, intent) else {
        warn!("vote on unknown target {}", target);
        notifier.error(VOTE_FAILED);
        return;
    };

    let result = api.vote(target, intent).await;
    match board.settle(&pending, result) {
        Settlement::Confirmed(outcome) => {
            info!(
                "{} confirmed: {} ({} up / {} down) - {}",
                target,
                outcome.net_votes,
                outcome.upvotes_count,
                outcome.downvotes_count,
                outcome.message
            );
        }
        Settlement::RolledBack(err) => match err {
            ApiError::AuthRequired => notifier.warning(LOGIN_PROMPT),
            ApiError::Rejected(message) => notifier.error(&message),
            ApiError::Transport(err) => {
                warn!("vote transport failure on {}: {}", target, err);
                notifier.error(NETWORK_FAILED);
            }
            err => {
                warn!("vote failure on {}: {}", target, err);
                notifier.error(VOTE_FAILED);
            }
        },
        Settlement::Stale => {}
    }
}
