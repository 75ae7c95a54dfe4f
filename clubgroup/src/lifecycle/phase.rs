//! Per-mutation phase state machine

use serde::{Deserialize, Serialize};

use crate::{ClubGroupError, Result};

/// Mutation category driving the legal phase sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Find,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Find => write!(f, "find"),
        }
    }
}

/// Where a mutation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Pending,
    /// Blocking pre-hooks finished
    PreHooksRun,
    /// Name gate of an update evaluated
    ConditionalPreHook,
    /// The store accepted the write
    Persisted,
    /// The store answered a read
    Queried,
    /// Create post-hooks finished
    PostHooksRun,
    /// Delete post-hook finished
    PostHook,
    Done,
}

impl Phase {
    /// Phase that may follow `self` for the given mutation kind
    fn next_for(self, kind: MutationKind) -> Option<Phase> {
        use MutationKind as K;
        use Phase as P;

        match (kind, self) {
            (K::Create, P::Pending) => Some(P::PreHooksRun),
            (K::Create, P::PreHooksRun) => Some(P::Persisted),
            (K::Create, P::Persisted) => Some(P::PostHooksRun),
            (K::Create, P::PostHooksRun) => Some(P::Done),

            (K::Update, P::Pending) => Some(P::ConditionalPreHook),
            (K::Update, P::ConditionalPreHook) => Some(P::Persisted),
            (K::Update, P::Persisted) => Some(P::Done),

            (K::Delete, P::Pending) => Some(P::Persisted),
            (K::Delete, P::Persisted) => Some(P::PostHook),
            (K::Delete, P::PostHook) => Some(P::Done),

            (K::Find, P::Pending) => Some(P::PreHooksRun),
            (K::Find, P::PreHooksRun) => Some(P::Queried),
            (K::Find, P::Queried) => Some(P::Done),

            _ => None,
        }
    }
}

/// Tracks and validates the phases of one mutation
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    kind: MutationKind,
    history: Vec<Phase>,
}

impl PhaseTracker {
    pub fn new(kind: MutationKind) -> Self {
        Self {
            kind,
            history: vec![Phase::Pending],
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn current(&self) -> Phase {
        self.history.last().copied().unwrap_or(Phase::Pending)
    }

    /// Every phase visited so far, starting with `Pending`
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn is_done(&self) -> bool {
        self.current() == Phase::Done
    }

    /// Move to `next`, failing on a transition the kind does not allow
    pub fn advance(&mut self, next: Phase) -> Result<()> {
        let current = self.current();
        if current.next_for(self.kind) != Some(next) {
            return Err(ClubGroupError::Internal(format!(
                "illegal {} phase transition {:?} -> {:?}",
                self.kind, current, next
            )));
        }

        tracing::trace!(kind = %self.kind, from = ?current, to = ?next, "phase transition");
        self.history.push(next);
        Ok(())
    }
}
