//! Lifecycle hook engine
//!
//! - `phase`: per-kind phase state machine
//! - `derive`: search token derivation and post-update upkeep
//! - `emitter`: creation notification
//! - `cascade`: deletion cleanup seam (inert by default)
//! - `expansion`: read pre-hook seam (inert by default)
//! - `failure`: post-hook failure events and their broadcast channel
//! - `dispatcher`: the mutation enum and the dispatcher sequencing all of the above

pub mod cascade;
pub mod derive;
pub mod dispatcher;
pub mod emitter;
pub mod expansion;
pub mod failure;
pub mod phase;

pub use cascade::{CascadeError, CascadePolicy, InertCascade};
pub use derive::SearchTokenMaintainer;
pub use dispatcher::{DeleteScope, HookDispatcher, Mutation, MutationOutcome, UpdateScope};
pub use emitter::{CREATION_MESSAGE, CreationNotifier};
pub use expansion::{FindQuery, NoExpansion, ReferenceExpansion};
pub use failure::{FailureChannel, PostHookFailure};
pub use phase::{MutationKind, Phase, PhaseTracker};
