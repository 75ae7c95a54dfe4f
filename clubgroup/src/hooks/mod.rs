//! Group lifecycle observers
//!
//! Observers are the extension point after the built-in post-hooks: audit
//! trails, cache invalidation, outbound events. They run in priority order with
//! a per-hook timeout, and their failures are reported without failing the
//! mutation that triggered them.
//!
//! - `traits.rs`: the `GroupHook` trait and `HookResult`
//! - `registry.rs`: `HookRegistry` for registration and execution

pub mod registry;
pub mod traits;

pub use registry::{GroupEvent, HookFailure, HookFailureKind, HookRegistry};
pub use traits::{GroupHook, HookResult};
