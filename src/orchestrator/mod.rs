//! Orchestration core: the control loop over the other subsystems.
//!
//! The only public API re-exported from here is [`Orchestrator`] plus the
//! two timing constants it runs on. The orchestrator owns its strategy,
//! watcher, and health monitor; all three hold non-owning references to the
//! services registry, and the registry never refers back.

mod core;

pub use core::{Orchestrator, DISCOVERY_TIMEOUT, HEALTH_CHECK_INTERVAL};
