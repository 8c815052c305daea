//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! - `PortService` backs the one-shot commands (list, kill, check, watch).
//! - `Session` is the interactive state machine; `EffectRunner` carries out
//!   the work it requests.

mod port_service;
mod runtime;
mod session;

pub use port_service::{PortQuery, PortService};
pub use runtime::EffectRunner;
pub use session::{DetailPane, Effect, Event, Key, KillTarget, Session, Status, ViewMode};
