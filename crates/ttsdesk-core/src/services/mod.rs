//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports (trait interfaces) and domain logic.
//! They never know about concrete implementations.

mod coordinator;

pub use coordinator::{
    CoordinatorDeps, CoordinatorError, CoordinatorHandle, CoordinatorState, ServerPhase,
    spawn_coordinator,
};
