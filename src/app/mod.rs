mod dispatch;
mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod state;
mod types;


pub use orchestrator::{OrchestratorBuilder, ShutterlinkOrchestrator};
pub use types::{Component, ComponentState, DrainOutcome};
