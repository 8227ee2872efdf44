//! The orchestration engine: one [`Agent::run`] per request.

pub mod context;
pub mod factory;
pub mod orchestrator;

pub use context::{Interrupted, RequestContext};
pub use factory::build_agent;
pub use orchestrator::{Agent, AgentOptions};
