//! Infrastructure layer for copilot-council
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the Copilot CLI gateway, configuration file loading,
//! and the JSONL transcript logger.

pub mod config;
pub mod copilot;
pub mod logging;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileCouncilConfig, FileOutputConfig};
pub use copilot::{
    error::{CopilotError, Result},
    gateway::CopilotLlmGateway,
    router::MessageRouter,
    session::CopilotSession,
};
pub use logging::JsonlConversationLogger;
