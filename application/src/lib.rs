//! Application layer for copilot-council
//!
//! This crate contains the council use case, port definitions, and run
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilConfig, DEFAULT_TIMEOUT};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::fan_out::{FanOutExecutor, FanOutRequest};
pub use use_cases::run_council::RunCouncilUseCase;
