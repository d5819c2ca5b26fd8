//! Answering agent for research-assistant.
//!
//! A chat-completion model, reached through a pluggable provider, answers
//! each question and may call a web-search tool along the way.
//!
//! # Architecture
//!
//! ```text
//! question + ConversationMemory → ResearchAgent
//!   ├── build_messages (system prompt, memory window, question)
//!   └── agentic_loop
//!       ├── LlmProvider::chat
//!       ├── ToolExecutor → SearchTool (web_search)
//!       └── repeat until a text answer or max_tool_iterations
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod executor;
pub mod memory;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod research;
pub mod tool;
pub mod traits;

// Re-export key types
pub use agentic_loop::{LoopPolicy, agentic_loop};
pub use client::create_provider;
pub use config::AgentConfig;
pub use executor::ToolExecutor;
pub use memory::{ConversationMemory, MemoryEntry, MemoryRole};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use provider::LlmProvider;
pub use research::ResearchAgent;
pub use tool::{ToolCall, ToolDefinition, ToolResult, ToolSet};
pub use traits::AnsweringAgent;
