//! # research-assistant
//!
//! A research assistant that answers free-text questions with a hosted
//! chat-completion model, lets the model consult a web-search tool, and
//! appends every answered question to a local SQLite query log.
//!
//! ## Layout
//!
//! - [`credentials`]: model and search API keys from a TOML secrets file or
//!   the environment
//! - [`storage`]: the append-only query log
//! - [`search`]: the web-search tool adapter
//! - [`agent`]: the answering agent and its conversation memory
//! - [`interaction`]: question handling and the chat loop
//! - [`cli`] and [`server`]: the command-line and web-form surfaces
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use research_assistant::agent::{AgentConfig, ConversationMemory, ResearchAgent, create_provider};
//! use research_assistant::core::RetentionPolicy;
//! use research_assistant::interaction::Interaction;
//! use research_assistant::search::{SearchConfig, SerpApiSearch};
//! use research_assistant::storage::SqliteStorage;
//!
//! # async fn run() -> research_assistant::Result<()> {
//! let agent_config = AgentConfig::builder().from_env().build()?;
//! let search = SerpApiSearch::new(SearchConfig::builder().from_env().build()?)?;
//! let provider = create_provider(&agent_config)?;
//! let agent = ResearchAgent::new(&agent_config, Arc::from(provider), Arc::new(search));
//! let storage = SqliteStorage::open_initialized(std::path::Path::new("qa.db"))?;
//!
//! let interaction = Interaction::new(Arc::new(agent), Arc::new(storage), RetentionPolicy::default());
//! let mut memory = ConversationMemory::new();
//! if let Some(turn) = interaction.handle_question("What is the capital of France?", &mut memory).await? {
//!     assert!(!turn.answer.is_empty());
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod credentials;
pub mod error;
pub mod interaction;
pub mod search;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
