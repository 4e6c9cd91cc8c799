//! PromptLoom - Guided Prompt Building for Learners
//!
//! A small backend-plus-session toolkit that helps students turn a bare
//! topic into a well-structured LLM prompt. The server proxies Gemini
//! for AI tag suggestions and prompt critiques; the session state
//! machine drives the tag picker (debounce, staged reveal, selection
//! cap, conflict warnings) without doing any IO of its own.
//!
//! ## Core Features
//!
//! - **Tag Generation**: Gemini-backed, category-grouped tag suggestions
//!   with response caching and a curated offline fallback pool
//! - **Prompt Analysis**: Scored feedback and a structured rewrite of a
//!   student's draft prompt
//! - **Sans-IO Session**: Deterministic tag-selection state machine,
//!   async-driven via [`session::SessionDriver`]
//! - **Layered Config**: Defaults, global file, project file, and
//!   environment variables, merged in order
//!
//! ## Quick Start
//!
//! ```ignore
//! use promptloom::{Config, server};
//!
//! let config = promptloom::ConfigLoader::load()?;
//! server::serve(config).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction, prompt templates, output validation
//! - [`server`]: Axum HTTP surface (tag generation, analysis, health)
//! - [`session`]: Client-side tag-selection state machine and driver
//! - [`tags`]: Request/response types, categories, fallback pool
//! - [`config`]: Layered configuration loading

pub mod ai;
pub mod cache;
pub mod config;
pub mod constants;
pub mod server;
pub mod session;
pub mod tags;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{CacheConfig, Config, ConfigLoader, ServerConfig, SessionConfig};

// Error Types
pub use types::{ErrorCategory, LoomError, Result};

// Cache
pub use cache::ResponseCache;

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::provider::{LlmProvider, LlmResponse, ProviderConfig, SharedProvider, create_provider};
pub use ai::validation::{PromptAnalysis, TagValidator};

// =============================================================================
// Domain Re-exports
// =============================================================================

pub use session::{SessionDriver, TagFetcher, TagSession};
pub use tags::{Intent, Persona, Stage, TagCategory, TagGroups, TagRequest, TagResponse};
