//! Core services: rate caching, conversation state, alert evaluation.

pub mod alerts;
pub mod cache;
pub mod command;
pub mod engine;
pub mod expr;
pub mod inline;
pub mod session;
pub mod text;

pub use alerts::AlertEvaluator;
pub use cache::RateCache;
pub use engine::{ConversationEngine, EngineConfig};
pub use session::{SessionMap, SessionState};
