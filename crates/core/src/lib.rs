pub mod config;
pub mod domain;
pub mod errors;

pub use domain::{Candidate, CompletionResult, ConversationTurn};
pub use errors::{ApplicationError, InterfaceError};
