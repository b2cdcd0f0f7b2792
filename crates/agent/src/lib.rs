//! Intent routing - keyword classification and per-intent completion dispatch
//!
//! This crate is the routing core of scout:
//! - Classifies a free-text user message into a conversational intent
//!   (`intent`)
//! - Holds one immutable persona profile per intent (`profile`)
//! - Issues exactly one completion request per inbound turn (`dispatch`)
//!   through the pluggable `CompletionClient` seam (`llm`)
//!
//! # Architecture
//!
//! The routing path is a straight line with no retained state:
//! 1. **Classification** (`intent`) - ordered keyword rules, total function
//! 2. **Profile lookup** (`profile`) - static 1:1 intent -> persona table
//! 3. **Dispatch** (`dispatch`) - build one request, call upstream once,
//!    return the generated text verbatim
//!
//! # Key Types
//!
//! - `Intent` - the classified purpose of a message
//! - `AgentDispatcher` - main orchestrator (see `dispatch` module)
//! - `CompletionClient` - pluggable trait over the chat-completion upstream
//!
//! # Statelessness Principle
//!
//! The dispatcher holds no conversation memory. Anything the agent should
//! "remember" (the previously suggested candidates, prior turns) must be
//! supplied by the caller inside the current request payload.

pub mod dispatch;
pub mod intent;
pub mod llm;
pub mod profile;

pub use dispatch::AgentDispatcher;
pub use intent::{classify, Intent};
pub use llm::{CompletionClient, CompletionRequest, HttpCompletionClient, UpstreamError};
pub use profile::{AgentProfile, ProfileTable};
