//! The chat engine.
//!
//! A turn flows through five stages:
//!
//! 1. **Validate** the configuration snapshot (enabled, credential present)
//! 2. **Retrieve** local snippets and web results concurrently
//! 3. **Assemble** the system instruction and outbound message sequence
//! 4. **Call** the completion endpoint under the configured timeout
//! 5. **Commit** the user and assistant messages to session history
//!
//! Only configuration and upstream errors reach the caller. Retrieval and
//! search faults degrade to less context, never to a failed turn.

pub mod context;
pub mod orchestrator;

pub use context::{build_context_block, build_system_instruction};
pub use orchestrator::{
    ChatOrchestrator, ChatReply, ChatRequest, RagSource, RetrievedContext, DISABLED_MESSAGE,
    MISSING_KEY_MESSAGE,
};
