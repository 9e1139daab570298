//! Prompt context assembly.
//!
//! Merges local snippets and web results into one text block and folds it
//! into the system instruction sent with every completion request.

pub mod assembler;

pub use assembler::{CONTEXT_PREAMBLE, build_context_block, build_system_instruction};
