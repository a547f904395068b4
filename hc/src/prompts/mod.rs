//! Prompt templates for plan generation

pub mod embedded;
mod loader;

pub use loader::{PromptContext, PromptLoader};
