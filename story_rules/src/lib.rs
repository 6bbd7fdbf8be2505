//! # Story Rules
//!
//! The "Story Bible" crate - contains the story definitions, the keypath-addressed
//! state store and the pure functions evaluated against it (predicates and content
//! templates). This crate is the single source of truth for narrative state and
//! does not contain any playback logic.

pub mod config;
pub mod definitions;
pub mod error;
pub mod predicate;
pub mod state;
pub mod template;

pub use config::*;
pub use definitions::*;
pub use error::*;
pub use predicate::*;
pub use state::*;
pub use template::*;
