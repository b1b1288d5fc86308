//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate cipher and repository calls into use-case level APIs.
//! - Keep transport layers decoupled from storage and crypto details.

pub mod note_store;
