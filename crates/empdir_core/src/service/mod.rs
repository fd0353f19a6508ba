//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate connection lifecycle and repository calls for callers.
//! - Keep console code decoupled from storage details.

pub mod directory_service;
