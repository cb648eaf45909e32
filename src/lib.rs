//! Client-side chat session manager
//!
//! Owns the message timeline of a chat widget, drives the per-turn reply
//! exchange and the end-of-session analysis against a remote backend, and
//! derives sentiment statistics from the accumulated turns.

pub mod backend;
pub mod config;
pub mod runtime;
pub mod session;
