//! Assessor CLI Library Crate
//!
//! Environment configuration, the interactive terminal session, and the
//! candidate-facing rendering of questions, scores, and feedback. The `assess`
//! binary is a thin wrapper around this library.

pub mod config;
pub mod display;
pub mod session;
