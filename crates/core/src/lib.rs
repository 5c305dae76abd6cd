//! Assessor Core Library Crate
//!
//! Everything needed to run an adaptive role-play assessment independent of
//! any terminal or transport: response analysis and validation, the
//! probe-or-advance engine, weighted scoring, the LLM-backed collaborators
//! for question phrasing and feedback, and transcript persistence. The `assess`
//! binary in `services/cli` is a thin interactive shell around this crate.

pub mod analysis;
pub mod case;
pub mod criteria;
pub mod engine;
pub mod feedback;
pub mod lexicon;
pub mod llm_client;
pub mod questions;
pub mod scoring;
pub mod selector;
pub mod templates;
pub mod themes;
pub mod transcript;
pub mod validation;
