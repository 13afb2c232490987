//! Retrieval-augmented context assembly for medbrief.
//!
//! This crate is the orchestration core: it turns a query plus an optional
//! patient scope into a bounded, deterministic context block, and drives the
//! briefing and consultation-summary workflows on top of it.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`assembler`] | Retrieve, deduplicate, truncate, render context blocks |
//! | [`briefing`] | Doctor briefings and condition-focused summaries |
//! | [`summarizer`] | Transcript → structured summary → index write-back |
//! | [`prompts`] | Prompt templates for every generation call |

pub mod assembler;
pub mod briefing;
pub mod prompts;
pub mod summarizer;

pub use assembler::ContextAssembler;
pub use briefing::{BriefingGenerator, BriefingMode};
pub use summarizer::{ConsultationOutcome, ConsultationSummarizer};
