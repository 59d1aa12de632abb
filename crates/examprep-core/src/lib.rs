//! examprep-core: Exam session state machine, answer evaluation, and scoring.
//!
//! This crate defines the question model, the grading rules, the session and
//! timer state machines, and the engine that ties them together. Loading banks
//! from remote places and rendering results live in sibling crates.

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod timer;

pub use error::ExamError;
