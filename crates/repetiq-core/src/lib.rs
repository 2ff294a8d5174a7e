//! Core library for repetiq.
//!
//! This crate analyzes French text for stylistic word repetitions: it
//! tokenizes with positions, resolves each form to a grammatical reading via
//! a reference lexicon (disambiguating by corpus frequency), detects zones
//! where occurrences of one lemma crowd together, and assembles a browsable
//! report.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`lexicon`] - Lexicon table loading and lookup
//! - [`tokenizer`] - Position-preserving word extraction
//! - [`classify`] - Grammatical classification and disambiguation
//! - [`clusters`] - Repetition cluster detection and excerpts
//! - [`analysis`] - Full pipeline orchestration
//! - [`html`] - HTML report rendering
//! - [`export`] - Override-lexicon export
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use repetiq_core::analysis::{AnalysisParams, run_analysis};
//! use repetiq_core::lexicon::Lexicon;
//!
//! let lexicon = Lexicon::load(Utf8Path::new("data/OpenLexicon.tsv")).unwrap();
//! let report = run_analysis("Le chat dort. Le chat rêve.", &lexicon, &AnalysisParams::default())
//!     .expect("analysis failed");
//! println!("{} clusters", report.stats.total_clusters);
//! ```
#![deny(unsafe_code)]

pub mod analysis;
pub mod classify;
pub mod clusters;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod html;
pub mod lexicon;
pub mod tokenizer;

pub use analysis::{AnalysisParams, AnalysisReport, run_analysis};
pub use config::{Config, ConfigLoader, ConfigSources, DEFAULT_MAX_INPUT_BYTES, LogLevel};
pub use error::{AnalysisError, ConfigError, ConfigResult, LexiconError};
pub use lexicon::Lexicon;
