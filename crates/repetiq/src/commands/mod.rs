//! Command implementations.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use repetiq_core::clusters::ClusterParams;
use repetiq_core::config::{
    Config, DEFAULT_CONTEXT_CHARS, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_OCCURRENCES,
};
use repetiq_core::{AnalysisParams, Lexicon};

pub mod analyze;
pub mod classify;
pub mod info;
pub mod report;

/// Read a file and validate its size against the configured limit.
///
/// Combines the file-read and size-validation steps that every analysis
/// command needs.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Lexicon-related options shared by the analysis commands.
#[derive(clap::Args, Debug)]
pub struct LexiconArgs {
    /// Reference lexicon TSV (overrides config)
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<Utf8PathBuf>,

    /// Override lexicon TSV (default: <input>_custom_lexicon.tsv if present)
    #[arg(long, value_name = "FILE")]
    pub custom_lexicon: Option<Utf8PathBuf>,
}

/// Cluster tuning options shared by the analysis commands.
#[derive(clap::Args, Debug)]
pub struct ClusterArgs {
    /// Maximum gap in bytes between occurrences in one cluster
    #[arg(long)]
    pub max_distance: Option<usize>,

    /// Minimum occurrences for a cluster to be reported
    #[arg(long)]
    pub min_occurrences: Option<usize>,

    /// Context bytes shown around excerpts
    #[arg(long)]
    pub context_chars: Option<usize>,
}

impl ClusterArgs {
    /// Resolve analysis parameters: CLI flag > config > default.
    ///
    /// Out-of-range values are rejected later by the core's validation;
    /// no silent fallback happens here.
    pub fn resolve(&self, config: &Config) -> AnalysisParams {
        AnalysisParams {
            clusters: ClusterParams {
                max_distance: self
                    .max_distance
                    .or(config.max_distance)
                    .unwrap_or(DEFAULT_MAX_DISTANCE),
                min_occurrences: self
                    .min_occurrences
                    .or(config.min_occurrences)
                    .unwrap_or(DEFAULT_MIN_OCCURRENCES),
            },
            context_chars: self
                .context_chars
                .or(config.context_chars)
                .unwrap_or(DEFAULT_CONTEXT_CHARS),
        }
    }
}

/// Default reference lexicon location, relative to the working directory.
const DEFAULT_LEXICON_PATH: &str = "data/OpenLexicon.tsv";

/// The override table conventionally sits next to the analyzed file.
pub fn derived_custom_lexicon_path(input: &Utf8Path) -> Utf8PathBuf {
    let stem = input.file_stem().unwrap_or("document");
    input.with_file_name(format!("{stem}_custom_lexicon.tsv"))
}

/// Load the reference lexicon plus any override table for `input`.
///
/// A spinner covers the load; the reference table runs to six figures of
/// rows and takes a moment on cold caches.
pub fn load_lexicon(
    args: &LexiconArgs,
    config: &Config,
    input: &Utf8Path,
) -> anyhow::Result<Lexicon> {
    let lexicon_path = args
        .lexicon
        .clone()
        .or_else(|| config.lexicon.clone())
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LEXICON_PATH));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("loading lexicon {lexicon_path}"));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let mut lexicon = Lexicon::load(&lexicon_path)
        .with_context(|| format!("failed to load lexicon {lexicon_path}"))?;

    let custom_path = args
        .custom_lexicon
        .clone()
        .or_else(|| config.custom_lexicon.clone())
        .map_or_else(
            || {
                let derived = derived_custom_lexicon_path(input);
                derived.is_file().then_some(derived)
            },
            Some,
        );

    if let Some(custom_path) = custom_path {
        spinner.set_message(format!("merging override lexicon {custom_path}"));
        lexicon
            .merge_override(&custom_path)
            .with_context(|| format!("failed to load override lexicon {custom_path}"))?;
    }

    spinner.finish_and_clear();
    Ok(lexicon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_override_path_sits_next_to_input() {
        let path = derived_custom_lexicon_path(Utf8Path::new("textes/DNF.txt"));
        assert_eq!(path, Utf8PathBuf::from("textes/DNF_custom_lexicon.tsv"));
    }

    #[test]
    fn cluster_args_resolve_with_precedence() {
        let config = Config {
            max_distance: Some(100),
            ..Config::default()
        };
        let args = ClusterArgs {
            max_distance: Some(50),
            min_occurrences: None,
            context_chars: None,
        };
        let params = args.resolve(&config);
        assert_eq!(params.clusters.max_distance, 50);
        assert_eq!(params.clusters.min_occurrences, DEFAULT_MIN_OCCURRENCES);
        assert_eq!(params.context_chars, DEFAULT_CONTEXT_CHARS);
    }
}
