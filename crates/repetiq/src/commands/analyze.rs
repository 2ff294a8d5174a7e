//! Analyze command — repetition cluster summary.

use std::collections::BTreeMap;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use repetiq_core::analysis::reports::LemmaReport;
use repetiq_core::config::Config;
use repetiq_core::run_analysis;

use super::{ClusterArgs, LexiconArgs, load_lexicon, read_input_file};

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// File to analyze.
    pub file: Utf8PathBuf,

    /// Lexicon selection.
    #[command(flatten)]
    pub lexicon: LexiconArgs,

    /// Cluster tuning.
    #[command(flatten)]
    pub clusters: ClusterArgs,

    /// Lemmas shown in the ranking table.
    #[arg(long, default_value_t = 15)]
    pub top: usize,
}

/// Run repetition analysis and print a cluster summary.
#[instrument(name = "cmd_analyze", skip_all, fields(file = %args.file))]
pub fn cmd_analyze(
    args: AnalyzeArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, "executing analyze command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let lexicon = load_lexicon(&args.lexicon, config, &args.file)?;
    let params = args.clusters.resolve(config);

    let report = run_analysis(&content, &lexicon, &params)
        .with_context(|| format!("failed to analyze {}", args.file))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", args.file.bold());
    println!(
        "\n  {} {} words, {} distinct forms, {} lemmas",
        "Text:".cyan(),
        report.stats.total_words,
        report.stats.unique_forms,
        report.stats.unique_lemmas,
    );
    println!(
        "  {} {} clusters across {} lemmas",
        "Clusters:".cyan(),
        report.stats.total_clusters,
        report.stats.lemmas_with_clusters,
    );

    // Rank lemmas by cluster count, then occurrence count.
    let mut ranked: Vec<&LemmaReport> = report
        .categories
        .iter()
        .flat_map(|section| &section.lemmas)
        .filter(|lemma| !lemma.clusters.is_empty())
        .collect();
    ranked.sort_by(|a, b| {
        (b.cluster_count(), b.count).cmp(&(a.cluster_count(), a.count))
    });

    if !ranked.is_empty() {
        println!("\n  {}", "Top repeated lemmas".cyan());
        println!(
            "  {:<4} {:<20} {:>8} {:>8}  {}",
            "#", "lemma", "groups", "count", "category"
        );
        for (rank, lemma) in ranked.iter().take(args.top).enumerate() {
            println!(
                "  {:<4} {:<20} {:>8} {:>8}  {}",
                rank + 1,
                lemma.display,
                lemma.cluster_count(),
                lemma.count,
                lemma.category.dimmed(),
            );
        }

        // Cluster size distribution
        let mut sizes: BTreeMap<usize, usize> = BTreeMap::new();
        for lemma in &ranked {
            for cluster in &lemma.clusters {
                *sizes.entry(cluster.occurrence_count).or_insert(0) += 1;
            }
        }
        println!("\n  {}", "Cluster sizes".cyan());
        for (size, count) in &sizes {
            let bar = "█".repeat((*count).min(50));
            println!("  {size:>3} occurrences: {count:>4} {bar}");
        }

        // A taste of the worst offender
        if let Some(worst) = ranked.first() {
            let cluster = &worst.clusters[0];
            let excerpt: String = cluster
                .segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<String>()
                .chars()
                .take(100)
                .collect();
            println!(
                "\n  {} \"{}\" — {} occurrence(s) at {}-{}",
                "Example:".cyan(),
                worst.display.bold(),
                cluster.occurrence_count,
                cluster.body_start,
                cluster.body_end,
            );
            println!("  {}", excerpt.replace('\n', " ").dimmed());
        }
    } else {
        println!("\n  {}", "No repetition clusters found.".green());
    }

    Ok(())
}
