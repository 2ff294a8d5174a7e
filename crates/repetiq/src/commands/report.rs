//! Report command — HTML generation and override-lexicon export.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use repetiq_core::config::Config;
use repetiq_core::{export, html, run_analysis};

use super::{ClusterArgs, LexiconArgs, derived_custom_lexicon_path, load_lexicon, read_input_file};

/// Arguments for the `report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// File to analyze.
    pub file: Utf8PathBuf,

    /// Output HTML file (default: <input>_report.html)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Lexicon selection.
    #[command(flatten)]
    pub lexicon: LexiconArgs,

    /// Cluster tuning.
    #[command(flatten)]
    pub clusters: ClusterArgs,

    /// Skip exporting unknown words to the override lexicon
    #[arg(long)]
    pub no_export: bool,
}

/// Generate the HTML repetition report for a file.
#[instrument(name = "cmd_report", skip_all, fields(file = %args.file))]
pub fn cmd_report(
    args: ReportArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, output = ?args.output, "executing report command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let lexicon = load_lexicon(&args.lexicon, config, &args.file)?;
    let params = args.clusters.resolve(config);

    let report = run_analysis(&content, &lexicon, &params)
        .with_context(|| format!("failed to analyze {}", args.file))?;

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args.file.file_stem().unwrap_or("document");
        args.file.with_file_name(format!("{stem}_report.html"))
    });

    let title = args.file.file_name().unwrap_or(args.file.as_str());
    let document = html::render_html(&report, title);
    std::fs::write(output.as_std_path(), &document)
        .with_context(|| format!("failed to write {output}"))?;

    // Unknown words go to the editable override table unless suppressed.
    let export_summary = if args.no_export {
        None
    } else {
        let export_path = args
            .lexicon
            .custom_lexicon
            .clone()
            .or_else(|| config.custom_lexicon.clone())
            .unwrap_or_else(|| derived_custom_lexicon_path(&args.file));
        let summary = export::export_unknown_words(&report, &export_path)
            .with_context(|| format!("failed to export override lexicon {export_path}"))?;
        Some((export_path, summary))
    };

    if global_json {
        let payload = serde_json::json!({
            "output": output,
            "stats": report.stats,
            "export": export_summary.as_ref().map(|(path, summary)| serde_json::json!({
                "path": path,
                "preserved": summary.preserved,
                "added": summary.added,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "{} {} — {} clusters across {} lemmas",
        "Report:".green(),
        output,
        report.stats.total_clusters,
        report.stats.lemmas_with_clusters,
    );
    if let Some((path, summary)) = export_summary {
        if summary.added > 0 {
            println!(
                "{} {} — {} entries preserved, {} added",
                "Override lexicon:".green(),
                path,
                summary.preserved,
                summary.added,
            );
        } else {
            println!(
                "{} {} unchanged ({} entries)",
                "Override lexicon:".dimmed(),
                path,
                summary.total(),
            );
        }
    }

    Ok(())
}
