//! Classify command — classification and ambiguity statistics.

use std::collections::HashMap;

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use repetiq_core::classify::{self, Status, WordClassifier};
use repetiq_core::config::Config;
use repetiq_core::tokenizer;

use super::{LexiconArgs, load_lexicon, read_input_file};

/// Arguments for the `classify` subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// File to analyze.
    pub file: Utf8PathBuf,

    /// Lexicon selection.
    #[command(flatten)]
    pub lexicon: LexiconArgs,

    /// Ambiguous words shown, ranked by in-text frequency.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

#[derive(Serialize)]
struct AmbiguousWord {
    word: String,
    occurrences: usize,
    readings: Vec<Reading>,
    chosen: Option<String>,
}

#[derive(Serialize)]
struct Reading {
    cgram: String,
    lemme: String,
    freq: f64,
}

#[derive(Serialize)]
struct ClassifyReport {
    total_forms: usize,
    classified: usize,
    unknown: usize,
    ambiguous: usize,
    by_cgram: Vec<(String, usize)>,
    ambiguous_words: Vec<AmbiguousWord>,
}

/// Show how the text's forms classify and how ambiguity resolves.
#[instrument(name = "cmd_classify", skip_all, fields(file = %args.file))]
pub fn cmd_classify(
    args: ClassifyArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, "executing classify command");

    let content = read_input_file(&args.file, max_input_bytes)?;
    let lexicon = load_lexicon(&args.lexicon, config, &args.file)?;

    let tokens = tokenizer::extract_tokens(&content, &lexicon);

    let mut classifier = WordClassifier::new(&lexicon);
    classifier.register_forms(tokens.iter().map(|t| t.word.as_str()));

    // Unique forms in first-appearance order, with in-text frequencies.
    let mut frequencies: HashMap<String, usize> = HashMap::new();
    let mut unique_forms: Vec<String> = Vec::new();
    for token in &tokens {
        let key = token.word.to_lowercase();
        let count = frequencies.entry(key.clone()).or_insert(0);
        if *count == 0 {
            unique_forms.push(key);
        }
        *count += 1;
    }

    let classifications: Vec<_> = unique_forms
        .iter()
        .map(|form| classifier.classify(form, false))
        .collect();
    let stats = classify::statistics(&classifications);

    // Ambiguous forms ranked by how often they appear in this text.
    let mut ambiguous: Vec<&classify::Classification> = classifications
        .iter()
        .filter(|c| c.status == Status::Ambiguous)
        .collect();
    ambiguous.sort_by(|a, b| {
        frequencies
            .get(&b.word)
            .cmp(&frequencies.get(&a.word))
            .then_with(|| a.word.cmp(&b.word))
    });

    let ambiguous_words: Vec<AmbiguousWord> = ambiguous
        .iter()
        .take(args.top)
        .map(|c| {
            let readings = classifier
                .ambiguous_readings(&c.word)
                .into_iter()
                .map(|reading| Reading {
                    cgram: reading.cgram,
                    lemme: reading.entry.lemme,
                    freq: reading.entry.freq,
                })
                .collect();
            let chosen = classifier.classify(&c.word, true).cgram;
            AmbiguousWord {
                word: c.word.clone(),
                occurrences: frequencies.get(&c.word).copied().unwrap_or(0),
                readings,
                chosen,
            }
        })
        .collect();

    let report = ClassifyReport {
        total_forms: stats.total,
        classified: stats.classified,
        unknown: stats.unknown,
        ambiguous: stats.ambiguous,
        by_cgram: stats.by_cgram.clone(),
        ambiguous_words,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let percent = |n: usize| {
        if report.total_forms == 0 {
            0.0
        } else {
            n as f64 * 100.0 / report.total_forms as f64
        }
    };

    println!("{}", args.file.bold());
    println!(
        "\n  {} {} distinct forms — {} classified ({:.1}%), {} ambiguous ({:.1}%), {} unknown ({:.1}%)",
        "Classification:".cyan(),
        report.total_forms,
        report.classified,
        percent(report.classified),
        report.ambiguous,
        percent(report.ambiguous),
        report.unknown,
        percent(report.unknown),
    );

    if !report.by_cgram.is_empty() {
        println!("\n  {}", "Categories".cyan());
        for (cgram, count) in report.by_cgram.iter().take(15) {
            println!("  {cgram:<12} {count:>6}");
        }
    }

    if !report.ambiguous_words.is_empty() {
        println!("\n  {}", "Ambiguous forms (by in-text frequency)".cyan());
        for word in &report.ambiguous_words {
            println!(
                "\n  {} — {} occurrence(s), {} readings",
                word.word.bold(),
                word.occurrences,
                word.readings.len(),
            );
            for reading in &word.readings {
                let marker = if word.chosen.as_deref() == Some(reading.cgram.as_str()) {
                    "→".green().to_string()
                } else {
                    " ".to_string()
                };
                println!(
                    "   {marker} {:<12} freq {:>10.2}  lemme: {}",
                    reading.cgram, reading.freq, reading.lemme,
                );
            }
        }
    }

    Ok(())
}
