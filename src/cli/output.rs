use crate::pipeline::{EventSink, ResultSet, RunEvent, RunReport};
use crate::rewrite::{CorrectionPair, RewriteSummary};
use anyhow::Result;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::MultiSelect;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonMisspelling {
    word: String,
    suggestion: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonUnresolved {
    word: String,
    error: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    documents_checked: usize,
    words_checked: usize,
    total_misspellings: usize,
    misspellings: Vec<JsonMisspelling>,
    unresolved: Vec<JsonUnresolved>,
    failed_documents: Vec<String>,
    cancelled: bool,
}

pub fn print_report(
    report: &RunReport,
    files: &[impl AsRef<Path>],
    colored_output: bool,
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Text => print_text_report(report, colored_output),
        OutputFormat::Json => print_json_report(report, files),
    }
}

fn print_text_report(report: &RunReport, colored_output: bool) {
    let results = &report.results;

    if !results.misspelled.is_empty() {
        if colored_output {
            println!("\n{}", "Misspelled words:".bold().underline());
        } else {
            println!("\nMisspelled words:");
        }

        for (word, suggestion) in results.corrections() {
            if colored_output {
                println!(
                    "  {} {} {}",
                    word.red().bold(),
                    "→".dimmed(),
                    suggestion.green()
                );
            } else {
                println!("  {} → {}", word, suggestion);
            }
        }
    }

    if !results.unresolved.is_empty() {
        if colored_output {
            println!("\n{}", "Unresolved words:".bold().underline());
        } else {
            println!("\nUnresolved words:");
        }

        for (word, error) in &results.unresolved {
            if colored_output {
                println!("  {} ({})", word.yellow().bold(), error.dimmed());
            } else {
                println!("  {} ({})", word, error);
            }
        }
    }

    if !report.failed_documents.is_empty() {
        if colored_output {
            println!("\n{}", "Failed documents:".bold().underline());
        } else {
            println!("\nFailed documents:");
        }

        for error in &report.failed_documents {
            if colored_output {
                println!("  {}", error.to_string().red());
            } else {
                println!("  {}", error);
            }
        }
    }
}

fn print_json_report(report: &RunReport, files: &[impl AsRef<Path>]) {
    let results = &report.results;

    let misspellings: Vec<JsonMisspelling> = results
        .corrections()
        .map(|(word, suggestion)| JsonMisspelling {
            word: word.to_string(),
            suggestion: suggestion.to_string(),
        })
        .collect();

    let unresolved: Vec<JsonUnresolved> = results
        .unresolved
        .iter()
        .map(|(word, error)| JsonUnresolved {
            word: word.clone(),
            error: error.clone(),
        })
        .collect();

    let output = JsonOutput {
        documents_checked: files.len(),
        words_checked: report.words_enqueued,
        total_misspellings: misspellings.len(),
        misspellings,
        unresolved,
        failed_documents: report
            .failed_documents
            .iter()
            .map(|error| error.to_string())
            .collect(),
        cancelled: report.cancelled(),
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

pub fn print_run_summary(report: &RunReport, files: &[impl AsRef<Path>], colored: bool) {
    println!();

    if report.cancelled() {
        let line = format!(
            "Run cancelled: {} of {} words resolved",
            report.results.total_resolved(),
            report.words_enqueued
        );
        if colored {
            println!("{} {}", "✗".red().bold(), line.yellow());
        } else {
            println!("✗ {}", line);
        }
        return;
    }

    let misspellings = report.results.misspelled.len();
    let unresolved = report.results.unresolved.len();

    if misspellings == 0 && unresolved == 0 {
        if colored {
            println!("{}", "✓ No misspellings found!".green().bold());
        } else {
            println!("✓ No misspellings found!");
        }
        return;
    }

    let error_word = if misspellings == 1 {
        "misspelling"
    } else {
        "misspellings"
    };
    if colored {
        println!(
            "{} {} {} found in {} {}",
            "✗".red().bold(),
            misspellings.to_string().red().bold(),
            error_word,
            files.len(),
            if files.len() == 1 {
                "document"
            } else {
                "documents"
            }
        );
    } else {
        println!(
            "✗ {} {} found in {} {}",
            misspellings,
            error_word,
            files.len(),
            if files.len() == 1 {
                "document"
            } else {
                "documents"
            }
        );
    }

    if unresolved > 0 {
        let line = format!(
            "{} {} could not be checked",
            unresolved,
            if unresolved == 1 { "word" } else { "words" }
        );
        if colored {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }
}

pub fn print_fix_summary(summary: &RewriteSummary, colored: bool) {
    println!();

    let total = summary.total_occurrences();
    let files = summary.files_changed();

    if total == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total == 1 {
            "correction"
        } else {
            "corrections"
        };
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total.to_string().green().bold(),
                fix_word,
                files,
                if files == 1 { "document" } else { "documents" }
            );
        } else {
            println!(
                "✓ {} {} applied to {} {}",
                total,
                fix_word,
                files,
                if files == 1 { "document" } else { "documents" }
            );
        }
    }

    for error in &summary.failed_documents {
        if colored {
            eprintln!("{} {}", "✗".red().bold(), error.to_string().red());
        } else {
            eprintln!("✗ {}", error);
        }
    }
}

/// Spinner fed by run events. Safe to hand to the worker pool; the bar
/// handles concurrent updates itself.
pub struct ProgressSink {
    bar: ProgressBar,
}

impl ProgressSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        bar.set_message("Checking...");
        Self { bar }
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ProgressSink {
    fn emit(&self, event: RunEvent) {
        match event {
            RunEvent::WordResolved(verdict) => {
                self.bar.inc(1);
                self.bar.set_message(format!(
                    "{} words checked (last: {})",
                    self.bar.position(),
                    verdict.word()
                ));
            }
            RunEvent::RunCompleted { cancelled } => {
                if cancelled {
                    self.bar.finish_with_message("Run cancelled");
                } else {
                    self.bar.finish_with_message("Check complete");
                }
            }
        }
    }
}

/// Every misspelling paired with its suggestion, ready for the rewriter.
pub fn all_corrections(results: &ResultSet) -> Vec<CorrectionPair> {
    results
        .corrections()
        .map(|(word, suggestion)| CorrectionPair::new(word, suggestion))
        .collect()
}

/// Let the user pick which corrections to apply. Falls back to accepting
/// all of them when stdin is not a terminal.
pub fn select_corrections(results: &ResultSet) -> Result<Vec<CorrectionPair>> {
    if results.misspelled.is_empty() {
        return Ok(Vec::new());
    }

    if !console::user_attended() {
        return Ok(all_corrections(results));
    }

    let items: Vec<String> = results
        .corrections()
        .map(|(word, suggestion)| format!("{} → {}", word, suggestion))
        .collect();
    let defaults = vec![true; items.len()];

    let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select corrections to apply")
        .items(&items)
        .defaults(&defaults)
        .interact()?;

    Ok(chosen
        .into_iter()
        .map(|index| {
            CorrectionPair::new(
                results.misspelled[index].clone(),
                results.suggestions[index].clone(),
            )
        })
        .collect())
}
