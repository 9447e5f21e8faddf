use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use doc_outline::config::Config;
use doc_outline::parser::{self, Tree};
use doc_outline::report::{self, BackendOutput};

#[derive(Parser)]
#[command(name = "doc_outline", about = "Build and compare document outlines from extraction backend output")]
struct Cli {
    /// Config file (default: ./outline.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the section tree of one backend output file
    Tree {
        file: PathBuf,
        /// Title for output without any header (default: "<BACKEND> Content")
        #[arg(short, long)]
        title: Option<String>,
        /// Remove noise sections before printing
        #[arg(long)]
        clean: bool,
        /// Show a content preview under each section
        #[arg(short, long)]
        detailed: bool,
        /// Deepest nesting to print (0 = roots only)
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Write the section tree of one backend output file as JSON
    Export {
        file: PathBuf,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long)]
        clean: bool,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load an exported JSON tree and print its metrics
    Import { file: PathBuf },
    /// Compare every *_output.txt backend output in a directory
    Compare {
        dir: PathBuf,
        #[arg(long)]
        clean: bool,
        /// Report which backends found a section with this title (repeatable)
        #[arg(short, long = "key-section")]
        key_sections: Vec<String>,
        /// Also write trees and metrics to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Tree {
            file,
            title,
            clean,
            detailed,
            max_depth,
        } => {
            if max_depth.is_some() {
                config.display.max_depth = max_depth;
            }
            let output = read_output(&file)?;
            let title = title.unwrap_or_else(|| output.default_title());
            let processed = parser::process_backend(&output.text, &title, clean.then_some(&config.noise));
            print!("{}", report::render_outline(&processed.tree, &config.display, detailed));
            let m = &processed.metrics;
            println!(
                "\n{} sections | levels {:?} | {} words | quality {}/100",
                m.total_nodes, m.level_counts, m.total_content_words, m.quality_score
            );
        }
        Commands::Export {
            file,
            title,
            clean,
            output,
        } => {
            let backend = read_output(&file)?;
            let title = title.unwrap_or_else(|| backend.default_title());
            let processed = parser::process_backend(&backend.text, &title, clean.then_some(&config.noise));
            let json = processed.tree.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} sections to {}", processed.metrics.total_nodes, path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let tree = Tree::from_json(&json)
                .with_context(|| format!("Invalid tree in {}", file.display()))?;
            let m = parser::compute_metrics(&tree);
            println!("{}", serde_json::to_string_pretty(&m)?);
        }
        Commands::Compare {
            dir,
            clean,
            key_sections,
            json,
        } => {
            let outputs = report::load_outputs(&dir)?;
            if outputs.is_empty() {
                println!("No *_output.txt files in {}.", dir.display());
                return Ok(());
            }
            let comparison = compare_with_progress(&outputs, clean.then_some(&config.noise));

            for row in &comparison.rows {
                println!("\n{} ({} sections)", row.name.to_uppercase(), row.metrics.total_nodes);
                println!("{}", "-".repeat(60));
                print!("{}", report::render_outline(&row.tree, &config.display, false));
            }

            println!("\n{}", report::render_table(&comparison));
            if !key_sections.is_empty() {
                print!("{}", report::render_key_sections(&comparison, &key_sections));
            }
            if let Some(best) = comparison.recommendation() {
                println!("\nBest outline: {}", best.to_uppercase());
            }
            if let Some(path) = json {
                std::fs::write(&path, comparison.to_json(chrono::Utc::now())?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Saved trees to {}", path.display());
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn read_output(path: &Path) -> anyhow::Result<BackendOutput> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| doc_outline::OutlineError::InvalidInput(format!("{} is not UTF-8 text", path.display())))?;
    let name = report::backend_name(path)
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "document".to_string());
    Ok(BackendOutput { name, text })
}

fn compare_with_progress(
    outputs: &[BackendOutput],
    rules: Option<&doc_outline::NoiseRules>,
) -> report::Comparison {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(outputs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    let comparison = report::compare(outputs, rules, || pb.inc(1));
    pb.finish_and_clear();
    comparison
}
