use clap::{Parser, Subcommand};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use ignore::WalkBuilder;
use serde::Serialize;
use tracing::warn;

use crate::core::{
    Document, Framework, GroupedView, OutlineEngine, SymbolNode, SymbolPresenter, SymbolStats,
};

#[derive(Parser)]
#[command(name = "symscope")]
#[command(about = "Framework-Aware Symbol Outlines For Front-End Code")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the grouped symbol outline of one file
    Outline {
        /// Source file to analyze
        file: PathBuf,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,

        /// Apply a quick filter by id (see `symscope filters`)
        #[arg(long)]
        filter: Option<String>,

        /// Narrow the outline with a free-text search query
        #[arg(short, long)]
        query: Option<String>,

        /// Only show symbols with priority high or above
        #[arg(long)]
        important: bool,

        /// Only show symbols referenced from the template
        #[arg(long)]
        template_only: bool,
    },

    /// Print symbol statistics for one file
    Stats {
        /// Source file to analyze
        file: PathBuf,

        /// Emit the stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan a directory and summarize every front-end source file
    Scan {
        /// Directory to walk (respects .gitignore)
        dir: PathBuf,
    },

    /// List the quick-filter catalog
    Filters,
}

/// JSON report envelope for `outline --json`
#[derive(Serialize)]
struct OutlineReport {
    generated_at: String,
    file: PathBuf,
    framework: &'static str,
    stats: SymbolStats,
    groups: Vec<GroupReport>,
}

#[derive(Serialize)]
struct GroupReport {
    id: String,
    label: String,
    icon: String,
    color: String,
    default_expanded: bool,
    symbols: Vec<SymbolNode>,
}

impl Cli {
    pub async fn execute(self, engine: OutlineEngine) -> Result<()> {
        match self.command {
            Commands::Outline {
                file,
                json,
                filter,
                query,
                important,
                template_only,
            } => outline(engine, file, json, filter, query, important, template_only).await,
            Commands::Stats { file, json } => stats(engine, file, json).await,
            Commands::Scan { dir } => scan(engine, dir).await,
            Commands::Filters => filters(engine),
        }
    }
}

async fn load(engine: &OutlineEngine, file: &PathBuf) -> Result<()> {
    let document = Document::from_path(file, engine.config().outline.max_file_size)?;
    engine.set_document(document);
    engine.refresh_now().await;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn outline(
    engine: OutlineEngine,
    file: PathBuf,
    json: bool,
    filter: Option<String>,
    query: Option<String>,
    important: bool,
    template_only: bool,
) -> Result<()> {
    load(&engine, &file).await?;

    if let Some(query) = query.as_deref() {
        engine.search(query);
    }
    if let Some(filter) = filter.as_deref() {
        engine.apply_quick_filter(filter);
    }
    if important {
        engine.toggle_important_filter();
    }
    if template_only {
        engine.toggle_template_usage_filter();
    }

    let view = engine.grouped();

    if json {
        let report = build_report(&engine, &file, &view);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "📄 {} · {}",
        file.display(),
        view.framework.display_name()
    );

    if view.buckets.is_empty() {
        println!("  (no symbols)");
        return Ok(());
    }

    let presenter = SymbolPresenter::new(&engine.config().display);
    for bucket in &view.buckets {
        let header = presenter.group_header(&bucket.definition, bucket.symbols.len());
        println!("\n{}", header.label);
        for &id in &bucket.symbols {
            if let Some(display) = presenter.symbol_display(&view.forest, id) {
                println!("  {} — {}", display.label, display.description);
            }
        }
    }

    Ok(())
}

fn build_report(engine: &OutlineEngine, file: &PathBuf, view: &GroupedView) -> OutlineReport {
    OutlineReport {
        generated_at: Utc::now().to_rfc3339(),
        file: file.clone(),
        framework: view.framework.display_name(),
        stats: engine.symbol_stats(),
        groups: view
            .buckets
            .iter()
            .map(|bucket| GroupReport {
                id: bucket.definition.id.clone(),
                label: bucket.definition.name.clone(),
                icon: bucket.definition.icon.clone(),
                color: bucket.definition.color.clone(),
                default_expanded: bucket.definition.default_expanded,
                symbols: bucket
                    .symbols
                    .iter()
                    .filter_map(|id| view.forest.get(*id).cloned())
                    .collect(),
            })
            .collect(),
    }
}

async fn stats(engine: OutlineEngine, file: PathBuf, json: bool) -> Result<()> {
    load(&engine, &file).await?;
    let stats = engine.symbol_stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("📄 {}", file.display());
    println!("框架: {}", stats.framework.display_name());
    println!("符号总数: {}", stats.total);
    if !stats.by_priority.is_empty() {
        let mut rows: Vec<_> = stats.by_priority.iter().collect();
        rows.sort();
        println!("按优先级:");
        for (priority, count) in rows {
            println!("  {priority}: {count}");
        }
    }
    if !stats.by_category.is_empty() {
        let mut rows: Vec<_> = stats.by_category.iter().collect();
        rows.sort();
        println!("按类别:");
        for (category, count) in rows {
            println!("  {category}: {count}");
        }
    }

    Ok(())
}

async fn scan(engine: OutlineEngine, dir: PathBuf) -> Result<()> {
    let extensions = engine.config().outline.extensions.clone();
    let mut summaries: Vec<(PathBuf, Framework, usize)> = Vec::new();

    let walker = WalkBuilder::new(&dir).hidden(false).git_ignore(true).build();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !has_extension(path, &extensions) {
            continue;
        }

        if load(&engine, &path.to_path_buf()).await.is_err() {
            warn!("Skipping unreadable file: {}", path.display());
            continue;
        }
        let stats = engine.symbol_stats();
        summaries.push((path.to_path_buf(), stats.framework, stats.total));
    }

    if summaries.is_empty() {
        println!("No front-end source files found under {}", dir.display());
        return Ok(());
    }

    summaries.sort();
    for (path, framework, total) in &summaries {
        println!(
            "{} · {} · {} symbols",
            path.display(),
            framework.display_name(),
            total
        );
    }
    println!("\n{} files scanned", summaries.len());

    Ok(())
}

fn filters(engine: OutlineEngine) -> Result<()> {
    println!("Quick filters:");
    for filter in engine.quick_filters() {
        let hotkey = filter
            .hotkey
            .map(|key| format!("[{key}] "))
            .unwrap_or_default();
        println!("  {hotkey}{} — {}", filter.id, filter.name);
    }
    Ok(())
}

fn has_extension(path: &std::path::Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_lowercase();
            extensions.iter().any(|candidate| candidate == &lower)
        })
}
