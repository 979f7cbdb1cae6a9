//! CLI binary for emerge: scan a source tree into file and entity results.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use emerge_core::analysis::Analysis;
use emerge_core::config::EmergeConfig;
use emerge_core::language::LanguageType;
use emerge_core::results::{FileResult, ResultSet, ScannedFile};
use emerge_parser::generate_entity_results_parallel;
use emerge_parser::languages::LanguageRegistry;
use emerge_parser::tokenizer::scan_tokens;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "emerge", about = "Scope-based entity extraction for source trees")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract file and entity results from a source tree
    Scan {
        /// Project root directory (defaults to current directory)
        path: Option<PathBuf>,

        /// Only scan files of this language
        #[arg(short, long)]
        lang: Option<String>,

        /// Glob patterns to include files (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns to exclude files (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured languages
    Languages {
        /// Project root directory (defaults to current directory)
        path: Option<PathBuf>,
    },
}

fn project_root(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Scan {
            path,
            lang,
            include,
            exclude,
            json,
        } => cmd_scan(&project_root(path)?, lang.as_deref(), &include, &exclude, json),
        Commands::Languages { path } => cmd_languages(&project_root(path)?),
    }
}

/// A source file picked up by the walker, with the parser that will read it.
#[derive(Debug)]
struct SourceFile {
    path: PathBuf,
    relative: PathBuf,
    scanned_by: String,
    language: LanguageType,
    source: String,
}

fn build_glob_set(patterns: &[String], flag: &str) -> Result<Option<globset::GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = globset::GlobSetBuilder::new();
    for p in patterns {
        builder.add(globset::Glob::new(p).with_context(|| format!("invalid {flag} glob '{p}'"))?);
    }
    Ok(Some(
        builder
            .build()
            .with_context(|| format!("invalid {flag} glob set"))?,
    ))
}

/// Collect source files with a registered parser, honoring ignore files and
/// glob filters. `only` restricts the walk to one parser by name.
fn collect_source_files(
    project_root: &Path,
    registry: &LanguageRegistry,
    only: Option<&str>,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<SourceFile>> {
    use indicatif::{ProgressBar, ProgressStyle};

    let include_set = build_glob_set(include, "--include")?;
    let exclude_set = build_glob_set(exclude, "--exclude")?;

    let walker = ignore::WalkBuilder::new(project_root)
        .hidden(true)
        .git_ignore(true)
        .add_custom_ignore_filename(".emergeignore")
        .build();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message("Scanning files...");

    let mut files = Vec::new();

    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let Some(parser) = registry.for_extension(ext) else {
            continue;
        };
        if only.is_some_and(|name| name != parser.name()) {
            continue;
        }
        let relative = path.strip_prefix(project_root).unwrap_or(path);
        if let Some(ref inc) = include_set
            && !inc.is_match(relative)
        {
            continue;
        }
        if let Some(ref exc) = exclude_set
            && exc.is_match(relative)
        {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(source) => {
                files.push(SourceFile {
                    path: path.to_path_buf(),
                    relative: relative.to_path_buf(),
                    scanned_by: parser.scanned_by().to_string(),
                    language: parser.language(),
                    source,
                });
                spinner.set_message(format!("{} files collected", files.len()));
                spinner.tick();
            }
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    spinner.finish_and_clear();
    Ok(files)
}

/// Describe a collected file the way the result model expects it.
fn scanned_file(project_root: &Path, file: SourceFile) -> ScannedFile {
    let relative = file
        .relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let display_name = file
        .relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| relative.clone());
    let module_name = file
        .relative
        .parent()
        .and_then(Path::file_name)
        .or_else(|| project_root.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    ScannedFile {
        scanned_file_name: file.path.display().to_string(),
        relative_file_path_to_analysis: relative.clone(),
        absolute_name: relative,
        display_name,
        module_name,
        scanned_by: file.scanned_by,
        scanned_language: Some(file.language),
        scanned_tokens: scan_tokens(&file.source),
    }
}

fn analysis_name(project_root: &Path) -> String {
    project_root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "emerge".to_string())
}

/// Walk, register and extract. Returns the populated result set.
fn run_scan(
    project_root: &Path,
    registry: &LanguageRegistry,
    analysis: &Arc<Analysis>,
    only: Option<&str>,
    include: &[String],
    exclude: &[String],
) -> Result<ResultSet> {
    let sources = collect_source_files(project_root, registry, only, include, exclude)?;

    let mut results = ResultSet::new();
    for source in sources {
        let relative = source.relative.display().to_string();
        let file = FileResult::create(Arc::clone(analysis), scanned_file(project_root, source))
            .with_context(|| format!("failed to create file result for {relative}"))?;
        results.add_file(file)?;
    }

    let extraction = generate_entity_results_parallel(&results, registry);
    for (file_id, error) in &extraction.failures {
        let file = results
            .file(*file_id)
            .map_or("", FileResult::relative_file_path_to_analysis);
        tracing::warn!(file, error = %error, "entity extraction failed");
    }
    results.add_entities(extraction.entities)?;
    Ok(results)
}

fn cmd_scan(
    project_root: &Path,
    lang: Option<&str>,
    include: &[String],
    exclude: &[String],
    json: bool,
) -> Result<()> {
    let config = EmergeConfig::load(project_root)?;
    let registry =
        LanguageRegistry::from_config(&config).context("failed to compile language tables")?;

    let only = match lang {
        Some(l) => Some(
            registry
                .get(l)
                .with_context(|| format!("unknown language '{l}' (see `emerge languages`)"))?
                .name()
                .to_string(),
        ),
        None => None,
    };

    let analysis = Analysis::new(analysis_name(project_root));
    let results = run_scan(
        project_root,
        &registry,
        &analysis,
        only.as_deref(),
        include,
        exclude,
    )?;

    if results.file_count() == 0 {
        eprintln!("No source files found for the configured languages.");
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&scan_report(&analysis, &results))?
        );
    } else {
        print_results(&results);
    }
    print_summary(&analysis, &results);
    Ok(())
}

fn print_results(results: &ResultSet) {
    for (file_id, file) in results.files() {
        println!("{}", file.relative_file_path_to_analysis());
        for (_, entity) in results.entities_of(file_id) {
            println!(
                "  {} ({} tokens)",
                entity.entity_name(),
                entity.scanned_tokens().len()
            );
        }
    }
}

fn scan_report(analysis: &Analysis, results: &ResultSet) -> serde_json::Value {
    let files: Vec<_> = results
        .files()
        .map(|(file_id, file)| {
            let entities: Vec<_> = results
                .entities_of(file_id)
                .map(|(_, entity)| {
                    serde_json::json!({
                        "name": entity.entity_name(),
                        "absolute_name": entity.absolute_name(),
                        "tokens": entity.scanned_tokens().len(),
                    })
                })
                .collect();
            serde_json::json!({
                "file": file.relative_file_path_to_analysis(),
                "language": file.scanned_language(),
                "scanned_by": file.scanned_by(),
                "entities": entities,
            })
        })
        .collect();

    serde_json::json!({
        "analysis": analysis.name,
        "started_at": analysis.started_at.to_rfc3339(),
        "files": files,
        "statistics": analysis.statistics.snapshot(),
    })
}

fn print_summary(analysis: &Analysis, results: &ResultSet) {
    let elapsed = Utc::now() - analysis.started_at;
    eprintln!(
        "Scanned {} files, extracted {} entities in {}ms",
        results.file_count(),
        results.entity_count(),
        elapsed.num_milliseconds()
    );
    let snapshot = analysis.statistics.snapshot();
    for (key, value) in &snapshot.counters {
        eprintln!("  {key}: {value}");
    }
    if let Some(rate) = snapshot.parsing_hit_rate {
        eprintln!("  parsing hit rate: {:.1}%", rate * 100.0);
    }
}

fn cmd_languages(project_root: &Path) -> Result<()> {
    let config = EmergeConfig::load(project_root)?;
    let registry =
        LanguageRegistry::from_config(&config).context("failed to compile language tables")?;

    for parser in registry.iter() {
        let mut keywords: Vec<&str> = parser.entity_keywords().iter().map(String::as_str).collect();
        keywords.sort_unstable();
        println!(
            "{:<12} {:<16} {}",
            parser.name(),
            parser.extensions().join(", "),
            keywords.join(", ")
        );
    }
    Ok(())
}
