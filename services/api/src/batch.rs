use clap::{Args, ValueEnum};
use site_scoring::config::{AppConfig, ScoringConfig};
use site_scoring::error::AppError;
use site_scoring::export::{export_results, export_workbook, ranked, ExportFormat};
use site_scoring::scoring::{score_all, SchemaRegistry, SchemaVariant, ScoredLocation};
use site_scoring::tabular::{parse_table, IngestStats};
use site_scoring::templates::{csv_template, excel_template, mock_workbook};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV or Excel file with one location per row
    pub(crate) file: PathBuf,
    /// Write results to this file; the extension picks json, csv or xlsx
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,
    /// Only print the best N locations
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Factor registry to score against (standard or extended)
    #[arg(long, value_parser = crate::infra::parse_variant)]
    pub(crate) variant: Option<SchemaVariant>,
    /// Minimum recognized factors per row
    #[arg(long, value_parser = crate::infra::parse_min_factors)]
    pub(crate) min_factors: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum TemplateKind {
    /// CSV with one example row per product
    Csv,
    /// Example workbook with PV, Storage, Charging and Info sheets
    Excel,
    /// Workbook with random locations for demos
    Mock,
}

#[derive(Args, Debug)]
pub(crate) struct TemplateArgs {
    #[arg(value_enum)]
    pub(crate) kind: TemplateKind,
    /// Destination file
    #[arg(long, short)]
    pub(crate) output: PathBuf,
    /// Seed for reproducible mock data
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Factor registry used for the CSV and Excel templates
    #[arg(long, value_parser = crate::infra::parse_variant)]
    pub(crate) variant: Option<SchemaVariant>,
}

fn scoring_config(
    variant: Option<SchemaVariant>,
    min_factors: Option<usize>,
) -> Result<ScoringConfig, AppError> {
    let mut scoring = AppConfig::load()?.scoring;
    if let Some(variant) = variant {
        scoring.variant = variant;
    }
    if let Some(min_factors) = min_factors {
        scoring.min_factors = min_factors;
    }
    Ok(scoring)
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let scoring = scoring_config(args.variant, args.min_factors)?;
    let registry = SchemaRegistry::get(scoring.variant);

    let bytes = std::fs::read(&args.file)?;
    let filename = display_name(&args.file);
    let parsed = parse_table(&bytes, &filename, registry, scoring.ingest_options())?;
    let results = score_all(parsed.drafts().iter().cloned(), registry);

    match args.output {
        Some(output) => {
            let format = ExportFormat::from_path(&output.to_string_lossy()).ok_or_else(|| {
                AppError::Validation(format!(
                    "unsupported output '{}': use .json, .csv or .xlsx",
                    output.display()
                ))
            })?;
            let body = match format {
                ExportFormat::Xlsx => export_workbook(&parsed, &results)?,
                ExportFormat::Json | ExportFormat::Csv => {
                    export_results(&results, format, registry)?
                }
            };
            std::fs::write(&output, body)?;
            println!(
                "Scored {} locations from {} into {}",
                results.len(),
                filename,
                output.display()
            );
        }
        None => render_ranking(&filename, parsed.stats, &results, args.limit),
    }

    Ok(())
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    let scoring = scoring_config(args.variant, None)?;
    let registry = SchemaRegistry::get(scoring.variant);

    let body = match args.kind {
        TemplateKind::Csv => csv_template(registry)?,
        TemplateKind::Excel => excel_template(registry)?,
        TemplateKind::Mock => mock_workbook(args.seed)?,
    };
    std::fs::write(&args.output, body)?;
    println!("Template written to {}", args.output.display());
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

pub(crate) fn ranking_lines(results: &[ScoredLocation], limit: Option<usize>) -> Vec<String> {
    ranked(results)
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(position, result)| {
            format!(
                "{:>3}. {:>5.1}  {:<8} #{:<5} {}",
                position + 1,
                result.score,
                result.product.key(),
                result.location_id,
                result.location_name
            )
        })
        .collect()
}

fn render_ranking(
    filename: &str,
    stats: IngestStats,
    results: &[ScoredLocation],
    limit: Option<usize>,
) {
    println!("Location scoring");
    println!("File: {filename}");
    println!(
        "Rows: {} read, {} scored, {} skipped",
        stats.rows_seen, stats.accepted, stats.dropped
    );
    println!("\nRanking");
    for line in ranking_lines(results, limit) {
        println!("  {line}");
    }
}
