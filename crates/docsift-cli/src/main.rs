use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use docsift_core::{
    AnalysisConfigBuilder, CollectionAnalyzer, CollectionReport, DocumentEvent, InputSpec,
};
use docsift_pdfium::PdfiumSource;

/// Extract and rank the document sections most relevant to a persona and
/// task from a collection of PDFs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Collection directory (defaults to the current directory)
    collection_dir: Option<PathBuf>,

    /// Path to the input specification JSON
    /// (default: <collection>/challenge1b_input.json)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to write the result JSON
    /// (default: <collection>/predicted_output.json)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding the PDF files
    /// (default: <collection>/PDFs when present, else the collection dir)
    #[arg(long)]
    pdf_dir: Option<PathBuf>,

    /// Number of sections to extract collection-wide
    #[arg(long)]
    top_sections: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,

    /// Directory holding a local pdfium library
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Soft per-document time budget in seconds
    #[arg(long)]
    time_budget_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Resolve configuration: CLI flags > env vars > defaults
    let collection_dir = cli
        .collection_dir
        .unwrap_or_else(|| PathBuf::from("."));
    let input_path = cli
        .input
        .unwrap_or_else(|| collection_dir.join("challenge1b_input.json"));
    let output_path = cli
        .output
        .unwrap_or_else(|| collection_dir.join("predicted_output.json"));
    let pdf_dir = cli.pdf_dir.unwrap_or_else(|| {
        let pdfs = collection_dir.join("PDFs");
        if pdfs.is_dir() { pdfs } else { collection_dir.clone() }
    });
    let pdfium_lib = cli
        .pdfium_lib
        .or_else(|| std::env::var("PDFIUM_LIB_PATH").ok().map(PathBuf::from));

    if !input_path.exists() {
        anyhow::bail!("Input specification not found: {}", input_path.display());
    }

    let spec = InputSpec::from_file(&input_path)?;

    let mut builder = AnalysisConfigBuilder::new();
    if let Some(n) = cli.top_sections {
        builder = builder.section_count(n);
    }
    let config = builder.build()?;
    let analyzer = CollectionAnalyzer::with_config(config);

    let mut source = PdfiumSource::new();
    if let Some(dir) = pdfium_lib {
        source = source.with_library_path(dir);
    }
    if let Some(secs) = cli.time_budget_secs {
        source = source.with_time_budget(Duration::from_secs(secs));
    }

    let timestamp = chrono::Utc::now().to_rfc3339();

    let bar = if cli.quiet {
        indicatif::ProgressBar::hidden()
    } else {
        let bar = indicatif::ProgressBar::new(spec.documents.len() as u64);
        bar.set_style(
            indicatif::ProgressStyle::with_template(
                "{spinner:.cyan} {msg} [{bar:40.cyan/dim}] {pos}/{len}",
            )
            .expect("static template")
            .progress_chars("=> "),
        );
        bar
    };

    let report = analyzer.analyze_with_progress(
        &source,
        &spec,
        &pdf_dir,
        timestamp,
        |event| match event {
            DocumentEvent::Started { filename } => bar.set_message(filename.to_string()),
            DocumentEvent::Collected { .. } | DocumentEvent::Skipped { .. } => bar.inc(1),
        },
    )?;
    bar.finish_and_clear();

    report
        .result
        .write_pretty(std::fs::File::create(&output_path)?)?;

    print_run_summary(
        &mut std::io::stdout(),
        &report,
        &output_path,
        !cli.no_color,
    )?;

    // Partial skips are still a success; only fatal pipeline errors
    // (handled above via `?`) produce a non-zero exit.
    Ok(())
}

fn print_run_summary(
    writer: &mut impl Write,
    report: &CollectionReport,
    output_path: &std::path::Path,
    use_color: bool,
) -> std::io::Result<()> {
    for skip in &report.skipped {
        let msg = format!("Skipped {}: {}", skip.filename, skip.reason);
        if use_color {
            use owo_colors::OwoColorize;
            writeln!(writer, "{}", msg.yellow())?;
        } else {
            writeln!(writer, "{}", msg)?;
        }
    }

    writeln!(
        writer,
        "Extracted {} sections and {} subsections from {} of {} documents",
        report.result.extracted_sections.len(),
        report.result.subsection_analysis.len(),
        report.timings.len(),
        report.result.metadata.input_documents.len(),
    )?;
    writeln!(writer, "Wrote {}", output_path.display())?;

    Ok(())
}
