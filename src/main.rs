use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, prelude::*};

use relgraph::fonts::CosmicTextMeasure;
use relgraph::{
    DEFAULT_BASE_NAME, ExportFormat, GenerateOptions, MetadataDocument, Theme, error::Error,
};

/// Render relational table metadata as a clustered relationship diagram
#[derive(Parser, Debug)]
#[command(name = "relgraph", version)]
#[command(about = "Render table lookups and many-to-many joins as SVG, PNG or PDF diagrams", long_about = None)]
struct Args {
    /// Metadata document (.json, .yaml, .yml or .toml)
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output directory, created if missing
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Base file name of the written diagrams
    #[arg(long, default_value = DEFAULT_BASE_NAME)]
    name: String,

    /// Theme file (TOML or YAML) or built-in theme name
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0, value_parser = parse_scale)]
    png_scale: f32,

    /// Also export a PDF
    #[arg(long)]
    pdf: bool,

    /// Log every skipped lookup and relationship, including unresolvable ones
    #[arg(short, long)]
    verbose: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    completions: Option<Shell>,
}

fn parse_scale(raw: &str) -> Result<f32, String> {
    let scale: f32 = raw.parse().map_err(|e| format!("{e}"))?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("{scale} is not a finite value greater than zero"));
    }
    Ok(scale)
}

/// Fallback filter when `RUST_LOG` is unset; dependencies stay quiet.
fn default_filter(verbose: bool) -> &'static str {
    match verbose {
        true => "relgraph=debug",
        false => "relgraph=info",
    }
}

fn init_tracing(verbose: bool) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    if verbose {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .without_time();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

fn run(args: Args) -> Result<(), Error> {
    let Some(input) = args.input else {
        return Ok(());
    };

    let theme = match args.theme.as_deref() {
        Some(theme) => Theme::load(theme)?,
        None => Theme::default(),
    };
    let document = MetadataDocument::load(&input)?;

    let mut formats = vec![ExportFormat::Svg, ExportFormat::Png];
    if args.pdf {
        formats.push(ExportFormat::Pdf);
    }
    let options = GenerateOptions {
        base_name: args.name,
        theme,
        formats,
        png_scale: args.png_scale,
    };

    let generated = relgraph::generate(
        &document,
        &args.output,
        &options,
        CosmicTextMeasure::new(),
    )?;

    let warnings = generated.diagnostics.warnings().count();
    if warnings > 0 {
        eprintln!("{warnings} metadata gap(s) reported");
    }
    for path in &generated.paths {
        println!("{}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        generate(shell, &mut Args::command(), "relgraph", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
