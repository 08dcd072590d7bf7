//! SDF CLI - Command-line interface for SDF Flux
//!
//! Commands:
//! - fit: Fit a maximum entropy partition on training data
//! - extract: Extract SDF features into a JSON report
//! - encode: Print the symbol sequence of each series
//! - names: Print feature labels for a configuration

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use sdf_flux::{
    feature_names, FeatureMode, FeatureReport, MorphLayout, Partition, PartitionGenerator,
    SampleMatrix, SdfConfig, SdfError, SdfProcessor, SymbolEncoder, SDF_VERSION,
};

/// SDF - Symbolic dynamic filtering features for time series
#[derive(Parser)]
#[command(name = "sdf")]
#[command(author = "Synheart AI Inc")]
#[command(version = SDF_VERSION)]
#[command(about = "Extract symbolic dynamic filtering features", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a maximum entropy partition on training data
    Fit {
        /// Training matrix file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Partition output file (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Orientation of the input matrix
        #[arg(long, default_value = "columns")]
        layout: MatrixLayout,

        /// Alphabet size
        #[arg(long, default_value = "4")]
        num_symbols: usize,
    },

    /// Extract SDF features into a JSON report
    Extract {
        /// Sample matrix file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Report output file (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Orientation of the input matrix
        #[arg(long, default_value = "columns")]
        layout: MatrixLayout,

        /// Fitted partition; fits on the input itself when omitted
        #[arg(long)]
        partition: Option<PathBuf>,

        /// Base configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Alphabet size (overrides the config file)
        #[arg(long)]
        num_symbols: Option<usize>,

        /// Feature mode (overrides the config file)
        #[arg(long)]
        mode: Option<ModeArg>,

        /// Morph flatten order (overrides the config file)
        #[arg(long)]
        morph_layout: Option<MorphLayoutArg>,

        /// Process columns sequentially
        #[arg(long)]
        sequential: bool,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Print the symbol sequence of each series
    Encode {
        /// Sample matrix file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Fitted partition
        #[arg(long)]
        partition: PathBuf,

        /// Orientation of the input matrix
        #[arg(long, default_value = "columns")]
        layout: MatrixLayout,
    },

    /// Print feature labels for a configuration
    Names {
        /// Alphabet size
        #[arg(long, default_value = "4")]
        num_symbols: usize,

        /// Feature mode
        #[arg(long, default_value = "stationary")]
        mode: ModeArg,

        /// Morph flatten order
        #[arg(long, default_value = "row-major")]
        morph_layout: MorphLayoutArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MatrixLayout {
    /// Each inner array is one series
    Columns,
    /// Each inner array is one time step across all series
    Rows,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Stationary vector
    Stationary,
    /// Flattened morph matrix
    Morph,
}

impl From<ModeArg> for FeatureMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Stationary => FeatureMode::Stationary,
            ModeArg::Morph => FeatureMode::Morph,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MorphLayoutArg {
    /// Destination rows one after another
    RowMajor,
    /// Source columns one after another
    Transposed,
}

impl From<MorphLayoutArg> for MorphLayout {
    fn from(layout: MorphLayoutArg) -> Self {
        match layout {
            MorphLayoutArg::RowMajor => MorphLayout::RowMajor,
            MorphLayoutArg::Transposed => MorphLayout::Transposed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
    /// One column per line
    Ndjson,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable; `RUST_LOG` overrides the level
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), SdfCliError> {
    match cli.command {
        Commands::Fit {
            input,
            output,
            layout,
            num_symbols,
        } => cmd_fit(&input, &output, layout, num_symbols),

        Commands::Extract {
            input,
            output,
            layout,
            partition,
            config,
            num_symbols,
            mode,
            morph_layout,
            sequential,
            output_format,
        } => {
            let mut base = match config {
                Some(path) => SdfConfig::load(&path)?,
                None => SdfConfig::default(),
            };
            if let Some(n) = num_symbols {
                base.num_symbols = n;
            }
            if let Some(mode) = mode {
                base.mode = mode.into();
            }
            if let Some(layout) = morph_layout {
                base.morph_layout = layout.into();
            }
            if sequential {
                base.parallel = false;
            }

            cmd_extract(
                &input,
                &output,
                layout,
                partition.as_deref(),
                base,
                output_format,
            )
        }

        Commands::Encode {
            input,
            partition,
            layout,
        } => cmd_encode(&input, &partition, layout),

        Commands::Names {
            num_symbols,
            mode,
            morph_layout,
        } => cmd_names(num_symbols, mode, morph_layout),
    }
}

fn cmd_fit(
    input: &Path,
    output: &Path,
    layout: MatrixLayout,
    num_symbols: usize,
) -> Result<(), SdfCliError> {
    let matrix = read_matrix(input, layout)?;
    let partition = PartitionGenerator::fit_matrix(&matrix, num_symbols)?;

    info!(
        num_symbols,
        samples = matrix.n_rows() * matrix.n_cols(),
        "partition fitted"
    );

    write_output(output, &(partition.to_json()? + "\n"))
}

fn cmd_extract(
    input: &Path,
    output: &Path,
    layout: MatrixLayout,
    partition: Option<&Path>,
    config: SdfConfig,
    output_format: OutputFormat,
) -> Result<(), SdfCliError> {
    let matrix = read_matrix(input, layout)?;
    let mut processor = SdfProcessor::new(config)?;

    // Load an existing partition, or fit on the input itself
    match partition {
        Some(path) => {
            let partition_json = fs::read_to_string(path)?;
            processor.load_partition(&partition_json)?;
        }
        None => {
            debug!("no partition supplied, fitting on input");
            processor.fit(&matrix)?;
        }
    }

    let report = processor.extract_report(&matrix)?;
    info!(
        columns = report.quality.total_columns,
        degenerate = report.quality.degenerate_columns,
        "features extracted"
    );

    write_output(output, &format_report(&report, output_format)?)
}

fn cmd_encode(input: &Path, partition: &Path, layout: MatrixLayout) -> Result<(), SdfCliError> {
    let matrix = read_matrix(input, layout)?;
    let partition = Partition::from_json(&fs::read_to_string(partition)?)?;

    let sequences: Vec<Vec<usize>> = matrix
        .columns()
        .map(|series| SymbolEncoder::encode(series, &partition))
        .collect();

    println!("{}", serde_json::to_string(&sequences)?);
    Ok(())
}

fn cmd_names(
    num_symbols: usize,
    mode: ModeArg,
    morph_layout: MorphLayoutArg,
) -> Result<(), SdfCliError> {
    SdfConfig::new(num_symbols, mode.into()).validate()?;
    for name in feature_names(num_symbols, mode.into(), morph_layout.into()) {
        println!("{name}");
    }
    Ok(())
}

// Helper functions

fn read_matrix(input: &Path, layout: MatrixLayout) -> Result<SampleMatrix, SdfCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(SdfCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let nested: Vec<Vec<f64>> = serde_json::from_str(&input_data)?;
    let matrix = match layout {
        MatrixLayout::Columns => SampleMatrix::from_columns(nested)?,
        MatrixLayout::Rows => SampleMatrix::from_rows(&nested)?,
    };

    if matrix.n_cols() == 0 {
        return Err(SdfCliError::NoSeries);
    }
    Ok(matrix)
}

fn write_output(output: &Path, data: &str) -> Result<(), SdfCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_report(report: &FeatureReport, format: OutputFormat) -> Result<String, SdfCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for column in &report.columns {
                lines.push(serde_json::to_string(column)?);
            }
            Ok(lines.join("\n") + "\n")
        }
    }
}

// Error handling

#[derive(Debug)]
enum SdfCliError {
    Io(io::Error),
    Sdf(SdfError),
    Json(serde_json::Error),
    NoInput,
    NoSeries,
}

impl From<io::Error> for SdfCliError {
    fn from(e: io::Error) -> Self {
        SdfCliError::Io(e)
    }
}

impl From<SdfError> for SdfCliError {
    fn from(e: SdfError) -> Self {
        SdfCliError::Sdf(e)
    }
}

impl From<serde_json::Error> for SdfCliError {
    fn from(e: serde_json::Error) -> Self {
        SdfCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SdfCliError> for CliError {
    fn from(e: SdfCliError) -> Self {
        match e {
            SdfCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SdfCliError::Sdf(e) => {
                let hint = match &e {
                    SdfError::InvalidSymbolCount(_) => "Use --num-symbols 2 or more",
                    SdfError::SymbolCountMismatch { .. } => {
                        "Match --num-symbols to the partition file"
                    }
                    SdfError::RaggedMatrix { .. } => "Check --layout and series lengths",
                    _ => "Check input data and configuration",
                };
                CliError {
                    code: "SDF_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            SdfCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Input must be a JSON array of number arrays".to_string()),
            },
            SdfCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, nothing to read".to_string(),
                hint: Some("Pipe a matrix into the command or pass --input <file>".to_string()),
            },
            SdfCliError::NoSeries => CliError {
                code: "NO_SERIES".to_string(),
                message: "Input matrix has no series".to_string(),
                hint: Some("Ensure input file is not an empty array".to_string()),
            },
        }
    }
}
