use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use pdfstencil::analyze::{analyze_corpus, AnalyzeOptions};
use pdfstencil::block::{DEFAULT_COLUMN_GAP_RATIO, DEFAULT_LINE_GAP_RATIO};

/// pdfstencil reconstructs page layout from PDF template families and
/// reports the blocks shared across the whole corpus.
#[derive(Debug, Parser)]
#[clap(name = "pdfstencil", version, author)]
struct CliArguments {
    /// The command to run
    #[command(subcommand)]
    command: Command,

    /// Sets the level of logging verbosity:
    /// -v = info, -vv = debug, -vvv = trace
    #[clap(short, long, action = ArgAction::Count)]
    verbosity: u8,
}

/// What to do.
#[derive(Debug, Subcommand)]
enum Command {
    /// Analyzes a directory of PDF documents and writes the XML reports
    #[command(visible_alias = "a")]
    Analyze(AnalyzeCommand),
}

#[derive(Debug, Parser)]
struct AnalyzeCommand {
    /// Directory containing the PDF corpus
    input_dir: PathBuf,

    /// Directory receiving the XML reports and image artifacts
    output_dir: PathBuf,

    /// JSON code-postal dictionary replacing the built-in city subset
    #[clap(long = "postal-dict", value_name = "FILE")]
    postal_dict: Option<PathBuf>,

    /// Vertical gap threshold between the lines of one block, as a multiple
    /// of the line height
    #[clap(long, value_name = "RATIO", default_value_t = DEFAULT_LINE_GAP_RATIO)]
    line_gap_ratio: f32,

    /// Horizontal gap threshold between the column regions of one block, as
    /// a multiple of the line height
    #[clap(long, value_name = "RATIO", default_value_t = DEFAULT_COLUMN_GAP_RATIO)]
    column_gap_ratio: f32,
}

fn main() -> ExitCode {
    let args = CliArguments::parse();
    init_logging(args.verbosity);

    match args.command {
        Command::Analyze(cmd) => {
            let options = AnalyzeOptions {
                line_gap_ratio: cmd.line_gap_ratio,
                column_gap_ratio: cmd.column_gap_ratio,
                postal_dictionary: cmd.postal_dict,
            };
            match analyze_corpus(&cmd.input_dir, &cmd.output_dir, &options) {
                Ok(summary) => {
                    println!(
                        "analyzed {} documents ({} skipped), {} universal blocks",
                        summary.analyzed, summary.skipped, summary.universal_blocks
                    );
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
