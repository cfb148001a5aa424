use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use paprika_import::{ImportError, PaprikaImporter, Settings};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A .paprikarecipe file, a .paprikarecipes export or a directory of .paprikarecipe files
    input: PathBuf,

    /// Directory that receives one folder per recipe
    output: PathBuf,

    /// Settings file (defaults to paprika-import.toml in the current directory, if present)
    #[arg(long, env = "PAPRIKA_CONFIG")]
    config: Option<PathBuf>,

    /// Keep HTML entities such as &amp; as they appear in the export
    #[arg(long)]
    no_entities: bool,

    /// Keep times as written in Paprika instead of ISO 8601 durations
    #[arg(long)]
    keep_times: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Cli) -> Result<ExitCode, ImportError> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if args.no_entities {
        settings.decode_entities = false;
    }
    if args.keep_times {
        settings.iso_durations = false;
    }

    let summary = PaprikaImporter::builder()
        .input(&args.input)
        .output(&args.output)
        .settings(settings)
        .build()?;

    for failure in &summary.failures {
        println!("Skipped {}: {}", failure.origin, failure.error);
    }
    println!(
        "Converted {} recipe(s), skipped {}. Output is in {}",
        summary.succeeded(),
        summary.skipped(),
        args.output.display()
    );

    if summary.all_failed() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
