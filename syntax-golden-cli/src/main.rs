use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use syntax_golden::{
    ExpectedMismatches, Harness, HarnessConfig, HarnessError, ProcessAdapter, StdFileSystem,
    StdProcess,
};
use syntax_golden_tokens::TokenTreeParser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Exit code for runs that could not finish.
const EXIT_FATAL: i32 = 2;

/// Snapshot-test a parser against recorded baselines
#[derive(Parser, Debug)]
#[command(name = "syntax-golden")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory or single file to scan, overriding `root` from the config
    root: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "syntax-golden.toml")]
    config: PathBuf,

    /// Source file extension, without the dot
    #[arg(long)]
    ext: Option<String>,

    /// Do not run the capability smoke checks
    #[arg(long)]
    skip_smoke: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Relative paths in the config are taken from the config's directory.
fn relative_to_config(config_path: &Path, path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn load_config(cli: &Cli) -> Result<(HarnessConfig, ExpectedMismatches), HarnessError> {
    let mut config = HarnessConfig::load(&cli.config)?;
    config.root = match &cli.root {
        Some(root) => root.clone(),
        None => relative_to_config(&cli.config, Path::new(&config.root))
            .to_string_lossy()
            .into_owned(),
    };
    if let Some(ext) = &cli.ext {
        config.source_extension = ext.clone();
    }
    debug!(?config, "configuration loaded");

    let expected = match &config.expected_failures {
        Some(path) => ExpectedMismatches::load(&relative_to_config(&cli.config, path))?,
        None => ExpectedMismatches::default(),
    };
    Ok((config, expected))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let process = StdProcess::from_env();
    let (config, expected) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            process.print(&[&"ABORTED:", &err]);
            process.exit(EXIT_FATAL)
        }
    };

    let fs = StdFileSystem::new();
    let parser = TokenTreeParser::new();
    let verdict = Harness::new(&fs, &process, &parser)
        .with_config(config)
        .with_expected_mismatches(expected)
        .with_skip_smoke(cli.skip_smoke)
        .run();

    process.exit(verdict.exit_code())
}
