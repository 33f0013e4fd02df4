use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use leader_genes::app::{App, RunOptions, RunSummary};
use leader_genes::config::{ConfigLoader, ResolvedConfig};
use leader_genes::domain::Source;
use leader_genes::entrez::EntrezHttpClient;
use leader_genes::error::MiningError;
use leader_genes::export::Exporter;
use leader_genes::output::{JsonOutput, OutputMode};
use leader_genes::retrieval::ThreadPause;

#[derive(Parser)]
#[command(name = "leader-genes")]
#[command(about = "Mine NCBI Gene, MedGen and GTR for genes associated with a phenotype")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run vocabulary expansion, seeding, cross-check and export")]
    Mine(MineArgs),
    #[command(about = "Show the MeSH vocabulary and query for a phenotype")]
    Vocabulary(VocabularyArgs),
    #[command(about = "Cross-check candidates from an earlier export")]
    CrossCheck(CrossCheckArgs),
}

#[derive(Args)]
struct MineArgs {
    phenotype: String,

    #[arg(long)]
    output: Option<Utf8PathBuf>,

    #[arg(long = "source", value_enum)]
    sources: Vec<Source>,

    #[arg(long)]
    skip_cross_check: bool,

    #[arg(long)]
    no_export: bool,
}

#[derive(Args)]
struct VocabularyArgs {
    phenotype: String,
}

#[derive(Args)]
struct CrossCheckArgs {
    #[arg(long)]
    resume: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<MiningError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MiningError) -> u8 {
    match error {
        MiningError::EmptyQuery
        | MiningError::InvalidDatabase(_)
        | MiningError::InvalidSource(_)
        | MiningError::MissingConfig(_)
        | MiningError::ConfigRead(_)
        | MiningError::ConfigParse(_)
        | MiningError::ReferenceTable { .. } => 2,
        MiningError::EntrezHttp(_)
        | MiningError::EntrezTransient(_)
        | MiningError::EntrezStatus { .. }
        | MiningError::Xml(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Mine(args) => run_mine(args, config, output_mode),
        Commands::Vocabulary(args) => run_vocabulary(args, config, output_mode),
        Commands::CrossCheck(args) => run_cross_check(args, config, output_mode),
    }
}

fn build_app(config: ResolvedConfig) -> miette::Result<App<EntrezHttpClient, ThreadPause>> {
    let client = EntrezHttpClient::new(&config.entrez)?;
    Ok(App::new(client, ThreadPause, config))
}

fn run_mine(
    args: MineArgs,
    mut config: ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    if !args.sources.is_empty() {
        config.sources = args.sources;
    }
    let export_dir = if args.no_export {
        None
    } else {
        Some(args.output.unwrap_or_else(|| config.output_dir.clone()))
    };
    let options = RunOptions {
        cross_check: !args.skip_cross_check,
        export_dir,
    };

    let mut app = build_app(config)?;
    let sink = output_mode.sink();
    let (_, summary) = app.run(&args.phenotype, &options, sink.as_ref())?;

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_summary(&summary).into_diagnostic(),
        OutputMode::Interactive => {
            print_run_summary(&summary);
            Ok(())
        }
    }
}

fn run_vocabulary(
    args: VocabularyArgs,
    config: ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let mut app = build_app(config)?;
    let mut state = app.begin_run();
    let sink = output_mode.sink();
    if !app.expand_vocabulary(&mut state, &args.phenotype, sink.as_ref())? {
        return Err(MiningError::EmptyQuery.into());
    }
    JsonOutput::print_vocabulary(&state.vocabulary).into_diagnostic()
}

fn run_cross_check(
    args: CrossCheckArgs,
    config: ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let exporter = Exporter::new(args.resume);
    let mut state = exporter.load_state()?;
    let mut app = build_app(config)?;
    let sink = output_mode.sink();
    let outcomes = app.cross_check_all(&mut state, sink.as_ref())?;
    exporter.export_verified(&state)?;
    JsonOutput::print_cross_checks(&outcomes).into_diagnostic()
}

fn print_run_summary(summary: &RunSummary) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}leader-genes summary for \"{}\"{reset}", summary.phenotype);
    println!("{cyan}query: {}{reset}", summary.query);
    for source in &summary.sources {
        println!(
            "{yellow}  {} hits={} evaluated={} relevant={} added={} skipped={}{reset}",
            source.source,
            source.hits,
            source.evaluated,
            source.relevant,
            source.genes_added,
            source.skipped
        );
    }
    println!("{yellow}candidate genes: {}{reset}", summary.candidates);
    println!(
        "{green}verified genes ({}): {}{reset}",
        summary.verified.len(),
        summary.verified.join(", ")
    );
    println!("{cyan}requests: {}{reset}", summary.requests);
    for path in &summary.exported {
        println!("{cyan}  wrote {path}{reset}");
    }
}
