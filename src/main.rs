use anyhow::{Context, Result};
use clap::Parser;
use guided_build::logging::{self, LogLevel};
use guided_build::parser::parse_duration;
use guided_build::{BuildCommand, BuildOutcome, Controller, OutcomeKind, Transcript, eas, parse_file};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "guided-build",
    about = "Run `eas build` unattended, answering its interactive prompts",
    version
)]
struct Args {
    /// Path to the eas executable
    #[arg(long, default_value = eas::DEFAULT_PROGRAM)]
    eas: String,

    /// Build platform
    #[arg(long, default_value = eas::DEFAULT_PLATFORM)]
    platform: String,

    /// Build profile from eas.json
    #[arg(long, default_value = eas::DEFAULT_PROFILE)]
    profile: String,

    /// Prompt table file to use instead of the built-in one
    #[arg(long)]
    prompts: Option<PathBuf>,

    /// Where to write the build transcript (overwritten each run)
    #[arg(long, default_value = "build_log.txt")]
    transcript: PathBuf,

    /// Longest wait for any expected output, e.g. `600s`
    #[arg(long, default_value = "600s", value_parser = parse_duration)]
    timeout: Duration,

    /// Pause after answering a prompt
    #[arg(long, default_value = "2s", value_parser = parse_duration)]
    settle: Duration,

    /// Access token for the build tool [default: taken from the variable named by --token-var]
    #[arg(long)]
    token: Option<String>,

    /// Environment variable the build tool reads its token from
    #[arg(long, default_value = eas::TOKEN_VAR)]
    token_var: String,

    /// Directory to run the build in
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Mirror build output to stdout
    #[arg(long)]
    echo: bool,

    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Extra arguments passed to `eas build`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    extra: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level)?;

    let table = match &args.prompts {
        Some(path) => parse_file(path)?,
        None => eas::default_table()?,
    };
    let command = build_command(&args);
    let transcript = Transcript::create(&args.transcript)?;

    println!("Starting EAS build with automatic responses...");

    let mut controller = Controller::spawn(&command, transcript)
        .with_context(|| {
            format!(
                "Could not start `{}`. Install the build tool (`npm install eas-cli`) and run again",
                args.eas
            )
        })?
        .settle(args.settle);
    if args.echo {
        controller = controller.echo();
    }

    let outcome = controller.run(&table, args.timeout).await;
    report(&outcome, &args.transcript);

    Ok(())
}

fn build_command(args: &Args) -> BuildCommand {
    let mut command = BuildCommand::new(&args.eas)
        .args(eas::build_args(&args.platform, &args.profile))
        .args(args.extra.iter().cloned());

    let token = args
        .token
        .clone()
        .or_else(|| std::env::var(&args.token_var).ok());
    match token {
        Some(token) => command = command.env(&args.token_var, token),
        None => warn!(
            "{} is not set; the build tool will rely on an existing login",
            args.token_var
        ),
    }

    if let Some(dir) = &args.cwd {
        command = command.cwd(dir);
    }
    command
}

fn report(outcome: &BuildOutcome, transcript: &Path) {
    match outcome.kind {
        OutcomeKind::Completed => println!("Build finished."),
        OutcomeKind::BuildFailed => println!("Build failed."),
        OutcomeKind::TimedOut => println!("Timed out waiting for the build."),
        OutcomeKind::ProcessExited => println!("Build tool exited before the build finished."),
        OutcomeKind::Errored => {
            if let Some(error) = &outcome.error {
                println!("Error during build: {error}");
            }
        }
    }
    if !outcome.is_success() && !outcome.last_output.trim().is_empty() {
        println!("Last output: {}", outcome.last_output.trim_end());
    }
    println!(
        "\nBuild process completed. Check {} for details.",
        transcript.display()
    );
}
