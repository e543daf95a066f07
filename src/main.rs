use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use hubwire::amqp::AmqpError;
use hubwire::config::HubwireConfig;
use hubwire::error::{ClientError, EventHubsError, FailureReason, ServiceErrorTranslator};
use hubwire::logging::init_logging;

/// Failure kinds that can be fed to the translator from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FailureKind {
    /// A generic failure
    General,
    /// A client-side timeout
    Timeout,
    /// An invalid argument
    Argument,
    /// A cancelled task
    TaskCanceled,
    /// An already classified general error
    Classified,
}

#[derive(Parser, Debug)]
#[command(name = "hubwire")]
#[command(version)]
#[command(about = "Classify Event Hubs client failures")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a hubwire TOML configuration file
    #[arg(long, short, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a failure and print the outcome as JSON
    Translate(TranslateArgs),
    /// List AMQP conditions and the reasons they classify as
    Conditions,
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Name of the Event Hub the operation targeted
    #[arg(long, short)]
    resource: String,

    /// AMQP condition symbol of a transport failure
    #[arg(long, conflicts_with = "kind")]
    condition: Option<String>,

    /// Entity the failing AMQP link was addressing
    #[arg(long, requires = "condition", value_name = "NAME")]
    link_resource: Option<String>,

    /// Kind of non-transport failure
    #[arg(long, value_enum)]
    kind: Option<FailureKind>,

    /// Wrap the failure in a cancellation (alone: a bare cancellation)
    #[arg(long)]
    canceled: bool,

    /// Message or description carried by the failure
    #[arg(long, default_value = "")]
    message: String,
}

/// JSON outcome of `hubwire translate`.
#[derive(Debug, Serialize)]
struct TranslationReport<'a> {
    input_kind: &'static str,
    output_kind: &'static str,
    same_instance: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_transient: Option<bool>,
    /// Resource recorded on the transport failure, which translation ignores.
    #[serde(skip_serializing_if = "Option::is_none")]
    link_resource: Option<&'a str>,
}

/// The transport failure behind `error`, looking through one cancellation.
fn transport_failure(error: &ClientError) -> Option<&AmqpError> {
    match error {
        ClientError::OperationCanceled {
            cause: Some(cause), ..
        } => cause.as_amqp(),
        _ => error.as_amqp(),
    }
}

impl<'a> TranslationReport<'a> {
    fn new(input: &'a Arc<ClientError>, output: &'a Arc<ClientError>) -> Self {
        let classified = output.as_event_hubs();
        Self {
            input_kind: input.kind(),
            output_kind: output.kind(),
            same_instance: Arc::ptr_eq(input, output),
            message: output.to_string(),
            reason: classified.map(EventHubsError::reason),
            resource_name: classified.and_then(EventHubsError::resource_name),
            is_transient: classified.map(EventHubsError::is_transient),
            link_resource: transport_failure(input).and_then(AmqpError::resource_name),
        }
    }
}

fn with_default(message: &str, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

fn build_failure(args: &TranslateArgs) -> Option<Arc<ClientError>> {
    let base = match (&args.condition, args.kind) {
        (Some(condition), _) => {
            let amqp = AmqpError::new(condition.as_str(), args.message.clone());
            let amqp = match &args.link_resource {
                Some(name) => amqp.with_resource_name(name.as_str()),
                None => amqp,
            };
            Some(ClientError::from(amqp))
        }
        (None, Some(FailureKind::General)) => Some(ClientError::other(with_default(
            &args.message,
            "An unexpected error occurred.",
        ))),
        (None, Some(FailureKind::Timeout)) => Some(ClientError::Timeout {
            message: with_default(&args.message, "The operation has timed out."),
        }),
        (None, Some(FailureKind::Argument)) => Some(ClientError::invalid_argument(
            "value",
            with_default(&args.message, "Value does not fall within the expected range."),
        )),
        (None, Some(FailureKind::TaskCanceled)) => Some(ClientError::task_canceled()),
        (None, Some(FailureKind::Classified)) => Some(ClientError::from(
            EventHubsError::general(false, with_default(&args.message, "thing")),
        )),
        (None, None) => None,
    };

    match (base, args.canceled) {
        (Some(cause), true) => Some(Arc::new(ClientError::canceled_by(
            "The operation was canceled.",
            Arc::new(cause),
        ))),
        (None, true) => Some(Arc::new(ClientError::canceled())),
        (base, false) => base.map(Arc::new),
    }
}

fn run_translate(translator: &ServiceErrorTranslator, args: &TranslateArgs) -> Result<()> {
    let failure = build_failure(args);
    let translated = translator.try_translate(failure.as_ref(), &args.resource)?;

    // try_translate only succeeds when a failure was supplied.
    if let Some(input) = failure.as_ref() {
        let report = TranslationReport::new(input, &translated);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn run_conditions(translator: &ServiceErrorTranslator) {
    for (condition, reason) in translator.conditions().entries() {
        let reason = reason.map_or("-", FailureReason::as_str);
        println!("{:<40} {}", condition.symbol(), reason);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<HubwireConfig> {
    match path {
        Some(path) => HubwireConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(HubwireConfig::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    init_logging(config.logging_config().with_verbosity(cli.verbose));

    let translator = config.translator();
    tracing::debug!(
        overrides = translator.conditions().override_count(),
        "translator ready"
    );

    match &cli.command {
        Commands::Translate(args) => run_translate(&translator, args)?,
        Commands::Conditions => run_conditions(&translator),
        Commands::Config => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
