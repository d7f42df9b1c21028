// crates/authority-gate-cli/src/main.rs
// ============================================================================
// Module: Authority Gate CLI Entry Point
// Description: Command dispatcher for the governance pipeline.
// Purpose: Expose propose/decide/promote/pipeline/audit/verify to operators.
// Dependencies: clap, authority-gate-core, authority-gate-config,
//               authority-gate-store-jsonl, serde_json
// ============================================================================

//! ## Overview
//! The CLI is a thin collaborator over the core pipeline: it parses raw JSON
//! arguments, resolves policy and ledger paths, reads the wall clock once
//! per command, and prints structured results. All governance semantics live
//! in the core crate. Inputs are untrusted; every supplied intent is
//! re-validated (including hash recomputation) before use.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use authority_gate_config::FilePolicySource;
use authority_gate_config::default_policy_path;
use authority_gate_config::default_witness_path;
use authority_gate_core::ActionIntent;
use authority_gate_core::DEFAULT_AUDIT_LIMIT;
use authority_gate_core::Decision;
use authority_gate_core::GovernancePlane;
use authority_gate_core::InMemoryWitnessLedger;
use authority_gate_core::IntentId;
use authority_gate_core::PipelineConfig;
use authority_gate_core::PipelineOutcome;
use authority_gate_core::ResolutionDecision;
use authority_gate_core::Timestamp;
use authority_gate_core::Verdict;
use authority_gate_core::WitnessRecord;
use authority_gate_core::promote;
use authority_gate_core::propose;
use authority_gate_core::validate_intent;
use authority_gate_store_jsonl::JsonlWitnessLedger;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "authority-gate",
    version,
    about = "Structural authority separation for agent actions"
)]
struct Cli {
    /// Path to the policy YAML file.
    #[arg(long, value_name = "PATH", global = true)]
    policy: Option<PathBuf>,
    /// Path to the witness JSONL file.
    #[arg(long, value_name = "PATH", global = true)]
    witness: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an ActionIntent from raw JSON.
    Propose(ProposeCommand),
    /// Evaluate an intent against the policy.
    Decide(DecideCommand),
    /// Check whether a verdict licenses an intent.
    Promote(PromoteCommand),
    /// Run the full PROPOSE → DECIDE → PROMOTE → WITNESS pipeline.
    Pipeline(PipelineCommand),
    /// Resolve a pending escalation.
    ResolveEscalation(ResolveEscalationCommand),
    /// View recent witness records.
    Audit(AuditCommand),
    /// Verify witness chain integrity.
    Verify,
}

/// Arguments for the `propose` command.
#[derive(clap::Args, Debug)]
struct ProposeCommand {
    /// Raw intent JSON: a parameter bag or a full intent object.
    #[arg(value_name = "JSON")]
    json: String,
}

/// Arguments for the `decide` command.
#[derive(clap::Args, Debug)]
struct DecideCommand {
    /// Full intent JSON to evaluate.
    #[arg(value_name = "INTENT_JSON")]
    intent_json: String,
}

/// Arguments for the `promote` command.
#[derive(clap::Args, Debug)]
struct PromoteCommand {
    /// Full intent JSON.
    #[arg(value_name = "INTENT_JSON")]
    intent_json: String,
    /// Verdict JSON previously produced by `decide`.
    #[arg(value_name = "VERDICT_JSON")]
    verdict_json: String,
}

/// Arguments for the `pipeline` command.
#[derive(clap::Args, Debug)]
struct PipelineCommand {
    /// Raw intent JSON: a parameter bag or a full intent object.
    #[arg(value_name = "JSON")]
    json: String,
}

/// Arguments for the `resolve-escalation` command.
#[derive(clap::Args, Debug)]
struct ResolveEscalationCommand {
    /// Intent identifier of the escalated action.
    #[arg(value_name = "INTENT_ID")]
    intent_id: String,
    /// Human decision to record.
    #[arg(value_name = "DECISION", value_enum)]
    decision: ResolutionArg,
}

/// Arguments for the `audit` command.
#[derive(clap::Args, Debug)]
struct AuditCommand {
    /// Number of trailing records to show.
    #[arg(long, value_name = "N")]
    last: Option<usize>,
}

/// Human decision accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResolutionArg {
    /// Approve the escalated action.
    Approve,
    /// Deny the escalated action.
    Deny,
}

impl From<ResolutionArg> for ResolutionDecision {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Approve => Self::Approve,
            ResolutionArg::Deny => Self::Deny,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let policy_path = resolve_policy_path(cli.policy)?;
    let witness_path = resolve_witness_path(cli.witness)?;

    match cli.command {
        Commands::Propose(command) => command_propose(&command),
        Commands::Decide(command) => command_decide(&command, policy_path),
        Commands::Promote(command) => command_promote(&command),
        Commands::Pipeline(command) => command_pipeline(&command, policy_path, witness_path),
        Commands::ResolveEscalation(command) => {
            command_resolve_escalation(&command, policy_path, witness_path)
        }
        Commands::Audit(command) => command_audit(&command, policy_path, witness_path),
        Commands::Verify => command_verify(policy_path, witness_path),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `propose` command.
fn command_propose(command: &ProposeCommand) -> CliResult<ExitCode> {
    let raw = parse_json(&command.json)?;
    let intent = propose(&raw, Timestamp::now_utc()).map_err(|err| CliError::new(err.to_string()))?;
    print_json(&intent)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `decide` command.
fn command_decide(command: &DecideCommand, policy_path: PathBuf) -> CliResult<ExitCode> {
    let intent = parse_intent(&command.intent_json)?;
    let plane = decision_plane(policy_path);
    let verdict = plane
        .decide(&intent, Timestamp::now_utc())
        .map_err(|err| CliError::new(err.to_string()))?;
    print_json(&verdict)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `promote` command.
fn command_promote(command: &PromoteCommand) -> CliResult<ExitCode> {
    let intent = parse_intent(&command.intent_json)?;
    let verdict: Verdict = serde_json::from_str(&command.verdict_json)
        .map_err(|err| CliError::new(format!("invalid verdict json: {err}")))?;
    let config = PipelineConfig::default();
    let promoted = promote(&intent, &verdict, Timestamp::now_utc(), config.max_verdict_age);
    print_json(&json!({ "promoted": promoted }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `pipeline` command.
fn command_pipeline(
    command: &PipelineCommand,
    policy_path: PathBuf,
    witness_path: PathBuf,
) -> CliResult<ExitCode> {
    let raw = parse_json(&command.json)?;
    let mut plane = witness_plane(policy_path, witness_path)?;
    let outcome = plane
        .run(&raw, Timestamp::now_utc())
        .map_err(|err| CliError::new(err.to_string()))?;
    print_json(&pipeline_summary(&outcome))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `resolve-escalation` command.
fn command_resolve_escalation(
    command: &ResolveEscalationCommand,
    policy_path: PathBuf,
    witness_path: PathBuf,
) -> CliResult<ExitCode> {
    let mut plane = witness_plane(policy_path, witness_path)?;
    let record = plane
        .resolve_escalation(
            &IntentId::new(command.intent_id.clone()),
            command.decision.into(),
            Timestamp::now_utc(),
        )
        .map_err(|err| CliError::new(err.to_string()))?;
    print_json(&json!({
        "governance": record.execution_result.status,
        "intent_id": command.intent_id,
        "witness_sequence": record.sequence,
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `audit` command.
fn command_audit(
    command: &AuditCommand,
    policy_path: PathBuf,
    witness_path: PathBuf,
) -> CliResult<ExitCode> {
    let plane = witness_plane(policy_path, witness_path)?;
    for record in plane.audit(command.last.unwrap_or(DEFAULT_AUDIT_LIMIT)) {
        write_stdout_line(&audit_line(record))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `verify` command.
fn command_verify(policy_path: PathBuf, witness_path: PathBuf) -> CliResult<ExitCode> {
    let plane = witness_plane(policy_path, witness_path)?;
    let verification = plane.verify();
    if verification.report.valid {
        write_stdout_line(&format!(
            "Witness chain valid. {} records verified.",
            verification.total_records
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let broken_at = verification
        .report
        .broken_at
        .map_or_else(|| "?".to_string(), |index| index.to_string());
    let reason = verification.report.reason.unwrap_or_else(|| "unknown".to_string());
    write_stderr_line(&format!("Witness chain BROKEN at record {broken_at}: {reason}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::FAILURE)
}

// ============================================================================
// SECTION: Plane Construction
// ============================================================================

/// Builds a pipeline over the policy file and the durable JSONL ledger.
fn witness_plane(
    policy_path: PathBuf,
    witness_path: PathBuf,
) -> CliResult<GovernancePlane<FilePolicySource, JsonlWitnessLedger>> {
    let ledger = JsonlWitnessLedger::open(witness_path)
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(GovernancePlane::new(
        FilePolicySource::new(policy_path),
        ledger,
        PipelineConfig::default(),
    ))
}

/// Builds a decision-only pipeline that never touches the witness file.
fn decision_plane(policy_path: PathBuf) -> GovernancePlane<FilePolicySource, InMemoryWitnessLedger> {
    GovernancePlane::new(
        FilePolicySource::new(policy_path),
        InMemoryWitnessLedger::new(),
        PipelineConfig::default(),
    )
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves the policy path from the flag or the default location.
fn resolve_policy_path(flag: Option<PathBuf>) -> CliResult<PathBuf> {
    match flag {
        Some(path) => Ok(path),
        None => default_policy_path().map_err(|err| CliError::new(err.to_string())),
    }
}

/// Resolves the witness path from the flag or the default location.
fn resolve_witness_path(flag: Option<PathBuf>) -> CliResult<PathBuf> {
    match flag {
        Some(path) => Ok(path),
        None => default_witness_path().map_err(|err| CliError::new(err.to_string())),
    }
}

// ============================================================================
// SECTION: Input Parsing
// ============================================================================

/// Parses a raw JSON argument.
fn parse_json(input: &str) -> CliResult<Value> {
    serde_json::from_str(input).map_err(|err| CliError::new(format!("invalid json: {err}")))
}

/// Parses and fully validates a supplied intent, including its hash.
fn parse_intent(input: &str) -> CliResult<ActionIntent> {
    let raw = parse_json(input)?;
    validate_intent(&raw).map_err(|errors| CliError::new(format!("invalid action intent: {errors}")))
}

// ============================================================================
// SECTION: Output Shaping
// ============================================================================

/// Builds the pipeline summary object printed to stdout.
fn pipeline_summary(outcome: &PipelineOutcome) -> Value {
    let governance = if outcome.verdict.decision == Decision::Approve {
        "approved".to_string()
    } else {
        outcome.verdict.decision.to_string()
    };
    json!({
        "governance": governance,
        "action": format!("{}:{}", outcome.intent.action.kind, outcome.intent.action.target),
        "rule": outcome.verdict.rule_matched,
        "reason": outcome.verdict.reason,
        "promoted": outcome.promoted,
        "intent_id": outcome.intent.id,
        "witness_sequence": outcome.record.sequence,
    })
}

/// Formats one human-readable audit line.
fn audit_line(record: &WitnessRecord) -> String {
    format!(
        "[{}] {} {}:{} ({}) - {}",
        record.sequence,
        record.execution_result.status.as_str().to_uppercase(),
        record.intent.action.kind,
        record.intent.action.target,
        record.verdict.rule_matched,
        record.verdict.reason
    )
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Prints a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("output serialization failed: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output-stream error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed writing to {stream}: {error}")
}

/// Writes an error message to stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
