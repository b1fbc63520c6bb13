// crates/dataset-registry-cli/src/main.rs
// ============================================================================
// Module: Dataset Registry CLI Entry Point
// Description: Command dispatcher for dataset registry operations.
// Purpose: Expose every registry read and mutation with JSON output.
// Dependencies: clap, dataset-registry-cli, dataset-registry-config,
//               dataset-registry-core, serde, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! The `dataset-registry` binary opens the registry described by the config
//! file, runs one operation, and writes the result to stdout as canonical
//! JSON. Failures are written to stderr as `{"error":{"kind","message"}}`
//! with a non-zero exit code; `kind` is the stable registry error label.
//! Mutating commands take the caller identity from `--caller`; the host is
//! trusted to supply it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use dataset_registry_cli::backend::BackendError;
use dataset_registry_cli::backend::CliRegistry;
use dataset_registry_cli::backend::open_registry;
use dataset_registry_cli::input::InputError;
use dataset_registry_cli::input::read_json;
use dataset_registry_config::DatasetRegistryConfig;
use dataset_registry_core::DEFAULT_MAX_PAGE_SIZE;
use dataset_registry_core::DatasetFields;
use dataset_registry_core::DatasetId;
use dataset_registry_core::DatasetImport;
use dataset_registry_core::MetadataUpdate;
use dataset_registry_core::OwnerId;
use dataset_registry_core::RegistryError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "dataset-registry", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to dataset-registry.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new dataset owned by the caller.
    Register(InputCommand),
    /// Fetch one dataset record.
    Get(IdArgs),
    /// List every dataset id held by an owner, oldest first.
    OwnerIds(OwnerArgs),
    /// Print the highest dataset id issued so far.
    Count,
    /// Page through dataset ids.
    PageIds(PageArgs),
    /// Page through one owner's dataset ids.
    PageOwnerIds(OwnerPageArgs),
    /// Page through dataset records, skipping ids that were never created.
    PageRecords(PageArgs),
    /// Page through one owner's dataset records.
    PageOwnerRecords(OwnerPageArgs),
    /// Replace a dataset's descriptive metadata.
    Update(UpdateCommand),
    /// Freeze a dataset's descriptive metadata.
    Freeze(CallerIdCommand),
    /// Transfer a dataset to a new owner.
    Transfer(TransferCommand),
    /// Import a complete record with an explicit id (admin only).
    Import(InputCommand),
    /// Replace the admin identity (admin only).
    SetAdmin(SetAdminCommand),
    /// Set the pause flag (admin only).
    SetPaused(SetPausedCommand),
    /// Print the admin identity.
    Admin,
    /// Print the pause flag.
    Paused,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a dataset registry configuration file.
    Validate,
}

/// Caller identity for mutating commands.
#[derive(Args, Debug)]
struct CallerArgs {
    /// Identity performing the mutation.
    #[arg(long, value_name = "IDENTITY")]
    caller: String,
}

/// Dataset id argument.
#[derive(Args, Debug)]
struct IdArgs {
    /// Dataset id (1-based).
    #[arg(long, value_name = "ID")]
    id: u64,
}

/// Owner argument.
#[derive(Args, Debug)]
struct OwnerArgs {
    /// Owner identity.
    #[arg(long, value_name = "IDENTITY")]
    owner: String,
}

/// Offset and limit arguments.
#[derive(Args, Debug)]
struct PageArgs {
    /// Cursor returned by the previous page.
    #[arg(long, default_value_t = 0)]
    offset: u64,
    /// Requested page size; clamped to the configured maximum.
    #[arg(long, default_value_t = DEFAULT_MAX_PAGE_SIZE)]
    limit: u64,
}

/// Owner page arguments.
#[derive(Args, Debug)]
struct OwnerPageArgs {
    /// Owner selection.
    #[command(flatten)]
    owner: OwnerArgs,
    /// Page selection.
    #[command(flatten)]
    page: PageArgs,
}

/// Mutation driven by a JSON request file.
#[derive(Args, Debug)]
struct InputCommand {
    /// Caller identity.
    #[command(flatten)]
    caller: CallerArgs,
    /// JSON request file.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
}

/// Arguments for `update`.
#[derive(Args, Debug)]
struct UpdateCommand {
    /// Caller identity.
    #[command(flatten)]
    caller: CallerArgs,
    /// Target dataset.
    #[command(flatten)]
    id: IdArgs,
    /// JSON file holding name, description, `data_type`, and `is_public`.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
}

/// Mutation addressed to a single dataset.
#[derive(Args, Debug)]
struct CallerIdCommand {
    /// Caller identity.
    #[command(flatten)]
    caller: CallerArgs,
    /// Target dataset.
    #[command(flatten)]
    id: IdArgs,
}

/// Arguments for `transfer`.
#[derive(Args, Debug)]
struct TransferCommand {
    /// Caller identity.
    #[command(flatten)]
    caller: CallerArgs,
    /// Target dataset.
    #[command(flatten)]
    id: IdArgs,
    /// Receiving owner identity.
    #[arg(long, value_name = "IDENTITY")]
    new_owner: String,
}

/// Arguments for `set-admin`.
#[derive(Args, Debug)]
struct SetAdminCommand {
    /// Caller identity.
    #[command(flatten)]
    caller: CallerArgs,
    /// Replacement admin identity.
    #[arg(long, value_name = "IDENTITY")]
    new_admin: String,
}

/// Arguments for `set-paused`.
#[derive(Args, Debug)]
struct SetPausedCommand {
    /// Caller identity.
    #[command(flatten)]
    caller: CallerArgs,
    /// New pause flag.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    paused: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a stable kind label.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Stable error label.
    kind: &'static str,
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(kind: &'static str, message: String) -> Self {
        Self {
            kind,
            message,
        }
    }
}

impl From<RegistryError> for CliError {
    fn from(error: RegistryError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}

impl From<BackendError> for CliError {
    fn from(error: BackendError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}

impl From<InputError> for CliError {
    fn from(error: InputError) -> Self {
        Self::new("input", error.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Loads configuration and dispatches the selected command.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = DatasetRegistryConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new("config", format!("failed to load config: {err}")))?;
    if let Commands::Config {
        command: ConfigCommand::Validate,
    } = cli.command
    {
        write_json(&json!({ "valid": true }))?;
        return Ok(ExitCode::SUCCESS);
    }
    let registry = open_registry(&config)?;
    dispatch(&registry, cli.command)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs one registry command and writes its result.
fn dispatch(registry: &CliRegistry, command: Commands) -> CliResult<()> {
    match command {
        Commands::Register(command) => {
            let fields: DatasetFields = read_json(&command.input)?;
            let id = registry.register(&caller(&command.caller), fields)?;
            write_json(&json!({ "id": id }))
        }
        Commands::Get(args) => write_json(&registry.get(dataset_id(args.id)?)?),
        Commands::OwnerIds(args) => {
            let owner = OwnerId::new(args.owner);
            let ids = registry.get_owner_ids(&owner)?;
            write_json(&json!({ "owner": owner, "ids": ids }))
        }
        Commands::Count => write_json(&json!({ "count": registry.get_count()? })),
        Commands::PageIds(page) => write_json(&registry.page_ids(page.offset, page.limit)?),
        Commands::PageOwnerIds(args) => write_json(&registry.page_owner_ids(
            &OwnerId::new(args.owner.owner),
            args.page.offset,
            args.page.limit,
        )?),
        Commands::PageRecords(page) => {
            write_json(&registry.page_records(page.offset, page.limit)?)
        }
        Commands::PageOwnerRecords(args) => write_json(&registry.page_owner_records(
            &OwnerId::new(args.owner.owner),
            args.page.offset,
            args.page.limit,
        )?),
        Commands::Update(command) => {
            let update: MetadataUpdate = read_json(&command.input)?;
            registry.update_metadata(&caller(&command.caller), dataset_id(command.id.id)?, update)?;
            write_json(&json!({ "ok": true }))
        }
        Commands::Freeze(command) => {
            registry.freeze_metadata(&caller(&command.caller), dataset_id(command.id.id)?)?;
            write_json(&json!({ "ok": true }))
        }
        Commands::Transfer(command) => {
            registry.transfer(
                &caller(&command.caller),
                dataset_id(command.id.id)?,
                &OwnerId::new(command.new_owner),
            )?;
            write_json(&json!({ "ok": true }))
        }
        Commands::Import(command) => {
            let request: DatasetImport = read_json(&command.input)?;
            let id = registry.import(&caller(&command.caller), request)?;
            write_json(&json!({ "id": id }))
        }
        Commands::SetAdmin(command) => {
            let admin =
                registry.set_admin(&caller(&command.caller), OwnerId::new(command.new_admin))?;
            write_json(&json!({ "admin": admin }))
        }
        Commands::SetPaused(command) => {
            let paused = registry.set_paused(&caller(&command.caller), command.paused)?;
            write_json(&json!({ "paused": paused }))
        }
        Commands::Admin => write_json(&json!({ "admin": registry.get_admin()? })),
        Commands::Paused => write_json(&json!({ "paused": registry.is_paused()? })),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => write_json(&json!({ "valid": true })),
    }
}

// ============================================================================
// SECTION: Argument Helpers
// ============================================================================

/// Returns the caller identity.
fn caller(args: &CallerArgs) -> OwnerId {
    OwnerId::new(args.caller.as_str())
}

/// Converts a raw id; id 0 is never issued, so it is reported as not found.
fn dataset_id(raw: u64) -> CliResult<DatasetId> {
    DatasetId::from_raw(raw)
        .ok_or_else(|| CliError::new("not_found", format!("dataset {raw} not found")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value to stdout as one line of canonical JSON.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new("output", format!("failed to encode output: {err}")))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout
        .write_all(&bytes)
        .map_err(|err| CliError::new("output", format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error to stderr and returns a failure exit code.
fn emit_error(error: &CliError) -> ExitCode {
    let payload = json!({ "error": { "kind": error.kind, "message": error.message } });
    let line = serde_jcs::to_string(&payload).unwrap_or_else(|_| error.to_string());
    let _ = write_stderr_line(&line);
    ExitCode::FAILURE
}
