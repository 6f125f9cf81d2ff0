// crates/permission-engine-cli/src/main.rs
// ============================================================================
// Module: Permission Engine CLI Entry Point
// Description: Command dispatcher for permission engine administration.
// Purpose: Drive every permission action and read against a configured ledger.
// Dependencies: clap, permission-engine-core, permission-engine-config, tokio.
// ============================================================================

//! ## Overview
//! The `permission-engine` binary opens the engine described by
//! `permission-engine.toml`, runs exactly one command, and prints the result
//! as canonical JSON on stdout. Actions take the calling account via `--as`;
//! the engine decides whether that account is allowed to act. All
//! user-facing strings are routed through the i18n catalog.
//!
//! Security posture: arguments and input files are untrusted and are parsed
//! into validated identifiers before reaching the engine.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use permission_engine_broker::FanoutEventSink;
use permission_engine_broker::HttpPayloadStore;
use permission_engine_broker::LogEventSink;
use permission_engine_cli::i18n::Locale;
use permission_engine_cli::i18n::set_locale;
use permission_engine_cli::t;
use permission_engine_config::AuditSinkType;
use permission_engine_config::PermissionEngineConfig;
use permission_engine_config::example_config_toml;
use permission_engine_core::AccessLevel;
use permission_engine_core::AccountAddress;
use permission_engine_core::AccountRecord;
use permission_engine_core::AccountStatusAction;
use permission_engine_core::ActionOutcome;
use permission_engine_core::AuditSink;
use permission_engine_core::AuthContext;
use permission_engine_core::EnodeId;
use permission_engine_core::FileAuditSink;
use permission_engine_core::IdentifierError;
use permission_engine_core::InMemoryLedger;
use permission_engine_core::NodeRecord;
use permission_engine_core::NodeStatusAction;
use permission_engine_core::NoopAuditSink;
use permission_engine_core::OrgId;
use permission_engine_core::OrgStatus;
use permission_engine_core::OrgStatusAction;
use permission_engine_core::PayloadStore;
use permission_engine_core::PendingOpType;
use permission_engine_core::PendingOperation;
use permission_engine_core::PermissionEngine;
use permission_engine_core::PermissionError;
use permission_engine_core::RoleDefinition;
use permission_engine_core::RoleId;
use permission_engine_core::RoleRecord;
use permission_engine_core::SharedEventSink;
use permission_engine_core::SharedLedger;
use permission_engine_core::StderrAuditSink;
use permission_engine_core::TargetKey;
use permission_engine_core::VoteTarget;
use permission_engine_core::canonical_json_bytes;
use permission_engine_store_sqlite::SqliteLedger;
use permission_engine_store_sqlite::SqliteLedgerError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a payload read for `payload store-raw`.
const MAX_PAYLOAD_INPUT_BYTES: usize = 4 * 1024 * 1024;
/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "PERMISSION_ENGINE_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "permission-engine", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `PERMISSION_ENGINE_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Config file path (defaults to permission-engine.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Network bootstrap and boot status.
    Network {
        /// Selected network subcommand.
        #[command(subcommand)]
        command: NetworkCommand,
    },
    /// Org lifecycle actions and reads.
    Org {
        /// Selected org subcommand.
        #[command(subcommand)]
        command: OrgCommand,
    },
    /// Node lifecycle actions and reads.
    Node {
        /// Selected node subcommand.
        #[command(subcommand)]
        command: NodeCommand,
    },
    /// Role management.
    Role {
        /// Selected role subcommand.
        #[command(subcommand)]
        command: RoleCommand,
    },
    /// Account role assignment and status.
    Account {
        /// Selected account subcommand.
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Cast an approval on the open vote of an auth org.
    Vote(VoteCommand),
    /// Cancel the open vote of an auth org without applying it.
    Cancel(CancelCommand),
    /// Open vote inspection.
    Pending {
        /// Selected pending subcommand.
        #[command(subcommand)]
        command: PendingCommand,
    },
    /// `SQLite` ledger administration.
    Ledger {
        /// Selected ledger subcommand.
        #[command(subcommand)]
        command: LedgerCommand,
    },
    /// Encrypted payload store client.
    Payload {
        /// Selected payload subcommand.
        #[command(subcommand)]
        command: PayloadCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate,
    /// Write the example configuration to disk.
    Init(ConfigInitCommand),
}

/// Arguments for `config init`.
#[derive(Args, Debug)]
struct ConfigInitCommand {
    /// Destination path.
    #[arg(long, value_name = "PATH", default_value = "permission-engine.toml")]
    output: PathBuf,
    /// Overwrite an existing file.
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
}

/// Network subcommands.
#[derive(Subcommand, Debug)]
enum NetworkCommand {
    /// Seed the network-admin org from the `[network]` config section.
    Init,
    /// Mark network boot complete.
    Boot(CallerArgs),
    /// Report boot status and ledger version.
    Status,
}

/// Calling account shared by every action.
#[derive(Args, Debug, Clone)]
struct CallerArgs {
    /// Account performing the action.
    #[arg(long = "as", value_name = "ACCOUNT")]
    caller: String,
}

/// Org subcommands.
#[derive(Subcommand, Debug)]
enum OrgCommand {
    /// Propose a new master org.
    Add(OrgAddCommand),
    /// Create a sub-org beneath an approved org.
    AddSub(OrgAddSubCommand),
    /// Vote to approve a proposed org.
    Approve(OrgTargetCommand),
    /// Propose an org status change.
    Status(OrgStatusCommand),
    /// Vote to approve a proposed org status change.
    ApproveStatus(OrgStatusCommand),
    /// Show an org with its nodes, roles, accounts, and sub-orgs.
    Show(OrgShowCommand),
    /// List every org.
    List,
    /// Check whether an org has a given status.
    Check(OrgCheckCommand),
}

/// Arguments for `org add`.
#[derive(Args, Debug)]
struct OrgAddCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// New org identifier.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Initial node of the org.
    #[arg(long, value_name = "ENODE")]
    enode: String,
    /// Initial admin account of the org.
    #[arg(long, value_name = "ACCOUNT")]
    admin: String,
}

/// Arguments for `org add-sub`.
#[derive(Args, Debug)]
struct OrgAddSubCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Parent org identifier.
    #[arg(long, value_name = "ORG")]
    parent: String,
    /// Sub-org name (a single segment).
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Optional initial node.
    #[arg(long, value_name = "ENODE")]
    enode: Option<String>,
}

/// Arguments for org actions naming one org.
#[derive(Args, Debug)]
struct OrgTargetCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Org identifier.
    #[arg(long, value_name = "ORG")]
    org: String,
}

/// Arguments for `org status` and `org approve-status`.
#[derive(Args, Debug)]
struct OrgStatusCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Org identifier.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Requested status change.
    #[arg(long, value_enum)]
    action: OrgActionArg,
}

/// Arguments for `org show`.
#[derive(Args, Debug)]
struct OrgShowCommand {
    /// Org identifier.
    #[arg(long, value_name = "ORG")]
    org: String,
}

/// Arguments for `org check`.
#[derive(Args, Debug)]
struct OrgCheckCommand {
    /// Org identifier.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Status to compare against.
    #[arg(long, value_enum)]
    status: OrgStatusArg,
}

/// Node subcommands.
#[derive(Subcommand, Debug)]
enum NodeCommand {
    /// Propose a node for an org.
    Propose(NodeProposeCommand),
    /// Vote to approve the node's open operation.
    Approve(NodeTargetCommand),
    /// Propose a node status change.
    Status(NodeStatusCommand),
    /// Cancel the node's open operation.
    Cancel(NodeTargetCommand),
    /// Show a node.
    Show(NodeShowCommand),
    /// List every node.
    List,
}

/// Arguments for `node propose`.
#[derive(Args, Debug)]
struct NodeProposeCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Owning org.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Node enode URL.
    #[arg(long, value_name = "ENODE")]
    enode: String,
}

/// Arguments for node actions naming one node.
#[derive(Args, Debug)]
struct NodeTargetCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Node enode URL.
    #[arg(long, value_name = "ENODE")]
    enode: String,
}

/// Arguments for `node status`.
#[derive(Args, Debug)]
struct NodeStatusCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Node enode URL.
    #[arg(long, value_name = "ENODE")]
    enode: String,
    /// Requested status change.
    #[arg(long, value_enum)]
    action: NodeActionArg,
}

/// Arguments for `node show`.
#[derive(Args, Debug)]
struct NodeShowCommand {
    /// Node enode URL.
    #[arg(long, value_name = "ENODE")]
    enode: String,
}

/// Role subcommands.
#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// Create or reactivate a role.
    Add(RoleAddCommand),
    /// Deactivate a role.
    Remove(RoleTargetCommand),
    /// Show a role with its voter and full-access resolution.
    Show(RoleShowCommand),
    /// List every role.
    List,
}

/// Arguments for `role add`.
#[derive(Args, Debug)]
struct RoleAddCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Defining org.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Role identifier.
    #[arg(long, value_name = "ROLE")]
    role: String,
    /// Granted access level.
    #[arg(long, value_enum)]
    access: AccessArg,
    /// Holders may vote.
    #[arg(long, action = ArgAction::SetTrue)]
    voter: bool,
    /// Role is an admin role.
    #[arg(long, action = ArgAction::SetTrue)]
    admin: bool,
}

/// Arguments for `role remove`.
#[derive(Args, Debug)]
struct RoleTargetCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Defining org.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Role identifier.
    #[arg(long, value_name = "ROLE")]
    role: String,
}

/// Arguments for `role show`.
#[derive(Args, Debug)]
struct RoleShowCommand {
    /// Org the role is resolved from.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Role identifier.
    #[arg(long, value_name = "ROLE")]
    role: String,
}

/// Account subcommands.
#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Assign a role to an account.
    AssignRole(AccountAssignRoleCommand),
    /// Revoke an account's role.
    RevokeRole(AccountTargetCommand),
    /// Propose an org admin account.
    AssignAdmin(AccountOrgCommand),
    /// Vote to approve a proposed org admin account.
    ApproveAdmin(AccountOrgCommand),
    /// Change an account's status.
    Status(AccountStatusCommand),
    /// Show an account with its admin standing.
    Show(AccountShowCommand),
    /// List every account.
    List,
}

/// Arguments for `account assign-role`.
#[derive(Args, Debug)]
struct AccountAssignRoleCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Account receiving the role.
    #[arg(long, value_name = "ACCOUNT")]
    account: String,
    /// Org the account belongs to.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Role to assign.
    #[arg(long, value_name = "ROLE")]
    role: String,
}

/// Arguments for `account revoke-role`.
#[derive(Args, Debug)]
struct AccountTargetCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Target account.
    #[arg(long, value_name = "ACCOUNT")]
    account: String,
}

/// Arguments for org admin assignment and approval.
#[derive(Args, Debug)]
struct AccountOrgCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Master org receiving the admin.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Proposed admin account.
    #[arg(long, value_name = "ACCOUNT")]
    account: String,
}

/// Arguments for `account status`.
#[derive(Args, Debug)]
struct AccountStatusCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Org the account belongs to.
    #[arg(long, value_name = "ORG")]
    org: String,
    /// Target account.
    #[arg(long, value_name = "ACCOUNT")]
    account: String,
    /// Requested status change.
    #[arg(long, value_enum)]
    action: AccountActionArg,
}

/// Arguments for `account show`.
#[derive(Args, Debug)]
struct AccountShowCommand {
    /// Target account.
    #[arg(long, value_name = "ACCOUNT")]
    account: String,
}

/// Arguments for `vote`.
#[derive(Args, Debug)]
struct VoteCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Org whose voters decide.
    #[arg(long = "auth-org", value_name = "ORG")]
    auth_org: String,
    /// Operation the voter expects to approve.
    #[arg(long, value_enum)]
    op: OpArg,
    /// Kind of the expected target.
    #[arg(long = "target-kind", value_enum)]
    target_kind: TargetKindArg,
    /// Identifier of the expected target.
    #[arg(long, value_name = "ID")]
    target: String,
}

/// Arguments for `cancel`.
#[derive(Args, Debug)]
struct CancelCommand {
    /// Calling account.
    #[command(flatten)]
    caller: CallerArgs,
    /// Org whose vote is cancelled.
    #[arg(long = "auth-org", value_name = "ORG")]
    auth_org: String,
    /// Kind of the expected target.
    #[arg(long = "target-kind", value_enum)]
    target_kind: TargetKindArg,
    /// Identifier of the expected target.
    #[arg(long, value_name = "ID")]
    target: String,
}

/// Pending subcommands.
#[derive(Subcommand, Debug)]
enum PendingCommand {
    /// Show the open vote and valid voters of an auth org.
    Show(PendingShowCommand),
}

/// Arguments for `pending show`.
#[derive(Args, Debug)]
struct PendingShowCommand {
    /// Auth org to inspect.
    #[arg(long = "auth-org", value_name = "ORG")]
    auth_org: String,
}

/// Ledger subcommands.
#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// List stored snapshots, newest first.
    Versions,
    /// List logged mutations after a version.
    Mutations(LedgerMutationsCommand),
    /// Delete all but the newest snapshots.
    Prune(LedgerPruneCommand),
    /// Verify ledger readiness and the head snapshot hash.
    Verify,
}

/// Arguments for `ledger mutations`.
#[derive(Args, Debug)]
struct LedgerMutationsCommand {
    /// Only list mutations that produced a version above this one.
    #[arg(long, value_name = "VERSION", default_value_t = 0)]
    since: u64,
}

/// Arguments for `ledger prune`.
#[derive(Args, Debug)]
struct LedgerPruneCommand {
    /// Number of newest snapshots to keep.
    #[arg(long, value_name = "N")]
    keep: u64,
}

/// Payload subcommands.
#[derive(Subcommand, Debug)]
enum PayloadCommand {
    /// Store a raw payload and print its hash.
    StoreRaw(PayloadStoreRawCommand),
}

/// Arguments for `payload store-raw`.
#[derive(Args, Debug)]
struct PayloadStoreRawCommand {
    /// File holding the payload bytes.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Sender hint forwarded to the store.
    #[arg(long = "from", value_name = "SENDER", default_value = "")]
    sender: String,
}

// ============================================================================
// SECTION: Value Enums
// ============================================================================

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

/// Org status change selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OrgActionArg {
    /// Suspend an operational org.
    Suspend,
    /// Lift a suspension.
    RevokeSuspension,
}

impl From<OrgActionArg> for OrgStatusAction {
    fn from(value: OrgActionArg) -> Self {
        match value {
            OrgActionArg::Suspend => Self::Suspend,
            OrgActionArg::RevokeSuspension => Self::RevokeSuspension,
        }
    }
}

/// Org status selections for `org check`.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OrgStatusArg {
    /// Awaiting approval.
    Proposed,
    /// Approved.
    Approved,
    /// Suspended.
    Suspended,
    /// Suspension lifted.
    SuspensionRevoked,
}

impl From<OrgStatusArg> for OrgStatus {
    fn from(value: OrgStatusArg) -> Self {
        match value {
            OrgStatusArg::Proposed => Self::Proposed,
            OrgStatusArg::Approved => Self::Approved,
            OrgStatusArg::Suspended => Self::Suspended,
            OrgStatusArg::SuspensionRevoked => Self::SuspensionRevoked,
        }
    }
}

/// Node status change selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum NodeActionArg {
    /// Deactivate an active node.
    Deactivate,
    /// Reactivate a deactivated node.
    Activate,
    /// Blacklist a node permanently.
    Blacklist,
}

impl From<NodeActionArg> for NodeStatusAction {
    fn from(value: NodeActionArg) -> Self {
        match value {
            NodeActionArg::Deactivate => Self::Deactivate,
            NodeActionArg::Activate => Self::Activate,
            NodeActionArg::Blacklist => Self::Blacklist,
        }
    }
}

/// Account status change selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum AccountActionArg {
    /// Suspend an active account.
    Suspend,
    /// Reactivate a suspended account.
    Reactivate,
    /// Blacklist an account permanently.
    Blacklist,
}

impl From<AccountActionArg> for AccountStatusAction {
    fn from(value: AccountActionArg) -> Self {
        match value {
            AccountActionArg::Suspend => Self::Suspend,
            AccountActionArg::Reactivate => Self::Reactivate,
            AccountActionArg::Blacklist => Self::Blacklist,
        }
    }
}

/// Access level selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum AccessArg {
    /// No network access.
    NoAccess,
    /// Read-only calls.
    ReadOnly,
    /// Value transfers and contract calls.
    Transact,
    /// Contract deployment.
    ContractDeploy,
    /// Everything, including permissioning.
    FullAccess,
}

impl From<AccessArg> for AccessLevel {
    fn from(value: AccessArg) -> Self {
        match value {
            AccessArg::NoAccess => Self::NoAccess,
            AccessArg::ReadOnly => Self::ReadOnly,
            AccessArg::Transact => Self::Transact,
            AccessArg::ContractDeploy => Self::ContractDeploy,
            AccessArg::FullAccess => Self::FullAccess,
        }
    }
}

/// Pending operation type selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OpArg {
    /// Master org approval.
    AddOrg,
    /// Sub-org approval.
    AddSubOrg,
    /// Org suspension.
    SuspendOrg,
    /// Org suspension revocation.
    RevokeOrgSuspension,
    /// Node approval.
    ApproveNode,
    /// Node deactivation.
    DeactivateNode,
    /// Node activation.
    ActivateNode,
    /// Node blacklisting.
    BlacklistNode,
    /// Org admin assignment.
    AssignOrgAdmin,
}

impl From<OpArg> for PendingOpType {
    fn from(value: OpArg) -> Self {
        match value {
            OpArg::AddOrg => Self::AddOrg,
            OpArg::AddSubOrg => Self::AddSubOrg,
            OpArg::SuspendOrg => Self::SuspendOrg,
            OpArg::RevokeOrgSuspension => Self::RevokeOrgSuspension,
            OpArg::ApproveNode => Self::ApproveNode,
            OpArg::DeactivateNode => Self::DeactivateNode,
            OpArg::ActivateNode => Self::ActivateNode,
            OpArg::BlacklistNode => Self::BlacklistNode,
            OpArg::AssignOrgAdmin => Self::AssignOrgAdmin,
        }
    }
}

/// Vote target kind selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum TargetKindArg {
    /// Target is an org identifier.
    Org,
    /// Target is an enode URL.
    Node,
    /// Target is an account address.
    Account,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<PermissionError> for CliError {
    fn from(error: PermissionError) -> Self {
        Self::new(t!("engine.action_failed", error = error))
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    let config_path = cli.config.as_deref();

    match command {
        Commands::Config {
            command,
        } => command_config(config_path, command),
        Commands::Payload {
            command,
        } => command_payload(config_path, command).await,
        Commands::Ledger {
            command,
        } => command_ledger(config_path, &command),
        command => {
            let session = Session::open(config_path)?;
            session.dispatch(command)
        }
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(&help).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(config_path: Option<&Path>, command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(config_path),
        ConfigCommand::Init(command) => command_config_init(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let _config = load_config(config_path)?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes the example configuration, refusing to clobber without `--force`.
fn command_config_init(command: &ConfigInitCommand) -> CliResult<ExitCode> {
    if command.output.exists() && !command.force {
        return Err(CliError::new(t!(
            "config.init.exists",
            path = command.output.display()
        )));
    }
    fs::write(&command.output, example_config_toml()).map_err(|err| {
        CliError::new(t!(
            "config.init.write_failed",
            path = command.output.display(),
            error = err
        ))
    })?;
    write_stdout_line(&t!("config.init.ok", path = command.output.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates configuration.
fn load_config(config_path: Option<&Path>) -> CliResult<PermissionEngineConfig> {
    PermissionEngineConfig::load(config_path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Engine Session
// ============================================================================

/// Engine type assembled from configuration.
type CliEngine = PermissionEngine<SharedLedger, SharedEventSink, Arc<dyn AuditSink>>;

/// Engine opened for one command.
struct Session {
    /// Loaded configuration.
    config: PermissionEngineConfig,
    /// Permission engine over the configured ledger and sinks.
    engine: CliEngine,
}

impl Session {
    /// Loads configuration and opens the engine it describes.
    fn open(config_path: Option<&Path>) -> CliResult<Self> {
        let config = load_config(config_path)?;
        let engine = build_engine(&config)?;
        Ok(Self {
            config,
            engine,
        })
    }

    /// Runs one engine-backed command.
    fn dispatch(&self, command: Commands) -> CliResult<ExitCode> {
        match command {
            Commands::Network {
                command,
            } => self.command_network(&command),
            Commands::Org {
                command,
            } => self.command_org(command),
            Commands::Node {
                command,
            } => self.command_node(command),
            Commands::Role {
                command,
            } => self.command_role(command),
            Commands::Account {
                command,
            } => self.command_account(command),
            Commands::Vote(command) => self.command_vote(&command),
            Commands::Cancel(command) => self.command_cancel(&command),
            Commands::Pending {
                command,
            } => self.command_pending(&command),
            Commands::Config {
                ..
            }
            | Commands::Ledger {
                ..
            }
            | Commands::Payload {
                ..
            } => Err(CliError::new(t!("main.unsupported_dispatch"))),
        }
    }

    /// Prints an action outcome, warning when the ledger is not durable.
    fn emit_outcome(&self, outcome: &ActionOutcome) -> CliResult<ExitCode> {
        if self.config.ledger.sqlite_config().is_none() {
            write_stderr_line(&t!("engine.memory_ledger_warning"))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
        write_canonical_json(outcome)?;
        Ok(ExitCode::SUCCESS)
    }

    // ------------------------------------------------------------------------
    // Network
    // ------------------------------------------------------------------------

    /// Dispatches network subcommands.
    fn command_network(&self, command: &NetworkCommand) -> CliResult<ExitCode> {
        match command {
            NetworkCommand::Init => {
                let request = self
                    .config
                    .bootstrap_request()
                    .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
                let outcome = self.engine.bootstrap(&request)?;
                self.emit_outcome(&outcome)
            }
            NetworkCommand::Boot(caller) => {
                let outcome = self.engine.complete_network_boot(&auth(caller)?)?;
                self.emit_outcome(&outcome)
            }
            NetworkCommand::Status => {
                let snapshot = self.engine.snapshot()?;
                write_canonical_json(&NetworkStatusOutput {
                    booted: snapshot.network_booted,
                    version: snapshot.version,
                    network_admin_org: self.engine.config().network_admin_org.as_str(),
                })?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Orgs
    // ------------------------------------------------------------------------

    /// Dispatches org subcommands.
    fn command_org(&self, command: OrgCommand) -> CliResult<ExitCode> {
        match command {
            OrgCommand::Add(command) => {
                let outcome = self.engine.add_org(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    &parse_enode(&command.enode)?,
                    &parse_account(&command.admin)?,
                )?;
                self.emit_outcome(&outcome)
            }
            OrgCommand::AddSub(command) => {
                let enode = command.enode.as_deref().map(parse_enode).transpose()?;
                let outcome = self.engine.add_sub_org(
                    &auth(&command.caller)?,
                    &parse_org(&command.parent)?,
                    &command.name,
                    enode.as_ref(),
                )?;
                self.emit_outcome(&outcome)
            }
            OrgCommand::Approve(command) => {
                let outcome =
                    self.engine.approve_org(&auth(&command.caller)?, &parse_org(&command.org)?)?;
                self.emit_outcome(&outcome)
            }
            OrgCommand::Status(command) => {
                let outcome = self.engine.update_org_status(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    command.action.into(),
                )?;
                self.emit_outcome(&outcome)
            }
            OrgCommand::ApproveStatus(command) => {
                let outcome = self.engine.approve_org_status_update(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    command.action.into(),
                )?;
                self.emit_outcome(&outcome)
            }
            OrgCommand::Show(command) => {
                write_canonical_json(&self.engine.org_details(&parse_org(&command.org)?)?)?;
                Ok(ExitCode::SUCCESS)
            }
            OrgCommand::List => {
                write_canonical_json(&self.engine.org_list()?)?;
                Ok(ExitCode::SUCCESS)
            }
            OrgCommand::Check(command) => {
                let status: OrgStatus = command.status.into();
                let matches = self.engine.check_org_status(&parse_org(&command.org)?, status)?;
                write_canonical_json(&CheckOutput {
                    result: matches,
                })?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------------

    /// Dispatches node subcommands.
    fn command_node(&self, command: NodeCommand) -> CliResult<ExitCode> {
        match command {
            NodeCommand::Propose(command) => {
                let outcome = self.engine.propose_node(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    &parse_enode(&command.enode)?,
                )?;
                self.emit_outcome(&outcome)
            }
            NodeCommand::Approve(command) => {
                let outcome =
                    self.engine.approve_node(&auth(&command.caller)?, &parse_enode(&command.enode)?)?;
                self.emit_outcome(&outcome)
            }
            NodeCommand::Status(command) => {
                let outcome = self.engine.update_node_status(
                    &auth(&command.caller)?,
                    &parse_enode(&command.enode)?,
                    command.action.into(),
                )?;
                self.emit_outcome(&outcome)
            }
            NodeCommand::Cancel(command) => {
                let outcome = self
                    .engine
                    .cancel_pending_operation(&auth(&command.caller)?, &parse_enode(&command.enode)?)?;
                self.emit_outcome(&outcome)
            }
            NodeCommand::Show(command) => {
                let enode_id = parse_enode(&command.enode)?;
                write_canonical_json(&NodeShowOutput {
                    connection_allowed: self.engine.connection_allowed(&enode_id)?,
                    node: self.engine.node_details(&enode_id)?,
                })?;
                Ok(ExitCode::SUCCESS)
            }
            NodeCommand::List => {
                write_canonical_json(&self.engine.node_list()?)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------------

    /// Dispatches role subcommands.
    fn command_role(&self, command: RoleCommand) -> CliResult<ExitCode> {
        match command {
            RoleCommand::Add(command) => {
                let definition = RoleDefinition {
                    org_id: parse_org(&command.org)?,
                    role_id: parse_role(&command.role)?,
                    access_level: command.access.into(),
                    is_voter: command.voter,
                    is_admin: command.admin,
                };
                let outcome = self.engine.add_role(&auth(&command.caller)?, &definition)?;
                self.emit_outcome(&outcome)
            }
            RoleCommand::Remove(command) => {
                let outcome = self.engine.remove_role(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    &parse_role(&command.role)?,
                )?;
                self.emit_outcome(&outcome)
            }
            RoleCommand::Show(command) => {
                let org_id = parse_org(&command.org)?;
                let role_id = parse_role(&command.role)?;
                let record = self.engine.role_details(&org_id, &role_id)?;
                write_canonical_json(&RoleShowOutput {
                    is_voter: self.engine.is_voter_role(&org_id, &role_id)?,
                    is_full_access: self.engine.is_full_access_role(&org_id, &role_id)?,
                    role: record,
                })?;
                Ok(ExitCode::SUCCESS)
            }
            RoleCommand::List => {
                write_canonical_json(&self.engine.role_list()?)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    /// Dispatches account subcommands.
    fn command_account(&self, command: AccountCommand) -> CliResult<ExitCode> {
        match command {
            AccountCommand::AssignRole(command) => {
                let outcome = self.engine.assign_account_role(
                    &auth(&command.caller)?,
                    &parse_account(&command.account)?,
                    &parse_org(&command.org)?,
                    &parse_role(&command.role)?,
                )?;
                self.emit_outcome(&outcome)
            }
            AccountCommand::RevokeRole(command) => {
                let outcome = self
                    .engine
                    .revoke_account_role(&auth(&command.caller)?, &parse_account(&command.account)?)?;
                self.emit_outcome(&outcome)
            }
            AccountCommand::AssignAdmin(command) => {
                let outcome = self.engine.assign_org_admin(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    &parse_account(&command.account)?,
                )?;
                self.emit_outcome(&outcome)
            }
            AccountCommand::ApproveAdmin(command) => {
                let outcome = self.engine.approve_org_admin_account(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    &parse_account(&command.account)?,
                )?;
                self.emit_outcome(&outcome)
            }
            AccountCommand::Status(command) => {
                let outcome = self.engine.update_account_status(
                    &auth(&command.caller)?,
                    &parse_org(&command.org)?,
                    &parse_account(&command.account)?,
                    command.action.into(),
                )?;
                self.emit_outcome(&outcome)
            }
            AccountCommand::Show(command) => {
                let address = parse_account(&command.account)?;
                let record = self.engine.account_details(&address)?;
                write_canonical_json(&AccountShowOutput {
                    network_admin: self.engine.is_network_admin(&address)?,
                    org_admin: self.engine.is_org_admin(&address, &record.org_id)?,
                    admin_account: self.engine.is_admin_account(&address)?,
                    access: self.engine.account_access(&address)?,
                    account: record,
                })?;
                Ok(ExitCode::SUCCESS)
            }
            AccountCommand::List => {
                write_canonical_json(&self.engine.account_list()?)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Voting
    // ------------------------------------------------------------------------

    /// Executes `vote`.
    fn command_vote(&self, command: &VoteCommand) -> CliResult<ExitCode> {
        let target = VoteTarget::new(
            command.op.into(),
            parse_target(command.target_kind, &command.target)?,
        );
        let outcome = self.engine.process_vote(
            &auth(&command.caller)?,
            &parse_org(&command.auth_org)?,
            &target,
        )?;
        self.emit_outcome(&outcome)
    }

    /// Executes `cancel`.
    fn command_cancel(&self, command: &CancelCommand) -> CliResult<ExitCode> {
        let target = parse_target(command.target_kind, &command.target)?;
        let outcome = self.engine.cancel_voting_item(
            &auth(&command.caller)?,
            &parse_org(&command.auth_org)?,
            &target,
        )?;
        self.emit_outcome(&outcome)
    }

    /// Dispatches pending subcommands.
    fn command_pending(&self, command: &PendingCommand) -> CliResult<ExitCode> {
        match command {
            PendingCommand::Show(command) => {
                let auth_org = parse_org(&command.auth_org)?;
                write_canonical_json(&PendingShowOutput {
                    pending: self.engine.pending_operation(&auth_org)?,
                    number_of_valid_voters: self.engine.number_of_valid_voters(&auth_org)?,
                    valid_voters: self.engine.valid_voters(&auth_org)?,
                })?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Builds the engine described by `config`.
fn build_engine(config: &PermissionEngineConfig) -> CliResult<CliEngine> {
    let engine_config = config
        .engine_config()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let ledger = match config.ledger.sqlite_config() {
        Some(sqlite) => SharedLedger::from_ledger(
            SqliteLedger::open(sqlite)
                .map_err(|err| CliError::new(t!("ledger.open_failed", error = err)))?,
        ),
        None => SharedLedger::from_ledger(InMemoryLedger::new()),
    };
    let events = build_event_sink(config)?;
    let audit = build_audit_sink(config)?;
    Ok(PermissionEngine::open(engine_config, ledger, events, audit)?)
}

/// Builds the event sink: the optional JSON-line log behind a fanout.
fn build_event_sink(config: &PermissionEngineConfig) -> CliResult<SharedEventSink> {
    let mut fanout = FanoutEventSink::new();
    if let Some(path) = &config.events.log_path {
        let file = OpenOptions::new().create(true).append(true).open(path).map_err(|err| {
            CliError::new(t!("events.open_failed", path = path.display(), error = err))
        })?;
        fanout = fanout.with_sink(LogEventSink::new(file));
    }
    Ok(SharedEventSink::from_sink(fanout))
}

/// Builds the configured audit sink.
fn build_audit_sink(config: &PermissionEngineConfig) -> CliResult<Arc<dyn AuditSink>> {
    match (config.audit.sink, &config.audit.path) {
        (AuditSinkType::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkType::None, _) => Ok(Arc::new(NoopAuditSink)),
        (AuditSinkType::File, Some(path)) => {
            let sink = FileAuditSink::new(path).map_err(|err| {
                CliError::new(t!("audit.open_failed", path = path.display(), error = err))
            })?;
            Ok(Arc::new(sink))
        }
        (AuditSinkType::File, None) => Err(CliError::new(t!("audit.path_missing"))),
    }
}

// ============================================================================
// SECTION: Ledger Commands
// ============================================================================

/// Dispatches ledger subcommands against the configured `SQLite` ledger.
fn command_ledger(config_path: Option<&Path>, command: &LedgerCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let sqlite = config
        .ledger
        .sqlite_config()
        .ok_or_else(|| CliError::new(t!("ledger.sqlite_required")))?;
    let ledger = SqliteLedger::open(sqlite)
        .map_err(|err| CliError::new(t!("ledger.open_failed", error = err)))?;
    let ledger_error = |err: SqliteLedgerError| CliError::new(t!("ledger.query_failed", error = err));
    match command {
        LedgerCommand::Versions => {
            write_canonical_json(&ledger.list_versions().map_err(ledger_error)?)?;
        }
        LedgerCommand::Mutations(command) => {
            write_canonical_json(&ledger.mutations_since(command.since).map_err(ledger_error)?)?;
        }
        LedgerCommand::Prune(command) => {
            let pruned = ledger.prune_versions(command.keep).map_err(ledger_error)?;
            write_canonical_json(&LedgerPruneOutput {
                pruned,
                kept: command.keep,
            })?;
        }
        LedgerCommand::Verify => {
            ledger.readiness().map_err(ledger_error)?;
            let head = ledger.head_version().map_err(ledger_error)?;
            let state_hash = if head == 0 {
                None
            } else {
                let state = ledger
                    .load_version(head)
                    .map_err(ledger_error)?
                    .ok_or_else(|| CliError::new(t!("ledger.head_missing", version = head)))?;
                let digest = state
                    .fingerprint()
                    .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
                Some(digest.value)
            };
            write_canonical_json(&LedgerVerifyOutput {
                status: "ok",
                head_version: head,
                state_hash,
            })?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Payload Commands
// ============================================================================

/// Dispatches payload subcommands.
async fn command_payload(config_path: Option<&Path>, command: PayloadCommand) -> CliResult<ExitCode> {
    match command {
        PayloadCommand::StoreRaw(command) => command_payload_store_raw(config_path, command).await,
    }
}

/// Stores a raw payload through the configured store.
async fn command_payload_store_raw(
    config_path: Option<&Path>,
    command: PayloadStoreRawCommand,
) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let store_config = config
        .payload_store
        .ok_or_else(|| CliError::new(t!("payload.not_configured")))?;
    let payload = read_bytes_with_limit(&command.input, MAX_PAYLOAD_INPUT_BYTES).map_err(|err| {
        match err {
            ReadLimitError::Io(err) => CliError::new(t!(
                "payload.read_failed",
                path = command.input.display(),
                error = err
            )),
            ReadLimitError::TooLarge {
                size,
                limit,
            } => CliError::new(t!(
                "input.read_too_large",
                kind = "payload",
                path = command.input.display(),
                size = size,
                limit = limit
            )),
        }
    })?;
    // The store client blocks; keep it off the async workers.
    let hash = tokio::task::spawn_blocking(move || {
        let store = HttpPayloadStore::with_timeout(&store_config.endpoint, store_config.timeout())?;
        store.store_raw(&payload, &command.sender)
    })
    .await
    .map_err(|err| CliError::new(t!("payload.task_failed", error = err)))?
    .map_err(|err| CliError::new(t!("payload.store_failed", error = err)))?;
    write_json_value(&serde_json::json!({ "hash": hash.to_string() }))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Output of `network status`.
#[derive(Serialize)]
struct NetworkStatusOutput<'a> {
    /// Whether network boot has completed.
    booted: bool,
    /// Ledger version of the snapshot.
    version: u64,
    /// Configured network-admin org.
    network_admin_org: &'a str,
}

/// Output of boolean checks.
#[derive(Serialize)]
struct CheckOutput {
    /// Check result.
    result: bool,
}

/// Output of `role show`.
#[derive(Serialize)]
struct RoleShowOutput {
    /// Role record.
    role: RoleRecord,
    /// Whether the role resolves to an active voter role.
    is_voter: bool,
    /// Whether the role resolves to an active full-access role.
    is_full_access: bool,
}

/// Output of `account show`.
#[derive(Serialize)]
struct AccountShowOutput {
    /// Account record.
    account: AccountRecord,
    /// Whether the account is a network admin.
    network_admin: bool,
    /// Whether the account administers its org.
    org_admin: bool,
    /// Whether the account holds an admin role and may act.
    admin_account: bool,
    /// Access level the account may act with.
    access: AccessLevel,
}

/// Output of `node show`.
#[derive(Serialize)]
struct NodeShowOutput {
    /// Node record.
    node: NodeRecord,
    /// Whether the node may connect.
    connection_allowed: bool,
}

/// Output of `pending show`.
#[derive(Serialize)]
struct PendingShowOutput {
    /// Open vote, if any.
    pending: Option<PendingOperation>,
    /// Number of valid voters.
    number_of_valid_voters: usize,
    /// Valid voters, ordered.
    valid_voters: Vec<AccountAddress>,
}

/// Output of `ledger prune`.
#[derive(Serialize)]
struct LedgerPruneOutput {
    /// Snapshots deleted.
    pruned: u64,
    /// Snapshots kept.
    kept: u64,
}

/// Output of `ledger verify`.
#[derive(Serialize)]
struct LedgerVerifyOutput {
    /// Verification status label.
    status: &'static str,
    /// Latest committed version.
    head_version: u64,
    /// Hash of the head snapshot, when one exists.
    state_hash: Option<String>,
}

// ============================================================================
// SECTION: Parsing Helpers
// ============================================================================

/// Maps an identifier parse failure into a localized error.
fn invalid_identifier(error: &IdentifierError) -> CliError {
    CliError::new(t!("input.invalid_identifier", error = error))
}

/// Parses an org identifier.
fn parse_org(raw: &str) -> CliResult<OrgId> {
    OrgId::parse(raw).map_err(|err| invalid_identifier(&err))
}

/// Parses a role identifier.
fn parse_role(raw: &str) -> CliResult<RoleId> {
    RoleId::parse(raw).map_err(|err| invalid_identifier(&err))
}

/// Parses an enode identifier.
fn parse_enode(raw: &str) -> CliResult<EnodeId> {
    EnodeId::parse(raw).map_err(|err| invalid_identifier(&err))
}

/// Parses an account address.
fn parse_account(raw: &str) -> CliResult<AccountAddress> {
    AccountAddress::parse(raw).map_err(|err| invalid_identifier(&err))
}

/// Builds the auth context for the calling account.
fn auth(caller: &CallerArgs) -> CliResult<AuthContext> {
    Ok(AuthContext::new(parse_account(&caller.caller)?))
}

/// Parses a vote or cancel target.
fn parse_target(kind: TargetKindArg, raw: &str) -> CliResult<TargetKey> {
    Ok(match kind {
        TargetKindArg::Org => TargetKey::Org(parse_org(raw)?),
        TargetKindArg::Node => TargetKey::Node(parse_enode(raw)?),
        TargetKindArg::Account => TargetKey::Account(parse_account(raw)?),
    })
}

/// Resolves the CLI locale from flags or the environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors raised by [`read_bytes_with_limit`].
#[derive(Debug)]
enum ReadLimitError {
    /// I/O failure.
    Io(std::io::Error),
    /// Input exceeded the limit.
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Renders a value as canonical JSON with a trailing newline.
fn canonical_output_bytes<T: Serialize>(value: &T) -> CliResult<Vec<u8>> {
    let mut bytes = canonical_json_bytes(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes canonical JSON to stdout.
fn write_canonical_json<T: Serialize>(value: &T) -> CliResult<()> {
    let bytes = canonical_output_bytes(value)?;
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a canonical JSON value to stdout.
fn write_json_value(value: &Value) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
