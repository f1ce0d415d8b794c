//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use facetwork_core::domain::Where;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "facetwork",
    bin_name = "facetwork",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Facet-based metamodel and interaction checks",
    long_about = "Facetwork builds a metamodel from class manifests, validates it, \
                  and answers visible/usable/valid questions about domain members.",
    after_help = "EXAMPLES:\n\
        \x20 facetwork validate ./classes\n\
        \x20 facetwork list --output-format json\n\
        \x20 facetwork inspect com.acme.Order\n\
        \x20 facetwork check com.acme.Order quantity --kind usable --persistent\n\
        \x20 facetwork completions bash > /usr/share/bash-completion/completions/facetwork",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bootstrap the metamodel and run every validator.
    #[command(
        about = "Validate a class directory",
        after_help = "EXAMPLES:\n\
            \x20 facetwork validate            # built-in demo domain\n\
            \x20 facetwork validate ./classes"
    )]
    Validate(ValidateArgs),

    /// List every specification.
    #[command(
        visible_alias = "ls",
        about = "List specifications",
        after_help = "EXAMPLES:\n\
            \x20 facetwork list\n\
            \x20 facetwork list ./classes --output-format json"
    )]
    List(ListArgs),

    /// Show one specification's members and facets.
    #[command(
        about = "Inspect a specification",
        after_help = "EXAMPLES:\n\
            \x20 facetwork inspect com.acme.Order\n\
            \x20 facetwork inspect --dir ./classes com.acme.Customer"
    )]
    Inspect(InspectArgs),

    /// Evaluate a visibility, usability, or validity check.
    #[command(
        about = "Evaluate an interaction check",
        after_help = "EXAMPLES:\n\
            \x20 facetwork check com.acme.Order quantity --kind usable --persistent\n\
            \x20 facetwork check com.acme.Order quantity --kind valid --arg 0\n\
            \x20 facetwork check com.acme.Customer email --user guest\n\
            \x20 facetwork check com.acme.Order place --kind valid --arg A-100"
    )]
    Check(CheckArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 facetwork completions bash > ~/.local/share/bash-completion/completions/facetwork\n\
            \x20 facetwork completions zsh  > ~/.zfunc/_facetwork\n\
            \x20 facetwork completions fish > ~/.config/fish/completions/facetwork.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 facetwork config get metamodel.classes_dir\n\
            \x20 facetwork config list\n\
            \x20 facetwork config path"
    )]
    Config(ConfigCommands),
}

// ── validate / list ───────────────────────────────────────────────────────────

/// Arguments for `facetwork validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Directory of class manifests.  Defaults to `metamodel.classes_dir`,
    /// then to the built-in demo domain.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for `facetwork list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Directory of class manifests.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

// ── inspect / check ───────────────────────────────────────────────────────────

/// Arguments for `facetwork inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Directory of class manifests.
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Fully qualified class name.
    #[arg(value_name = "CLASS")]
    pub class: String,
}

/// Arguments for `facetwork check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Directory of class manifests.
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Fully qualified class name.
    #[arg(value_name = "CLASS")]
    pub class: String,

    /// Property, collection, or action id.
    #[arg(value_name = "MEMBER")]
    pub member: String,

    /// Which check to evaluate.
    #[arg(short = 'k', long = "kind", value_enum, default_value = "visible")]
    pub kind: CheckKind,

    /// Evaluate against a persisted target instead of a transient one.
    #[arg(long = "persistent")]
    pub persistent: bool,

    /// Object id of the persisted target.
    #[arg(long = "oid", value_name = "OID", default_value = "1", requires = "persistent")]
    pub oid: String,

    /// Field value on the target, as `name=value`.
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// Proposed value (property) or argument (action), in order.
    #[arg(long = "arg", value_name = "VALUE")]
    pub args: Vec<String>,

    /// Rendering context.
    #[arg(long = "where", value_enum, default_value = "anywhere")]
    pub where_: WhereArg,

    /// User name; defaults to `session.user`.
    #[arg(short = 'u', long = "user", value_name = "USER")]
    pub user: Option<String>,

    /// Role held by the user; repeatable.  Defaults to `session.roles`.
    #[arg(short = 'r', long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,

    /// Run the check as framework-initiated (skips authorization).
    #[arg(long = "framework")]
    pub framework: bool,
}

/// Interaction check selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckKind {
    Visible,
    Usable,
    Valid,
}

/// Rendering contexts accepted by `--where`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum WhereArg {
    Anywhere,
    ObjectForms,
    AllTables,
    ParentedTables,
    StandaloneTables,
}

impl From<WhereArg> for Where {
    fn from(arg: WhereArg) -> Self {
        match arg {
            WhereArg::Anywhere => Where::Anywhere,
            WhereArg::ObjectForms => Where::ObjectForms,
            WhereArg::AllTables => Where::AllTables,
            WhereArg::ParentedTables => Where::ParentedTables,
            WhereArg::StandaloneTables => Where::StandaloneTables,
        }
    }
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `facetwork completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `facetwork config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `session.user`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
