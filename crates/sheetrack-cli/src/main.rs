#![forbid(unsafe_code)]

mod cmd;
mod identity;
mod output;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, report_error};
use sheetrack_core::config::{self, UserConfig};
use std::env;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "sheetrack: practice-sheet tracker for coding problems",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user (skips env resolution).
    #[arg(long, global = true)]
    user: Option<String>,

    /// Email used for admin matching at sign-in.
    #[arg(long, global = true)]
    email: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize a sheetrack project",
        long_about = "Create .sheetrack/ in the current directory with a default config and database.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    sk init\n\n    # Reset config.toml to the default template\n    sk init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Project",
        about = "Sign in and provision a profile",
        long_about = "Create the acting user's profile on first sign-in, or refresh it. Emails listed in [access].admin_emails get the admin role.",
        after_help = "EXAMPLES:\n    # Sign in with an email that may be on the admin list\n    sk --user ada --email ada@example.com login --name \"Ada\""
    )]
    Login(cmd::login::LoginArgs),

    #[command(
        next_help_heading = "Authoring",
        about = "Create a sheet, topic, sub-pattern or problem",
        long_about = "Append a new entity at the end of its parent's ordering. Admin only.",
        after_help = "EXAMPLES:\n    # Create a sheet\n    sk create sheet --title \"Blind 75\"\n\n    # Add a problem under a sub-pattern\n    sk create problem --parent sp-... --title \"Two Sum\" --url https://leetcode.com/problems/two-sum --platform-id 1"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Authoring",
        about = "Rename an entity",
        after_help = "EXAMPLES:\n    sk rename tp-... --title \"Graphs\""
    )]
    Rename(cmd::rename::RenameArgs),

    #[command(
        next_help_heading = "Authoring",
        about = "Soft-delete an entity",
        long_about = "Hide an entity. Topics and sub-patterns with live children are refused. Admin only.",
        after_help = "EXAMPLES:\n    sk delete pb-..."
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Authoring",
        about = "Restore a soft-deleted entity",
        after_help = "EXAMPLES:\n    sk restore pb-..."
    )]
    Restore(cmd::restore::RestoreArgs),

    #[command(
        next_help_heading = "Authoring",
        about = "Move an entity up or down among its siblings",
        after_help = "EXAMPLES:\n    sk move pb-... up\n    sk move tp-... down"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Authoring",
        about = "Import problems from a JSON array",
        long_about = "Append every problem in a JSON array to one sub-pattern. One bad entry rejects the batch. Admin only.",
        after_help = "EXAMPLES:\n    sk import --sub-pattern sp-... --file problems.json\n    cat problems.json | sk import --sub-pattern sp-..."
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Read",
        about = "List sheets or the children of a parent",
        after_help = "EXAMPLES:\n    # List sheets\n    sk list\n\n    # List topics of a sheet\n    sk list --parent sh-...\n\n    # Emit machine-readable output\n    sk list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show a sheet's full structure",
        long_about = "Show topics, sub-patterns and problems of a sheet with the acting user's progress and notes.",
        after_help = "EXAMPLES:\n    sk show sh-...\n    sk --user ada show sh-... --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Mark a problem solved",
        after_help = "EXAMPLES:\n    sk solve pb-..."
    )]
    Solve(cmd::solve::SolveArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Mark a problem unsolved",
        long_about = "Remove a problem from the completion map. Streak counters are not rewound.",
        after_help = "EXAMPLES:\n    sk unsolve pb-..."
    )]
    Unsolve(cmd::solve::SolveArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Show streaks, daily goal and activity",
        after_help = "EXAMPLES:\n    sk profile\n    sk profile --days 30 --json"
    )]
    Profile(cmd::profile::ProfileArgs),

    #[command(
        next_help_heading = "Progress",
        about = "Solved/total per sheet",
        after_help = "EXAMPLES:\n    sk stats\n    sk stats --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(next_help_heading = "Progress", about = "Manage private notes on problems")]
    Note {
        #[command(subcommand)]
        command: cmd::note::NoteCommand,
    },

    #[command(
        next_help_heading = "Administration",
        about = "List every user profile",
        long_about = "Admin oversight: every profile with role, solved count and streaks.",
        after_help = "EXAMPLES:\n    sk users --json"
    )]
    Users(cmd::users::UsersArgs),

    #[command(
        next_help_heading = "Administration",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    sk completions bash\n\n    # Generate zsh completions\n    sk completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SHEETRACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "sheetrack=debug,sk=debug,info"
        } else {
            "sheetrack=info,sk=info,warn"
        })
    });

    let format = env::var("SHEETRACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_user_config() -> UserConfig {
    config::load_user_config().unwrap_or_else(|err| {
        warn!("ignoring user config: {err:#}");
        UserConfig::default()
    })
}

fn dispatch(cli: &Cli, ctx: &cmd::Context<'_>) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, ctx.cwd, ctx.output),
        Commands::Login(args) => cmd::login::run_login(args, ctx),
        Commands::Create(args) => cmd::create::run_create(args, ctx),
        Commands::Rename(args) => cmd::rename::run_rename(args, ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, ctx),
        Commands::Restore(args) => cmd::restore::run_restore(args, ctx),
        Commands::Move(args) => cmd::move_cmd::run_move(args, ctx),
        Commands::Import(args) => cmd::import::run_import(args, ctx),
        Commands::List(args) => cmd::list::run_list(args, ctx),
        Commands::Show(args) => cmd::show::run_show(args, ctx),
        Commands::Solve(args) => cmd::solve::run_solve(args, ctx),
        Commands::Unsolve(args) => cmd::solve::run_unsolve(args, ctx),
        Commands::Profile(args) => cmd::profile::run_profile(args, ctx),
        Commands::Stats(args) => cmd::stats::run_stats(args, ctx),
        Commands::Note { command } => cmd::note::run_note(command, ctx),
        Commands::Users(args) => cmd::users::run_users(args, ctx),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args.shell, &mut Cli::command())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user_config = load_user_config();
    let env_format = env::var("FORMAT").ok();
    let output = OutputMode::from_resolved(&config::resolve_output(
        cli.json,
        user_config.output.as_deref(),
        env_format.as_deref(),
    ));

    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            report_error(output, &CliError::new(format!("cannot read working directory: {err}")));
            return ExitCode::FAILURE;
        }
    };

    let ctx = cmd::Context {
        cwd: &cwd,
        output,
        user_flag: cli.user.as_deref(),
        email_flag: cli.email.as_deref(),
        user_config: &user_config,
    };

    match dispatch(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("command failed: {err:#}");
            report_error(output, &CliError::from_anyhow(&err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["sk", "--json", "list"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["sk", "list", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn user_and_email_are_global() {
        let cli = Cli::parse_from(["sk", "login", "--user", "ada", "--email", "ada@example.com"]);
        assert_eq!(cli.user.as_deref(), Some("ada"));
        assert_eq!(cli.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn unsolve_reuses_solve_args() {
        let cli = Cli::parse_from(["sk", "unsolve", "pb-1"]);
        match cli.command {
            Commands::Unsolve(args) => assert_eq!(args.problem_id, "pb-1"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn note_subcommands_parse() {
        let cli = Cli::parse_from(["sk", "note", "show", "pb-1"]);
        assert!(matches!(
            cli.command,
            Commands::Note {
                command: cmd::note::NoteCommand::Show(_)
            }
        ));
    }

    #[test]
    fn verbose_short_flag() {
        let cli = Cli::parse_from(["sk", "-v", "stats"]);
        assert!(cli.verbose);
    }
}
