//! viewkit - template override cascade and capability composition
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use viewkit::config::{viewkit_home, Config};
use viewkit::error::exit_codes;
use viewkit::layout::LayoutContext;
use viewkit::roles::FileRoleRegistry;

// =============================================================================
// CLI Definition
// =============================================================================

/// viewkit - template override cascade and capability composition
#[derive(Parser)]
#[command(name = "viewkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show template override candidates for a view part
    Templates {
        /// Template family, optionally with a directory (`table`, `partials/list`)
        #[arg(long)]
        slug: String,
        /// Sub-part (`body`, `footer`)
        #[arg(long, default_value = "")]
        part: String,
        /// View id
        #[arg(long)]
        view: u64,
        /// Form id
        #[arg(long)]
        form: u64,
        /// Id of the post embedding the view
        #[arg(long)]
        post: Option<u64>,
        /// Search the configured roots for the winning file
        #[arg(long)]
        locate: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Compose a granted-capability mapping read from a JSON file
    Compose {
        /// File holding `{"capability": bool, ...}`
        grants: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Check whether roles hold any of the given capabilities
    Check {
        /// Role held by the actor (repeatable)
        #[arg(long = "role", required = true)]
        roles: Vec<String>,
        /// Capabilities to test, in order
        #[arg(required = true)]
        capabilities: Vec<String>,
        /// Object the check is scoped to
        #[arg(long)]
        object: Option<u64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Install, remove, or list role capabilities
    Roles {
        /// Action to perform
        #[command(subcommand)]
        action: RolesSubcommand,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },

    /// Edit a view layout file
    Layout {
        /// Layout JSON file (created on first change)
        file: PathBuf,
        /// Action to perform
        #[command(subcommand)]
        action: LayoutSubcommand,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum RolesSubcommand {
    /// Grant each tier role its default capabilities
    Install,
    /// Revoke every view capability from every role
    Remove,
    /// List roles and their capabilities
    List,
}

#[derive(Subcommand, Clone)]
enum LayoutSubcommand {
    /// Add a row with a column structure such as `4-4-4`
    AddRow {
        /// Context (directory, single, edit, export)
        context: LayoutContext,
        /// Column structure
        structure: String,
        /// Insert before this row id
        #[arg(long)]
        before: Option<String>,
    },
    /// Remove a row
    RemoveRow {
        /// Context (directory, single, edit, export)
        context: LayoutContext,
        /// Row id
        row: String,
    },
    /// Set a row attribute (id, class, style)
    SetRow {
        /// Context (directory, single, edit, export)
        context: LayoutContext,
        /// Row id
        row: String,
        /// Attribute name
        key: String,
        /// Attribute value
        value: String,
    },
    /// Switch the active tab
    Tab {
        /// Context (directory, single, edit, export)
        context: LayoutContext,
    },
    /// Print the layout
    Show,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("viewkit error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.viewkit/crash.log and exits with the error code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("viewkit panic: {}", info);

        if let Some(home) = viewkit_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::ERROR);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Templates {
            slug,
            part,
            view,
            form,
            post,
            locate,
            json,
            quiet,
        } => run_templates(slug, part, view, form, post, locate, json, quiet, &cwd),
        Commands::Compose {
            grants,
            json,
            quiet,
        } => run_compose(grants, json, quiet, &cwd),
        Commands::Check {
            roles,
            capabilities,
            object,
            json,
            quiet,
        } => run_check(roles, capabilities, object, json, quiet, &cwd),
        Commands::Roles {
            action,
            json,
            quiet,
        } => run_roles(action, json, quiet, &cwd),
        Commands::Layout {
            file,
            action,
            json,
            quiet,
        } => run_layout(file, action, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::OK as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
}

fn open_role_registry(config: &Config) -> Result<FileRoleRegistry, Box<dyn std::error::Error>> {
    let path = config
        .roles_path()
        .ok_or("could not determine roles file (no home directory)")?;
    Ok(FileRoleRegistry::with_path(path))
}

#[allow(clippy::too_many_arguments)]
fn run_templates(
    slug: String,
    part: String,
    view: u64,
    form: u64,
    post: Option<u64>,
    locate: bool,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use viewkit::cli::templates_cmd::{TemplatesCommand, TemplatesOptions};

    let config = Config::load_from_cwd(cwd);
    let cmd = TemplatesCommand::new(cwd, config);
    let options = TemplatesOptions {
        slug,
        part,
        view_id: view,
        form_id: form,
        post_id: post,
        locate,
        json,
        quiet,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_compose(
    grants: PathBuf,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use viewkit::cli::compose_cmd::{ComposeCommand, ComposeOptions};

    let config = Config::load_from_cwd(cwd);
    let cmd = ComposeCommand::new(config);
    let options = ComposeOptions {
        grants,
        json,
        quiet,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_check(
    roles: Vec<String>,
    capabilities: Vec<String>,
    object: Option<u64>,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use viewkit::cli::check_cmd::{CheckCommand, CheckOptions};

    let config = Config::load_from_cwd(cwd);
    let registry = open_role_registry(&config)?;
    let cmd = CheckCommand::new(registry, config);
    let options = CheckOptions {
        roles,
        capabilities,
        object_id: object,
        json,
        quiet,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(check_exit_code(output.success, output.allowed))
}

fn check_exit_code(success: bool, allowed: bool) -> ExitCode {
    match (success, allowed) {
        (true, true) => ExitCode::from(exit_codes::OK as u8),
        (true, false) => ExitCode::from(exit_codes::DENIED as u8),
        (false, _) => ExitCode::from(exit_codes::ERROR as u8),
    }
}

fn run_roles(
    action: RolesSubcommand,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use viewkit::cli::roles_cmd::{RolesAction, RolesCommand, RolesOptions};

    let config = Config::load_from_cwd(cwd);
    let registry = open_role_registry(&config)?;
    let cmd = RolesCommand::new(registry);
    let options = RolesOptions {
        action: match action {
            RolesSubcommand::Install => RolesAction::Install,
            RolesSubcommand::Remove => RolesAction::Remove,
            RolesSubcommand::List => RolesAction::List,
        },
        json,
        quiet,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_layout(
    file: PathBuf,
    action: LayoutSubcommand,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use viewkit::cli::layout_cmd::{LayoutCommand, LayoutCommandAction, LayoutOptions};

    let cmd = LayoutCommand::new(file);
    let options = LayoutOptions {
        action: match action {
            LayoutSubcommand::AddRow {
                context,
                structure,
                before,
            } => LayoutCommandAction::AddRow {
                context,
                structure,
                before,
            },
            LayoutSubcommand::RemoveRow { context, row } => {
                LayoutCommandAction::RemoveRow { context, row }
            }
            LayoutSubcommand::SetRow {
                context,
                row,
                key,
                value,
            } => LayoutCommandAction::SetRow {
                context,
                row,
                key,
                value,
            },
            LayoutSubcommand::Tab { context } => LayoutCommandAction::Tab { context },
            LayoutSubcommand::Show => LayoutCommandAction::Show,
        },
        json,
        quiet,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}
