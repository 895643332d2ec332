//! SGEX CLI
//!
//! Command-line interface for browsing DAK decision-table concepts

mod commands; // concepts, cql, check, stage, config
mod output;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use sgex_core::{Result, SortField, init_tracing};
use std::io;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "sgex")]
#[command(about = "SGEX: browse and check DAK decision-table concepts")]
#[command(version = sgex_core::VERSION)]
#[command(
    long_about = "SGEX reads the DAK code system (input/fsh/codesystems/DAK.fsh) of a\n\
WHO SMART Guidelines repository and lists its decision-table concepts.\n\
\n\
Examples:\n  \
sgex concepts --repo WorldHealthOrganization/smart-anc   # List concepts on GitHub\n  \
sgex concepts DAK.fsh --sort display                     # List concepts of a local file\n  \
sgex cql ANC.DT.01 --repo who/smart-anc --branch dev     # Print the CQL of one concept\n  \
sgex check DAK.fsh                                       # Report extraction problems\n  \
sgex stage add input/fsh/codesystems/DAK.fsh DAK.fsh     # Stage a local edit"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.sgexrc.json/.sgexrc.toml/sgex.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

/// Which repository and branch to read from
#[derive(Args, Clone, Debug, Default)]
pub struct RepoArgs {
    /// Repository as owner/name (or owner/name@branch)
    #[arg(
        long,
        env = "SGEX_REPO",
        help = "Repository as owner/name (default: github section of the config)"
    )]
    pub repo: Option<String>,

    /// Branch to read
    #[arg(long, help = "Branch (default: configured branch or main)")]
    pub branch: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the concepts of the DAK code system
    #[command(alias = "ls")]
    Concepts {
        /// Local FSH file to read instead of a repository
        #[arg(help = "FSH file to read (default: repository code system)")]
        file: Option<PathBuf>,

        #[command(flatten)]
        target: RepoArgs,

        /// Case-insensitive filter on code, display and definition
        #[arg(short, long, help = "Only show concepts matching this text")]
        search: Option<String>,

        /// Column to sort by
        #[arg(
            long,
            help = "Sort column (code, display, definition, tables, tabs, cql)"
        )]
        sort: Option<SortField>,

        /// Sort descending
        #[arg(long, requires = "sort", help = "Sort in descending order")]
        desc: bool,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,
    },

    /// Print the CQL expression of one concept
    Cql {
        /// Concept code
        #[arg(help = "Code of the concept")]
        code: String,

        /// Local FSH file to read instead of a repository
        #[arg(help = "FSH file to read (default: repository code system)")]
        file: Option<PathBuf>,

        #[command(flatten)]
        target: RepoArgs,
    },

    /// Report problems found while extracting concepts
    Check {
        /// Local FSH file to read instead of a repository
        #[arg(help = "FSH file to check (default: repository code system)")]
        file: Option<PathBuf>,

        #[command(flatten)]
        target: RepoArgs,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,
    },

    /// Manage pending edits in the staging ground
    Stage {
        #[command(subcommand)]
        action: StageAction,

        #[command(flatten)]
        target: RepoArgs,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum StageAction {
    /// Stage the content of a local file for a repository path
    Add {
        /// Repository-relative path the edit applies to
        #[arg(help = "Repository path, e.g. input/fsh/codesystems/DAK.fsh")]
        path: String,

        /// Local file holding the new content
        #[arg(help = "Local file with the new content")]
        file: PathBuf,

        /// Short description of the edit
        #[arg(short, long, help = "Description of the change")]
        message: Option<String>,
    },

    /// List staged edits
    List,

    /// Drop the staged edit of one path
    Drop {
        #[arg(help = "Repository path to unstage")]
        path: String,
    },

    /// Drop every staged edit
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration file format
        #[arg(long, default_value = "json", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show current configuration
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable output with colors and context
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// One line per entry
    Compact,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// TOML configuration format
    Toml,
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return Ok(());
    }

    let use_colors = !cli.no_color && std::env::var("NO_COLOR").is_err();
    colored::control::set_override(use_colors);

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "sgex=error",
        1 => "sgex=warn",
        2 => "sgex=info",
        3 => "sgex=debug",
        _ => "sgex=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    match run_command(cli, use_colors).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("sgex failed: {}", e);
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

async fn run_command(cli: Cli, use_colors: bool) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Concepts {
            file,
            target,
            search,
            sort,
            desc,
            format,
        }) => {
            commands::concepts_command(
                file,
                &target,
                search,
                sort,
                desc,
                format,
                use_colors,
                config_path,
            )
            .await
        }

        Some(Commands::Cql { code, file, target }) => {
            commands::cql_command(&code, file, &target, config_path).await
        }

        Some(Commands::Check {
            file,
            target,
            format,
        }) => commands::check_command(file, &target, format, use_colors, config_path).await,

        Some(Commands::Stage { action, target }) => match action {
            StageAction::Add {
                path,
                file,
                message,
            } => commands::stage::add_command(&path, &file, message, &target, config_path),
            StageAction::List => commands::stage::list_command(&target, config_path),
            StageAction::Drop { path } => {
                commands::stage::drop_command(&path, &target, config_path)
            }
            StageAction::Clear => commands::stage::clear_command(&target, config_path),
        },

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { format, force } => commands::config::init_command(format, force),
            ConfigAction::Show => commands::config::show_command(config_path),
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("sgex {}", sgex_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                println!(
                    "  Code system: {}",
                    sgex_core::DAK_CODESYSTEM_PATH
                );
            } else {
                println!("{}", sgex_core::VERSION);
            }
            Ok(())
        }

        None => {
            // No subcommand provided, show help
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
