use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenedeck")]
#[command(author, version, about)]
#[command(long_about = "A scene-based presentation player.\n\n\
    Decks are YAML files of slides, scenes and voice-over word timings.\n\n\
    Examples:\n  \
    scenedeck deck.yaml              Launch player (fullscreen)\n  \
    scenedeck deck.yaml --windowed   Launch in a window\n  \
    scenedeck steps deck.yaml        Print the step breakdown of every scene\n  \
    scenedeck sync deck.yaml --json  Align voice-over words to slide elements")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to play
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Start playing immediately
    #[arg(long, global = false)]
    pub autoplay: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the step breakdown of every scene in a deck
    Steps {
        /// Deck file
        file: PathBuf,
    },

    /// Align voice-over words to slide elements
    Sync {
        /// Deck file
        file: PathBuf,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pin an element to a fixed time (repeatable)
        #[arg(long = "lock", value_name = "ELEMENT=SECONDS")]
        locks: Vec<String>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (defaults.theme, defaults.trigger_mode, defaults.start_mode)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn ensure_exists(file: &std::path::Path) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    Ok(())
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Steps { file }) => {
                ensure_exists(&file)?;
                crate::commands::steps::run(&file)
            }
            Some(Commands::Sync {
                file,
                json,
                output,
                locks,
            }) => {
                ensure_exists(&file)?;
                crate::commands::sync::run(&file, json, output.as_deref(), &locks)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::banner::print_banner_with_version();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    ensure_exists(&file)?;
                    crate::app::run(file, self.windowed, self.slide, self.autoplay)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
