//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use crate::setup;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal voice recorder with pause/resume and a saved-recordings browser
#[derive(Parser)]
#[command(name = "wavelet")]
#[command(version)]
#[command(about = "\n\n ╷ ╷┌─┐╷ ╷\n │╷│├─┤│┌┘\n └┴┘╵ ╵└┘")]
#[command(long_about = "\n\n ╷ ╷┌─┐╷ ╷\n │╷│├─┤│┌┘\n └┴┘╵ ╵└┘\n\nA terminal voice recorder with pause/resume, a live level meter and a\nsaved-recordings browser with playback, rename, delete and share.\n\nDEFAULT COMMAND:\n    With no command, wavelet shows the splash screen and opens the dashboard.\n\nDASHBOARD KEYS:\n    Enter/r   record or resume\n    Space     pause or resume\n    s         stop and save\n    l         open the recordings list\n    q/Esc     quit (an active recording is saved)\n\nEXAMPLES:\n    # Start recording straight away from a hotkey\n    $ wavelet --no-splash\n    $ pkill -USR1 wavelet\n\n    # Browse saved recordings\n    $ wavelet list\n\n    # Rename the newest recording\n    $ wavelet rename \"$(wavelet ls | head -1)\" standup")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavelet/wavelet.toml\n    Logs:               ~/.local/state/wavelet/wavelet.log.*"
)]
struct Cli {
    /// Skip the splash screen
    #[arg(long, global = true)]
    no_splash: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the recording dashboard (default)
    ///
    /// Enter to record, Space to pause/resume, s to stop, l for the
    /// recordings list. Sending SIGUSR1 starts or stops recording.
    #[command(visible_alias = "r")]
    Record,

    /// Browse saved recordings interactively
    #[command(visible_alias = "l")]
    List,

    /// Print saved recordings, newest first
    Ls,

    /// Play a recording to the end
    Play {
        /// File name inside the recordings folder, or a path
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Rename a recording (".mp3" is appended when missing)
    Rename {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "NEW_NAME")]
        new_name: String,
    },

    /// Delete a recording
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Copy a recording to the clipboard for pasting into other applications
    Share {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Open configuration file in your default editor
    Config,

    /// Show recent log entries
    Logs,

    /// List available audio input devices
    ListDevices,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   wavelet completions bash > wavelet.bash
    ///   wavelet completions zsh > _wavelet
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavelet", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return exit_on_error(commands::handle_list_devices());
        }
        Some(Commands::Logs) => {
            return exit_on_error(commands::handle_logs());
        }
        _ => {}
    }

    logging::init_logging()?;
    setup::run_setup().map_err(|e| {
        tracing::error!("Setup failed: {e}");
        anyhow::anyhow!("Setup failed: {e}")
    })?;

    match cli.command {
        None => commands::handle_record(!cli.no_splash).await?,
        Some(Commands::Record) => commands::handle_record(false).await?,
        Some(Commands::List) => commands::handle_list().await?,
        Some(Commands::Ls) => commands::handle_ls().await?,
        Some(Commands::Play { name }) => commands::handle_play(name).await?,
        Some(Commands::Rename { name, new_name }) => {
            commands::handle_rename(name, new_name).await?;
        }
        Some(Commands::Delete { name }) => commands::handle_delete(name).await?,
        Some(Commands::Share { name }) => commands::handle_share(name).await?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

fn exit_on_error(result: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_and_aliases() {
        let cli = Cli::try_parse_from(["wavelet", "--no-splash"]).unwrap();
        assert!(cli.no_splash);
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["wavelet", "r"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Record)));

        let cli = Cli::try_parse_from(["wavelet", "rename", "a.mp4", "b"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Rename { ref name, ref new_name }) if name == "a.mp4" && new_name == "b"
        ));
    }
}
