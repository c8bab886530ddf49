//! Saved recordings: the interactive list and its one-shot counterparts.

use super::context::AppContext;
use crate::library::{RecordingFile, RecordingsViewer};
use crate::ui::{show_error, Screen};
use anyhow::anyhow;
use std::time::Duration;

/// Opens the interactive recordings list.
///
/// # Errors
/// - If the terminal cannot be initialized
/// - If the configuration cannot be loaded
pub async fn handle_list() -> anyhow::Result<()> {
    let mut screen = Screen::enter()?;

    let setup = AppContext::load().and_then(|context| {
        let library = context.list_controller()?;
        Ok((context, library))
    });
    let (context, mut library) = match setup {
        Ok(setup) => setup,
        Err(err) => {
            show_error(screen.terminal(), &format!("Recordings Error:\n\n{err}"))?;
            screen.cleanup()?;
            return Err(err);
        }
    };

    let mut viewer = RecordingsViewer::new(context.config.ui.toast_duration());
    let result = viewer.run(screen.terminal(), &mut library);

    drop(library);
    screen.cleanup()?;
    result.map(|_| ())
}

/// Prints one recording path per line, newest first.
///
/// # Errors
/// - If the configuration cannot be loaded or the folder cannot be read
pub async fn handle_ls() -> anyhow::Result<()> {
    let context = AppContext::load()?;
    let library = context.list_controller()?;
    for file in library.list_recordings()? {
        println!("{}", file.path.display());
    }
    Ok(())
}

/// Plays a recording to completion.
///
/// # Errors
/// - If the recording does not exist or no player is available
pub async fn handle_play(name: String) -> anyhow::Result<()> {
    let context = AppContext::load()?;
    let mut library = context.list_controller()?;
    let file = resolve(&context, &name)?;

    library.play(&file)?;
    println!("Playing {} (Ctrl+C to stop)", file.name);

    while library.is_playing() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    library.release_playback();
    Ok(())
}

/// Renames a recording, appending `.mp3` when the new name lacks it.
///
/// # Errors
/// - If the recording does not exist or the new name is taken or invalid
pub async fn handle_rename(name: String, new_name: String) -> anyhow::Result<()> {
    let context = AppContext::load()?;
    let mut library = context.list_controller()?;
    let file = resolve(&context, &name)?;

    let renamed = library.rename(&file, &new_name)?;
    println!("{} -> {}", file.name, renamed.name);
    Ok(())
}

/// # Errors
/// - If the recording does not exist or cannot be removed
pub async fn handle_delete(name: String) -> anyhow::Result<()> {
    let context = AppContext::load()?;
    let mut library = context.list_controller()?;
    let file = resolve(&context, &name)?;

    library.delete(&file)?;
    println!("Deleted {}", file.name);
    Ok(())
}

/// Places the recording on the clipboard as a file reference.
///
/// # Errors
/// - If the recording does not exist or no clipboard tool is available
pub async fn handle_share(name: String) -> anyhow::Result<()> {
    let context = AppContext::load()?;
    let library = context.list_controller()?;
    let file = resolve(&context, &name)?;

    let handoff = library.share(&file)?;
    println!("Copied {} ({}) to the clipboard", handoff.uri, handoff.mime);
    Ok(())
}

fn resolve(context: &AppContext, name: &str) -> anyhow::Result<RecordingFile> {
    context
        .store
        .resolve(name)
        .map_err(|e| anyhow!("{e}. Run 'wavelet ls' to see saved recordings."))
}
