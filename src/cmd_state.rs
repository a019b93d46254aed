//! Saved state inspection and config validation commands.

use std::path::Path;

use automator_config::{Config, ConfigLoader, ConfigValidator};
use automator_queue::{FileStateStore, StateStore};

/// Print the persisted media state.
pub(crate) async fn show_state(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStateStore::new(ConfigLoader::expand_path(&config.state.dir)).await?;

    match store.load().await? {
        Some(state) => {
            println!("{}", serde_json::to_string_pretty(&state)?);
            println!(
                "\nOn restart this job comes back as {:?} ({} of {} items done).",
                state.restored_phase(),
                state.cursor.min(state.items.len()),
                state.items.len() + state.inline_items
            );
        }
        None => println!("No saved media state at {}", store.path().display()),
    }

    Ok(())
}

/// Validate the configuration file at `path`.
pub(crate) fn check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config);

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    result.into_result()?;
    println!("{} is valid", path.display());
    Ok(())
}
