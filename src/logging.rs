use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::Level;

/// Installs a global subscriber that appends to `path`.
///
/// The TUI owns stdout, so logs only ever go to a file.
pub fn init_file_logging(path: &Path, level: &str, json: bool) -> Result<()> {
    let level: Level = level
        .parse()
        .map_err(|_| eyre!("invalid log level `{level}`"))?;

    ensure_parent_dir(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

    let builder = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(level)
        .with_writer(Mutex::new(file));

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        let path = std::env::temp_dir().join("proctab_test_level.log");
        let err = init_file_logging(&path, "chatty", false).unwrap_err();
        assert!(err.to_string().contains("chatty"));
    }
}
