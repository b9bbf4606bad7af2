//! Persist the best score to disk (XDG config or ~/.config/dotstui).

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dotstui";
const FILENAME: &str = "highscore";

/// Default location: $XDG_CONFIG_HOME/dotstui/highscore, else ~/.config/dotstui/highscore.
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(APP_DIR).join(FILENAME)
}

/// Load the best score. 0 when the file is missing or unreadable.
pub fn load_high_score(path: &Path) -> u32 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.lines().next().and_then(|l| l.trim().parse().ok()))
        .unwrap_or(0)
}

/// Save the best score, creating the directory if needed.
pub fn save_high_score(path: &Path, score: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut f = fs::File::create(path).with_context(|| format!("writing {}", path.display()))?;
    writeln!(f, "{}", score)?;
    Ok(())
}
