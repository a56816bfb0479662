//! Utility functions for user interaction.
use crate::error::Result;
use crate::storage::constants::DELETION_PREVIEW_LIMIT;
use std::io::{self, BufRead, Write};

/// Format deletion confirmation message with path list
pub fn format_deletion_message(paths: &[String]) -> String {
    let mut message = format!("About to delete {} item(s):\n", paths.len());
    for path in paths.iter().take(DELETION_PREVIEW_LIMIT) {
        message.push_str(&format!("  {path}\n"));
    }
    if paths.len() > DELETION_PREVIEW_LIMIT {
        message.push_str(&format!(
            "  ... and {} more\n",
            paths.len() - DELETION_PREVIEW_LIMIT
        ));
    }
    message.push_str("Continue? (y/N): ");
    message
}

/// Prompt user for confirmation before performing potentially destructive operations.
pub fn confirm_deletion(paths: &[String], force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }

    print!("{}", format_deletion_message(paths));
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
