use std::env;
use std::path::PathBuf;

/// Get the path to the tagging data directory (~/.tagging)
pub fn tagging_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".tagging")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".tagging")
    }
}

/// Get the path to the default SQLite database (~/.tagging/tagging.db)
pub fn database_file() -> PathBuf {
    tagging_dir().join("tagging.db")
}
