use std::env;
use std::path::PathBuf;

/// Maximum number of history entries retained; older entries are dropped on
/// insert.
pub const HISTORY_LIMIT: usize = 50;

/// Caller-side cap on requirement length, in characters.
pub const MAX_REQUIREMENT_LENGTH: usize = 1000;

/// Get the path to the Ticketsmith data directory (~/.ticketsmith)
pub fn ticketsmith_dir() -> PathBuf {
    // Explicit override first (useful for tests and portable setups)
    if let Ok(dir) = env::var("TICKETSMITH_DATA_DIR") {
        return PathBuf::from(dir);
    }

    // Then HOME, falling back to the dirs crate for normal usage
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".ticketsmith")
    } else {
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".ticketsmith")
    }
}

/// Get the path to the SQLite database file (~/.ticketsmith/ticketsmith.db)
pub fn database_file() -> PathBuf {
    ticketsmith_dir().join("ticketsmith.db")
}
