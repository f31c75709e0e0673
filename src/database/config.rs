use std::path::{Path, PathBuf};

/// Longest column name `upload_table` keeps; longer names are cut to this many characters.
pub const DEFAULT_MAX_COLUMN_NAME_LENGTH: usize = 25;

/// Connection settings for a [`Database`](super::Database).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database file; created on first write if it does not exist
    pub path: PathBuf,
    /// Open every connection read-only
    pub read_only: bool,
    /// Column-name limit applied by `upload_table`
    pub max_column_name_length: usize,
}

impl DatabaseConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn max_column_name_length(mut self, length: usize) -> Self {
        self.max_column_name_length = length;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            read_only: false,
            max_column_name_length: DEFAULT_MAX_COLUMN_NAME_LENGTH,
        }
    }
}
