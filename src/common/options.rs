/// Default capacity of a binding buffer, in bytes.
///
/// Large enough for every fixed-width type and for typical text and memo
/// values. Longer values fail with [`MdbError::BindOverflow`](crate::MdbError).
pub const DEFAULT_BIND_SIZE: usize = 16 * 1024;

/// Default `strftime` pattern used to render DateTime columns.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Options for opening a database file.
///
/// # Example
///
/// ```no_run
/// use jetsql::{Database, OpenOptions};
///
/// let options = OpenOptions::new()
///     .bind_size(64 * 1024)
///     .date_format("%m/%d/%y %H:%M:%S")
///     .cache_catalog(true);
///
/// let db = Database::open_with("northwind.mdb", options)?;
/// # Ok::<(), jetsql::MdbError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub(crate) bind_size: usize,
    pub(crate) date_format: String,
    pub(crate) cache_catalog: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            bind_size: DEFAULT_BIND_SIZE,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            cache_catalog: false,
        }
    }
}

impl OpenOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity of each column's binding buffer.
    #[must_use]
    pub fn bind_size(mut self, bytes: usize) -> Self {
        self.bind_size = bytes;
        self
    }

    /// Sets the `strftime` pattern for DateTime columns.
    #[must_use]
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Keeps the catalog between calls instead of re-scanning it on every
    /// `tables`/`open_table`. Drop the cached copy with
    /// [`Database::invalidate_catalog`](crate::Database::invalidate_catalog).
    #[must_use]
    pub fn cache_catalog(mut self, enabled: bool) -> Self {
        self.cache_catalog = enabled;
        self
    }

    pub fn get_bind_size(&self) -> usize {
        self.bind_size
    }

    pub fn get_date_format(&self) -> &str {
        &self.date_format
    }

    pub fn get_cache_catalog(&self) -> bool {
        self.cache_catalog
    }
}
