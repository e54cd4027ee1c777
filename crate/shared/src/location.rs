/// Represents a location in a source file (file path, line, column)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Path of the file the location points into
    pub file_path: String,
    /// The line number (1-based)
    pub line: usize,
    /// The column number (1-based; 0 means "the entire line")
    pub column: usize,
}

impl Location {
    /// Creates a new Location
    ///
    /// ### Arguments
    /// * `file_path` - Path of the file the location points into
    /// * `line` - Line number (1-based)
    /// * `column` - Column number (1-based, 0 for "entire line")
    ///
    /// ### Returns
    /// A new Location
    pub fn new(file_path: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
        }
    }

    /// True when the location designates a whole line rather than a column
    pub fn is_whole_line(&self) -> bool {
        self.column == 0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_whole_line() {
            write!(f, "{}:{}", self.file_path, self.line)
        } else {
            write!(f, "{}:{}:{}", self.file_path, self.line, self.column)
        }
    }
}
