/// Layout knobs for help output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Total output width used for wrapping.
    pub line_width: usize,
    /// Indentation of section headers and the description.
    pub indent: usize,
    /// Gap between the name column and the description column.
    pub margin: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            line_width: 80,
            indent: 4,
            margin: 4,
        }
    }
}
