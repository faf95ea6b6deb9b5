use anyhow::Result;

/// Line-oriented input for the interactive shell.
pub trait CommandSource {
    /// Returns None once input is exhausted.
    fn next_line(&mut self) -> Result<Option<String>>;
}
