use std::io::{self, BufRead, StdinLock};

use anyhow::Result;

use crate::usecases::contracts::CommandSource;

/// Reads shell commands one line at a time.
pub struct LineCommandSource<R> {
    reader: R,
}

impl LineCommandSource<StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> LineCommandSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> CommandSource for LineCommandSource<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

#[cfg(test)]
pub struct MockCommandSource {
    queue: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl MockCommandSource {
    pub fn from(lines: &[&str]) -> Self {
        Self {
            queue: lines.iter().map(|line| (*line).to_owned()).collect(),
        }
    }
}

#[cfg(test)]
impl CommandSource for MockCommandSource {
    fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.queue.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn line_source_strips_line_endings() {
        let mut source = LineCommandSource::new(Cursor::new("list\r\nsend c1 hi\n"));

        assert_eq!(source.next_line().expect("read"), Some("list".to_owned()));
        assert_eq!(
            source.next_line().expect("read"),
            Some("send c1 hi".to_owned())
        );
        assert_eq!(source.next_line().expect("read"), None);
    }

    #[test]
    fn mock_source_drains_in_order() {
        let mut source = MockCommandSource::from(&["help", "quit"]);

        assert_eq!(source.next_line().expect("read"), Some("help".to_owned()));
        assert_eq!(source.next_line().expect("read"), Some("quit".to_owned()));
        assert_eq!(source.next_line().expect("read"), None);
    }
}
