//! Accumulating diagnostics sink.
//!
//! Nothing in the scenario compiler fails hard on bad input. Problems are
//! appended here as `"<file> line <n>: <message>"` and the caller decides at
//! the end of a load whether they amount to a failure.

use v2txt::ParseError;

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    /// File currently being read; prefixes every entry.
    pub file_name: String,
    entries: Vec<String>,
}

impl Diagnostics {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            entries: Vec::new(),
        }
    }

    /// Switches the file name used for subsequent entries.
    pub fn set_file(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
    }

    pub fn push(&mut self, line: u32, message: impl AsRef<str>) {
        let entry = format!("{} line {}: {}", self.file_name, line, message.as_ref());
        log::debug!("{}", entry);
        self.entries.push(entry);
    }

    pub fn push_parse_error(&mut self, err: &ParseError) {
        self.push(err.line(), err.to_string());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The whole log, one entry per line.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_carry_file_and_line() {
        let mut diag = Diagnostics::new("common/countries.txt");
        diag.push(4, "encountered a tag that was not three characters");
        diag.set_file("common/event_modifiers.txt");
        diag.push(12, "unknown modifier key 'foo'");

        assert_eq!(diag.len(), 2);
        assert_eq!(
            diag.entries()[0],
            "common/countries.txt line 4: encountered a tag that was not three characters"
        );
        assert!(diag.report().ends_with("line 12: unknown modifier key 'foo'\n"));
    }
}
