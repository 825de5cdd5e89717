//! Minimal CSV writer for the admin exports.

use std::borrow::Cow;

/// Placeholder written for absent values.
pub const MISSING: &str = "N/A";

/// Quote a field when it contains a delimiter, a quote or a line break.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn or_missing(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

#[derive(Debug)]
pub struct CsvWriter {
    columns: usize,
    out: String,
}

impl CsvWriter {
    pub fn new(header: &[&str]) -> Self {
        let mut writer = CsvWriter { columns: header.len(), out: String::new() };
        writer.push_line(header.iter().copied());
        writer
    }

    /// Rows shorter than the header are padded with `N/A`, longer ones are cut.
    pub fn row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields: Vec<String> = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        fields.resize(self.columns, MISSING.to_string());
        self.push_line(fields.iter().map(String::as_str));
    }

    fn push_line<'a>(&mut self, fields: impl Iterator<Item = &'a str>) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        let line = fields.map(escape_field).collect::<Vec<_>>().join(",");
        self.out.push_str(&line);
    }

    pub fn finish(self) -> String {
        self.out
    }
}
