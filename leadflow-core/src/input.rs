//! Input normalization
//!
//! Turns raw user input (typed values, bulk text, uploaded text files) into the
//! finite, order-preserving, duplicate-free lists the service accepts. An empty
//! result means there is nothing to submit.

use std::collections::HashSet;

use url::Url;

/// How bulk text is split into entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    /// One entry per line
    Lines,
    /// Comma separated cells on each line, optionally double-quoted
    Csv,
}

impl EntryFormat {
    /// Pick a format from a file name, by extension
    pub fn from_file_name(name: &str) -> Self {
        let is_csv = name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            EntryFormat::Csv
        } else {
            EntryFormat::Lines
        }
    }
}

/// Split bulk text into raw entries
///
/// Entries are not trimmed or filtered; the normalizers do that.
pub fn split_entries(text: &str, format: EntryFormat) -> Vec<String> {
    match format {
        EntryFormat::Lines => text.lines().map(str::to_string).collect(),
        EntryFormat::Csv => text.lines().flat_map(split_csv_line).collect(),
    }
}

/// Split one CSV line into cells
///
/// Commas inside double quotes belong to the cell; the quotes are dropped and
/// a doubled quote inside a quoted cell stands for one quote.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);

    cells
}

/// Whether `candidate` is an absolute URL with an `http` or `https` scheme
pub fn is_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Normalize raw URL entries
///
/// Trims, drops anything that is not an absolute http(s) URL, and removes
/// duplicates keeping the first occurrence. Entries are returned as typed,
/// not canonicalized.
pub fn normalize_urls<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedupe(
        raw.into_iter()
            .map(|entry| entry.as_ref().trim().to_string())
            .filter(|entry| is_http_url(entry)),
    )
}

/// Normalize raw email entries
///
/// Trims, drops blanks and removes duplicates keeping the first occurrence.
/// Address syntax is left to the verification service.
pub fn normalize_emails<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedupe(
        raw.into_iter()
            .map(|entry| entry.as_ref().trim().to_string())
            .filter(|entry| !entry.is_empty()),
    )
}

fn dedupe(entries: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    entries.filter(|entry| seen.insert(entry.clone())).collect()
}

/// Row window of a spreadsheet, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u32,
    /// `None` reads to the last row
    pub end: Option<u32>,
}

impl RowRange {
    pub fn new(start: u32, end: Option<u32>) -> Self {
        Self { start, end }
    }

    /// Whether the window is non-empty and starts at row 1 or later
    pub fn is_valid(&self) -> bool {
        self.start >= 1 && self.end.is_none_or(|end| end >= self.start)
    }

    /// Start row as the service expects it
    pub fn start_field(&self) -> String {
        self.start.to_string()
    }

    /// End row as the service expects it; empty when open-ended
    pub fn end_field(&self) -> String {
        self.end.map(|end| end.to_string()).unwrap_or_default()
    }
}

impl Default for RowRange {
    fn default() -> Self {
        Self::new(1, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_urls_scenario() {
        let raw = ["http://a.com", "http://a.com", "not-a-url", "https://b.com"];
        assert_eq!(normalize_urls(raw), vec!["http://a.com", "https://b.com"]);
    }

    #[test]
    fn test_normalize_urls_keeps_first_occurrence_order() {
        let raw = [
            "  https://z.org  ",
            "ftp://files.example.com",
            "https://a.org",
            "https://z.org",
            "",
            "mailto:someone@example.com",
            "http://",
            "example.com",
        ];
        assert_eq!(normalize_urls(raw), vec!["https://z.org", "https://a.org"]);
    }

    #[test]
    fn test_normalize_urls_only_http_schemes() {
        let raw = vec![
            "HTTPS://Upper.example".to_string(),
            "file:///etc/passwd".to_string(),
            "javascript:alert(1)".to_string(),
        ];
        let normalized = normalize_urls(&raw);
        assert_eq!(normalized, vec!["HTTPS://Upper.example"]);
        assert!(normalized.iter().all(|u| is_http_url(u)));
    }

    #[test]
    fn test_normalize_urls_empty_input() {
        assert!(normalize_urls(Vec::<String>::new()).is_empty());
        assert!(normalize_urls(["not-a-url", "   "]).is_empty());
    }

    #[test]
    fn test_normalize_emails() {
        let raw = [" a@x.com", "b@x.com", "", "a@x.com ", "  "];
        assert_eq!(normalize_emails(raw), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_split_entries_lines() {
        let entries = split_entries("http://a.com\r\nhttp://b.com\n\n", EntryFormat::Lines);
        assert_eq!(normalize_urls(entries), vec!["http://a.com", "http://b.com"]);
    }

    #[test]
    fn test_split_entries_csv() {
        let text = "\"https://a.com\",name\nhttps://b.com,\"other\"\n";
        let entries = split_entries(text, EntryFormat::Csv);
        assert_eq!(normalize_urls(entries), vec!["https://a.com", "https://b.com"]);
    }

    #[test]
    fn test_split_entries_csv_keeps_quoted_commas() {
        let text = "\"https://a.com/?q=x,y\",name\n\"say \"\"hi\"\"\",https://b.com\n";
        let entries = split_entries(text, EntryFormat::Csv);
        assert_eq!(
            entries,
            vec!["https://a.com/?q=x,y", "name", "say \"hi\"", "https://b.com"]
        );
        assert_eq!(
            normalize_urls(entries),
            vec!["https://a.com/?q=x,y", "https://b.com"]
        );
    }

    #[test]
    fn test_entry_format_from_file_name() {
        assert_eq!(EntryFormat::from_file_name("sites.CSV"), EntryFormat::Csv);
        assert_eq!(EntryFormat::from_file_name("sites.txt"), EntryFormat::Lines);
        assert_eq!(EntryFormat::from_file_name("sites"), EntryFormat::Lines);
    }

    #[test]
    fn test_row_range_fields() {
        let open = RowRange::default();
        assert_eq!(open.start_field(), "1");
        assert_eq!(open.end_field(), "");
        assert!(open.is_valid());

        let bounded = RowRange::new(2, Some(40));
        assert_eq!(bounded.end_field(), "40");
        assert!(bounded.is_valid());

        assert!(!RowRange::new(0, None).is_valid());
        assert!(!RowRange::new(10, Some(3)).is_valid());
    }
}
