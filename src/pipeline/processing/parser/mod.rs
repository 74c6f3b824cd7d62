use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::EVENTID;
use crate::error::{GenQuakemlError, Result};
use crate::types::EventRecord;

pub trait Parser {
    fn parse(&self, text: &str) -> Result<EventRecord>;
}

/// Parses `key = value` lines. Blank lines and lines starting with a comment
/// marker are skipped; every other line must contain the delimiter.
pub struct KeyValueParser {
    pub delimiter: char,
    pub comment_markers: Vec<char>,
}

impl KeyValueParser {
    pub fn new() -> Self {
        Self {
            delimiter: '=',
            comment_markers: vec!['#', ';'],
        }
    }

    fn is_comment(&self, line: &str) -> bool {
        line.chars()
            .next()
            .map(|c| self.comment_markers.contains(&c))
            .unwrap_or(false)
    }
}

impl Default for KeyValueParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for KeyValueParser {
    fn parse(&self, text: &str) -> Result<EventRecord> {
        let mut record = EventRecord::new();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();
            if line.is_empty() || self.is_comment(line) {
                continue;
            }

            let (key, value) = line.split_once(self.delimiter).ok_or_else(|| {
                GenQuakemlError::parse(
                    line_number,
                    raw_line,
                    format!("expected 'key {} value'", self.delimiter),
                )
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(GenQuakemlError::parse(line_number, raw_line, "empty field name"));
            }
            let value = strip_quotes(value.trim());

            if let Some(previous) = record.insert(key, value) {
                warn!(
                    "Field '{}' repeated on line {}; replacing '{}' with '{}'",
                    key, line_number, previous, value
                );
            }
        }

        debug!("KeyValueParser: parsed {} fields", record.len());
        Ok(record)
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Read and parse the input description at `path`
pub fn read_record(path: &Path) -> Result<EventRecord> {
    if !path.exists() {
        return Err(GenQuakemlError::file(path, "does not exist"));
    }
    if !path.is_file() {
        return Err(GenQuakemlError::file(path, "is not a regular file"));
    }
    let text = fs::read_to_string(path).map_err(|e| GenQuakemlError::file(path, e.to_string()))?;
    let record = KeyValueParser::new().parse(&text)?;
    info!("Read {} fields from {}", record.len(), path.display());
    Ok(record)
}

/// Resolve where the catalog is written: the explicit path when given,
/// otherwise `<eventid>.<extension>` next to the input, otherwise the input
/// file stem with the extension.
pub fn resolve_output_path(
    input: &Path,
    explicit: Option<&Path>,
    record: &EventRecord,
    extension: &str,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let directory = input.parent().unwrap_or_else(|| Path::new(""));
    let stem = match record.get_non_empty(EVENTID) {
        Some(eventid) => sanitize_file_stem(eventid),
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "event".to_string()),
    };
    directory.join(format!("{}.{}", stem, extension.trim_start_matches('.')))
}

fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parses_pairs_and_skips_comments() {
        let text = "# event description\n\neventid = ga2021abc\n; legacy comment\ndepth=10\nregion = \"Hunter Valley, NSW\"\n";
        let record = KeyValueParser::new().parse(text).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("eventid"), Some("ga2021abc"));
        assert_eq!(record.get("depth"), Some("10"));
        assert_eq!(record.get("region"), Some("Hunter Valley, NSW"));
    }

    #[test]
    fn test_value_may_contain_delimiter() {
        let record = KeyValueParser::new().parse("note = a=b").unwrap();
        assert_eq!(record.get("note"), Some("a=b"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let record = KeyValueParser::new().parse("EventID = A\neventid = b").unwrap();
        assert_eq!(record.get("EventID"), Some("A"));
        assert_eq!(record.get("eventid"), Some("b"));
    }

    #[test]
    fn test_line_without_delimiter_is_parse_error() {
        let err = KeyValueParser::new()
            .parse("depth = 10\nlatitude -32.1\n")
            .unwrap_err();
        match err {
            GenQuakemlError::Parse { line_number, line, .. } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "latitude -32.1");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_key_is_parse_error() {
        assert!(matches!(
            KeyValueParser::new().parse(" = value"),
            Err(GenQuakemlError::Parse { line_number: 1, .. })
        ));
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let record = KeyValueParser::new()
            .parse("\u{feff}eventid = ga2021abc\ndepth = 10\n")
            .unwrap();
        assert_eq!(record.get("eventid"), Some("ga2021abc"));
        assert!(record.keys().all(|key| !key.starts_with('\u{feff}')));
    }

    #[test]
    fn test_read_record_strips_byte_order_mark() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("event.txt");
        fs::write(&path, "\u{feff}# saved with a BOM\neventid = ga2021abc\n").unwrap();
        let record = read_record(&path).unwrap();
        assert_eq!(record.get("eventid"), Some("ga2021abc"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_read_record_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_record(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, GenQuakemlError::File { .. }));
    }

    #[test]
    fn test_read_record_rejects_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(read_record(dir.path()), Err(GenQuakemlError::File { .. })));
    }

    #[test]
    fn test_output_path_resolution() {
        let input = Path::new("data/event.txt");
        let with_id: EventRecord = [("eventid", "ga2021abc")].into_iter().collect();
        let without_id = EventRecord::new();

        assert_eq!(
            resolve_output_path(input, Some(Path::new("out.xml")), &with_id, "xml"),
            PathBuf::from("out.xml")
        );
        assert_eq!(
            resolve_output_path(input, None, &with_id, "xml"),
            PathBuf::from("data/ga2021abc.xml")
        );
        assert_eq!(
            resolve_output_path(input, None, &without_id, ".xml"),
            PathBuf::from("data/event.xml")
        );
    }
}
