//! Readers for delimited text tables.
//!
//! [`TabularSource`] is implemented twice: [`CsvSource`] uses the `csv` crate
//! and is compiled with the `csv` feature, while [`DelimitedTextSource`] is a
//! small hand-rolled reader that needs nothing beyond the standard library.
//! Both produce the same [`Table`] for the same input:
//!
//! - the first non-blank record is the header row
//! - fields may be quoted with `"`; a doubled `""` inside quotes is a literal quote
//! - records end at `\n`, `\r\n` or `\r`; blank lines are skipped
//! - a leading UTF-8 byte order mark is ignored
//! - records may have fewer or more fields than the header

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::ClientError;

/// One data record together with the line it started on (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub line: u64,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Position of a column, comparing header names after trimming
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header.trim() == name)
    }
}

pub trait TabularSource {
    fn read_table(&mut self) -> Result<Table, ClientError>;
}

/// Table reader backed by the `csv` crate
#[cfg(feature = "csv")]
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
}

#[cfg(feature = "csv")]
impl<R: Read> CsvSource<R> {
    pub fn new(reader: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        Self { reader }
    }
}

#[cfg(feature = "csv")]
impl<R: Read> TabularSource for CsvSource<R> {
    fn read_table(&mut self) -> Result<Table, ClientError> {
        let mut headers: Vec<String> = self
            .reader
            .headers()
            .map_err(|e| ClientError::Format(format!("failed to read CSV header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();
        if let Some(first) = headers.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        let mut rows = Vec::new();
        for result in self.reader.records() {
            let record =
                result.map_err(|e| ClientError::Format(format!("failed to read CSV row: {}", e)))?;
            rows.push(TableRow {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                fields: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Table { headers, rows })
    }
}

/// Hand-rolled comma separated reader for builds without the `csv` crate
pub struct DelimitedTextSource<R: Read> {
    reader: R,
    delimiter: char,
}

impl<R: Read> DelimitedTextSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            delimiter: ',',
        }
    }
}

impl<R: Read> TabularSource for DelimitedTextSource<R> {
    fn read_table(&mut self) -> Result<Table, ClientError> {
        let mut text = String::new();
        self.reader
            .read_to_string(&mut text)
            .map_err(|e| ClientError::Format(format!("failed to read delimited text: {}", e)))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let mut records = parse_records(text, self.delimiter).into_iter();
        let headers = records
            .next()
            .map(|record| record.fields)
            .unwrap_or_default();

        Ok(Table {
            headers,
            rows: records.collect(),
        })
    }
}

fn parse_records(text: &str, delimiter: char) -> Vec<TableRow> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // true once the current record has any content, even an empty quoted field
    let mut started = false;
    let mut line: u64 = 1;
    let mut record_line: u64 = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                '\r' => {
                    if chars.peek() != Some(&'\n') {
                        line += 1;
                    }
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                if !started {
                    record_line = line;
                }
                started = true;
                in_quotes = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if started {
                    fields.push(std::mem::take(&mut field));
                    records.push(TableRow {
                        line: record_line,
                        fields: std::mem::take(&mut fields),
                    });
                    started = false;
                }
                line += 1;
            }
            _ if c == delimiter => {
                if !started {
                    record_line = line;
                }
                started = true;
                fields.push(std::mem::take(&mut field));
            }
            _ => {
                if !started {
                    record_line = line;
                }
                started = true;
                field.push(c);
            }
        }
    }

    if started {
        fields.push(field);
        records.push(TableRow {
            line: record_line,
            fields,
        });
    }

    records
}

/// Open a table file with the richest reader compiled into this build
pub fn open_source(path: &Path) -> Result<Box<dyn TabularSource>, ClientError> {
    let file = File::open(path).map_err(|e| ClientError::file_io(path, e))?;

    #[cfg(feature = "csv")]
    {
        debug!("Reading {} with the csv reader", path.display());
        Ok(Box::new(CsvSource::new(file)))
    }

    #[cfg(not(feature = "csv"))]
    {
        debug!("Reading {} with the built-in delimited text reader", path.display());
        Ok(Box::new(DelimitedTextSource::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_delimited(input: &str) -> Table {
        DelimitedTextSource::new(input.as_bytes())
            .read_table()
            .unwrap()
    }

    #[test]
    fn test_delimited_reads_header_and_rows() {
        let table = read_delimited("Kind Name,Icon Name,Color\nPrinter,print,#ff0000\n");
        assert_eq!(table.headers, vec!["Kind Name", "Icon Name", "Color"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].fields, vec!["Printer", "print", "#ff0000"]);
        assert_eq!(table.column("Color"), Some(2));
    }

    #[test]
    fn test_delimited_handles_quotes_and_line_endings() {
        let table = read_delimited(
            "\u{feff}A,B\r\n\"x, y\",\"say \"\"hi\"\"\"\r\n\r\n\"multi\nline\",z\rlast,\"\"",
        );
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(
            table.rows,
            vec![
                TableRow {
                    line: 2,
                    fields: vec!["x, y".to_string(), "say \"hi\"".to_string()],
                },
                TableRow {
                    line: 4,
                    fields: vec!["multi\nline".to_string(), "z".to_string()],
                },
                TableRow {
                    line: 6,
                    fields: vec!["last".to_string(), "".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_delimited_keeps_short_rows() {
        let table = read_delimited("A,B,C\n1,2\n");
        assert_eq!(table.rows[0].fields, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        let table = read_delimited("");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_both_readers_agree() {
        let inputs = [
            "Kind Name,Icon Name,Color\nPrinter,print,#ff0000\nScanner,barcode,#00ff00\n",
            "Kind Name,Icon Name,Color\r\n\r\n \"Door\" ,door-open,#123456\r\nShort,only\r\n",
            "\u{feff}Color,Kind Name,Icon Name,Extra\n#fff,\"Quoted, Name\",star,1,2\n",
            "Kind Name,Icon Name,Color\n\"He said \"\"x\"\"\",a,b",
        ];
        for input in inputs {
            let expected = CsvSource::new(input.as_bytes()).read_table().unwrap();
            let actual = read_delimited(input);
            assert_eq!(actual.headers, expected.headers, "headers for {:?}", input);
            let expected_fields: Vec<_> = expected.rows.iter().map(|r| &r.fields).collect();
            let actual_fields: Vec<_> = actual.rows.iter().map(|r| &r.fields).collect();
            assert_eq!(actual_fields, expected_fields, "rows for {:?}", input);
        }
    }
}
