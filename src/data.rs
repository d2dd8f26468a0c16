//! CSV source reading and row normalization

use crate::error::{Result, TabsyncError};
use encoding_rs::Encoding;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A CSV file together with its parse settings
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    separator: u8,
    encoding: &'static Encoding,
}

/// Header row plus the leading sample rows used for schema inference
#[derive(Debug, Clone)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
}

impl CsvSource {
    pub fn new(path: &Path, separator: u8, encoding_label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(encoding_label.as_bytes()).ok_or_else(|| {
            TabsyncError::config(format!("unknown csv encoding '{}'", encoding_label))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            separator,
            encoding,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> Result<csv::Reader<File>> {
        // flexible: ragged rows are normalized later, not rejected
        Ok(csv::ReaderBuilder::new()
            .delimiter(self.separator)
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?)
    }

    /// Read the header row plus up to `sample_limit` data rows
    pub fn preview(&self, sample_limit: usize) -> Result<CsvPreview> {
        let mut reader = self.reader()?;
        let headers = decode_record(self.encoding, reader.byte_headers()?);

        let mut sample_rows = Vec::new();
        let mut record = csv::ByteRecord::new();
        while sample_rows.len() < sample_limit && reader.read_byte_record(&mut record)? {
            sample_rows.push(decode_record(self.encoding, &record));
        }

        Ok(CsvPreview {
            headers,
            sample_rows,
        })
    }

    /// Stream the data rows, each normalized to `width` fields
    pub fn rows(&self, width: usize) -> Result<RowStream> {
        Ok(RowStream {
            reader: self.reader()?,
            record: csv::ByteRecord::new(),
            encoding: self.encoding,
            width,
        })
    }
}

/// Streaming reader over normalized data rows
pub struct RowStream {
    reader: csv::Reader<File>,
    record: csv::ByteRecord,
    encoding: &'static Encoding,
    width: usize,
}

impl RowStream {
    /// Next normalized row, or None at end of file
    pub fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        if self.reader.read_byte_record(&mut self.record)? {
            let row = decode_record(self.encoding, &self.record);
            Ok(Some(normalize_row(row, self.width)))
        } else {
            Ok(None)
        }
    }
}

/// Pad short rows with empty fields and drop extra trailing fields so every
/// row matches the header width
pub fn normalize_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

fn decode_record(encoding: &'static Encoding, record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| {
            let (text, _, _) = encoding.decode(field);
            text.into_owned()
        })
        .collect()
}
