//! Plain-text persistence of feature records.
//!
//! One record per line: `imageId,v1,v2,...,vn`. There is no header, no
//! quoting, and ids must not contain commas. Floats are written with Rust's
//! shortest round-trip formatting, which is locale independent. Reading is
//! all-or-nothing: one malformed field fails the whole load.

use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{ImgMatchError, ImgMatchResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Feature vector for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    pub image_id: String,
    pub vector: Vec<f32>,
}

impl FeatureRecord {
    pub fn new(image_id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            image_id: image_id.into(),
            vector,
        }
    }
}

/// Ordered collection of records with unique ids.
#[derive(Clone, Debug, Default)]
pub struct FeatureStore {
    records: Vec<FeatureRecord>,
    index: HashMap<String, usize>,
}

impl FeatureStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records, rejecting duplicate or invalid ids.
    pub fn from_records(records: Vec<FeatureRecord>) -> ImgMatchResult<Self> {
        let mut store = Self::new();
        for record in records {
            store.push(record)?;
        }
        Ok(store)
    }

    /// Appends a record.
    pub fn push(&mut self, record: FeatureRecord) -> ImgMatchResult<()> {
        check_image_id(&record.image_id)?;
        if self.index.contains_key(&record.image_id) {
            return Err(ImgMatchError::DuplicateId {
                image_id: record.image_id,
            });
        }
        self.index.insert(record.image_id.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns all records in insertion order.
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Looks up a record by image id.
    pub fn get(&self, image_id: &str) -> Option<&FeatureRecord> {
        self.index.get(image_id).map(|&idx| &self.records[idx])
    }

    /// Looks up a record by image id, failing with `NotFound`.
    pub fn require(&self, image_id: &str) -> ImgMatchResult<&FeatureRecord> {
        self.get(image_id).ok_or_else(|| ImgMatchError::NotFound {
            image_id: image_id.to_string(),
        })
    }

    /// Appends `other`'s vector to every record with the same id.
    ///
    /// Records with no counterpart in `other` are dropped; their ids are
    /// returned alongside the joined store.
    pub fn join(&self, other: &FeatureStore) -> (FeatureStore, Vec<String>) {
        let mut joined = FeatureStore::new();
        let mut missing = Vec::new();
        for record in &self.records {
            match other.get(&record.image_id) {
                Some(extra) => {
                    let mut vector = Vec::with_capacity(record.vector.len() + extra.vector.len());
                    vector.extend_from_slice(&record.vector);
                    vector.extend_from_slice(&extra.vector);
                    joined.records.push(FeatureRecord::new(record.image_id.clone(), vector));
                    joined
                        .index
                        .insert(record.image_id.clone(), joined.records.len() - 1);
                }
                None => {
                    trace_warn!("join_missing", image_id = record.image_id);
                    missing.push(record.image_id.clone());
                }
            }
        }
        (joined, missing)
    }

    /// Parses a store from a reader.
    pub fn from_reader<R: BufRead>(reader: R) -> ImgMatchResult<Self> {
        let mut store = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|err| ImgMatchError::Parse {
                line: line_no,
                reason: err.to_string(),
            })?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_line(line, line_no)?;
            store.push(record).map_err(|err| ImgMatchError::Parse {
                line: line_no,
                reason: err.to_string(),
            })?;
        }
        Ok(store)
    }

    /// Reads a store file.
    pub fn read_from<P: AsRef<Path>>(path: P) -> ImgMatchResult<Self> {
        let path = path.as_ref();
        let _span = trace_span!("store_read", path = %path.display()).entered();
        let file = File::open(path).map_err(|err| ImgMatchError::io(path, err))?;
        let store = Self::from_reader(BufReader::new(file))?;
        trace_event!("store_loaded", records = store.len());
        Ok(store)
    }

    /// Writes every record, one line each, in insertion order.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for record in &self.records {
            write!(writer, "{}", record.image_id)?;
            for value in &record.vector {
                write!(writer, ",{value}")?;
            }
            writeln!(writer)?;
        }
        writer.flush()
    }

    /// Writes the store to a file, replacing any existing content.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> ImgMatchResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| ImgMatchError::io(path, err))?;
        self.to_writer(BufWriter::new(file))
            .map_err(|err| ImgMatchError::io(path, err))?;
        trace_event!("store_written", records = self.len());
        Ok(())
    }
}

pub(crate) fn check_image_id(image_id: &str) -> ImgMatchResult<()> {
    if image_id.is_empty() || image_id.contains([',', '\n', '\r']) {
        return Err(ImgMatchError::InvalidImageId {
            image_id: image_id.to_string(),
        });
    }
    Ok(())
}

fn parse_line(line: &str, line_no: usize) -> ImgMatchResult<FeatureRecord> {
    let mut fields = line.split(',');
    let image_id = fields.next().unwrap_or_default();
    if image_id.is_empty() {
        return Err(ImgMatchError::Parse {
            line: line_no,
            reason: "empty image id".to_string(),
        });
    }
    let vector = fields
        .enumerate()
        .map(|(col, field)| {
            field
                .trim()
                .parse::<f32>()
                .map_err(|err| ImgMatchError::Parse {
                    line: line_no,
                    reason: format!("field {}: {err} ({field:?})", col + 1),
                })
        })
        .collect::<ImgMatchResult<Vec<_>>>()?;
    Ok(FeatureRecord::new(image_id, vector))
}

#[cfg(test)]
mod tests {
    use super::{FeatureRecord, FeatureStore};
    use crate::ImgMatchError;
    use std::io::Cursor;

    #[test]
    fn writer_emits_one_line_per_record() {
        let store = FeatureStore::from_records(vec![
            FeatureRecord::new("a.jpg", vec![1.0, 0.5]),
            FeatureRecord::new("b.jpg", vec![]),
        ])
        .unwrap();
        let mut out = Vec::new();
        store.to_writer(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a.jpg,1,0.5\nb.jpg\n");
    }

    #[test]
    fn reader_skips_blank_lines_and_crlf() {
        let text = "a.jpg,1,2\r\n\nb.jpg,3,4\n";
        let store = FeatureStore::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b.jpg").unwrap().vector, vec![3.0, 4.0]);
    }

    #[test]
    fn malformed_field_fails_whole_read() {
        let text = "a.jpg,1,2\nb.jpg,3,x\n";
        let err = FeatureStore::from_reader(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, ImgMatchError::Parse { line: 2, .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let text = "a.jpg,1\na.jpg,2\n";
        let err = FeatureStore::from_reader(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, ImgMatchError::Parse { line: 2, .. }));
    }

    #[test]
    fn ids_with_commas_cannot_be_stored() {
        let err = FeatureStore::from_records(vec![FeatureRecord::new("a,b.jpg", vec![1.0])])
            .unwrap_err();
        assert!(matches!(err, ImgMatchError::InvalidImageId { .. }));
    }

    #[test]
    fn join_appends_matching_vectors_and_reports_missing() {
        let left = FeatureStore::from_records(vec![
            FeatureRecord::new("a.jpg", vec![1.0]),
            FeatureRecord::new("b.jpg", vec![2.0]),
        ])
        .unwrap();
        let right =
            FeatureStore::from_records(vec![FeatureRecord::new("a.jpg", vec![9.0, 8.0])]).unwrap();
        let (joined, missing) = left.join(&right);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.require("a.jpg").unwrap().vector, vec![1.0, 9.0, 8.0]);
        assert_eq!(missing, vec!["b.jpg".to_string()]);
    }

    #[test]
    fn require_reports_missing_id() {
        let store = FeatureStore::new();
        assert_eq!(
            store.require("x.jpg").unwrap_err(),
            ImgMatchError::NotFound {
                image_id: "x.jpg".to_string(),
            }
        );
    }
}
