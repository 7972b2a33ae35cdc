//! CSV log of (sample, prediction) rows
//!
//! Columns are the sample's feature names in order followed by `prediction`.
//! The header is taken from the existing file or written with the first row;
//! later rows must carry the same feature names in the same order.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use reasoning_sdk::{FailureClass, ReasoningError, Sample};

use crate::error::DashboardError;

/// Name of the trailing label column
pub const PREDICTION_COLUMN: &str = "prediction";

#[derive(Debug)]
pub struct PredictionLog {
    path: PathBuf,
    header: Mutex<Option<Vec<String>>>,
}

impl PredictionLog {
    /// Open a log, reading the header of an existing file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DashboardError> {
        let path = path.into();
        let header = read_header(&path)?;

        match &header {
            Some(columns) => log::info!(
                "Appending predictions to {} ({} columns)",
                path.display(),
                columns.len()
            ),
            None => log::info!("Prediction log {} will be created on first write", path.display()),
        }

        Ok(Self {
            path,
            header: Mutex::new(header),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row
    pub fn append(&self, sample: &Sample, prediction: FailureClass) -> Result<(), DashboardError> {
        if sample.is_empty() {
            return Err(ReasoningError::malformed_sample("sample has no features").into());
        }

        let columns: Vec<String> = sample
            .names()
            .map(str::to_string)
            .chain(std::iter::once(PREDICTION_COLUMN.to_string()))
            .collect();

        let mut header = self
            .header
            .lock()
            .map_err(|_| DashboardError::Persistence("prediction log lock poisoned".to_string()))?;

        if let Some(existing) = header.as_ref() {
            if *existing != columns {
                return Err(ReasoningError::malformed_sample(format!(
                    "sample columns [{}] do not match log columns [{}]",
                    columns.join(", "),
                    existing.join(", ")
                ))
                .into());
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| persistence(&self.path, e))?;

        let row: Vec<String> = sample
            .features()
            .iter()
            .map(|feature| feature.value.to_string())
            .chain(std::iter::once(prediction.to_string()))
            .collect();
        self.write_row(file, &mut header, columns, &row)?;

        log::debug!("Recorded prediction {} to {}", prediction, self.path.display());
        Ok(())
    }

    /// Write the header if none is recorded yet, then the row
    ///
    /// The header is recorded as soon as it reaches the output, so a failed
    /// row write never leads to a second header.
    fn write_row<W: Write>(
        &self,
        out: W,
        header: &mut Option<Vec<String>>,
        columns: Vec<String>,
        row: &[String],
    ) -> Result<(), DashboardError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);

        if header.is_none() {
            writer.write_record(&columns).map_err(|e| persistence(&self.path, e))?;
            writer.flush().map_err(|e| persistence(&self.path, e))?;
            *header = Some(columns);
        }

        writer.write_record(row).map_err(|e| persistence(&self.path, e))?;
        writer.flush().map_err(|e| persistence(&self.path, e))?;
        Ok(())
    }
}

fn read_header(path: &Path) -> Result<Option<Vec<String>>, DashboardError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(persistence(path, e)),
    };

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let header = reader.headers().map_err(|e| persistence(path, e))?;
    if header.is_empty() {
        return Ok(None);
    }

    Ok(Some(header.iter().map(str::to_string).collect()))
}

fn persistence(path: &Path, err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Persistence(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(fe: f64, cu: f64) -> Sample {
        Sample::new().with("Fe", fe).unwrap().with("Cu", cu).unwrap()
    }

    #[test]
    fn test_first_write_creates_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prediction_result.csv");
        let log = PredictionLog::open(&path).unwrap();

        log.append(&sample(5.0, 2.0), FailureClass::Normal).unwrap();
        log.append(&sample(9.5, 0.0), FailureClass::DirtInOil).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Fe,Cu,prediction\n5,2,normal\n9.5,0,dirt_in_oil\n");
    }

    #[test]
    fn test_existing_header_is_respected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "Fe,Cu,prediction\n1,1,normal\n").unwrap();

        let log = PredictionLog::open(&path).unwrap();
        log.append(&sample(3.0, 4.0), FailureClass::Normal).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Fe,Cu,prediction\n1,1,normal\n3,4,normal\n");
    }

    /// Accepts the first write, then fails every later one
    struct FailsAfterFirstWrite {
        writes: usize,
        written: Vec<u8>,
    }

    impl Write for FailsAfterFirstWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes += 1;
            if self.writes > 1 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_row_after_header_does_not_repeat_header() {
        let dir = tempdir().unwrap();
        let log = PredictionLog::open(dir.path().join("log.csv")).unwrap();
        let columns = vec!["Fe".to_string(), "Cu".to_string(), PREDICTION_COLUMN.to_string()];
        let row = vec!["5".to_string(), "2".to_string(), "normal".to_string()];

        let mut header = None;
        let mut out = FailsAfterFirstWrite { writes: 0, written: Vec::new() };
        let err = log.write_row(&mut out, &mut header, columns.clone(), &row).unwrap_err();

        assert!(matches!(err, DashboardError::Persistence(_)));
        assert_eq!(out.written, b"Fe,Cu,prediction\n");
        assert_eq!(header.as_ref(), Some(&columns));

        let mut retry = Vec::new();
        log.write_row(&mut retry, &mut header, columns, &row).unwrap();
        assert_eq!(retry, b"5,2,normal\n");
    }

    #[test]
    fn test_mismatched_columns_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let log = PredictionLog::open(&path).unwrap();
        log.append(&sample(1.0, 1.0), FailureClass::Normal).unwrap();

        let other = Sample::new().with("Pb", 1.0).unwrap();
        let err = log.append(&other, FailureClass::Normal).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Reasoning(ReasoningError::MalformedSample(_))
        ));
    }
}
