use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use super::error::SchemaError;
use crate::record::{Attribute, ATTRIBUTE_COUNT};

/// One non-blank cell of a required column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DatasetCell {
    /// 1-based CSV line the cell came from
    pub line: usize,
    pub value: String,
}

/// The required columns of a reference dataset, read once from CSV.
///
/// Only the ten record columns are kept; anything else in the file
/// (row numbers, surnames, the churn target) is ignored. Blank cells are
/// treated as missing and dropped.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    source: String,
    rows: usize,
    columns: HashMap<Attribute, Vec<DatasetCell>>,
}

impl ReferenceDataset {
    /// Reads the dataset from a CSV file.
    ///
    /// # Errors
    /// - `DatasetUnavailable` if the file cannot be opened or is not valid CSV
    /// - `SchemaDegenerate` if a required column is missing from the header
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        info!("Loading reference dataset from {}", source);
        let file = File::open(path).map_err(|e| SchemaError::unavailable(&source, e))?;
        Self::from_reader(file, source)
    }

    /// Reads the dataset from any CSV source; `source` names it in errors.
    pub fn from_reader<R: Read>(reader: R, source: impl Into<String>) -> Result<Self, SchemaError> {
        let source = source.into();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| SchemaError::unavailable(&source, format!("Failed to read CSV header: {}", e)))?
            .clone();
        let positions = resolve_columns(&headers)?;

        let mut columns: HashMap<Attribute, Vec<DatasetCell>> = Attribute::ALL
            .into_iter()
            .map(|attr| (attr, Vec::new()))
            .collect();
        let mut rows = 0usize;

        for (idx, result) in reader.records().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            let record = result.map_err(|e| {
                SchemaError::unavailable(&source, format!("Malformed CSV at line {}: {}", line, e))
            })?;
            rows += 1;

            for (attr, position) in &positions {
                let value = record.get(*position).unwrap_or_default();
                if value.is_empty() {
                    continue;
                }
                if let Some(cells) = columns.get_mut(attr) {
                    cells.push(DatasetCell {
                        line,
                        value: value.to_string(),
                    });
                }
            }
        }

        debug!("Read {} rows from {}", rows, source);
        Ok(Self {
            source,
            rows,
            columns,
        })
    }

    /// Where the data came from (a path, or the label given to `from_reader`).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of data rows, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of non-blank cells read for a column.
    pub fn non_blank(&self, attribute: Attribute) -> usize {
        self.cells(attribute).len()
    }

    pub(crate) fn cells(&self, attribute: Attribute) -> &[DatasetCell] {
        self.columns
            .get(&attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn normalize_header_name(name: &str) -> &str {
    // Spreadsheet exports may put a BOM in front of the first header.
    name.trim().trim_start_matches('\u{feff}')
}

fn resolve_columns(headers: &StringRecord) -> Result<Vec<(Attribute, usize)>, SchemaError> {
    let mut positions = Vec::with_capacity(ATTRIBUTE_COUNT);
    for attr in Attribute::ALL {
        let position = headers
            .iter()
            .position(|h| normalize_header_name(h) == attr.column_name())
            .ok_or_else(|| SchemaError::degenerate(attr.column_name(), "Column is missing from the header"))?;
        positions.push((attr, position));
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary";

    #[test]
    fn test_reads_required_columns_and_skips_blanks() {
        let data = format!(
            "RowNumber,{}\n1,600,France,Female,40,3,0.0,1,1,0,1000.0\n2,610,,Male,41,4,10.0,2,0,1,2000.0\n",
            HEADER
        );
        let dataset = ReferenceDataset::from_reader(data.as_bytes(), "inline").unwrap();
        assert_eq!(dataset.rows(), 2);
        assert_eq!(dataset.non_blank(Attribute::Geography), 1);
        assert_eq!(dataset.non_blank(Attribute::Gender), 2);
        assert_eq!(dataset.cells(Attribute::Gender)[1], DatasetCell { line: 3, value: "Male".into() });
    }

    #[test]
    fn test_header_with_bom() {
        let data = format!("\u{feff}{}\n600,France,Female,40,3,0.0,1,1,0,1000.0\n", HEADER);
        let dataset = ReferenceDataset::from_reader(data.as_bytes(), "inline").unwrap();
        assert_eq!(dataset.non_blank(Attribute::CreditScore), 1);
    }

    #[test]
    fn test_missing_column() {
        let data = "CreditScore,Geography\n600,France\n";
        let err = ReferenceDataset::from_reader(data.as_bytes(), "inline").unwrap_err();
        assert_eq!(
            err,
            SchemaError::SchemaDegenerate {
                column: "Gender".into(),
                reason: "Column is missing from the header".into(),
            }
        );
    }

    #[test]
    fn test_ragged_row_is_unavailable() {
        let data = format!("{}\n600,France\n", HEADER);
        let err = ReferenceDataset::from_reader(data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, SchemaError::DatasetUnavailable { .. }));
    }
}
