use std::path::Path;

use tracing::debug;

use crate::error::{NnError, Result};

/// One row read from a tabular source, before numerization: attribute values
/// as raw strings (`None` where the source held a null marker) plus the raw
/// label.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExample {
    pub id: u64,
    pub attributes: Vec<Option<String>>,
    pub label: String,
}

/// A raw tabular dataset: ordered attribute names plus rows in file order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub attribute_names: Vec<String>,
    pub examples: Vec<RawExample>,
}

/// CSV ingestion collaborator.
///
/// Reads a headed CSV into a `RawTable`. The label column is mandatory; the
/// id column is optional (absent, the row index becomes the id). Both are
/// excluded from the attribute list. Configured null markers are replaced by
/// `None` so later stages fail loudly instead of parsing garbage.
pub struct CsvDatasetReader {
    label_column: String,
    id_column: Option<String>,
    null_values: Vec<String>,
}

impl CsvDatasetReader {
    pub fn new(label_column: &str) -> CsvDatasetReader {
        CsvDatasetReader {
            label_column: label_column.to_string(),
            id_column: None,
            null_values: Vec::new(),
        }
    }

    pub fn with_id_column(mut self, name: &str) -> CsvDatasetReader {
        self.id_column = Some(name.to_string());
        self
    }

    /// Adds a string to treat as a missing value.
    pub fn with_null_value(mut self, value: &str) -> CsvDatasetReader {
        self.null_values.push(value.to_string());
        self
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<RawTable> {
        let mut reader = csv::Reader::from_path(&path)?;

        let headers = reader.headers()?.clone();
        let index_label = headers
            .iter()
            .position(|name| name == self.label_column)
            .ok_or_else(|| {
                NnError::Value(format!(
                    "label column '{}' not found in header",
                    self.label_column
                ))
            })?;
        let index_id = match &self.id_column {
            Some(name) => Some(
                headers
                    .iter()
                    .position(|header| header == name)
                    .ok_or_else(|| {
                        NnError::Value(format!("id column '{name}' not found in header"))
                    })?,
            ),
            None => None,
        };

        let attribute_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != index_label && Some(*index) != index_id)
            .map(|(_, name)| name.to_string())
            .collect();

        let mut examples = Vec::new();
        for (index_row, record) in reader.records().enumerate() {
            let record = record?;

            let id = match index_id {
                Some(index) => record
                    .get(index)
                    .unwrap_or_default()
                    .parse::<u64>()
                    .map_err(|_| {
                        NnError::Value(format!(
                            "row {}: id '{}' is not an unsigned integer",
                            index_row + 1,
                            record.get(index).unwrap_or_default()
                        ))
                    })?,
                None => index_row as u64,
            };

            let attributes = record
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != index_label && Some(*index) != index_id)
                .map(|(_, value)| {
                    if self.null_values.iter().any(|null| null == value) {
                        None
                    } else {
                        Some(value.to_string())
                    }
                })
                .collect();

            let label = record.get(index_label).unwrap_or_default().to_string();
            examples.push(RawExample {
                id,
                attributes,
                label,
            });
        }

        debug!(
            rows = examples.len(),
            arity = attribute_names.len(),
            "read raw dataset"
        );
        Ok(RawTable {
            attribute_names,
            examples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_rows_with_explicit_ids() {
        let (_dir, path) = write_csv("id,size,color,class\n10,1.5,red,yes\n20,2.0,blue,no\n");
        let table = CsvDatasetReader::new("class")
            .with_id_column("id")
            .read(&path)
            .unwrap();

        assert_eq!(table.attribute_names, vec!["size", "color"]);
        assert_eq!(table.examples.len(), 2);
        assert_eq!(table.examples[0].id, 10);
        assert_eq!(
            table.examples[0].attributes,
            vec![Some("1.5".to_string()), Some("red".to_string())]
        );
        assert_eq!(table.examples[1].label, "no");
    }

    #[test]
    fn falls_back_to_row_index_ids() {
        let (_dir, path) = write_csv("x,class\n0.1,a\n0.2,b\n");
        let table = CsvDatasetReader::new("class").read(&path).unwrap();
        assert_eq!(table.examples[0].id, 0);
        assert_eq!(table.examples[1].id, 1);
    }

    #[test]
    fn null_markers_become_none() {
        let (_dir, path) = write_csv("x,class\n?,a\n0.2,b\n");
        let table = CsvDatasetReader::new("class")
            .with_null_value("?")
            .read(&path)
            .unwrap();
        assert_eq!(table.examples[0].attributes, vec![None]);
        assert_eq!(
            table.examples[1].attributes,
            vec![Some("0.2".to_string())]
        );
    }

    #[test]
    fn missing_label_column_is_rejected() {
        let (_dir, path) = write_csv("x,y\n1,2\n");
        let err = CsvDatasetReader::new("class").read(&path);
        assert!(matches!(err, Err(NnError::Value(_))));
    }
}
