//! Wire-level measurement records and numeric coercion.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::Table;
use crate::PipelineError;

/// A field as it arrives on the wire: either a JSON number or a string that
/// should parse as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

/// One time-stamped measurement. Fields beyond `timestamp` and `bpm` are kept
/// and become extra numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub timestamp: RawValue,
    pub bpm: RawValue,
    #[serde(flatten)]
    pub extra: BTreeMap<String, RawValue>,
}

impl MeasurementRecord {
    pub fn new(timestamp: impl Into<RawValue>, bpm: impl Into<RawValue>) -> Self {
        Self {
            timestamp: timestamp.into(),
            bpm: bpm.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Request body: `{"data": [{"timestamp": "...", "bpm": "..."}, ...]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementPayload {
    pub data: Vec<MeasurementRecord>,
}

fn coerce(row: usize, column: &str, value: &RawValue) -> Result<f64, PipelineError> {
    value.to_f64().ok_or_else(|| PipelineError::Coercion {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Convert records to a numeric table with columns `timestamp`, `bpm`, then
/// the extra fields in name order. Rows keep their arrival order.
pub fn coerce_records(records: &[MeasurementRecord]) -> Result<Table, PipelineError> {
    if records.is_empty() {
        return Err(PipelineError::EmptyPayload);
    }

    let extra_names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();

    let mut timestamp = Vec::with_capacity(records.len());
    let mut bpm = Vec::with_capacity(records.len());
    let mut extras: Vec<Vec<f64>> = vec![Vec::with_capacity(records.len()); extra_names.len()];

    for (row, record) in records.iter().enumerate() {
        timestamp.push(coerce(row, "timestamp", &record.timestamp)?);
        bpm.push(coerce(row, "bpm", &record.bpm)?);

        for (values, &name) in extras.iter_mut().zip(&extra_names) {
            let raw = record
                .extra
                .get(name)
                .ok_or_else(|| PipelineError::MissingField {
                    row,
                    column: name.to_string(),
                })?;
            values.push(coerce(row, name, raw)?);
        }
    }

    let mut table = Table::new();
    table.push_column("timestamp", timestamp)?;
    table.push_column("bpm", bpm)?;
    for (name, values) in extra_names.into_iter().zip(extras) {
        table.push_column(name, values)?;
    }

    tracing::debug!(rows = table.nrows(), columns = table.ncols(), "coerced measurement records");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_accepts_string_and_number_fields() {
        let raw = r#"{"data": [
            {"timestamp": "1700000002", "bpm": "71.5"},
            {"timestamp": 1700000001, "bpm": 70, "pace": "5.2"}
        ]}"#;
        let payload: MeasurementPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.data.len(), 2);
        assert_eq!(payload.data[0].timestamp, RawValue::Text("1700000002".into()));
        assert_eq!(payload.data[1].bpm, RawValue::Number(70.0));
        assert_eq!(payload.data[1].extra["pace"], RawValue::Text("5.2".into()));
    }

    #[test]
    fn coerce_builds_columns_in_fixed_order() {
        let records = vec![
            MeasurementRecord::new("2", " 72 ").with_field("pace", 5.0).with_field("cadence", "170"),
            MeasurementRecord::new("1", "70").with_field("pace", "5.5").with_field("cadence", 168.0),
        ];
        let table = coerce_records(&records).unwrap();
        assert_eq!(
            table.column_names(),
            &["timestamp", "bpm", "cadence", "pace"]
        );
        assert_eq!(table.column("bpm").unwrap(), &[72.0, 70.0]);
        assert_eq!(table.column("cadence").unwrap(), &[170.0, 168.0]);
    }

    #[test]
    fn unparseable_value_names_row_and_column() {
        let records = vec![
            MeasurementRecord::new("1", "70"),
            MeasurementRecord::new("2", "seventy"),
        ];
        match coerce_records(&records) {
            Err(PipelineError::Coercion { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "bpm");
                assert_eq!(value, "seventy");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn extra_field_must_be_present_in_every_record() {
        let records = vec![
            MeasurementRecord::new("1", "70"),
            MeasurementRecord::new("2", "71").with_field("pace", 5.0),
        ];
        assert!(matches!(
            coerce_records(&records),
            Err(PipelineError::MissingField { row: 0, .. })
        ));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(coerce_records(&[]), Err(PipelineError::EmptyPayload)));
    }
}
