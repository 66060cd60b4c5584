use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::pipeline::FitReport;
use crate::records::{MeasurementPayload, MeasurementRecord, RawValue};
use crate::PipelineError;

fn fmt_f64(v: f64) -> String {
    format!("{v:.10}")
}

pub fn read_payload_json(path: &Path) -> Result<MeasurementPayload, PipelineError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn read_csv_records(path: &Path) -> Result<Vec<MeasurementRecord>, PipelineError> {
    read_csv_records_from(fs::File::open(path)?)
}

/// Read records from CSV with a header row. `timestamp` and `bpm` columns are
/// required; any other column is carried as an extra field.
pub fn read_csv_records_from<R: Read>(reader: R) -> Result<Vec<MeasurementRecord>, PipelineError> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MissingField {
                row: 0,
                column: name.to_string(),
            })
    };
    let ts_idx = find("timestamp")?;
    let bpm_idx = find("bpm")?;

    let mut records = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |idx: usize| -> Result<RawValue, PipelineError> {
            record
                .get(idx)
                .map(RawValue::from)
                .ok_or_else(|| PipelineError::MissingField {
                    row,
                    column: headers[idx].to_string(),
                })
        };

        let mut extra = BTreeMap::new();
        for (idx, name) in headers.iter().enumerate() {
            if idx != ts_idx && idx != bpm_idx {
                extra.insert(name.to_string(), field(idx)?);
            }
        }

        records.push(MeasurementRecord {
            timestamp: field(ts_idx)?,
            bpm: field(bpm_idx)?,
            extra,
        });
    }

    Ok(records)
}

pub fn write_report_json(path: &Path, report: &FitReport) -> Result<(), PipelineError> {
    let payload = serde_json::to_string_pretty(report)?;
    fs::write(path, payload)?;
    Ok(())
}

/// One row per fitted term: `a`, each gain `b` (tagged with its input column),
/// then `q`.
pub fn write_report_csv(path: &Path, report: &FitReport) -> Result<(), PipelineError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;

    wtr.write_record(["term", "input_column", "value"])?;
    wtr.write_record(["a", "", &fmt_f64(report.a)])?;
    for (name, gain) in report.input_columns.iter().zip(&report.b) {
        wtr.write_record(["b", name.as_str(), &fmt_f64(*gain)])?;
    }
    wtr.write_record(["q", "", &fmt_f64(report.q)])?;

    wtr.flush()?;
    Ok(())
}
