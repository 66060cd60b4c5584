//! coerce → sort → augment → split → fit

use serde::Serialize;
use statedyn::{InputSequence, StateDynamicsEstimator, Trajectory};

use crate::config::PipelineConfig;
use crate::features::FeatureFactory;
use crate::records::{coerce_records, MeasurementPayload, MeasurementRecord};
use crate::PipelineError;

/// Fitted model plus the column bookkeeping needed to interpret it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub a: f64,
    /// Gains, aligned with `input_columns`.
    pub b: Vec<f64>,
    pub q: f64,
    pub state_column: String,
    pub input_columns: Vec<String>,
    pub observations: usize,
    pub transitions: usize,
    pub rank: usize,
}

pub fn process_payload(
    payload: &MeasurementPayload,
    config: &PipelineConfig,
    factory: &FeatureFactory,
) -> Result<FitReport, PipelineError> {
    process_records(&payload.data, config, factory)
}

pub fn process_records(
    records: &[MeasurementRecord],
    config: &PipelineConfig,
    factory: &FeatureFactory,
) -> Result<FitReport, PipelineError> {
    config.validate()?;

    let mut table = coerce_records(records)?;
    table.sort_by(&config.timestamp_column)?;

    let table = factory.transform(
        &table,
        &config.transform_columns,
        config.transformations.as_deref(),
        config.suffix,
    )?;

    let (x, u, input_columns) =
        table.state_and_inputs(&config.state_column, config.input_columns.as_deref())?;
    let x = Trajectory::try_from(&x)?;
    let u = InputSequence::try_from(&u)?;

    let estimator = match config.rcond {
        Some(rcond) => StateDynamicsEstimator::with_rcond(rcond),
        None => StateDynamicsEstimator::new(),
    };
    let (model, diagnostics) = estimator.fit_with_diagnostics(&x, &u, config.a_fixed)?;

    tracing::info!(
        observations = x.len(),
        inputs = input_columns.len(),
        rank = diagnostics.rank,
        q = model.q,
        "fitted state dynamics"
    );

    Ok(FitReport {
        a: model.a,
        b: model.b.iter().copied().collect(),
        q: model.q,
        state_column: config.state_column.clone(),
        input_columns,
        observations: x.len(),
        transitions: diagnostics.transitions,
        rank: diagnostics.rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use statedyn::EstimationError;

    fn linear_records() -> Vec<MeasurementRecord> {
        // bpm[t+1] = 0.95 bpm[t] + 2 * load[t], delivered out of order
        let load = [1.0, 3.0, 2.0, 0.5, 4.0, 1.5, 2.5, 0.0, 3.5, 1.0, 2.0, 0.75];
        let mut bpm = vec![60.0];
        for t in 0..load.len() - 1 {
            let next = 0.95 * bpm[t] + 2.0 * load[t];
            bpm.push(next);
        }

        let mut records: Vec<MeasurementRecord> = (0..load.len())
            .map(|t| {
                MeasurementRecord::new(format!("{}", 1_700_000_000 + t), bpm[t].to_string())
                    .with_field("load", load[t])
            })
            .collect();
        records.swap(0, 4);
        records.swap(1, 3);
        records
    }

    fn load_only() -> PipelineConfig {
        PipelineConfig {
            transform_columns: Vec::new(),
            input_columns: Some(vec!["load".to_string()]),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn sorted_records_recover_known_gain() {
        let report =
            process_records(&linear_records(), &load_only(), &FeatureFactory::with_builtins()).unwrap();

        assert_eq!(report.a, 0.95);
        assert_eq!(report.input_columns, vec!["load".to_string()]);
        assert_eq!(report.observations, 12);
        assert_eq!(report.transitions, 11);
        assert_relative_eq!(report.b[0], 2.0, max_relative = 1e-9);
        assert!(report.q >= 0.0 && report.q < 1e-12);
    }

    #[test]
    fn default_config_augments_state_column() {
        let payload = MeasurementPayload {
            data: linear_records(),
        };
        let report =
            process_payload(&payload, &PipelineConfig::default(), &FeatureFactory::with_builtins())
                .unwrap();

        assert_eq!(
            report.input_columns,
            vec![
                "timestamp", "load", "bpm_square", "bpm_cube", "bpm_sin", "bpm_exp", "bpm_log1p"
            ]
        );
        assert_eq!(report.b.len(), 7);
    }

    #[test]
    fn too_few_records_surface_estimation_error() {
        let records = linear_records()[..2].to_vec();
        let cfg = PipelineConfig {
            transform_columns: Vec::new(),
            ..PipelineConfig::default()
        };
        let err = process_records(&records, &cfg, &FeatureFactory::new()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Estimation(EstimationError::InsufficientSamples { .. })
        ));
    }

    #[test]
    fn missing_state_column_is_reported() {
        let cfg = PipelineConfig {
            state_column: "spo2".to_string(),
            ..load_only()
        };
        let err = process_records(&linear_records(), &cfg, &FeatureFactory::new()).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn(c) if c == "spo2"));
    }
}
