//! Sample writers for solved trajectories.
//!
//! CSV rows are `t, x0.., dx0..`; JSON Lines emit one object per sample.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use ramp_shared::{RampError, RampNd, Trajectory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SampleFormat {
    #[default]
    Csv,
    Jsonl,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Ramp error: {0}")]
    Ramp(#[from] RampError),
}

#[derive(Debug, Serialize)]
pub struct SampleRecord {
    pub t: f64,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
}

/// Samples `ramp` every `dt` seconds (end time included) into `writer`.
///
/// Returns the number of samples written.
pub fn write_samples<W: Write>(
    ramp: &RampNd,
    dt: f64,
    format: SampleFormat,
    writer: W,
) -> Result<usize, OutputError> {
    let samples = ramp.samples(dt)?;
    let dims = ramp.dims();
    let mut velocity = Vec::with_capacity(dims);
    let mut count = 0;

    match format {
        SampleFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            let mut header = vec!["t".to_string()];
            header.extend((0..dims).map(|i| format!("x{}", i)));
            header.extend((0..dims).map(|i| format!("dx{}", i)));
            wtr.write_record(&header)?;
            for (t, position) in samples {
                ramp.derivative_into(t, &mut velocity);
                let row = std::iter::once(t)
                    .chain(position.iter().copied())
                    .chain(velocity.iter().copied())
                    .map(|v| v.to_string());
                wtr.write_record(row)?;
                count += 1;
            }
            wtr.flush()?;
        }
        SampleFormat::Jsonl => {
            let mut writer = writer;
            for (t, position) in samples {
                ramp.derivative_into(t, &mut velocity);
                let record = SampleRecord {
                    t,
                    position,
                    velocity: velocity.clone(),
                };
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
                count += 1;
            }
            writer.flush()?;
        }
    }
    tracing::debug!("Wrote {} samples ({:?})", count, format);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved() -> RampNd {
        let mut ramp = RampNd::rest_to_rest(vec![0.0, 0.0], vec![1.0, -0.5]).unwrap();
        ramp.solve_min_time(&[1.0, 1.0], &[10.0, 10.0]).unwrap();
        ramp
    }

    #[test]
    fn test_csv_header_and_rows() {
        let ramp = solved();
        let mut buf = Vec::new();
        let n = write_samples(&ramp, 0.5, SampleFormat::Csv, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,x0,x1,dx0,dx1");
        assert_eq!(lines.len(), n + 1);
        assert!(lines[1].starts_with("0,0,0,"));
    }

    #[test]
    fn test_jsonl_records() {
        let ramp = solved();
        let mut buf = Vec::new();
        let n = write_samples(&ramp, 0.5, SampleFormat::Jsonl, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), n);
        let last: serde_json::Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
        assert_eq!(last["t"].as_f64(), Some(ramp.end_time()));
        assert!((last["position"][0].as_f64().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_step() {
        let ramp = solved();
        let result = write_samples(&ramp, -1.0, SampleFormat::Csv, Vec::new());
        assert!(matches!(result, Err(OutputError::Ramp(RampError::InvalidDuration(_)))));
    }
}
