use crate::model::{SamplePoint, ThresholdCrossing};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Summary of a simulated degradation trajectory.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub years: u32,
    pub initial_capacity: f64,
    pub final_capacity: f64,
    pub final_soh_percent: f64,
    pub average_yearly_loss_percent: f64,
    pub crossings: Vec<ThresholdCrossing>,
}

impl Summary {
    /// Summarize a yearly series of samples, estimating crossings from the samples alone.
    ///
    /// # Errors
    /// Returns an error if the series is empty or not strictly ordered by year.
    pub fn from_samples(samples: &[SamplePoint], thresholds: &[f64]) -> Result<Self> {
        let crossings = thresholds
            .iter()
            .map(|&soh_percent| ThresholdCrossing {
                soh_percent,
                year: crossing_year(samples, soh_percent),
            })
            .collect();
        Self::with_crossings(samples, crossings)
    }

    /// Summarize a yearly series of samples with crossings already known.
    ///
    /// # Errors
    /// Returns an error if the series is empty or not strictly ordered by year.
    pub fn with_crossings(
        samples: &[SamplePoint],
        crossings: Vec<ThresholdCrossing>,
    ) -> Result<Self> {
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            bail!("cannot summarize an empty series");
        };
        if let Some(pair) = samples.windows(2).find(|pair| pair[1].year <= pair[0].year) {
            bail!(
                "series must be ordered by year, but year {} follows year {}",
                pair[1].year,
                pair[0].year
            );
        }

        let years = last.year - first.year;
        let average_yearly_loss_percent = if years > 0 {
            (first.soh_percent - last.soh_percent) / f64::from(years)
        } else {
            0.0
        };

        Ok(Self {
            years,
            initial_capacity: first.remaining_capacity,
            final_capacity: last.remaining_capacity,
            final_soh_percent: last.soh_percent,
            average_yearly_loss_percent,
            crossings,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let contents = toml::to_string(self).context("failed to serialize summary")?;
        fs::write(file, contents).with_context(|| format!("failed to write {file:?}"))?;
        Ok(())
    }
}

/// The daily loss is constant until health reaches 0, so the yearly slope is
/// exact on every interval that doesn't end clamped. On a clamped interval the
/// slope of the previous unclamped interval is used instead, when there is one.
fn crossing_year(samples: &[SamplePoint], threshold: f64) -> Option<f64> {
    let first = samples.first()?;
    if first.soh_percent < threshold {
        return Some(f64::from(first.year));
    }
    let i_pair = samples
        .windows(2)
        .position(|pair| pair[0].soh_percent >= threshold && pair[1].soh_percent < threshold)?;
    let (prev, next) = (&samples[i_pair], &samples[i_pair + 1]);

    let mut slope = yearly_slope(prev, next);
    if next.soh_percent <= 0.0 && i_pair > 0 && prev.soh_percent > 0.0 {
        slope = slope.max(yearly_slope(&samples[i_pair - 1], prev));
    }

    Some(f64::from(prev.year) + (prev.soh_percent - threshold) / slope)
}

fn yearly_slope(prev: &SamplePoint, next: &SamplePoint) -> f64 {
    (prev.soh_percent - next.soh_percent) / f64::from(next.year - prev.year)
}
