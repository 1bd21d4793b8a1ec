use crate::model::{ModelError, SamplePoint, SimulationParameters, ThresholdCrossing};

/// Integration steps per simulated year.
const DAYS_PER_YEAR: u32 = 365;

/// SoH points lost per full-depth cycle at the reference temperature.
const BASE_CYCLE_LOSS: f64 = 0.005;

/// SoH points lost per day by calendar aging at full intensity.
const BASE_CALENDAR_LOSS: f64 = 0.00005;

const REFERENCE_TEMPERATURE_C: f64 = 25.0;
const TEMPERATURE_SCALE_C: f64 = 15.0;

/// Degradation engine.
///
/// Holds the validated parameters and the current state of health,
/// and advances the battery one day at a time.
pub struct Engine {
    params: SimulationParameters,
    soh_percent: f64,
}

impl Engine {
    /// Create a new `Engine` for a pristine battery.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] if the parameters are invalid.
    pub fn new(params: SimulationParameters) -> Result<Self, ModelError> {
        params.validate()?;
        Ok(Self {
            params,
            soh_percent: 100.0,
        })
    }

    /// SoH points lost per day.
    pub fn daily_loss(&self) -> f64 {
        let cycles_per_day = self.params.cycles_per_year / f64::from(DAYS_PER_YEAR);

        // Arrhenius-like acceleration above the reference temperature.
        let temp_factor = ((self.params.average_temperature_c - REFERENCE_TEMPERATURE_C)
            / TEMPERATURE_SCALE_C)
            .exp();

        let cycle_loss = cycles_per_day
            * BASE_CYCLE_LOSS
            * self.params.depth_of_discharge
            * self.params.charging_habit.factor();
        let calendar_loss = BASE_CALENDAR_LOSS * self.params.calendar_aging;

        cycle_loss * temp_factor + calendar_loss
    }

    /// Run the whole simulation, returning one sample per year (year 0 included).
    pub fn perform_simulation(mut self) -> Vec<SamplePoint> {
        let daily_loss = self.daily_loss();
        log::debug!("daily loss: {daily_loss:.6} SoH points");

        let mut samples = Vec::with_capacity(self.params.years as usize + 1);
        samples.push(self.sample(0));

        for year in 1..=self.params.years {
            for _ in 0..DAYS_PER_YEAR {
                self.perform_day(daily_loss);
            }
            samples.push(self.sample(year));
        }

        samples
    }

    /// Step day by day and record the first day each threshold (%) is undercut.
    pub fn find_crossings(mut self, thresholds: &[f64]) -> Vec<ThresholdCrossing> {
        let daily_loss = self.daily_loss();

        let mut crossings: Vec<_> = thresholds
            .iter()
            .map(|&soh_percent| ThresholdCrossing {
                soh_percent,
                year: None,
            })
            .collect();

        let n_days = self.params.years * DAYS_PER_YEAR;
        for day in 1..=n_days {
            if crossings.iter().all(|crossing| crossing.year.is_some()) {
                break;
            }

            let prev_soh_percent = self.soh_percent;
            self.perform_day(daily_loss);

            for crossing in crossings.iter_mut().filter(|c| c.year.is_none()) {
                if prev_soh_percent >= crossing.soh_percent
                    && self.soh_percent < crossing.soh_percent
                {
                    crossing.year = Some(f64::from(day) / f64::from(DAYS_PER_YEAR));
                }
            }
        }

        crossings
    }

    fn perform_day(&mut self, daily_loss: f64) {
        // No recovery and no negative health.
        self.soh_percent = (self.soh_percent - daily_loss).max(0.0);
    }

    fn sample(&self, year: u32) -> SamplePoint {
        SamplePoint {
            year,
            remaining_capacity: self.params.initial_capacity_wh * self.soh_percent / 100.0,
            soh_percent: self.soh_percent,
        }
    }
}

/// Simulate the yearly state of health of a battery.
///
/// # Errors
/// Returns [`ModelError::InvalidParameter`] before running if any parameter is invalid.
pub fn simulate(params: &SimulationParameters) -> Result<Vec<SamplePoint>, ModelError> {
    let engine = Engine::new(params.clone())?;
    Ok(engine.perform_simulation())
}

/// Find when the state of health first drops below each threshold (%), to the day.
///
/// # Errors
/// Returns [`ModelError::InvalidParameter`] before running if any parameter is invalid.
pub fn threshold_crossings(
    params: &SimulationParameters,
    thresholds: &[f64],
) -> Result<Vec<ThresholdCrossing>, ModelError> {
    let engine = Engine::new(params.clone())?;
    Ok(engine.find_crossings(thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChargingHabit, tests::reference_params};

    fn soh_series(params: &SimulationParameters) -> Vec<f64> {
        simulate(params)
            .expect("parameters should be valid")
            .iter()
            .map(|sample| sample.soh_percent)
            .collect()
    }

    #[test]
    fn test_reference_run_strictly_decreasing() {
        let samples = simulate(&reference_params()).unwrap();
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0].year, 0);
        assert_eq!(samples[0].soh_percent, 100.0);
        assert_eq!(samples[0].remaining_capacity, 50.0);
        for pair in samples.windows(2) {
            assert_eq!(pair[1].year, pair[0].year + 1);
            assert!(pair[1].soh_percent < pair[0].soh_percent);
        }
        let last = samples.last().unwrap();
        assert!(last.soh_percent > 0.0 && last.soh_percent < 100.0);
        assert!((last.remaining_capacity - 50.0 * last.soh_percent / 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_soh_bounded_and_non_increasing() {
        let habits = [
            ChargingHabit::Slow,
            ChargingHabit::Standard,
            ChargingHabit::Fast,
            ChargingHabit::Partial,
        ];
        for habit in habits {
            for temp in [-10.0, 10.0, 25.0, 45.0, 60.0] {
                for dod in [0.1, 0.5, 1.0] {
                    let params = SimulationParameters {
                        years: 10,
                        cycles_per_year: 1000.0,
                        average_temperature_c: temp,
                        charging_habit: habit,
                        depth_of_discharge: dod,
                        ..reference_params()
                    };
                    let series = soh_series(&params);
                    assert!(series.iter().all(|&soh| (0.0..=100.0).contains(&soh)));
                    assert!(series.windows(2).all(|pair| pair[1] <= pair[0]));
                }
            }
        }
    }

    #[test]
    fn test_higher_temperature_degrades_more() {
        let cool = soh_series(&SimulationParameters {
            average_temperature_c: 15.0,
            ..reference_params()
        });
        let hot = soh_series(&SimulationParameters {
            average_temperature_c: 40.0,
            ..reference_params()
        });
        assert!(hot.iter().zip(&cool).all(|(hot, cool)| hot <= cool));
        assert!(hot.last() < cool.last());
    }

    #[test]
    fn test_fast_charging_degrades_more_than_slow() {
        let slow = soh_series(&SimulationParameters {
            charging_habit: ChargingHabit::Slow,
            ..reference_params()
        });
        let fast = soh_series(&SimulationParameters {
            charging_habit: ChargingHabit::Fast,
            ..reference_params()
        });
        assert!(fast.iter().zip(&slow).all(|(fast, slow)| fast <= slow));
    }

    #[test]
    fn test_deeper_discharge_degrades_more() {
        let shallow = soh_series(&SimulationParameters {
            depth_of_discharge: 0.2,
            ..reference_params()
        });
        let deep = soh_series(&SimulationParameters {
            depth_of_discharge: 1.0,
            ..reference_params()
        });
        assert!(deep.iter().zip(&shallow).all(|(deep, shallow)| deep <= shallow));
    }

    #[test]
    fn test_soh_clamped_at_zero() {
        let params = SimulationParameters {
            cycles_per_year: 5000.0,
            average_temperature_c: 60.0,
            charging_habit: ChargingHabit::Fast,
            depth_of_discharge: 1.0,
            years: 10,
            ..reference_params()
        };
        let samples = simulate(&params).unwrap();
        let last = samples.last().unwrap();
        assert_eq!(last.soh_percent, 0.0);
        assert_eq!(last.remaining_capacity, 0.0);
    }

    #[test]
    fn test_crossings_on_clamping_run() {
        let params = SimulationParameters {
            cycles_per_year: 5000.0,
            average_temperature_c: 60.0,
            charging_habit: ChargingHabit::Fast,
            depth_of_discharge: 1.0,
            years: 3,
            ..reference_params()
        };
        let daily_loss = Engine::new(params.clone()).unwrap().daily_loss();
        let crossings = threshold_crossings(&params, &[80.0, 60.0]).unwrap();

        for crossing in &crossings {
            let n_days = ((100.0 - crossing.soh_percent) / daily_loss).floor() + 1.0;
            let year = crossing.year.expect("threshold should be crossed");
            assert!((year - n_days / 365.0).abs() <= 1.0 / 365.0 + 1e-12);
            assert!(year < 0.2, "crossing at {year} years");
        }
    }

    #[test]
    fn test_unreached_threshold_has_no_crossing() {
        let crossings = threshold_crossings(&reference_params(), &[99.0, 60.0]).unwrap();
        assert!(crossings[0].year.is_some());
        assert_eq!(crossings[1].year, None);
    }

    #[test]
    fn test_invalid_params_produce_no_samples() {
        let zero_years = SimulationParameters {
            years: 0,
            ..reference_params()
        };
        assert!(matches!(
            simulate(&zero_years),
            Err(ModelError::InvalidParameter { name: "years", .. })
        ));

        let no_capacity = SimulationParameters {
            initial_capacity_wh: 0.0,
            ..reference_params()
        };
        assert!(matches!(
            simulate(&no_capacity),
            Err(ModelError::InvalidParameter {
                name: "initial_capacity_wh",
                ..
            })
        ));
    }
}
