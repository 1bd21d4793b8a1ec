use crate::analysis::Summary;
use crate::config::{Config, Overrides};
use crate::engine;
use crate::export;
use crate::model::SamplePoint;
use crate::report;
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<()> {
        self.cfg
            .apply_overrides(overrides)
            .context("failed to apply overrides")?;
        log::debug!("{:#?}", self.cfg.model);
        Ok(())
    }

    pub fn run_simulation(&self) -> Result<()> {
        let samples = self.simulate()?;

        let trajectory_file = self.trajectory_file();
        export::write_csv(&trajectory_file, &samples)
            .with_context(|| format!("failed to write {trajectory_file:?}"))?;
        log::info!("wrote {trajectory_file:?}");

        let summary = self.summarize(&samples)?;
        self.save_summary(&summary)?;

        Ok(())
    }

    pub fn show_simulation(&self) -> Result<()> {
        let samples = self.simulate()?;
        let summary = self.summarize(&samples)?;

        println!("{}", report::build_samples_table(&samples));
        println!("{}", report::build_summary_table(&summary));

        Ok(())
    }

    pub fn run_analysis(&self) -> Result<()> {
        let trajectory_file = self.trajectory_file();
        let samples = export::read_csv(&trajectory_file)
            .with_context(|| format!("failed to read {trajectory_file:?}"))?;
        log::info!("read {} samples from {trajectory_file:?}", samples.len());

        // Day-resolved crossings are only known for the trajectory of the current config.
        let summary = if self.simulate()? == samples {
            self.summarize(&samples)?
        } else {
            log::warn!("{trajectory_file:?} differs from the config, estimating crossings");
            Summary::from_samples(&samples, &self.cfg.output.thresholds)
                .context("failed to summarize samples")?
        };

        self.save_summary(&summary)
    }

    pub fn clean_sim(&self) -> Result<()> {
        let pattern = self.sim_dir.join("*.csv");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut files: Vec<_> = glob(pattern)
            .context("failed to glob output files")?
            .filter_map(Result::ok)
            .collect();

        let summary_file = self.summary_file();
        if summary_file.is_file() {
            files.push(summary_file);
        }

        for file in files {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }

        Ok(())
    }

    fn simulate(&self) -> Result<Vec<SamplePoint>> {
        let samples = engine::simulate(&self.cfg.model)
            .context("failed to simulate degradation")?;
        log::info!("simulated {} years", self.cfg.model.years);
        Ok(samples)
    }

    fn summarize(&self, samples: &[SamplePoint]) -> Result<Summary> {
        let crossings = engine::threshold_crossings(&self.cfg.model, &self.cfg.output.thresholds)
            .context("failed to find threshold crossings")?;
        Summary::with_crossings(samples, crossings)
            .context("failed to summarize samples")
    }

    fn save_summary(&self, summary: &Summary) -> Result<()> {
        log::info!("{summary:#?}");

        let summary_file = self.summary_file();
        summary
            .save(&summary_file)
            .context("failed to save summary")?;
        log::info!("wrote {summary_file:?}");

        Ok(())
    }

    fn trajectory_file(&self) -> PathBuf {
        self.sim_dir.join("trajectory.csv")
    }

    fn summary_file(&self) -> PathBuf {
        self.sim_dir.join("summary.toml")
    }
}
