use crate::model::SamplePoint;
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

/// Write samples as CSV with a `year,remaining_capacity,soh_percent` header.
pub fn write_samples<W: Write>(writer: W, samples: &[SamplePoint]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in samples {
        writer
            .serialize(sample)
            .with_context(|| format!("failed to serialize sample of year {}", sample.year))?;
    }
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

/// Read samples previously written by [`write_samples`].
pub fn read_samples<R: Read>(reader: R) -> Result<Vec<SamplePoint>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut samples = Vec::new();
    for (i_row, record) in reader.deserialize::<SamplePoint>().enumerate() {
        let sample = record.with_context(|| format!("invalid row {i_row}"))?;
        samples.push(sample);
    }
    Ok(samples)
}

pub fn write_csv<P: AsRef<Path>>(file: P, samples: &[SamplePoint]) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    write_samples(BufWriter::new(file), samples)
}

pub fn read_csv<P: AsRef<Path>>(file: P) -> Result<Vec<SamplePoint>> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    read_samples(BufReader::new(file))
}
