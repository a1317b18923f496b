//! Periodic persistence of trial results.
use crate::metrics::MetricsAggregator;
use anyhow::{Context, Result};
use chrono::Local;
use log::debug;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Writes the accumulated results of a run to `exp_data_<timestamp>.json`.
///
/// The timestamp is fixed when the checkpointer is constructed, so every
/// checkpoint of a run overwrites the same file with the full history. The
/// document is written to a temporary file first and renamed into place, so
/// a reader never observes a partially written checkpoint.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    dir: PathBuf,
    timestamp: String,
}

impl Checkpointer {
    /// Format of the timestamp in file names.
    pub const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%d-%H-%M-%S";

    /// Constructs a checkpointer writing into `dir`, stamped with the current local time.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let timestamp = Local::now().format(Self::TIMESTAMP_FORMAT).to_string();
        Self::with_timestamp(dir, timestamp)
    }

    /// Constructs a checkpointer with the given timestamp.
    pub fn with_timestamp(dir: impl AsRef<Path>, timestamp: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            timestamp: timestamp.into(),
        }
    }

    /// Timestamp of the run.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Path of the checkpoint file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("exp_data_{}.json", self.timestamp))
    }

    fn tmp_path(&self) -> PathBuf {
        self.dir.join(format!(".exp_data_{}.json.tmp", self.timestamp))
    }

    /// Writes all results, replacing the previous checkpoint of the run.
    pub fn save(&self, metrics: &MetricsAggregator) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory {:?}", self.dir))?;

        let tmp = self.tmp_path();
        let file =
            File::create(&tmp).with_context(|| format!("Failed to create file {:?}", tmp))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, metrics)?;
        writer.flush()?;
        drop(writer);

        let path = self.path();
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {:?} to {:?}", tmp, path))?;
        debug!("Saved checkpoint {:?}", path);
        Ok(path)
    }

    /// Reads a checkpoint file.
    pub fn load(path: impl AsRef<Path>) -> Result<MetricsAggregator> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let metrics = serde_json::from_reader(BufReader::new(file))?;
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::{Record, RecordValue},
        rollout::EpisodeOutcome,
        EpisodeState,
    };
    use tempdir::TempDir;

    fn outcome(success: bool) -> EpisodeOutcome {
        let robot = Record::from_slice(&[
            ("actions_cvars", RecordValue::Array1(vec![1.0])),
            (
                "actions_quantiles",
                RecordValue::Array3(vec![vec![vec![0.5, 1.5], vec![2.5]]]),
            ),
        ]);
        EpisodeOutcome {
            record: Record::from_slice(&[("robot", RecordValue::Record(robot))]),
            success,
            time: 12.5,
            energy: 3.0,
            steps: 25,
            discounted_return: 1.0,
            final_state: EpisodeState::ReachGoal,
            traces: None,
        }
    }

    #[test]
    fn test_checkpoints_overwrite_one_file() -> Result<()> {
        let dir = TempDir::new("checkpoint")?;
        let checkpointer = Checkpointer::with_timestamp(dir.path().join("experiment_data"), "2024-01-02-03-04-05");
        let mut metrics = MetricsAggregator::new(&["IQN".to_string()])?;

        metrics.record("IQN", outcome(true))?;
        let path = checkpointer.save(&metrics)?;
        assert!(path.ends_with("exp_data_2024-01-02-03-04-05.json"));

        metrics.record("IQN", outcome(false))?;
        let path_ = checkpointer.save(&metrics)?;
        assert_eq!(path, path_);

        let files: Vec<_> = fs::read_dir(dir.path().join("experiment_data"))?.collect();
        assert_eq!(files.len(), 1);

        let restored = Checkpointer::load(&path)?;
        assert_eq!(restored, metrics);
        assert_eq!(restored.get("IQN").unwrap().success, vec![true, false]);
        Ok(())
    }

    #[test]
    fn test_load_keeps_policy_order() -> Result<()> {
        let dir = TempDir::new("checkpoint")?;
        let checkpointer = Checkpointer::new(dir.path());
        let names: Vec<String> = ["adaptive_IQN", "IQN", "DQN", "APF", "BA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut metrics = MetricsAggregator::new(&names)?;
        for name in names.iter() {
            metrics.record(name, outcome(true))?;
        }

        let restored = Checkpointer::load(checkpointer.save(&metrics)?)?;
        assert_eq!(restored.names().collect::<Vec<_>>(), names);
        assert_eq!(restored, metrics);
        Ok(())
    }

    #[test]
    fn test_checkpoint_document_layout() -> Result<()> {
        let dir = TempDir::new("checkpoint")?;
        let checkpointer = Checkpointer::new(dir.path());
        let mut metrics = MetricsAggregator::new(&["APF".to_string(), "BA".to_string()])?;
        metrics.record("APF", outcome(true))?;
        let path = checkpointer.save(&metrics)?;

        let json: serde_json::Value = serde_json::from_reader(File::open(path)?)?;
        let apf = &json["APF"];
        assert_eq!(apf["success"], serde_json::json!([true]));
        assert_eq!(apf["time"], serde_json::json!([12.5]));
        assert_eq!(
            apf["ep_data"][0]["robot"]["actions_quantiles"],
            serde_json::json!([[[0.5, 1.5], [2.5]]])
        );
        assert_eq!(json["BA"]["energy"], serde_json::json!([]));
        Ok(())
    }
}
