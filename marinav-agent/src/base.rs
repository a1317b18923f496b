use anyhow::Result;
use std::path::{Path, PathBuf};

/// Agents whose parameters are read from and written to a model directory.
pub trait LoadModel {
    /// Writes the parameters into `dir` and returns the paths of the files.
    fn save_model<T: AsRef<Path>>(&self, dir: T) -> Result<Vec<PathBuf>>;

    /// Replaces the parameters with the ones in `dir`.
    fn load_model<T: AsRef<Path>>(&mut self, dir: T) -> Result<()>;
}
