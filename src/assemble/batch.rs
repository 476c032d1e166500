use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::assemble::folder::Pipeline;
use crate::assets::layout::list_subfolders;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Folder name to produced video, for successful folders only.
    ///
    /// Names that are not valid UTF-8 are keyed by their lossy form.
    pub outputs: BTreeMap<String, PathBuf>,
    /// `(folder name, failure message)` in processing order.
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// Output of `folder`, if it succeeded.
    pub fn get(&self, folder: &str) -> Option<&Path> {
        self.outputs.get(folder).map(PathBuf::as_path)
    }

    /// Number of successful folders.
    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }

    /// Number of failed folders.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// `true` when nothing was processed.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty() && self.failures.is_empty()
    }
}

impl Pipeline {
    /// Assemble every immediate subdirectory of `parent`, in sorted order.
    ///
    /// Individual folder failures are recorded and do not stop the batch. A missing `parent` is
    /// the only error.
    pub fn process_all(&self, parent: &Path) -> SlidecastResult<BatchResult> {
        if !parent.is_dir() {
            let msg = format!("execution folder '{}' does not exist", parent.display());
            self.relay.error(msg.clone());
            return Err(SlidecastError::missing_input(msg));
        }

        let names = list_subfolders(parent)?;
        if names.is_empty() {
            self.relay.warn(format!(
                "no subfolders found in execution folder '{}'",
                parent.display()
            ));
            return Ok(BatchResult::default());
        }

        let mut result = BatchResult::default();
        for dir_name in names {
            let name = dir_name.to_string_lossy().into_owned();
            match self.assemble(&parent.join(&dir_name)) {
                Ok(out) => {
                    result.outputs.insert(name, out);
                }
                Err(e) => result.failures.push((name, e.to_string())),
            }
        }

        self.relay.info(format!(
            "batch finished: {} succeeded, {} failed",
            result.succeeded(),
            result.failed()
        ));
        Ok(result)
    }
}
