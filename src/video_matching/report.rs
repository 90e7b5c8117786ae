use super::{RenamedVideo, SkippedVideo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of one run, as shown to the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub renamed: Vec<RenamedVideo>,
    pub skipped: Vec<SkippedVideo>,
    /// Absent when no video was renamed
    pub archive_path: Option<PathBuf>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        !self.renamed.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for skipped in &self.skipped {
            writeln!(f, "⚠️ Skipped {}: {}", skipped.video_name, skipped.reason)?;
        }

        if !self.is_success() {
            return writeln!(f, "⚠️ No videos were renamed.");
        }

        writeln!(f, "✅ Videos Renamed Successfully!")?;
        for r in &self.renamed {
            writeln!(f, "{} → {} (score={:.2})", r.original_name, r.new_name, r.score)?;
        }
        if let Some(path) = &self.archive_path {
            writeln!(f, "📦 Archive: {}", path.display())?;
        }

        Ok(())
    }
}
