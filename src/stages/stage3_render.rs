use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::{LineupDocument, Rundown};
use crate::models::EpisodeLineup;

/// Configuration for Stage 3 rendering
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Whether to write the JSON lineup document
    pub generate_document: bool,
    /// Whether to write the production rundown
    pub generate_rundown: bool,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            generate_document: true,
            generate_rundown: true,
        }
    }
}

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct Stage3Result {
    /// Path to the lineup document (if written)
    pub document_path: Option<PathBuf>,
    /// Path to the rundown (if written)
    pub rundown_path: Option<PathBuf>,
}

/// Execute Stage 3: Rendering
///
/// Produces two output views:
/// 1. Lineup document: JSON lineup plus generation metadata
/// 2. Rundown: production notes for hosts and producers
pub fn execute_stage3(
    lineup: &EpisodeLineup,
    document_output: Option<&Path>,
    rundown_output: Option<&Path>,
    config: &Stage3Config,
) -> Result<Stage3Result> {
    let mut result = Stage3Result {
        document_path: None,
        rundown_path: None,
    };

    if config.generate_document {
        if let Some(path) = document_output {
            info!("Writing lineup document to {:?}", path);
            LineupDocument::new(lineup).write_json(path)?;
            result.document_path = Some(path.to_path_buf());
        }
    }

    if config.generate_rundown {
        if let Some(path) = rundown_output {
            info!("Writing rundown to {:?}", path);
            Rundown::new(lineup).write_file(path)?;
            result.rundown_path = Some(path.to_path_buf());
        }
    }

    Ok(result)
}
