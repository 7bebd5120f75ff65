//! Fixed stage graph shared by every partner

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A checkpoint a partner's data passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "File")]
    File,
    #[serde(rename = "Stage 0")]
    Stage0,
    #[serde(rename = "Stage 1")]
    Stage1,
    #[serde(rename = "Stage 1B")]
    Stage1B,
    #[serde(rename = "Stage 2")]
    Stage2,
    #[serde(rename = "Target")]
    Target,
}

impl Stage {
    /// Display label used in reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            Stage::File => "File",
            Stage::Stage0 => "Stage 0",
            Stage::Stage1 => "Stage 1",
            Stage::Stage1B => "Stage 1B",
            Stage::Stage2 => "Stage 2",
            Stage::Target => "Target",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier of one of the six edges between stages
///
/// Every partner carries exactly these six transitions. They are configured
/// but never created or destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionId {
    #[serde(rename = "file-stage0")]
    FileStage0,
    #[serde(rename = "stage0-stage1")]
    Stage0Stage1,
    /// Error path into Stage 1B
    #[serde(rename = "stage1-stage1b")]
    Stage1Stage1B,
    /// Recovery path back out of Stage 1B
    #[serde(rename = "stage1b-stage1")]
    Stage1BStage1,
    #[serde(rename = "stage1-stage2")]
    Stage1Stage2,
    #[serde(rename = "stage2-target")]
    Stage2Target,
}

impl TransitionId {
    /// All transitions in display order
    pub const ALL: [TransitionId; 6] = [
        TransitionId::FileStage0,
        TransitionId::Stage0Stage1,
        TransitionId::Stage1Stage1B,
        TransitionId::Stage1BStage1,
        TransitionId::Stage1Stage2,
        TransitionId::Stage2Target,
    ];

    /// Main-line transitions in execution order
    pub const REQUIRED: [TransitionId; 4] = [
        TransitionId::FileStage0,
        TransitionId::Stage0Stage1,
        TransitionId::Stage1Stage2,
        TransitionId::Stage2Target,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionId::FileStage0 => "file-stage0",
            TransitionId::Stage0Stage1 => "stage0-stage1",
            TransitionId::Stage1Stage1B => "stage1-stage1b",
            TransitionId::Stage1BStage1 => "stage1b-stage1",
            TransitionId::Stage1Stage2 => "stage1-stage2",
            TransitionId::Stage2Target => "stage2-target",
        }
    }

    pub fn from_stage(&self) -> Stage {
        match self {
            TransitionId::FileStage0 => Stage::File,
            TransitionId::Stage0Stage1 => Stage::Stage0,
            TransitionId::Stage1Stage1B => Stage::Stage1,
            TransitionId::Stage1BStage1 => Stage::Stage1B,
            TransitionId::Stage1Stage2 => Stage::Stage1,
            TransitionId::Stage2Target => Stage::Stage2,
        }
    }

    pub fn to_stage(&self) -> Stage {
        match self {
            TransitionId::FileStage0 => Stage::Stage0,
            TransitionId::Stage0Stage1 => Stage::Stage1,
            TransitionId::Stage1Stage1B => Stage::Stage1B,
            TransitionId::Stage1BStage1 => Stage::Stage1,
            TransitionId::Stage1Stage2 => Stage::Stage2,
            TransitionId::Stage2Target => Stage::Target,
        }
    }

    /// Whether the transition must be configured before a run
    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// The required transition that gates this one, if any
    pub fn predecessor(&self) -> Option<TransitionId> {
        let position = Self::REQUIRED.iter().position(|t| t == self)?;
        position.checked_sub(1).map(|i| Self::REQUIRED[i])
    }

    /// Short label such as `File → Stage 0`
    pub fn label(&self) -> String {
        format!("{} → {}", self.from_stage(), self.to_stage())
    }

    /// Name given to a freshly created stage configuration
    pub fn config_name(&self) -> String {
        match self {
            TransitionId::Stage1Stage1B => format!("{} (Error Handling)", self.label()),
            TransitionId::Stage1BStage1 => format!("{} (Recovery)", self.label()),
            _ => self.label(),
        }
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransitionId::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown transition: {}", s))
    }
}
