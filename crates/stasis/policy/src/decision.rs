//! Pure emission policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// How far a halting system should take itself apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DissolutionMode {
    #[default]
    None,
    /// Stop emitting; keep local diagnostics.
    SoftHalt,
    HardHalt,
    Decompose,
}

impl DissolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SoftHalt => "soft_halt",
            Self::HardHalt => "hard_halt",
            Self::Decompose => "decompose",
        }
    }
}

impl fmt::Display for DissolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DissolutionMode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::None),
            "soft_halt" => Ok(Self::SoftHalt),
            "hard_halt" => Ok(Self::HardHalt),
            "decompose" => Ok(Self::Decompose),
            other => Err(PolicyError::UnknownDissolutionMode(other.to_string())),
        }
    }
}

/// What the system may do with its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceDecision {
    Emit,
    Withhold,
    Halt,
    Dissolve,
}

impl GovernanceDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emit => "emit",
            Self::Withhold => "withhold",
            Self::Halt => "halt",
            Self::Dissolve => "dissolve",
        }
    }

    pub fn permits_emission(&self) -> bool {
        matches!(self, Self::Emit)
    }
}

impl fmt::Display for GovernanceDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInputs {
    #[serde(default)]
    pub withhold: bool,
    #[serde(default)]
    pub dissolution: DissolutionMode,
    #[serde(default)]
    pub renegotiation_required: bool,
    #[serde(default)]
    pub stasis_active: bool,
}

impl PolicyInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn withhold(mut self, withhold: bool) -> Self {
        self.withhold = withhold;
        self
    }

    pub fn dissolution(mut self, mode: DissolutionMode) -> Self {
        self.dissolution = mode;
        self
    }

    pub fn renegotiation_required(mut self, required: bool) -> Self {
        self.renegotiation_required = required;
        self
    }

    pub fn stasis_active(mut self, active: bool) -> Self {
        self.stasis_active = active;
        self
    }
}

/// The policy combinator.
///
/// Precedence, strongest first: decompose, hard halt, then anything that
/// withholds (soft halt, active stasis, pending renegotiation, explicit
/// withhold). Only when none apply is emission permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct GovernancePolicy;

impl GovernancePolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, inputs: PolicyInputs) -> GovernanceDecision {
        match inputs.dissolution {
            DissolutionMode::Decompose => GovernanceDecision::Dissolve,
            DissolutionMode::HardHalt => GovernanceDecision::Halt,
            DissolutionMode::SoftHalt => GovernanceDecision::Withhold,
            DissolutionMode::None
                if inputs.stasis_active || inputs.renegotiation_required || inputs.withhold =>
            {
                GovernanceDecision::Withhold
            }
            DissolutionMode::None => GovernanceDecision::Emit,
        }
    }
}
