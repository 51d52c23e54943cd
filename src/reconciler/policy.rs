//! Policies controlling how the reconciler handles keys and values it cannot pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::*;

/// What to do with a key present on one side only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchedKeysBehaviour {
    /// Compare as if the missing side were present with a null value
    #[default]
    TreatMissingValueAsNull,
    /// Report the key as a difference without consulting any plugin
    ReportAsDifference,
    /// Leave the key out of the comparison
    Ignore,
    /// Abort the whole reconciliation
    Throw,
}

/// What to do when no plugin is able to compare a pair of values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoAvailablePluginBehaviour {
    /// Abort the whole reconciliation
    Throw,
    /// Treat the pair as matching
    Ignore,
    /// Report the pair as a difference with no payload
    #[default]
    ReportAsDifference,
}

fn normalize_policy_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for MismatchedKeysBehaviour {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_policy_name(s).as_str() {
            "treatmissingvalueasnull" => Ok(Self::TreatMissingValueAsNull),
            "reportasdifference" => Ok(Self::ReportAsDifference),
            "ignore" => Ok(Self::Ignore),
            "throw" => Ok(Self::Throw),
            _ => Err(ReconcileError::UnknownPolicy(format!(
                "mismatched keys behaviour '{s}'"
            ))),
        }
    }
}

impl FromStr for NoAvailablePluginBehaviour {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_policy_name(s).as_str() {
            "throw" => Ok(Self::Throw),
            "ignore" => Ok(Self::Ignore),
            "reportasdifference" => Ok(Self::ReportAsDifference),
            _ => Err(ReconcileError::UnknownPolicy(format!(
                "no available plugin behaviour '{s}'"
            ))),
        }
    }
}

impl fmt::Display for MismatchedKeysBehaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TreatMissingValueAsNull => write!(f, "treat_missing_value_as_null"),
            Self::ReportAsDifference => write!(f, "report_as_difference"),
            Self::Ignore => write!(f, "ignore"),
            Self::Throw => write!(f, "throw"),
        }
    }
}

impl fmt::Display for NoAvailablePluginBehaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Throw => write!(f, "throw"),
            Self::Ignore => write!(f, "ignore"),
            Self::ReportAsDifference => write!(f, "report_as_difference"),
        }
    }
}

/// Reconciler configuration.
///
/// Loaded from TOML as:
///
/// ```toml
/// mismatched_keys = "report_as_difference"
/// no_available_plugin = "throw"
/// ```
///
/// Missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub mismatched_keys: MismatchedKeysBehaviour,
    pub no_available_plugin: NoAvailablePluginBehaviour,
}

impl ReconcilerConfig {
    pub fn new(
        mismatched_keys: MismatchedKeysBehaviour,
        no_available_plugin: NoAvailablePluginBehaviour,
    ) -> Self {
        Self {
            mismatched_keys,
            no_available_plugin,
        }
    }

    /// Both policies set to `Throw`: any unpaired key or unclaimed value aborts
    pub fn strict() -> Self {
        Self::new(
            MismatchedKeysBehaviour::Throw,
            NoAvailablePluginBehaviour::Throw,
        )
    }

    pub fn from_toml(input: &str) -> ReconcileResult<Self> {
        toml::from_str(input).map_err(|e| ReconcileError::Configuration(e.to_string()))
    }

    pub fn with_mismatched_keys(mut self, behaviour: MismatchedKeysBehaviour) -> Self {
        self.mismatched_keys = behaviour;
        self
    }

    pub fn with_no_available_plugin(mut self, behaviour: NoAvailablePluginBehaviour) -> Self {
        self.no_available_plugin = behaviour;
        self
    }
}
