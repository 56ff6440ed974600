//! Function overview filtering by name and capability.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{FunctionOverview, FunctionSummary};

/// Something a function is known to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    Selfdestructs,
    Calls,
    Delegates,
    Creates,
    Logs,
    Reads,
    Writes,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Selfdestructs,
        Capability::Calls,
        Capability::Delegates,
        Capability::Creates,
        Capability::Logs,
        Capability::Reads,
        Capability::Writes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Selfdestructs => "Selfdestructs",
            Capability::Calls => "Calls",
            Capability::Delegates => "Delegates",
            Capability::Creates => "Creates",
            Capability::Logs => "Logs",
            Capability::Reads => "Reads",
            Capability::Writes => "Writes",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

impl FunctionSummary {
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Selfdestructs => self.has_selfdestructs,
            Capability::Calls => self.has_calls,
            Capability::Delegates => self.has_delegate,
            Capability::Creates => self.has_creates || self.has_create2s,
            Capability::Logs => self.has_logs,
            Capability::Reads => self.has_reads,
            Capability::Writes => self.has_writes,
        }
    }

    /// Every capability this function has, in [`Capability::ALL`] order.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL.into_iter().filter(|c| self.has_capability(*c)).collect()
    }
}

/// Filter over the function overview list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFilter {
    /// Case-insensitive substring of the raw function name; empty matches all.
    #[serde(default)]
    pub name: String,
    /// Capabilities a function must all have.
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl FunctionFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), capabilities: Vec::new() }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    pub fn matches(&self, overview: &FunctionOverview) -> bool {
        let summary = &overview.function;
        summary.name.to_lowercase().contains(&self.name.to_lowercase())
            && self.capabilities.iter().all(|c| summary.has_capability(*c))
    }

    pub fn apply<'a>(&self, functions: &'a [FunctionOverview]) -> Vec<&'a FunctionOverview> {
        functions.iter().filter(|overview| self.matches(overview)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("calls".parse::<Capability>(), Ok(Capability::Calls));
        assert_eq!("WRITES".parse::<Capability>(), Ok(Capability::Writes));
        assert!("selfdestruct".parse::<Capability>().is_err());
    }

    #[test]
    fn create2_counts_as_creates() {
        let summary = FunctionSummary { has_create2s: true, ..FunctionSummary::new("deploy()") };
        assert!(summary.has_capability(Capability::Creates));
        assert_eq!(summary.capabilities(), vec![Capability::Creates]);
    }
}
