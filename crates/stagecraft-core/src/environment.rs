//! Deployment environments and the groups of units deployed into them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Conventional deployment environments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Dev,
    Beta,
    Gamma,
    Prod,
}

impl Environment {
    /// Stage label used when this environment becomes a pipeline stage.
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Beta => "beta",
            Environment::Gamma => "gamma",
            Environment::Prod => "prod",
        }
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Environment::Prod)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single deployable stack, identified by its stack name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployableUnit(String);

impl DeployableUnit {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyField {
                field: "unit".to_string(),
                context: "deployment group".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeployableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Units deployed together into one environment, e.g. network, database
/// and compute for beta.
///
/// Populated by the caller; the assembler only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentGroup {
    units: Vec<DeployableUnit>,
}

impl DeploymentGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: DeployableUnit) -> &mut Self {
        self.units.push(unit);
        self
    }

    pub fn units(&self) -> &[DeployableUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<DeployableUnit> for DeploymentGroup {
    fn from_iter<I: IntoIterator<Item = DeployableUnit>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}
