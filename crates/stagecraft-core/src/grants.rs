//! Authorization grants attached to pipeline actions.
//!
//! The core only decides which (action-set, resource-set) pairs an action's
//! execution identity receives. Enforcement belongs to the platform.

use serde::{Deserialize, Serialize};

/// One (action-set, resource-set) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    /// Permitted operations, e.g. `sts:AssumeRole`.
    pub actions: Vec<String>,

    /// Resources the operations apply to.
    pub resources: Vec<String>,
}

impl Grant {
    pub fn new<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether any resource in this grant is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.resources.iter().any(|r| r == "*")
    }
}

/// A named, auditable bundle of grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustBoundary {
    /// Stable identifier of the boundary.
    pub name: String,

    pub grants: Vec<Grant>,
}

impl TrustBoundary {
    /// Scope of the self-mutation step.
    ///
    /// Self-mutation redeploys the pipeline's own definition, including the
    /// roles it runs under, so it may assume any execution role and read any
    /// configuration parameter.
    pub fn self_mutation() -> Self {
        Self {
            name: "self-mutation".to_string(),
            grants: vec![
                Grant::new(["sts:AssumeRole"], ["*"]),
                Grant::new(["ssm:GetParameter*"], ["*"]),
            ],
        }
    }

    /// Deploy scope for exactly one deployable unit.
    pub fn deploy_unit(unit: &str) -> Self {
        Self {
            name: format!("deploy-{unit}"),
            grants: vec![Grant::new(
                ["cloudformation:*"],
                [format!("arn:*:cloudformation:*:*:stack/{unit}/*")],
            )],
        }
    }
}
