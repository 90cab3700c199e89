//! Serde schema types for catalog documents

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// A service entry, one document per file under `services/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSpec {
    /// Unique, DNS-label-safe service name. Must match the file stem.
    pub name: String,

    /// Archetype fragment to build from (e.g. `api`, `worker`).
    pub archetype: String,

    /// Behavior profile reference (component list + behavior defaults).
    pub profile: String,

    /// Size tier reference.
    pub size: String,

    /// Cost profile reference.
    pub cost_profile: String,

    /// Monitoring profile reference.
    pub monitoring_profile: String,

    /// Release channel. Optional; when absent the pin fallback chain
    /// decides the revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Environments this service deploys to.
    pub environments: Vec<String>,

    /// Regions this service deploys to.
    pub regions: Vec<String>,

    /// Owning engineer or distribution list.
    pub owner: String,

    /// Owning team.
    pub team: String,

    /// Cost center in `CC-NNNNN` form.
    pub cost_center: String,

    /// Business unit for cost attribution.
    pub business_unit: String,

    /// Inline override blocks, highest two precedence levels.
    #[serde(default)]
    pub overrides: ServiceOverrides,
}

/// Service-level overrides, scoped per profile domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceOverrides {
    #[serde(default)]
    pub behavior: OverrideBlock,

    #[serde(default)]
    pub cost: OverrideBlock,

    #[serde(default)]
    pub monitoring: OverrideBlock,
}

/// One override block: a service-wide layer plus per-environment layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideBlock {
    /// Service-level override, applies to all environments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,

    /// Service+environment overrides, the most specific layer.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, Value>,
}

impl OverrideBlock {
    /// The per-environment layer for `environment`, if declared.
    pub fn for_environment(&self, environment: &str) -> Option<&Value> {
        self.environments.get(environment)
    }
}

/// A reusable template of default values with optional per-environment
/// overrides. Cost and monitoring profiles are plain templates; behavior
/// profiles wrap one in [`BehaviorProfile`]. Flattened there, so no
/// `deny_unknown_fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileTemplate {
    /// Default values, lowest precedence layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,

    /// Per-environment override layers. Keys must be members of the
    /// known environment set.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, Value>,
}

impl ProfileTemplate {
    pub fn for_environment(&self, environment: &str) -> Option<&Value> {
        self.environments.get(environment)
    }
}

/// A behavior profile: the component list plus behavior defaults.
///
/// No `deny_unknown_fields` here: serde does not support it together
/// with `flatten`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorProfile {
    /// Overlay components enabled for services using this profile.
    pub components: Vec<String>,

    /// Archetypes this profile is written against. Empty means any.
    /// Profiles point at archetypes; archetypes are opaque fragment
    /// trees and never reference profiles back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compatible_archetypes: Vec<String>,

    #[serde(flatten)]
    pub template: ProfileTemplate,
}

/// A named size tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeTier {
    /// Rank in the size total order. Unique across tiers; budgets must
    /// not decrease along it.
    pub order: u32,

    /// Scaling factor applied to profile base quantities. Strictly
    /// positive.
    pub multiplier: f64,

    pub resources: ResourceBaseline,

    pub replicas: ReplicaBounds,

    /// HPA target CPU utilization percentage.
    pub autoscaling_target_cpu_pct: u32,
}

/// Resource requests and limits for one size tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceBaseline {
    pub cpu_request: String,
    pub cpu_limit: String,
    pub memory_request: String,
    pub memory_limit: String,
}

/// Replica bounds for one size tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplicaBounds {
    pub min: u32,
    pub max: u32,
}

/// A pin target: an immutable revision, or a channel name resolved
/// through the channel table. Exactly one field is set; the loader
/// rejects anything else. One level of indirection only.
///
/// Flattened into [`EnvironmentPin`], so `deny_unknown_fields` cannot
/// apply; the loader validates the shape instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl PinTarget {
    pub fn is_empty(&self) -> bool {
        self.revision.is_none() && self.channel.is_none()
    }
}

/// Environment entry in the pin table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentPin {
    /// Channel used for services that declare none of their own.
    /// Checked before the raw pin in the fallback chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,

    #[serde(flatten)]
    pub pin: PinTarget,
}

/// The pin table document (`pins.yaml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinTable {
    /// Environment pins, keyed by environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, EnvironmentPin>,

    /// Region pins, keyed by environment then region.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub regions: BTreeMap<String, BTreeMap<String, PinTarget>>,
}

impl PinTable {
    pub fn environment(&self, environment: &str) -> Option<&EnvironmentPin> {
        self.environments.get(environment)
    }

    pub fn region(&self, environment: &str, region: &str) -> Option<&PinTarget> {
        self.regions.get(environment)?.get(region)
    }
}
