//! The resolved configuration value object

use std::collections::BTreeMap;

use forge_catalog::{Catalog, SizeTier};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::merge::{resolve_block, resolve_budgets};
use crate::refs::resolve_references;
use crate::revision::{ResolvedRevision, resolve_revision};
use crate::subst::SubstitutionContext;
use crate::{Error, Result};

/// One (service, environment, region) tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TupleKey {
    pub service: String,
    pub environment: String,
    pub region: String,
}

impl TupleKey {
    pub fn new(service: impl Into<String>, environment: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            environment: environment.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for TupleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.service, self.environment, self.region)
    }
}

/// The fully resolved configuration for one tuple.
///
/// Created fresh per resolution run and never mutated afterwards; the
/// assembly stage only reads from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    pub tuple: TupleKey,

    pub archetype: String,
    pub components: Vec<String>,

    pub size_name: String,
    pub size: SizeTier,

    /// Merged + substituted behavior block.
    pub behavior: Value,

    /// Merged + substituted cost block (structural fields only).
    pub cost: Value,

    /// Merged + substituted monitoring block.
    pub monitoring: Value,

    /// Scaled budget table, environment -> monthly quantity.
    pub budgets: BTreeMap<String, f64>,

    /// Functional + cost + monitoring labels.
    pub labels: BTreeMap<String, String>,

    pub revision: ResolvedRevision,
}

/// Run reference resolution, merging, substitution, and revision
/// resolution for one tuple.
pub fn resolve_tuple(catalog: &Catalog, tuple: &TupleKey) -> Result<ResolvedConfiguration> {
    let refs = resolve_references(catalog, &tuple.service)?;

    if !refs.service.environments.contains(&tuple.environment)
        || !refs.service.regions.contains(&tuple.region)
    {
        return Err(Error::TupleNotEnabled {
            service: tuple.service.clone(),
            environment: tuple.environment.clone(),
            region: tuple.region.clone(),
        });
    }

    let ctx = SubstitutionContext::new(refs.service, &tuple.environment, &tuple.region);

    let behavior = resolve_block(
        &refs.profile.template,
        &refs.service.overrides.behavior,
        &tuple.environment,
    );
    let behavior = ctx.substitute_tree(&behavior)?;

    let cost = resolve_block(
        refs.cost_profile,
        &refs.service.overrides.cost,
        &tuple.environment,
    );
    let cost = ctx.substitute_tree(&cost)?;

    let budgets = resolve_budgets(
        refs.cost_profile,
        &refs.service.overrides.cost,
        refs.size.multiplier,
    );

    let monitoring = resolve_block(
        refs.monitoring_profile,
        &refs.service.overrides.monitoring,
        &tuple.environment,
    );
    let monitoring = ctx.substitute_tree(&monitoring)?;

    let revision = resolve_revision(catalog, refs.service, &tuple.environment, &tuple.region)?;

    let labels = build_labels(refs.service, tuple, refs.archetype, refs.size_name);

    Ok(ResolvedConfiguration {
        tuple: tuple.clone(),
        archetype: refs.archetype.to_string(),
        components: refs.components.to_vec(),
        size_name: refs.size_name.to_string(),
        size: refs.size.clone(),
        behavior,
        cost,
        monitoring,
        budgets,
        labels,
        revision,
    })
}

/// The common label map stamped on every generated resource.
///
/// The `cost.*` set is the one billing validation requires on every
/// workload; the rest are functional.
fn build_labels(
    service: &forge_catalog::ServiceSpec,
    tuple: &TupleKey,
    archetype: &str,
    size_name: &str,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_string(), service.name.clone()),
        ("archetype".to_string(), archetype.to_string()),
        ("size".to_string(), size_name.to_string()),
        ("env".to_string(), tuple.environment.clone()),
        ("region".to_string(), tuple.region.clone()),
        ("cost.service".to_string(), service.name.clone()),
        ("cost.team".to_string(), service.team.clone()),
        ("cost.environment".to_string(), tuple.environment.clone()),
        ("cost.costCenter".to_string(), service.cost_center.clone()),
        ("cost.businessUnit".to_string(), service.business_unit.clone()),
        ("monitoring.profile".to_string(), service.monitoring_profile.clone()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_catalog;
    use pretty_assertions::assert_eq;

    fn resolvable_catalog() -> Catalog {
        let mut catalog = fixture_catalog();
        catalog.services.get_mut("svc-a").unwrap().channel = Some("stable".into());
        catalog
    }

    #[test]
    fn resolves_complete_tuple() {
        let catalog = resolvable_catalog();
        let tuple = TupleKey::new("svc-a", "prod", "euw1");

        let resolved = resolve_tuple(&catalog, &tuple).unwrap();

        assert_eq!(resolved.archetype, "api");
        assert_eq!(resolved.components, vec!["ingress", "hpa", "pdb"]);
        assert_eq!(resolved.revision.revision, "rev-2025.11.06");
        // threshold 70 from the profile's prod override.
        assert_eq!(
            resolved.behavior,
            serde_yaml::from_str::<Value>("threshold: 70").unwrap()
        );
        // cost_owner placeholder expanded from the context.
        let cost_owner = resolved.cost.get("cost_owner").unwrap();
        assert_eq!(cost_owner, &Value::String("alice@example.com".into()));
    }

    #[test]
    fn budgets_scaled_by_large_multiplier() {
        let catalog = resolvable_catalog();
        let tuple = TupleKey::new("svc-a", "prod", "euw1");

        let resolved = resolve_tuple(&catalog, &tuple).unwrap();

        assert_eq!(resolved.budgets["int-stable"], 1000.0);
        assert_eq!(resolved.budgets["pre-stable"], 3000.0);
        assert_eq!(resolved.budgets["prod"], 6000.0);
    }

    #[test]
    fn labels_carry_cost_and_functional_sets() {
        let catalog = resolvable_catalog();
        let tuple = TupleKey::new("svc-a", "prod", "euw1");

        let resolved = resolve_tuple(&catalog, &tuple).unwrap();

        assert_eq!(resolved.labels["env"], "prod");
        assert_eq!(resolved.labels["region"], "euw1");
        assert_eq!(resolved.labels["cost.costCenter"], "CC-10042");
        assert_eq!(resolved.labels["cost.businessUnit"], "commerce");
    }

    #[test]
    fn disabled_environment_is_rejected() {
        let catalog = resolvable_catalog();
        let tuple = TupleKey::new("svc-a", "staging", "euw1");

        let err = resolve_tuple(&catalog, &tuple).unwrap_err();
        assert!(matches!(err, Error::TupleNotEnabled { .. }));
    }

    #[test]
    fn disabled_region_is_rejected() {
        let catalog = resolvable_catalog();
        let tuple = TupleKey::new("svc-a", "prod", "use1");

        let err = resolve_tuple(&catalog, &tuple).unwrap_err();
        assert!(matches!(err, Error::TupleNotEnabled { .. }));
    }

    #[test]
    fn service_env_override_beats_all_layers() {
        let mut catalog = resolvable_catalog();
        let service = catalog.services.get_mut("svc-a").unwrap();
        service.overrides.behavior = serde_yaml::from_str(
            r#"
defaults:
  threshold: 75
environments:
  prod:
    threshold: 65
"#,
        )
        .unwrap();

        let prod = resolve_tuple(&catalog, &TupleKey::new("svc-a", "prod", "euw1")).unwrap();
        assert_eq!(
            prod.behavior,
            serde_yaml::from_str::<Value>("threshold: 65").unwrap()
        );

        let int =
            resolve_tuple(&catalog, &TupleKey::new("svc-a", "int-stable", "euw1")).unwrap();
        assert_eq!(
            int.behavior,
            serde_yaml::from_str::<Value>("threshold: 75").unwrap()
        );
    }

    #[test]
    fn unbound_variable_in_monitoring_block_fails_tuple() {
        let mut catalog = resolvable_catalog();
        let monitoring = catalog.monitoring_profiles.get_mut("standard").unwrap();
        monitoring.defaults =
            Some(serde_yaml::from_str("pager: \"{unknownKey}\"").unwrap());

        let err = resolve_tuple(&catalog, &TupleKey::new("svc-a", "prod", "euw1")).unwrap_err();
        match err {
            Error::UnboundVariable { token, path } => {
                assert_eq!(token, "unknownKey");
                assert_eq!(path, "pager");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
