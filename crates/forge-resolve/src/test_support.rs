//! Shared catalog fixtures for unit tests

use std::collections::BTreeMap;

use forge_catalog::{BehaviorProfile, Catalog, ProfileTemplate, ServiceSpec, SizeTier};

pub(crate) fn fixture_service() -> ServiceSpec {
    serde_yaml::from_str(
        r#"
name: svc-a
archetype: api
profile: public-api
size: large
cost_profile: standard
monitoring_profile: standard
environments: [int-stable, pre-stable, prod]
regions: [euw1, euw2]
owner: alice@example.com
team: payments
cost_center: CC-10042
business_unit: commerce
"#,
    )
    .unwrap()
}

pub(crate) fn fixture_size(order: u32, multiplier: f64, min: u32, max: u32) -> SizeTier {
    serde_yaml::from_str(&format!(
        r#"
order: {order}
multiplier: {multiplier}
resources:
  cpu_request: 500m
  cpu_limit: "1"
  memory_request: 1Gi
  memory_limit: 2Gi
replicas: {{min: {min}, max: {max}}}
autoscaling_target_cpu_pct: 75
"#
    ))
    .unwrap()
}

pub(crate) fn fixture_catalog() -> Catalog {
    let mut catalog = Catalog::default();

    catalog.services.insert("svc-a".into(), fixture_service());

    let profile: BehaviorProfile = serde_yaml::from_str(
        r#"
components: [ingress, hpa, pdb]
compatible_archetypes: [api]
defaults:
  threshold: 80
environments:
  prod:
    threshold: 70
"#,
    )
    .unwrap();
    catalog.profiles.insert("public-api".into(), profile);

    catalog.sizes.insert("small".into(), fixture_size(1, 0.3, 1, 2));
    catalog.sizes.insert("medium".into(), fixture_size(2, 1.0, 2, 5));
    catalog.sizes.insert("large".into(), fixture_size(3, 2.0, 3, 10));

    let cost: ProfileTemplate = serde_yaml::from_str(
        r##"
defaults:
  budgets:
    int-stable: 500
    pre-stable: 1500
    prod: 3000
  currency: EUR
  cost_owner: "{costOwner}"
  alerts:
    - threshold: 80
      channels: ["#finops"]
"##,
    )
    .unwrap();
    catalog.cost_profiles.insert("standard".into(), cost);

    let monitoring: ProfileTemplate = serde_yaml::from_str(
        r##"
defaults:
  error_rate_pct: 1
  notify: ["#alerts-{team}"]
"##,
    )
    .unwrap();
    catalog
        .monitoring_profiles
        .insert("standard".into(), monitoring);

    catalog.channels = BTreeMap::from([
        ("stable".into(), "rev-2025.11.06".into()),
        ("next".into(), "rev-2".into()),
    ]);

    catalog
}
