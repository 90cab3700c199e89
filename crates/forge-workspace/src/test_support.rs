//! Shared fixtures for unit tests

use std::collections::BTreeMap;

use forge_catalog::SizeTier;
use forge_resolve::{ResolvedConfiguration, ResolvedRevision, RevisionRule, TupleKey};

pub(crate) fn fixture_size() -> SizeTier {
    serde_yaml::from_str(
        r#"
order: 3
multiplier: 2.0
resources:
  cpu_request: 500m
  cpu_limit: "1"
  memory_request: 1Gi
  memory_limit: 2Gi
replicas: {min: 3, max: 10}
autoscaling_target_cpu_pct: 75
"#,
    )
    .unwrap()
}

pub(crate) fn fixture_resolved() -> ResolvedConfiguration {
    ResolvedConfiguration {
        tuple: TupleKey::new("svc-a", "prod", "euw1"),
        archetype: "api".into(),
        components: vec!["ingress".into(), "hpa".into(), "pdb".into()],
        size_name: "large".into(),
        size: fixture_size(),
        behavior: serde_yaml::from_str("threshold: 70").unwrap(),
        cost: serde_yaml::from_str("currency: EUR\ncost_owner: alice@example.com").unwrap(),
        monitoring: serde_yaml::from_str("error_rate_pct: 1").unwrap(),
        budgets: BTreeMap::from([
            ("int-stable".to_string(), 1000.0),
            ("pre-stable".to_string(), 3000.0),
            ("prod".to_string(), 6000.0),
        ]),
        labels: BTreeMap::from([
            ("app".to_string(), "svc-a".to_string()),
            ("env".to_string(), "prod".to_string()),
            ("region".to_string(), "euw1".to_string()),
            ("cost.service".to_string(), "svc-a".to_string()),
            ("cost.team".to_string(), "payments".to_string()),
            ("cost.environment".to_string(), "prod".to_string()),
            ("cost.costCenter".to_string(), "CC-10042".to_string()),
            ("cost.businessUnit".to_string(), "commerce".to_string()),
        ]),
        revision: ResolvedRevision {
            revision: "rev-1".into(),
            rule: RevisionRule::ServiceChannel,
            channel: Some("stable".into()),
        },
    }
}
