//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::path::Path;

use git2::{Repository, Signature};

/// Write the reference catalog: one service `svc-a` on profile
/// `public-api`, size `large`, channel `stable`.
pub fn write_catalog(dir: &Path) {
    let services = dir.join("services");
    std::fs::create_dir_all(&services).unwrap();

    std::fs::write(
        services.join("svc-a.yaml"),
        r#"
name: svc-a
archetype: api
profile: public-api
size: large
cost_profile: standard
monitoring_profile: standard
channel: stable
environments: [int-stable, pre-stable, prod]
regions: [euw1, euw2]
owner: alice@example.com
team: payments
cost_center: CC-10042
business_unit: commerce
overrides:
  behavior:
    defaults:
      threshold: 75
    environments:
      prod:
        threshold: 65
"#,
    )
    .unwrap();

    std::fs::write(
        dir.join("profiles.yaml"),
        r#"
public-api:
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

    std::fs::write(
        dir.join("sizes.yaml"),
        r#"
small:
  order: 1
  multiplier: 0.3
  resources:
    cpu_request: 100m
    cpu_limit: 200m
    memory_request: 256Mi
    memory_limit: 512Mi
  replicas: {min: 1, max: 2}
  autoscaling_target_cpu_pct: 75
medium:
  order: 2
  multiplier: 1.0
  resources:
    cpu_request: 250m
    cpu_limit: 500m
    memory_request: 512Mi
    memory_limit: 1Gi
  replicas: {min: 2, max: 5}
  autoscaling_target_cpu_pct: 75
large:
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
    .unwrap();

    std::fs::write(
        dir.join("cost-profiles.yaml"),
        r##"
standard:
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

    std::fs::write(
        dir.join("monitoring-profiles.yaml"),
        r##"
standard:
  defaults:
    error_rate_pct: 1
    notify: ["#alerts-{team}"]
"##,
    )
    .unwrap();

    std::fs::write(
        dir.join("channels.yaml"),
        "stable: rev-2025.11.06\nnext: rev-2\n",
    )
    .unwrap();
}

/// Create the fragment source repository with two tagged revisions:
/// `rev-2025.11.06` (stable) and `rev-2` (next).
pub fn write_source(dir: &Path) {
    let fragments = [
        "base",
        "archetypes/api",
        "environments/int-stable",
        "environments/pre-stable",
        "environments/prod",
        "regions/euw1",
        "regions/euw2",
        "components/ingress",
        "components/hpa",
        "components/pdb",
    ];
    for fragment in fragments {
        let full = dir.join(fragment);
        std::fs::create_dir_all(&full).unwrap();
        std::fs::write(
            full.join("kustomization.yaml"),
            format!("# {fragment}\nresources: []\n"),
        )
        .unwrap();
    }

    let repo = Repository::init(dir).unwrap();
    let sig = Signature::now("test", "test@example.com").unwrap();

    let first = commit_all(&repo, &sig, "fragments", &[]);
    tag(&repo, "rev-2025.11.06", first);

    // Second revision with a changed base fragment.
    std::fs::write(
        dir.join("base/kustomization.yaml"),
        "# base v2\nresources: []\n",
    )
    .unwrap();
    let second = commit_all(&repo, &sig, "base v2", &[first]);
    tag(&repo, "rev-2", second);
}

fn commit_all(
    repo: &Repository,
    sig: &Signature<'_>,
    message: &str,
    parents: &[git2::Oid],
) -> git2::Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent_commits: Vec<_> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).unwrap())
        .collect();
    let parent_refs: Vec<_> = parent_commits.iter().collect();
    repo.commit(Some("HEAD"), sig, sig, message, &tree, &parent_refs)
        .unwrap()
}

fn tag(repo: &Repository, name: &str, oid: git2::Oid) {
    let object = repo.find_object(oid, None).unwrap();
    repo.tag_lightweight(name, &object, false).unwrap();
}
