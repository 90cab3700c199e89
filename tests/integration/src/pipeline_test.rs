//! End-to-end pipeline tests over real catalog files and a real git
//! fragment repository.

mod common;

use std::time::Duration;

use forge_catalog::CatalogLoader;
use forge_fs::{NormalizedPath, checksum};
use forge_resolve::{RevisionRule, TupleKey};
use forge_source::{RetryPolicy, SourceCache};
use forge_workspace::{
    BuildDescriptor, GenerateOptions, enabled_tuples, generate_tuple, run_batch,
    validate_workspace,
};
use tempfile::TempDir;

struct Env {
    _dirs: Vec<TempDir>,
    catalog_dir: NormalizedPath,
    cache: SourceCache,
    opts: GenerateOptions,
}

fn setup() -> Env {
    let catalog_dir = TempDir::new().unwrap();
    common::write_catalog(catalog_dir.path());

    let source_dir = TempDir::new().unwrap();
    common::write_source(source_dir.path());

    let cache_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();

    let cache = SourceCache::new(
        source_dir.path().to_string_lossy().to_string(),
        NormalizedPath::new(cache_dir.path()),
    )
    .with_policy(RetryPolicy {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(10),
        max_elapsed: Duration::from_millis(100),
    });

    let opts = GenerateOptions {
        out_dir: NormalizedPath::new(out_dir.path()),
        strict: false,
    };

    let catalog_path = NormalizedPath::new(catalog_dir.path());
    Env {
        _dirs: vec![catalog_dir, source_dir, cache_dir, out_dir],
        catalog_dir: catalog_path,
        cache,
        opts,
    }
}

#[test]
fn generate_produces_the_reference_workspace() {
    let env = setup();
    let catalog = CatalogLoader::new().load(&env.catalog_dir).unwrap();
    let tuple = TupleKey::new("svc-a", "prod", "euw1");

    let generated = generate_tuple(&catalog, &env.cache, &tuple, &env.opts).unwrap();

    // Fragment copies for base, archetype, overlays, and every
    // enabled component.
    for fragment in [
        "fragments/base",
        "fragments/archetype",
        "fragments/environment",
        "fragments/region",
        "fragments/components/ingress",
        "fragments/components/hpa",
        "fragments/components/pdb",
    ] {
        assert!(
            generated.path.join(fragment).is_dir(),
            "missing fragment {fragment}"
        );
    }

    // Descriptor references only local relative paths.
    let descriptor: BuildDescriptor = serde_yaml::from_str(
        &std::fs::read_to_string(generated.path.join("build.yaml").to_native()).unwrap(),
    )
    .unwrap();
    assert_eq!(descriptor.revision.revision, "rev-2025.11.06");
    assert_eq!(descriptor.revision.rule, RevisionRule::ServiceChannel);
    for path in descriptor.fragments.iter().chain(descriptor.patches.iter()) {
        assert!(!path.starts_with('/'), "absolute path in descriptor: {path}");
        assert!(!path.contains("://"), "external path in descriptor: {path}");
        assert!(generated.path.join(path).exists(), "dangling path {path}");
    }

    // Labels include the tuple coordinates.
    assert_eq!(descriptor.labels["env"], "prod");
    assert_eq!(descriptor.labels["region"], "euw1");
    assert_eq!(descriptor.labels["cost.costCenter"], "CC-10042");

    // Patches carry the size tier's numbers.
    let resources =
        std::fs::read_to_string(generated.path.join("patches/resources.yaml").to_native())
            .unwrap();
    assert!(resources.contains("cpu: 500m"));
    assert!(resources.contains("memory: 1Gi"));

    let hpa =
        std::fs::read_to_string(generated.path.join("patches/autoscaling.yaml").to_native())
            .unwrap();
    assert!(hpa.contains("minReplicas: 3"));
    assert!(hpa.contains("maxReplicas: 10"));

    // Budgets scaled by the large multiplier, monotone over the
    // promotion order.
    assert_eq!(descriptor.budgets["int-stable"], 1000.0);
    assert_eq!(descriptor.budgets["pre-stable"], 3000.0);
    assert_eq!(descriptor.budgets["prod"], 6000.0);

    // The published workspace validates cleanly, even in strict mode.
    let report = validate_workspace(&generated.path).unwrap();
    assert!(report.passed(true), "findings: {:?}", report.findings);
}

#[test]
fn regeneration_is_byte_identical() {
    let env = setup();
    let catalog = CatalogLoader::new().load(&env.catalog_dir).unwrap();
    let tuple = TupleKey::new("svc-a", "prod", "euw1");

    let first = generate_tuple(&catalog, &env.cache, &tuple, &env.opts).unwrap();
    let first_tree = checksum::compute_tree_fingerprint(&first.path).unwrap();

    let second = generate_tuple(&catalog, &env.cache, &tuple, &env.opts).unwrap();
    let second_tree = checksum::compute_tree_fingerprint(&second.path).unwrap();

    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first_tree, second_tree);
}

#[test]
fn service_env_override_wins_in_generated_output() {
    let env = setup();
    let catalog = CatalogLoader::new().load(&env.catalog_dir).unwrap();

    // svc-a declares: profile default 80, profile prod override 70,
    // service override 75, service prod override 65.
    let prod = forge_resolve::resolve_tuple(&catalog, &TupleKey::new("svc-a", "prod", "euw1"))
        .unwrap();
    assert_eq!(
        prod.behavior,
        serde_yaml::from_str::<serde_yaml::Value>("threshold: 65").unwrap()
    );

    let int =
        forge_resolve::resolve_tuple(&catalog, &TupleKey::new("svc-a", "int-stable", "euw1"))
            .unwrap();
    assert_eq!(
        int.behavior,
        serde_yaml::from_str::<serde_yaml::Value>("threshold: 75").unwrap()
    );
}

#[test]
fn default_channel_beats_environment_pin_end_to_end() {
    let env = setup();

    // Drop the service channel and add pins: default channel `next`
    // (-> rev-2) must beat the raw environment pin rev-2025.11.06.
    let service_path = env.catalog_dir.join("services/svc-a.yaml");
    let content = std::fs::read_to_string(service_path.to_native()).unwrap();
    std::fs::write(
        service_path.to_native(),
        content.replace("channel: stable\n", ""),
    )
    .unwrap();
    std::fs::write(
        env.catalog_dir.join("pins.yaml").to_native(),
        r#"
environments:
  prod:
    default_channel: next
    revision: rev-2025.11.06
"#,
    )
    .unwrap();

    let catalog = CatalogLoader::new().load(&env.catalog_dir).unwrap();
    let tuple = TupleKey::new("svc-a", "prod", "euw1");
    let generated = generate_tuple(&catalog, &env.cache, &tuple, &env.opts).unwrap();

    assert_eq!(generated.revision.revision, "rev-2");
    assert_eq!(generated.revision.rule, RevisionRule::DefaultChannel);

    // rev-2 ships the updated base fragment.
    let base = std::fs::read_to_string(
        generated
            .path
            .join("fragments/base/kustomization.yaml")
            .to_native(),
    )
    .unwrap();
    assert!(base.contains("base v2"));
}

#[test]
fn batch_generates_all_enabled_tuples_sharing_one_checkout() {
    let env = setup();
    let catalog = CatalogLoader::new().load(&env.catalog_dir).unwrap();

    let tuples = enabled_tuples(&catalog, &[], None);
    // 3 environments x 2 regions.
    assert_eq!(tuples.len(), 6);

    let report = run_batch(&catalog, &env.cache, tuples, &env.opts, 3).unwrap();
    assert!(report.all_succeeded());

    for outcome in &report.outcomes {
        let generated = outcome.result.as_ref().unwrap();
        assert!(generated.path.join("build.yaml").is_file());
        // Every tuple rode the same channel revision.
        assert_eq!(generated.revision.revision, "rev-2025.11.06");
    }
}

#[test]
fn dangling_reference_fails_only_its_own_tuple() {
    let env = setup();

    // Add a second service with a dangling profile reference.
    std::fs::write(
        env.catalog_dir.join("services/svc-b.yaml").to_native(),
        r#"
name: svc-b
archetype: api
profile: ghost-profile
size: large
cost_profile: standard
monitoring_profile: standard
channel: stable
environments: [prod]
regions: [euw1]
owner: bob@example.com
team: payments
cost_center: CC-10043
business_unit: commerce
"#,
    )
    .unwrap();

    let catalog = CatalogLoader::new().load(&env.catalog_dir).unwrap();
    let tuples = enabled_tuples(&catalog, &[], Some("prod"));
    assert_eq!(tuples.len(), 3); // svc-a x 2 regions + svc-b x 1

    let report = run_batch(&catalog, &env.cache, tuples, &env.opts, 2).unwrap();

    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.succeeded().count(), 2);

    let failure = report.failed().next().unwrap();
    assert_eq!(failure.tuple.service, "svc-b");
    let message = failure.result.as_ref().unwrap_err();
    assert!(message.contains("ghost-profile"));
    assert!(message.contains("profiles"));
}
