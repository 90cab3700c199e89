//! CLI surface tests: subcommands, exit codes, output

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct CliEnv {
    catalog: TempDir,
    source: TempDir,
    cache: TempDir,
    out: TempDir,
}

fn setup() -> CliEnv {
    let catalog = TempDir::new().unwrap();
    common::write_catalog(catalog.path());
    let source = TempDir::new().unwrap();
    common::write_source(source.path());
    CliEnv {
        catalog,
        source,
        cache: TempDir::new().unwrap(),
        out: TempDir::new().unwrap(),
    }
}

fn forge(env: &CliEnv) -> Command {
    let mut cmd = Command::cargo_bin("forge").unwrap();
    cmd.arg("--catalog")
        .arg(env.catalog.path())
        .arg("--source")
        .arg(env.source.path())
        .arg("--cache")
        .arg(env.cache.path())
        .arg("--out")
        .arg(env.out.path());
    cmd
}

#[test]
fn generate_succeeds_and_prints_revision() {
    let env = setup();
    forge(&env)
        .args(["generate", "svc-a", "prod", "euw1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rev-2025.11.06"));

    assert!(
        env.out
            .path()
            .join("svc-a/prod/euw1/build.yaml")
            .is_file()
    );
}

#[test]
fn generate_unknown_service_fails() {
    let env = setup();
    forge(&env)
        .args(["generate", "ghost", "prod", "euw1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn generate_disabled_region_fails() {
    let env = setup();
    forge(&env)
        .args(["generate", "svc-a", "prod", "use1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not enabled"));
}

#[test]
fn malformed_catalog_exits_with_code_2() {
    let env = setup();
    std::fs::write(env.catalog.path().join("sizes.yaml"), "large: [oops\n").unwrap();

    forge(&env)
        .args(["generate", "svc-a", "prod", "euw1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Schema error"));
}

#[test]
fn validate_passes_on_generated_workspace() {
    let env = setup();
    forge(&env)
        .args(["generate", "svc-a", "prod", "euw1"])
        .assert()
        .success();

    let workspace = env.out.path().join("svc-a/prod/euw1");
    Command::cargo_bin("forge")
        .unwrap()
        .arg("validate")
        .arg(&workspace)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_fails_on_tampered_workspace() {
    let env = setup();
    forge(&env)
        .args(["generate", "svc-a", "prod", "euw1"])
        .assert()
        .success();

    let workspace = env.out.path().join("svc-a/prod/euw1");
    std::fs::write(
        workspace.join("monitoring.yaml"),
        "pager: \"{unknownKey}\"\n",
    )
    .unwrap();

    Command::cargo_bin("forge")
        .unwrap()
        .arg("validate")
        .arg(&workspace)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unsubstituted-placeholder"));
}

#[test]
fn batch_reports_every_tuple() {
    let env = setup();
    forge(&env)
        .args(["batch", "--environment", "prod", "--concurrency", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("svc-a/prod/euw1"))
        .stdout(predicate::str::contains("svc-a/prod/euw2"));
}

#[test]
fn batch_with_failing_tuple_exits_nonzero() {
    let env = setup();
    std::fs::write(
        env.catalog.path().join("services/svc-b.yaml"),
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

    forge(&env)
        .args(["batch", "--environment", "prod"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed"))
        .stdout(predicate::str::contains("ghost-profile"));
}
