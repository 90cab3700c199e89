//! Workspace assembly: generated files and the build descriptor
//!
//! Everything here writes into the staging directory; publication is a
//! single atomic rename performed by the pipeline once assembly and
//! fingerprinting succeed.

use forge_fs::{NormalizedPath, checksum, io};
use forge_resolve::ResolvedConfiguration;
use serde_yaml::{Mapping, Value};

use crate::Result;
use crate::descriptor::{API_VERSION, BuildDescriptor, DESCRIPTOR_FILE, IMAGE_PLACEHOLDER};

/// Generated patch files, relative to the workspace root.
pub const PATCH_FILES: [&str; 3] = [
    "patches/resources.yaml",
    "patches/replicas.yaml",
    "patches/autoscaling.yaml",
];

/// Write all generated files plus the descriptor into `staging`.
///
/// `fragments` is the list of workspace-relative fragment paths the
/// materializer copied. Returns the workspace fingerprint.
pub fn assemble(
    resolved: &ResolvedConfiguration,
    fragments: Vec<String>,
    staging: &NormalizedPath,
) -> Result<String> {
    write_yaml(&staging.join("labels.yaml"), &resolved.labels)?;
    write_yaml(&staging.join("cost.yaml"), &cost_document(resolved))?;
    write_yaml(&staging.join("monitoring.yaml"), &resolved.monitoring)?;

    write_yaml(&staging.join(PATCH_FILES[0]), &resources_patch(resolved))?;
    write_yaml(&staging.join(PATCH_FILES[1]), &replicas_patch(resolved))?;
    write_yaml(&staging.join(PATCH_FILES[2]), &autoscaling_patch(resolved))?;

    // The fingerprint covers every file except the descriptor itself,
    // which is written last.
    let fingerprint = checksum::compute_tree_fingerprint(staging)?;

    let descriptor = BuildDescriptor {
        api_version: API_VERSION.to_string(),
        service: resolved.tuple.service.clone(),
        environment: resolved.tuple.environment.clone(),
        region: resolved.tuple.region.clone(),
        revision: resolved.revision.clone(),
        image: IMAGE_PLACEHOLDER.to_string(),
        components: resolved.components.clone(),
        fragments,
        patches: PATCH_FILES.iter().map(|p| p.to_string()).collect(),
        labels: resolved.labels.clone(),
        budgets: resolved.budgets.clone(),
        fingerprint: fingerprint.clone(),
    };
    write_yaml(&staging.join(DESCRIPTOR_FILE), &descriptor)?;

    Ok(fingerprint)
}

fn write_yaml<T: serde::Serialize>(path: &NormalizedPath, value: &T) -> Result<()> {
    let content = serde_yaml::to_string(value).map_err(|e| {
        forge_fs::Error::DocumentSerialize {
            path: path.to_native(),
            format: "YAML".into(),
            message: e.to_string(),
        }
    })?;
    io::write_text(path, &content)?;
    Ok(())
}

/// The cost document: merged structural block plus the scaled budget
/// table.
fn cost_document(resolved: &ResolvedConfiguration) -> Value {
    let mut doc = match &resolved.cost {
        Value::Mapping(map) => map.clone(),
        _ => Mapping::new(),
    };
    let budgets: Mapping = resolved
        .budgets
        .iter()
        .map(|(env, amount)| (Value::String(env.clone()), Value::Number((*amount).into())))
        .collect();
    doc.insert(Value::String("budgets".into()), Value::Mapping(budgets));
    Value::Mapping(doc)
}

fn resources_patch(resolved: &ResolvedConfiguration) -> Value {
    let r = &resolved.size.resources;
    map([
        ("apiVersion", s("apps/v1")),
        ("kind", s("Deployment")),
        ("metadata", map([("name", s(&resolved.tuple.service))])),
        (
            "spec",
            map([(
                "template",
                map([(
                    "spec",
                    map([(
                        "containers",
                        Value::Sequence(vec![map([
                            ("name", s("app")),
                            (
                                "resources",
                                map([
                                    (
                                        "requests",
                                        map([
                                            ("cpu", s(&r.cpu_request)),
                                            ("memory", s(&r.memory_request)),
                                        ]),
                                    ),
                                    (
                                        "limits",
                                        map([
                                            ("cpu", s(&r.cpu_limit)),
                                            ("memory", s(&r.memory_limit)),
                                        ]),
                                    ),
                                ]),
                            ),
                        ])]),
                    )]),
                )]),
            )]),
        ),
    ])
}

fn replicas_patch(resolved: &ResolvedConfiguration) -> Value {
    map([
        ("apiVersion", s("apps/v1")),
        ("kind", s("Deployment")),
        ("metadata", map([("name", s(&resolved.tuple.service))])),
        ("spec", map([("replicas", num(resolved.size.replicas.min))])),
    ])
}

fn autoscaling_patch(resolved: &ResolvedConfiguration) -> Value {
    map([
        ("apiVersion", s("autoscaling/v2")),
        ("kind", s("HorizontalPodAutoscaler")),
        ("metadata", map([("name", s(&resolved.tuple.service))])),
        (
            "spec",
            map([
                ("minReplicas", num(resolved.size.replicas.min)),
                ("maxReplicas", num(resolved.size.replicas.max)),
                (
                    "metrics",
                    Value::Sequence(vec![map([
                        ("type", s("Resource")),
                        (
                            "resource",
                            map([
                                ("name", s("cpu")),
                                (
                                    "target",
                                    map([
                                        ("type", s("Utilization")),
                                        (
                                            "averageUtilization",
                                            num(resolved.size.autoscaling_target_cpu_pct),
                                        ),
                                    ]),
                                ),
                            ]),
                        ),
                    ])]),
                ),
            ]),
        ),
    ])
}

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (Value::String(k.to_string()), v))
            .collect(),
    )
}

fn s(value: impl Into<String>) -> Value {
    Value::String(value.into())
}

fn num(value: u32) -> Value {
    Value::Number(u64::from(value).into())
}
