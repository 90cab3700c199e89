//! Workspace validation
//!
//! Read-only scan of an assembled workspace. Structural corruption
//! (missing/unparseable descriptor, dangling or non-local paths,
//! leftover placeholders in generated files) raises; policy findings
//! (budget ordering, label completeness) are collected into the report
//! and never abort the scan.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use forge_fs::{NormalizedPath, io};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::descriptor::{BuildDescriptor, DESCRIPTOR_FILE};
use crate::{Error, Result};

/// Canonical promotion order used for the budget monotonicity check.
pub const ENVIRONMENT_ORDER: [&str; 3] = ["int-stable", "pre-stable", "prod"];

/// Cost labels every workspace must carry.
pub const REQUIRED_COST_LABELS: [&str; 5] = [
    "cost.service",
    "cost.team",
    "cost.environment",
    "cost.costCenter",
    "cost.businessUnit",
];

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Broken workspace; the build step must not consume it.
    Structural,
    /// Policy violation; fatal only when the caller opts into strict
    /// mode.
    Policy,
}

/// One validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// The structured validation report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn structural(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Structural)
    }

    pub fn policy(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Policy)
    }

    /// Whether the workspace passes under the given strictness.
    pub fn passed(&self, strict: bool) -> bool {
        if self.structural().next().is_some() {
            return false;
        }
        !(strict && self.policy().next().is_some())
    }

    fn push(
        &mut self,
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        path: Option<String>,
    ) {
        self.findings.push(Finding {
            severity,
            code: code.to_string(),
            message: message.into(),
            path,
        });
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[A-Za-z][A-Za-z0-9_]*\}").unwrap())
}

/// Validate an assembled workspace.
///
/// Returns `Err` only for structural corruption that prevents the scan
/// itself (no descriptor, unparseable documents). Everything the scan
/// can describe lands in the report.
pub fn validate_workspace(root: &NormalizedPath) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    let descriptor_path = root.join(DESCRIPTOR_FILE);
    if !descriptor_path.is_file() {
        return Err(Error::corrupt(
            descriptor_path.to_native(),
            "descriptor not found; not an assembled workspace",
        ));
    }

    let descriptor: BuildDescriptor = serde_yaml::from_str(&io::read_text(&descriptor_path)?)
        .map_err(|e| Error::corrupt(descriptor_path.to_native(), e.to_string()))?;

    check_local_paths(root, &descriptor, &mut report);
    check_placeholders(root, &descriptor, &mut report)?;
    check_budget_order(&descriptor.budgets, &mut report);
    check_labels(&descriptor.labels, &mut report);

    Ok(report)
}

/// Every referenced path must stay inside the workspace and exist.
fn check_local_paths(
    root: &NormalizedPath,
    descriptor: &BuildDescriptor,
    report: &mut ValidationReport,
) {
    for rel in descriptor.fragments.iter().chain(descriptor.patches.iter()) {
        if rel.starts_with('/') || rel.contains("://") || rel.split('/').any(|seg| seg == "..") {
            report.push(
                Severity::Structural,
                "non-local-path",
                format!("descriptor references a non-local path '{rel}'"),
                Some(rel.clone()),
            );
            continue;
        }
        if !root.join(rel).exists() {
            report.push(
                Severity::Structural,
                "dangling-path",
                format!("descriptor references '{rel}' which does not exist"),
                Some(rel.clone()),
            );
        }
    }
}

/// Generated files must be fully substituted. Fragment copies are
/// opaque source material and are not scanned; placeholders only ever
/// pass through the substitution engine on the generated side.
fn check_placeholders(
    root: &NormalizedPath,
    descriptor: &BuildDescriptor,
    report: &mut ValidationReport,
) -> Result<()> {
    let mut generated: Vec<String> = vec![
        "labels.yaml".into(),
        "cost.yaml".into(),
        "monitoring.yaml".into(),
        DESCRIPTOR_FILE.into(),
    ];
    generated.extend(descriptor.patches.iter().cloned());

    for rel in generated {
        let path = root.join(&rel);
        if !path.is_file() {
            continue; // reported by check_local_paths
        }
        let content = io::read_text(&path)?;
        if let Some(found) = placeholder_re().find(&content) {
            report.push(
                Severity::Structural,
                "unsubstituted-placeholder",
                format!("'{}' contains unsubstituted placeholder {}", rel, found.as_str()),
                Some(rel.clone()),
            );
        }
    }

    Ok(())
}

/// Budgets must not decrease along the promotion order.
fn check_budget_order(budgets: &BTreeMap<String, f64>, report: &mut ValidationReport) {
    let present: Vec<(&str, f64)> = ENVIRONMENT_ORDER
        .iter()
        .filter_map(|env| budgets.get(*env).map(|v| (*env, *v)))
        .collect();

    for pair in present.windows(2) {
        let (lower_env, lower) = pair[0];
        let (upper_env, upper) = pair[1];
        if lower > upper {
            report.push(
                Severity::Policy,
                "budget-order",
                format!(
                    "budget for {lower_env} ({lower}) exceeds {upper_env} ({upper}); \
                     budgets must be non-decreasing along the promotion order"
                ),
                None,
            );
        }
    }
}

/// The required cost label set must be present and well-formed.
fn check_labels(labels: &BTreeMap<String, String>, report: &mut ValidationReport) {
    for required in REQUIRED_COST_LABELS {
        match labels.get(required) {
            None => report.push(
                Severity::Policy,
                "missing-label",
                format!("required label '{required}' is missing"),
                None,
            ),
            Some(value) if value.is_empty() => report.push(
                Severity::Policy,
                "empty-label",
                format!("required label '{required}' is empty"),
                None,
            ),
            Some(_) => {}
        }
    }

    if let Some(cc) = labels.get("cost.costCenter") {
        static CC: OnceLock<Regex> = OnceLock::new();
        let cc_re = CC.get_or_init(|| Regex::new(r"^CC-\d{5}$").unwrap());
        if !cc_re.is_match(cc) {
            report.push(
                Severity::Policy,
                "cost-center-format",
                format!("cost.costCenter '{cc}' does not match CC-NNNNN"),
                None,
            );
        }
    }
}
