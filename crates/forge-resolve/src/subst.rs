//! Variable substitution over parsed configuration trees
//!
//! Substitution runs on the structured tree (mapping/sequence/scalar),
//! never on serialized text, so placeholder detection is exact and
//! serialization happens once, at assembly time. `{key}` tokens in
//! string leaves are expanded from the tuple's context; `{{` and `}}`
//! escape literal braces.

use std::collections::BTreeMap;

use forge_catalog::ServiceSpec;
use serde_yaml::{Mapping, Value};

use crate::{Error, Result};

/// The substitution context for one tuple.
#[derive(Debug, Clone)]
pub struct SubstitutionContext {
    values: BTreeMap<String, String>,
}

impl SubstitutionContext {
    /// Build the context from a service entry and the tuple coordinates.
    pub fn new(service: &ServiceSpec, environment: &str, region: &str) -> Self {
        let mut values = BTreeMap::new();
        values.insert("service".to_string(), service.name.clone());
        values.insert("owner".to_string(), service.owner.clone());
        // Billing tooling historically addresses the owner as costOwner.
        values.insert("costOwner".to_string(), service.owner.clone());
        values.insert("team".to_string(), service.team.clone());
        values.insert("costCenter".to_string(), service.cost_center.clone());
        values.insert("businessUnit".to_string(), service.business_unit.clone());
        values.insert("environment".to_string(), environment.to_string());
        values.insert("region".to_string(), region.to_string());
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterate over all context pairs (for label generation).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expand every placeholder in a whole tree.
    ///
    /// Substitution is total: an unknown token fails the tuple rather
    /// than leaving the placeholder in place.
    pub fn substitute_tree(&self, value: &Value) -> Result<Value> {
        let mut path = Vec::new();
        self.substitute_value(value, &mut path)
    }

    /// Expand placeholders in a single string.
    pub fn substitute_str(&self, input: &str, path: &str) -> Result<String> {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut token = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(t) => token.push(t),
                            None => {
                                return Err(Error::MalformedTemplate {
                                    path: path.to_string(),
                                    message: format!("unterminated placeholder '{{{token}'"),
                                });
                            }
                        }
                    }
                    match self.get(&token) {
                        Some(replacement) => out.push_str(replacement),
                        None => {
                            return Err(Error::UnboundVariable {
                                token,
                                path: path.to_string(),
                            });
                        }
                    }
                }
                other => out.push(other),
            }
        }

        Ok(out)
    }

    fn substitute_value(&self, value: &Value, path: &mut Vec<String>) -> Result<Value> {
        match value {
            Value::String(s) => {
                let rendered = self.substitute_str(s, &render_path(path))?;
                Ok(Value::String(rendered))
            }
            Value::Sequence(seq) => {
                let mut out = Vec::with_capacity(seq.len());
                for (idx, item) in seq.iter().enumerate() {
                    path.push(format!("[{idx}]"));
                    out.push(self.substitute_value(item, path)?);
                    path.pop();
                }
                Ok(Value::Sequence(out))
            }
            Value::Mapping(map) => {
                let mut out = Mapping::new();
                for (key, val) in map {
                    path.push(key_segment(key));
                    out.insert(key.clone(), self.substitute_value(val, path)?);
                    path.pop();
                }
                Ok(Value::Mapping(out))
            }
            other => Ok(other.clone()),
        }
    }
}

fn key_segment(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

fn render_path(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        if segment.starts_with('[') {
            out.push_str(segment);
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(segment);
        }
    }
    if out.is_empty() { "<root>".to_string() } else { out }
}
