//! The immutable catalog snapshot and its static validation

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use regex::Regex;
use serde_yaml::Value;

use crate::schema::{
    BehaviorProfile, PinTarget, ProfileTemplate, ServiceSpec, SizeTier,
};
use crate::{Error, Result};

/// The loaded catalog: every declarative table, parsed and validated.
///
/// Loaded once per run and passed by reference through the pipeline.
/// Never mutated after [`CatalogLoader`](crate::CatalogLoader) returns
/// it, so concurrent tuple tasks can share it freely.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub services: BTreeMap<String, ServiceSpec>,
    pub profiles: BTreeMap<String, BehaviorProfile>,
    pub sizes: BTreeMap<String, SizeTier>,
    pub cost_profiles: BTreeMap<String, ProfileTemplate>,
    pub monitoring_profiles: BTreeMap<String, ProfileTemplate>,
    pub channels: BTreeMap<String, String>,
    pub pins: crate::schema::PinTable,

    /// Table name -> originating file, for error messages.
    pub(crate) sources: BTreeMap<String, PathBuf>,
}

impl Catalog {
    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.get(name)
    }

    /// The known environment set: the union of every service's enabled
    /// environments and the pin table's environment keys. Profile
    /// per-environment override keys must fall inside it.
    pub fn known_environments(&self) -> BTreeSet<String> {
        let mut set: BTreeSet<String> = self
            .services
            .values()
            .flat_map(|s| s.environments.iter().cloned())
            .collect();
        set.extend(self.pins.environments.keys().cloned());
        set
    }

    /// File that defines `table`, for diagnostics.
    pub fn source_file(&self, table: &str) -> PathBuf {
        self.sources
            .get(table)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(format!("{table}.yaml")))
    }

    /// Validate every catalog-level invariant.
    ///
    /// Dangling service references (profile, size, cost profile, ...)
    /// are deliberately NOT checked here: those are per-tuple
    /// `UnknownReference` failures that must not abort sibling tuples.
    /// Everything checked here is fatal for the whole run.
    pub fn validate(&self) -> Result<()> {
        let name_re = Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap();
        let cc_re = Regex::new(r"^CC-\d{5}$").unwrap();
        let known_envs = self.known_environments();

        for (name, service) in &self.services {
            let file = self.source_file(&format!("services/{name}"));

            if !name_re.is_match(name) {
                return Err(Error::schema(
                    &file,
                    format!("service name '{name}' is not a DNS label"),
                ));
            }
            if service.name != *name {
                return Err(Error::schema(
                    &file,
                    format!(
                        "service name '{}' does not match its key '{name}'",
                        service.name
                    ),
                ));
            }
            if service.environments.is_empty() {
                return Err(Error::schema(&file, "service declares no environments"));
            }
            if service.regions.is_empty() {
                return Err(Error::schema(&file, "service declares no regions"));
            }
            if !cc_re.is_match(&service.cost_center) {
                return Err(Error::schema(
                    &file,
                    format!(
                        "cost_center '{}' does not match CC-NNNNN",
                        service.cost_center
                    ),
                ));
            }

            // Profile/archetype coupling is one-directional: the profile
            // names the archetypes it supports.
            if let Some(profile) = self.profiles.get(&service.profile)
                && !profile.compatible_archetypes.is_empty()
                && !profile.compatible_archetypes.contains(&service.archetype)
            {
                return Err(Error::schema(
                    &file,
                    format!(
                        "archetype '{}' is not compatible with profile '{}' (allowed: {})",
                        service.archetype,
                        service.profile,
                        profile.compatible_archetypes.join(", ")
                    ),
                ));
            }

            self.check_no_budgets_in_layer(
                &file,
                "cost override",
                service.overrides.cost.defaults.as_ref(),
            )?;
            for layer in service.overrides.cost.environments.values() {
                self.check_no_budgets_in_layer(&file, "cost override", Some(layer))?;
            }
        }

        let sizes_file = self.source_file("sizes");
        let mut orders = BTreeSet::new();
        for (name, size) in &self.sizes {
            if size.multiplier <= 0.0 {
                return Err(Error::schema(
                    &sizes_file,
                    format!("size '{name}' has non-positive multiplier {}", size.multiplier),
                ));
            }
            if !orders.insert(size.order) {
                return Err(Error::schema(
                    &sizes_file,
                    format!("size '{name}' reuses order {}", size.order),
                ));
            }
            if size.replicas.min > size.replicas.max {
                return Err(Error::schema(
                    &sizes_file,
                    format!(
                        "size '{name}' has replica min {} above max {}",
                        size.replicas.min, size.replicas.max
                    ),
                ));
            }
        }

        self.validate_profile_envs("profiles", self.profiles.iter().map(|(k, v)| (k, &v.template)), &known_envs)?;
        self.validate_profile_envs("cost-profiles", self.cost_profiles.iter(), &known_envs)?;
        self.validate_profile_envs(
            "monitoring-profiles",
            self.monitoring_profiles.iter(),
            &known_envs,
        )?;

        let cost_file = self.source_file("cost-profiles");
        for template in self.cost_profiles.values() {
            for layer in template.environments.values() {
                self.check_no_budgets_in_layer(&cost_file, "environment override", Some(layer))?;
            }
        }

        self.validate_pins()?;

        Ok(())
    }

    fn validate_profile_envs<'a>(
        &self,
        table: &str,
        profiles: impl Iterator<Item = (&'a String, &'a ProfileTemplate)>,
        known_envs: &BTreeSet<String>,
    ) -> Result<()> {
        let file = self.source_file(table);
        for (name, template) in profiles {
            for env in template.environments.keys() {
                if !known_envs.contains(env) {
                    return Err(Error::schema(
                        &file,
                        format!(
                            "profile '{name}' overrides unknown environment '{env}' \
                             (known: {})",
                            known_envs.iter().cloned().collect::<Vec<_>>().join(", ")
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Quantities scale, they are never replaced: an override layer that
    /// carries raw `budgets` would silently replace the scaled totals,
    /// so it is rejected at load time. Scaling goes through `multiplier`.
    fn check_no_budgets_in_layer(
        &self,
        file: &PathBuf,
        layer_kind: &str,
        layer: Option<&Value>,
    ) -> Result<()> {
        if let Some(Value::Mapping(map)) = layer
            && map.contains_key("budgets")
        {
            return Err(Error::schema(
                file,
                format!(
                    "{layer_kind} carries a raw 'budgets' key; \
                     budget changes must use 'multiplier'"
                ),
            ));
        }
        Ok(())
    }

    fn validate_pins(&self) -> Result<()> {
        let file = self.source_file("pins");

        for (env, entry) in &self.pins.environments {
            self.validate_pin_target(&file, &format!("environment '{env}'"), &entry.pin, true)?;
            if let Some(channel) = &entry.default_channel
                && !self.channels.contains_key(channel)
            {
                return Err(Error::schema(
                    &file,
                    format!("environment '{env}' default_channel '{channel}' is not in the channel table"),
                ));
            }
        }

        for (env, regions) in &self.pins.regions {
            for (region, target) in regions {
                self.validate_pin_target(
                    &file,
                    &format!("region '{region}' in environment '{env}'"),
                    target,
                    false,
                )?;
            }
        }

        Ok(())
    }

    fn validate_pin_target(
        &self,
        file: &PathBuf,
        what: &str,
        target: &PinTarget,
        allow_empty: bool,
    ) -> Result<()> {
        match (&target.revision, &target.channel) {
            (Some(_), Some(_)) => Err(Error::schema(
                file,
                format!("{what} pin sets both 'revision' and 'channel'; exactly one is allowed"),
            )),
            (None, None) if !allow_empty => Err(Error::schema(
                file,
                format!("{what} pin sets neither 'revision' nor 'channel'"),
            )),
            (None, Some(channel)) => {
                // One level of indirection only: the channel must map
                // straight to a revision.
                if !self.channels.contains_key(channel) {
                    return Err(Error::schema(
                        file,
                        format!("{what} pin references unknown channel '{channel}'"),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
