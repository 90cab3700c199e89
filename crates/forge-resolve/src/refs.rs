//! Name lookups against the loaded catalog

use forge_catalog::{BehaviorProfile, Catalog, ProfileTemplate, ServiceSpec, SizeTier};

use crate::{Error, Result};

/// Everything a tuple needs from the catalog, resolved by name.
///
/// Borrows from the catalog snapshot; the snapshot outlives every
/// pipeline stage, so no cloning happens at this level.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedReferences<'c> {
    pub service: &'c ServiceSpec,
    pub archetype: &'c str,
    pub profile: &'c BehaviorProfile,
    pub components: &'c [String],
    pub size_name: &'c str,
    pub size: &'c SizeTier,
    pub cost_profile: &'c ProfileTemplate,
    pub monitoring_profile: &'c ProfileTemplate,
}

/// Resolve every reference a service declares.
///
/// A dangling name is fatal for this tuple only; batch runs keep
/// processing sibling tuples.
pub fn resolve_references<'c>(
    catalog: &'c Catalog,
    service_name: &str,
) -> Result<ResolvedReferences<'c>> {
    let service = catalog
        .service(service_name)
        .ok_or_else(|| unknown("services", service_name, service_name))?;

    let profile = catalog
        .profiles
        .get(&service.profile)
        .ok_or_else(|| unknown("profiles", &service.profile, service_name))?;

    let size = catalog
        .sizes
        .get(&service.size)
        .ok_or_else(|| unknown("sizes", &service.size, service_name))?;

    let cost_profile = catalog
        .cost_profiles
        .get(&service.cost_profile)
        .ok_or_else(|| unknown("cost-profiles", &service.cost_profile, service_name))?;

    let monitoring_profile = catalog
        .monitoring_profiles
        .get(&service.monitoring_profile)
        .ok_or_else(|| unknown("monitoring-profiles", &service.monitoring_profile, service_name))?;

    Ok(ResolvedReferences {
        service,
        archetype: &service.archetype,
        profile,
        components: &profile.components,
        size_name: &service.size,
        size,
        cost_profile,
        monitoring_profile,
    })
}

fn unknown(table: &str, name: &str, service: &str) -> Error {
    Error::UnknownReference {
        table: table.to_string(),
        name: name.to_string(),
        service: service.to_string(),
    }
}
