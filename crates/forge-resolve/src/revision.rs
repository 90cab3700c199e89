//! Revision resolution with the channel/pin fallback chain
//!
//! Per tuple, first match terminates:
//!
//! 1. the service's own channel, resolved through the channel table;
//! 2. a region pin for (environment, region);
//! 3. the environment's default channel;
//! 4. the environment pin;
//! 5. nothing applies — fatal for the tuple.
//!
//! The chain is evaluated fresh per tuple and never cached across
//! services: a service's explicit channel must never be shadowed by a
//! pin resolved for some other service.

use forge_catalog::{Catalog, PinTarget, ServiceSpec};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which fallback rule produced the revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevisionRule {
    ServiceChannel,
    RegionPin,
    DefaultChannel,
    EnvironmentPin,
}

/// The outcome of revision resolution for one tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRevision {
    /// The immutable revision identifier (tag or commit).
    pub revision: String,

    /// The rule that terminated the chain.
    pub rule: RevisionRule,

    /// The channel the revision came through, when one was involved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Walk the fallback chain for one tuple.
pub fn resolve_revision(
    catalog: &Catalog,
    service: &ServiceSpec,
    environment: &str,
    region: &str,
) -> Result<ResolvedRevision> {
    // 1. Explicit service channel.
    if let Some(channel) = &service.channel {
        let revision = lookup_channel(catalog, channel, &service.name)?;
        tracing::debug!(service = %service.name, %channel, %revision, "Revision via service channel");
        return Ok(ResolvedRevision {
            revision,
            rule: RevisionRule::ServiceChannel,
            channel: Some(channel.clone()),
        });
    }

    // 2. Region pin.
    if let Some(target) = catalog.pins.region(environment, region) {
        let resolved = resolve_pin_target(catalog, target, &service.name)?;
        tracing::debug!(service = %service.name, %environment, %region, revision = %resolved.0, "Revision via region pin");
        return Ok(ResolvedRevision {
            revision: resolved.0,
            rule: RevisionRule::RegionPin,
            channel: resolved.1,
        });
    }

    let env_entry = catalog.pins.environment(environment);

    // 3. Environment default channel.
    if let Some(channel) = env_entry.and_then(|e| e.default_channel.as_ref()) {
        let revision = lookup_channel(catalog, channel, &service.name)?;
        tracing::debug!(service = %service.name, %environment, %channel, %revision, "Revision via default channel");
        return Ok(ResolvedRevision {
            revision,
            rule: RevisionRule::DefaultChannel,
            channel: Some(channel.clone()),
        });
    }

    // 4. Environment pin.
    if let Some(entry) = env_entry
        && !entry.pin.is_empty()
    {
        let resolved = resolve_pin_target(catalog, &entry.pin, &service.name)?;
        tracing::debug!(service = %service.name, %environment, revision = %resolved.0, "Revision via environment pin");
        return Ok(ResolvedRevision {
            revision: resolved.0,
            rule: RevisionRule::EnvironmentPin,
            channel: resolved.1,
        });
    }

    Err(Error::NoRevisionResolved {
        service: service.name.clone(),
        environment: environment.to_string(),
        region: region.to_string(),
    })
}

/// Resolve a pin target: a raw revision, or a channel with exactly one
/// hop through the channel table.
fn resolve_pin_target(
    catalog: &Catalog,
    target: &PinTarget,
    service: &str,
) -> Result<(String, Option<String>)> {
    if let Some(revision) = &target.revision {
        return Ok((revision.clone(), None));
    }
    if let Some(channel) = &target.channel {
        let revision = lookup_channel(catalog, channel, service)?;
        return Ok((revision, Some(channel.clone())));
    }
    // Load-time validation rejects empty pins; an empty one reaching
    // here means the table was built by hand.
    Err(Error::UnknownReference {
        table: "pins".to_string(),
        name: "<empty pin>".to_string(),
        service: service.to_string(),
    })
}

fn lookup_channel(catalog: &Catalog, channel: &str, service: &str) -> Result<String> {
    catalog
        .channels
        .get(channel)
        .cloned()
        .ok_or_else(|| Error::UnknownReference {
            table: "channels".to_string(),
            name: channel.to_string(),
            service: service.to_string(),
        })
}
