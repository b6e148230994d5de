//! First pass: collect snapshot-valued properties across the reactor

use super::context::PropertyVersions;
use crate::domain::{Module, Reactor};
use crate::error::{ReleaseError, Result};
use crate::version::{self, SNAPSHOT_SUFFIX};

/// Record every snapshot-valued property the module declares
pub fn scan(module: &Module, versions: &mut PropertyVersions) -> Result<()> {
    for (name, value) in &module.properties {
        if !value.ends_with(SNAPSHOT_SUFFIX) {
            continue;
        }

        let next = version::next_development_value(value).map_err(|e| {
            ReleaseError::version(format!(
                "property '{}' of '{}' has value '{}': {}",
                name, module.name, value, e
            ))
        })?;
        let release = version::release_value(value);

        tracing::info!(
            "Property {} = {}: next {}, release {}",
            name,
            value,
            next,
            release
        );
        versions.record(name, next, release);
    }
    Ok(())
}

/// Run [`scan`] over every module in reactor order
pub fn scan_reactor(reactor: &Reactor) -> Result<PropertyVersions> {
    let mut versions = PropertyVersions::new();
    for module in reactor {
        scan(module, &mut versions)?;
    }
    Ok(versions)
}
