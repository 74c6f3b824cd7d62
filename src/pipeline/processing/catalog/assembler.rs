use tracing::debug;

use crate::constants::{ANSS_CATALOG_NAMESPACE, ANSS_CATALOG_PREFIX, EP_PID, REGION};
use crate::domain::Catalog;
use crate::error::Result;
use crate::pipeline::output::NamespaceMap;
use crate::pipeline::processing::catalog::builder::BuiltEvent;
use crate::types::EventRecord;

/// A catalog ready for serialization, with the extra namespaces its
/// vendor attributes live in
#[derive(Debug, Clone)]
pub struct AssembledCatalog {
    pub catalog: Catalog,
    pub namespaces: NamespaceMap,
}

/// Wrap the single built event in a catalog carrying the `epPid` resource id
pub fn assemble_catalog(record: &EventRecord, built: BuiltEvent) -> Result<AssembledCatalog> {
    let resource_id = record.require(EP_PID)?.to_string();

    let mut namespaces = NamespaceMap::new();
    namespaces.insert(ANSS_CATALOG_PREFIX, ANSS_CATALOG_NAMESPACE);

    let description = record
        .get_non_empty(REGION)
        .map(|region| format!("{} ({})", built.event.anss.eventid, region));

    debug!("Assembled catalog {}", resource_id);
    Ok(AssembledCatalog {
        catalog: Catalog {
            resource_id,
            description,
            creation_info: built.creation_info,
            events: vec![built.event],
        },
        namespaces,
    })
}
