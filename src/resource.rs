//! ACL resource lifecycle for a declarative-resource framework
//!
//! The framework owns the record: seven string attributes plus an identifier
//! slot, where an empty identifier means "does not exist". This module maps
//! that record onto declarations and runs the create/read/delete/import hooks.

use crate::acl::{parse_import_id, reconcile, AclDeclaration, AclPatch, Reconciliation};
use crate::error::Result;
use crate::gateway::AclGateway;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info};

pub const ACL_PRINCIPAL: &str = "acl_principal";
pub const ACL_HOST: &str = "acl_host";
pub const ACL_OPERATION: &str = "acl_operation";
pub const ACL_PERMISSION_TYPE: &str = "acl_permission_type";
pub const RESOURCE_TYPE: &str = "resource_type";
pub const RESOURCE_NAME: &str = "resource_name";
pub const RESOURCE_PATTERN_TYPE_FILTER: &str = "resource_pattern_type_filter";

/// Attribute names in canonical identifier order
pub const ATTRIBUTES: [&str; 7] = [
    ACL_PRINCIPAL,
    ACL_HOST,
    ACL_OPERATION,
    ACL_PERMISSION_TYPE,
    RESOURCE_TYPE,
    RESOURCE_NAME,
    RESOURCE_PATTERN_TYPE_FILTER,
];

pub const DEFAULT_PATTERN_TYPE_FILTER: &str = "Literal";

pub const SCHEMA_VERSION: u32 = 1;

/// Record access the framework provides
pub trait ResourceData {
    fn get(&self, key: &str) -> Option<&str>;

    fn set(&mut self, key: &str, value: &str);

    fn id(&self) -> &str;

    /// An empty id marks the resource as gone
    fn set_id(&mut self, id: &str);
}

/// Serializable record, used by the admin binary as its state file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub schema_version: u32,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ..Default::default()
        }
    }

    /// Record holding a declaration's attributes, with no identifier yet
    pub fn from_declaration(decl: &AclDeclaration) -> Self {
        let mut state = Self::new();
        write_declaration(&mut state, decl);
        state
    }

    /// Record holding only an external identifier, ready for import
    pub fn for_import(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::new()
        }
    }

    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }
}

impl ResourceData for ResourceState {
    fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}

/// Upgrade a state written by an older schema.
///
/// Version 0 predates pattern type filters; such records were literal.
pub fn migrate_state(state: &mut ResourceState) {
    if state.schema_version >= SCHEMA_VERSION {
        return;
    }
    info!(
        "Migrating ACL state from schema version {} to {}",
        state.schema_version, SCHEMA_VERSION
    );
    if state.get(RESOURCE_PATTERN_TYPE_FILTER).is_none() {
        state.set(RESOURCE_PATTERN_TYPE_FILTER, DEFAULT_PATTERN_TYPE_FILTER);
    }
    state.schema_version = SCHEMA_VERSION;
}

/// Read a declaration from a record. Missing attributes read as empty,
/// except the pattern type filter which defaults to `Literal`.
pub fn read_declaration(d: &dyn ResourceData) -> AclDeclaration {
    let field = |key: &str| d.get(key).unwrap_or_default().to_string();
    let mut decl = AclDeclaration::from_fields(ATTRIBUTES.map(field));
    if d.get(RESOURCE_PATTERN_TYPE_FILTER).is_none() {
        decl.resource.pattern_type_filter = DEFAULT_PATTERN_TYPE_FILTER.to_string();
    }
    decl
}

pub fn write_declaration(d: &mut dyn ResourceData, decl: &AclDeclaration) {
    for (key, value) in ATTRIBUTES.iter().zip(decl.fields()) {
        d.set(key, value);
    }
}

/// Copy drifted values onto a record. Resource type, name and id are untouched.
pub fn apply_patch(d: &mut dyn ResourceData, patch: &AclPatch) {
    d.set(ACL_PRINCIPAL, &patch.principal);
    d.set(ACL_HOST, &patch.host);
    d.set(ACL_OPERATION, &patch.operation);
    d.set(ACL_PERMISSION_TYPE, &patch.permission_type);
    d.set(RESOURCE_PATTERN_TYPE_FILTER, &patch.pattern_type_filter);
}

/// Lifecycle hooks for the ACL resource type
pub struct AclResource {
    gateway: AclGateway,
}

impl AclResource {
    pub fn new(gateway: AclGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &AclGateway {
        &self.gateway
    }

    /// Create the ACL and set the record id once the cluster accepted it
    pub async fn on_create(&self, d: &mut dyn ResourceData) -> Result<()> {
        let decl = read_declaration(d);
        info!("Creating ACL {}", decl);

        if let Err(e) = self.gateway.create_acl(&decl).await {
            error!("Failed to create ACL: {}", e);
            return Err(e);
        }

        d.set_id(&decl.id());
        Ok(())
    }

    /// Compare the record with the cluster and heal drift in place
    pub async fn on_read(&self, d: &mut dyn ResourceData) -> Result<Reconciliation> {
        let decl = read_declaration(d);
        info!("Reading ACL {}", decl);

        let observed = self.gateway.list_acls().await?;
        let outcome = reconcile(&decl, &observed);
        match &outcome {
            Reconciliation::Confirmed => {}
            Reconciliation::Drifted(patch) => {
                info!("ACL {} drifted, updating state", decl);
                apply_patch(d, patch);
            }
            Reconciliation::NotFound => d.set_id(""),
        }
        Ok(outcome)
    }

    pub async fn on_delete(&self, d: &mut dyn ResourceData) -> Result<()> {
        let decl = read_declaration(d);
        info!("Deleting ACL {}", decl);
        self.gateway.delete_acl(&decl).await
    }

    /// Populate all seven attributes from the record's external id
    pub fn on_import(d: &mut dyn ResourceData) -> Result<AclDeclaration> {
        let decl = parse_import_id(d.id())?;
        info!("Importing ACL {}", decl);
        write_declaration(d, &decl);
        Ok(decl)
    }
}
