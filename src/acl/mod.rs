//! ACL declarations and their mapping onto the Kafka admin protocol
//!
//! This module holds everything that does not need a broker: the declaration
//! model, the token/wire-code codec, request translation, import parsing and
//! drift reconciliation.

pub mod codec;
pub mod import;
pub mod model;
pub mod reconcile;
pub mod translate;

pub use codec::{
    AclOperation, AclPatternType, AclPermissionType, AclResourceType, EnumKind, WireEnum,
    UNKNOWN_CONVERSION,
};
pub use import::parse_import_id;
pub use model::{Acl, AclDeclaration, Resource};
pub use reconcile::{reconcile, AclPatch, ObservedAcl, ObservedAcls, Reconciliation, ResourceAcls};
pub use translate::{to_creation_spec, to_filter_spec, CreationSpec, FilterSpec};
