//! Translation of declarations into Kafka admin request shapes
//!
//! Both translations validate every enum token first and fail on the first
//! unmapped one, in the order operation, permission type, resource type,
//! pattern type filter. Nothing here touches the network.

use super::codec::{AclOperation, AclPatternType, AclPermissionType, AclResourceType, WireEnum};
use super::model::AclDeclaration;
use crate::error::Result;

use kafka_protocol::messages::create_acls_request::AclCreation;
use kafka_protocol::messages::delete_acls_request::DeleteAclsFilter;
use kafka_protocol::messages::DescribeAclsRequest;
use kafka_protocol::protocol::StrBytes;

/// ACL half of a creation request with validated enum codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireAcl {
    pub principal: String,
    pub host: String,
    pub operation: AclOperation,
    pub permission_type: AclPermissionType,
}

/// Resource half of a creation request with validated enum codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResource {
    pub resource_type: AclResourceType,
    pub name: String,
    pub pattern_type: AclPatternType,
}

/// Everything a CreateAcls entry needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationSpec {
    pub acl: WireAcl,
    pub resource: WireResource,
}

/// Filter shared by DeleteAcls and DescribeAcls.
///
/// `None` string filters match anything; enum filters use the `Any` variants
/// to the same effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub principal: Option<String>,
    pub host: Option<String>,
    pub resource_name: Option<String>,
    pub operation: AclOperation,
    pub permission_type: AclPermissionType,
    pub resource_type: AclResourceType,
    pub pattern_type: AclPatternType,
}

struct ValidatedEnums {
    operation: AclOperation,
    permission_type: AclPermissionType,
    resource_type: AclResourceType,
    pattern_type: AclPatternType,
}

fn validate_enums(decl: &AclDeclaration) -> Result<ValidatedEnums> {
    Ok(ValidatedEnums {
        operation: AclOperation::parse_token(&decl.acl.operation)?,
        permission_type: AclPermissionType::parse_token(&decl.acl.permission_type)?,
        resource_type: AclResourceType::parse_token(&decl.resource.resource_type)?,
        pattern_type: AclPatternType::parse_token(&decl.resource.pattern_type_filter)?,
    })
}

/// Translate a declaration into a creation entry
pub fn to_creation_spec(decl: &AclDeclaration) -> Result<CreationSpec> {
    let enums = validate_enums(decl)?;
    Ok(CreationSpec {
        acl: WireAcl {
            principal: decl.acl.principal.clone(),
            host: decl.acl.host.clone(),
            operation: enums.operation,
            permission_type: enums.permission_type,
        },
        resource: WireResource {
            resource_type: enums.resource_type,
            name: decl.resource.name.clone(),
            pattern_type: enums.pattern_type,
        },
    })
}

/// Translate a declaration into an exact-match filter.
///
/// Principal, host and resource name are always set, never wildcarded.
pub fn to_filter_spec(decl: &AclDeclaration) -> Result<FilterSpec> {
    let enums = validate_enums(decl)?;
    Ok(FilterSpec {
        principal: Some(decl.acl.principal.clone()),
        host: Some(decl.acl.host.clone()),
        resource_name: Some(decl.resource.name.clone()),
        operation: enums.operation,
        permission_type: enums.permission_type,
        resource_type: enums.resource_type,
        pattern_type: enums.pattern_type,
    })
}

fn str_bytes(value: &str) -> StrBytes {
    StrBytes::from_string(value.to_string())
}

fn optional_str_bytes(value: &Option<String>) -> Option<StrBytes> {
    value.as_deref().map(str_bytes)
}

impl CreationSpec {
    pub fn to_creation(&self) -> AclCreation {
        AclCreation::default()
            .with_resource_type(self.resource.resource_type.code())
            .with_resource_name(str_bytes(&self.resource.name))
            .with_resource_pattern_type(self.resource.pattern_type.code())
            .with_principal(str_bytes(&self.acl.principal))
            .with_host(str_bytes(&self.acl.host))
            .with_operation(self.acl.operation.code())
            .with_permission_type(self.acl.permission_type.code())
    }
}

impl FilterSpec {
    /// Unfiltered listing of one resource type
    pub fn all_of_type(resource_type: AclResourceType) -> Self {
        Self {
            principal: None,
            host: None,
            resource_name: None,
            operation: AclOperation::Any,
            permission_type: AclPermissionType::Any,
            resource_type,
            pattern_type: AclPatternType::Any,
        }
    }

    pub fn to_delete_filter(&self) -> DeleteAclsFilter {
        DeleteAclsFilter::default()
            .with_resource_type_filter(self.resource_type.code())
            .with_resource_name_filter(optional_str_bytes(&self.resource_name))
            .with_pattern_type_filter(self.pattern_type.code())
            .with_principal_filter(optional_str_bytes(&self.principal))
            .with_host_filter(optional_str_bytes(&self.host))
            .with_operation(self.operation.code())
            .with_permission_type(self.permission_type.code())
    }

    pub fn to_describe_request(&self) -> DescribeAclsRequest {
        DescribeAclsRequest::default()
            .with_resource_type_filter(self.resource_type.code())
            .with_resource_name_filter(optional_str_bytes(&self.resource_name))
            .with_pattern_type_filter(self.pattern_type.code())
            .with_principal_filter(optional_str_bytes(&self.principal))
            .with_host_filter(optional_str_bytes(&self.host))
            .with_operation(self.operation.code())
            .with_permission_type(self.permission_type.code())
    }
}
