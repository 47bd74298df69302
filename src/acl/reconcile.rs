//! Read-time reconciliation of a declaration against observed cluster ACLs
//!
//! The reconciler is pure: it reports what the caller should do to its
//! record and leaves applying that outcome to the resource layer.

use super::codec::{
    AclOperation, AclPatternType, AclPermissionType, AclResourceType, WireEnum, UNKNOWN_CONVERSION,
};
use super::model::{Acl, AclDeclaration, Resource};

use kafka_protocol::messages::describe_acls_response::DescribeAclsResource;
use tracing::{debug, info, warn};

/// One ACL entry as listed by the cluster. Codes are kept raw so that values
/// this client does not understand survive into diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedAcl {
    pub principal: String,
    pub host: String,
    pub operation: i8,
    pub permission_type: i8,
}

/// ACLs the cluster holds for one (resource type, name, pattern type)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAcls {
    pub resource_type: i8,
    pub resource_name: String,
    pub pattern_type: i8,
    pub acls: Vec<ObservedAcl>,
}

/// Ordered snapshot of every ACL group a listing returned.
///
/// Built fresh for each operation. Order follows request order, then response
/// order, and decides tie-breaks during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedAcls {
    groups: Vec<ResourceAcls>,
}

impl ObservedAcl {
    pub fn operation_token(&self) -> &'static str {
        AclOperation::token_for_code(self.operation)
    }

    pub fn permission_type_token(&self) -> &'static str {
        AclPermissionType::token_for_code(self.permission_type)
    }
}

impl ResourceAcls {
    pub fn resource_type_token(&self) -> &'static str {
        AclResourceType::token_for_code(self.resource_type)
    }

    pub fn pattern_type_token(&self) -> &'static str {
        AclPatternType::token_for_code(self.pattern_type)
    }

    /// Every entry of this group as a full declaration, pattern type included
    pub fn declarations(&self) -> Vec<AclDeclaration> {
        self.acls
            .iter()
            .map(|entry| {
                AclDeclaration::new(
                    acl_from_entry(entry),
                    Resource::new(
                        self.resource_type_token(),
                        self.resource_name.clone(),
                        self.pattern_type_token(),
                    ),
                )
            })
            .collect()
    }
}

impl From<DescribeAclsResource> for ResourceAcls {
    fn from(resource: DescribeAclsResource) -> Self {
        Self {
            resource_type: resource.resource_type,
            resource_name: resource.resource_name.to_string(),
            pattern_type: resource.pattern_type,
            acls: resource
                .acls
                .into_iter()
                .map(|acl| ObservedAcl {
                    principal: acl.principal.to_string(),
                    host: acl.host.to_string(),
                    operation: acl.operation,
                    permission_type: acl.permission_type,
                })
                .collect(),
        }
    }
}

impl ObservedAcls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: ResourceAcls) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[ResourceAcls] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<ResourceAcls> {
        self.groups
    }

    /// Total number of ACL entries across all groups
    pub fn acl_count(&self) -> usize {
        self.groups.iter().map(|group| group.acls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn declarations(&self) -> Vec<AclDeclaration> {
        self.groups.iter().flat_map(ResourceAcls::declarations).collect()
    }
}

impl From<Vec<ResourceAcls>> for ObservedAcls {
    fn from(groups: Vec<ResourceAcls>) -> Self {
        Self { groups }
    }
}

impl Extend<ResourceAcls> for ObservedAcls {
    fn extend<I: IntoIterator<Item = ResourceAcls>>(&mut self, iter: I) {
        self.groups.extend(iter);
    }
}

/// Field values to copy onto a drifted record. Resource type and name are
/// never part of a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclPatch {
    pub principal: String,
    pub host: String,
    pub operation: String,
    pub permission_type: String,
    pub pattern_type_filter: String,
}

/// Outcome of reconciling one declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// An observed ACL matches the declaration exactly
    Confirmed,
    /// Only principal and operation matched; the record should take these values
    Drifted(AclPatch),
    /// Nothing matched; the record's identifier should be cleared
    NotFound,
}

fn acl_from_entry(entry: &ObservedAcl) -> Acl {
    Acl::new(
        entry.principal.clone(),
        entry.host.clone(),
        entry.operation_token(),
        entry.permission_type_token(),
    )
}

/// Decide whether `declared` is still present in `observed`.
///
/// The first exact match ends the scan. Among partial matches the last one
/// scanned wins.
pub fn reconcile(declared: &AclDeclaration, observed: &ObservedAcls) -> Reconciliation {
    let declared_id = declared.id();
    let mut patch = None;

    for group in observed.groups() {
        if group.resource_name != declared.resource.name || group.acls.is_empty() {
            continue;
        }
        info!(
            "Found ({}) ACL(s) for Resource {}: {:?}",
            group.acls.len(),
            group.resource_name,
            group
        );

        for entry in &group.acls {
            // the comparison borrows the declared pattern type filter
            let candidate = AclDeclaration::new(
                acl_from_entry(entry),
                Resource::new(
                    group.resource_type_token(),
                    declared.resource.name.clone(),
                    declared.resource.pattern_type_filter.clone(),
                ),
            );

            if candidate.id() == declared_id {
                debug!("Exact match for ACL {}", declared_id);
                return Reconciliation::Confirmed;
            }

            if candidate.acl.principal == declared.acl.principal
                && candidate.acl.operation == declared.acl.operation
            {
                let pattern_type = group.pattern_type_token();
                // unmapped codes must never reach the record
                if candidate.acl.permission_type == UNKNOWN_CONVERSION
                    || pattern_type == UNKNOWN_CONVERSION
                {
                    warn!(
                        "Ignoring partial match for ACL {} with unmapped codes: {:?}",
                        declared_id, entry
                    );
                    continue;
                }
                debug!("Partial match for ACL {}: {}", declared_id, candidate);
                patch = Some(AclPatch {
                    principal: candidate.acl.principal,
                    host: candidate.acl.host,
                    operation: candidate.acl.operation,
                    permission_type: candidate.acl.permission_type,
                    pattern_type_filter: pattern_type.to_string(),
                });
            }
        }
    }

    match patch {
        Some(patch) => Reconciliation::Drifted(patch),
        None => {
            info!("Did not find ACL {}", declared_id);
            Reconciliation::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> AclDeclaration {
        AclDeclaration::new(
            Acl::new("User:alice", "*", "Read", "Allow"),
            Resource::new("Topic", "orders", "Literal"),
        )
    }

    fn entry(principal: &str, host: &str, operation: AclOperation, permission: AclPermissionType) -> ObservedAcl {
        ObservedAcl {
            principal: principal.to_string(),
            host: host.to_string(),
            operation: operation.code(),
            permission_type: permission.code(),
        }
    }

    fn group(resource_type: AclResourceType, name: &str, pattern: AclPatternType, acls: Vec<ObservedAcl>) -> ResourceAcls {
        ResourceAcls {
            resource_type: resource_type.code(),
            resource_name: name.to_string(),
            pattern_type: pattern.code(),
            acls,
        }
    }

    #[test]
    fn test_exact_match_confirms() {
        let observed = ObservedAcls::from(vec![group(
            AclResourceType::Topic,
            "orders",
            AclPatternType::Literal,
            vec![entry("User:alice", "*", AclOperation::Read, AclPermissionType::Allow)],
        )]);
        assert_eq!(reconcile(&declared(), &observed), Reconciliation::Confirmed);
    }

    #[test]
    fn test_partial_match_produces_patch() {
        let observed = ObservedAcls::from(vec![group(
            AclResourceType::Topic,
            "orders",
            AclPatternType::Prefixed,
            vec![entry("User:alice", "10.0.0.1", AclOperation::Read, AclPermissionType::Deny)],
        )]);
        assert_eq!(
            reconcile(&declared(), &observed),
            Reconciliation::Drifted(AclPatch {
                principal: "User:alice".to_string(),
                host: "10.0.0.1".to_string(),
                operation: "Read".to_string(),
                permission_type: "Deny".to_string(),
                pattern_type_filter: "Prefixed".to_string(),
            })
        );
    }

    #[test]
    fn test_no_group_with_name_is_not_found() {
        let observed = ObservedAcls::from(vec![group(
            AclResourceType::Topic,
            "payments",
            AclPatternType::Literal,
            vec![entry("User:alice", "*", AclOperation::Read, AclPermissionType::Allow)],
        )]);
        assert_eq!(reconcile(&declared(), &observed), Reconciliation::NotFound);
        assert_eq!(reconcile(&declared(), &ObservedAcls::new()), Reconciliation::NotFound);
    }

    #[test]
    fn test_empty_group_is_skipped_not_terminal() {
        let observed = ObservedAcls::from(vec![
            group(AclResourceType::Topic, "orders", AclPatternType::Literal, vec![]),
            group(
                AclResourceType::Topic,
                "orders",
                AclPatternType::Literal,
                vec![entry("User:alice", "*", AclOperation::Read, AclPermissionType::Allow)],
            ),
        ]);
        assert_eq!(reconcile(&declared(), &observed), Reconciliation::Confirmed);
    }

    #[test]
    fn test_exact_match_beats_earlier_partial_match() {
        let observed = ObservedAcls::from(vec![group(
            AclResourceType::Topic,
            "orders",
            AclPatternType::Literal,
            vec![
                entry("User:alice", "10.0.0.9", AclOperation::Read, AclPermissionType::Allow),
                entry("User:alice", "*", AclOperation::Read, AclPermissionType::Allow),
            ],
        )]);
        assert_eq!(reconcile(&declared(), &observed), Reconciliation::Confirmed);
    }

    #[test]
    fn test_last_partial_match_wins() {
        let observed = ObservedAcls::from(vec![
            group(
                AclResourceType::Topic,
                "orders",
                AclPatternType::Literal,
                vec![entry("User:alice", "10.0.0.1", AclOperation::Read, AclPermissionType::Allow)],
            ),
            group(
                AclResourceType::Topic,
                "orders",
                AclPatternType::Prefixed,
                vec![entry("User:alice", "10.0.0.2", AclOperation::Read, AclPermissionType::Deny)],
            ),
        ]);
        match reconcile(&declared(), &observed) {
            Reconciliation::Drifted(patch) => {
                assert_eq!(patch.host, "10.0.0.2");
                assert_eq!(patch.permission_type, "Deny");
                assert_eq!(patch.pattern_type_filter, "Prefixed");
            }
            other => panic!("expected drift, got {:?}", other),
        }
    }

    #[test]
    fn test_other_principal_or_operation_is_not_a_match() {
        let observed = ObservedAcls::from(vec![group(
            AclResourceType::Topic,
            "orders",
            AclPatternType::Literal,
            vec![
                entry("User:bob", "*", AclOperation::Read, AclPermissionType::Allow),
                entry("User:alice", "*", AclOperation::Write, AclPermissionType::Allow),
            ],
        )]);
        assert_eq!(reconcile(&declared(), &observed), Reconciliation::NotFound);
    }

    #[test]
    fn test_partial_match_with_unmapped_codes_is_ignored() {
        let mut unknown_permission = entry("User:alice", "10.0.0.1", AclOperation::Read, AclPermissionType::Deny);
        unknown_permission.permission_type = 9;
        let mut unknown_pattern = group(
            AclResourceType::Topic,
            "orders",
            AclPatternType::Literal,
            vec![entry("User:alice", "10.0.0.2", AclOperation::Read, AclPermissionType::Deny)],
        );
        unknown_pattern.pattern_type = 0;

        let observed = ObservedAcls::from(vec![
            group(
                AclResourceType::Topic,
                "orders",
                AclPatternType::Literal,
                vec![unknown_permission],
            ),
            unknown_pattern.clone(),
        ]);
        assert_eq!(reconcile(&declared(), &observed), Reconciliation::NotFound);

        // a usable partial match scanned earlier survives
        let observed = ObservedAcls::from(vec![
            group(
                AclResourceType::Topic,
                "orders",
                AclPatternType::Prefixed,
                vec![entry("User:alice", "10.0.0.1", AclOperation::Read, AclPermissionType::Deny)],
            ),
            unknown_pattern,
        ]);
        match reconcile(&declared(), &observed) {
            Reconciliation::Drifted(patch) => {
                assert_eq!(patch.host, "10.0.0.1");
                assert_eq!(patch.permission_type, "Deny");
                assert_eq!(patch.pattern_type_filter, "Prefixed");
            }
            other => panic!("expected drift, got {:?}", other),
        }
    }

    #[test]
    fn test_same_name_other_resource_type_counts_as_partial() {
        let observed = ObservedAcls::from(vec![group(
            AclResourceType::Group,
            "orders",
            AclPatternType::Literal,
            vec![entry("User:alice", "*", AclOperation::Read, AclPermissionType::Allow)],
        )]);
        assert!(matches!(
            reconcile(&declared(), &observed),
            Reconciliation::Drifted(_)
        ));
    }

    #[test]
    fn test_observed_declarations_use_tokens() {
        let observed = ObservedAcls::from(vec![group(
            AclResourceType::TransactionalId,
            "tx-1",
            AclPatternType::Literal,
            vec![ObservedAcl {
                principal: "User:carol".to_string(),
                host: "*".to_string(),
                operation: 42,
                permission_type: AclPermissionType::Allow.code(),
            }],
        )]);
        assert_eq!(observed.acl_count(), 1);
        let ids: Vec<String> = observed.declarations().iter().map(AclDeclaration::id).collect();
        assert_eq!(ids, vec!["User:carol|*|unknownConversion|Allow|TransactionalID|tx-1|Literal"]);
    }
}
