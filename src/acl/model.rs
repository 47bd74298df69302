//! ACL declaration model
//!
//! Declarations are string-typed on purpose: they carry tokens exactly as the
//! user wrote them, and token legality is checked only when a declaration is
//! translated into a wire request.

use std::fmt;

/// Separator used by canonical identifiers and import strings
pub const ID_SEPARATOR: char = '|';

/// Number of fields in a canonical identifier
pub const ID_FIELD_COUNT: usize = 7;

/// Who may do what, granted or denied, from where
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Acl {
    pub principal: String,
    pub host: String,
    pub operation: String,
    pub permission_type: String,
}

/// The entity an ACL applies to and how its name is matched
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Resource {
    pub resource_type: String,
    pub name: String,
    pub pattern_type_filter: String,
}

/// One declared ACL on one resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AclDeclaration {
    pub acl: Acl,
    pub resource: Resource,
}

impl Acl {
    pub fn new(
        principal: impl Into<String>,
        host: impl Into<String>,
        operation: impl Into<String>,
        permission_type: impl Into<String>,
    ) -> Self {
        Self {
            principal: principal.into(),
            host: host.into(),
            operation: operation.into(),
            permission_type: permission_type.into(),
        }
    }
}

impl Resource {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        pattern_type_filter: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            pattern_type_filter: pattern_type_filter.into(),
        }
    }
}

impl AclDeclaration {
    pub fn new(acl: Acl, resource: Resource) -> Self {
        Self { acl, resource }
    }

    /// Build a declaration from the seven identifier fields in canonical order
    pub fn from_fields(fields: [String; ID_FIELD_COUNT]) -> Self {
        let [principal, host, operation, permission_type, resource_type, name, pattern_type_filter] =
            fields;
        Self {
            acl: Acl {
                principal,
                host,
                operation,
                permission_type,
            },
            resource: Resource {
                resource_type,
                name,
                pattern_type_filter,
            },
        }
    }

    /// The seven identifier fields in canonical order
    pub fn fields(&self) -> [&str; ID_FIELD_COUNT] {
        [
            &self.acl.principal,
            &self.acl.host,
            &self.acl.operation,
            &self.acl.permission_type,
            &self.resource.resource_type,
            &self.resource.name,
            &self.resource.pattern_type_filter,
        ]
    }

    /// Canonical identifier. Two declarations are identical iff their ids are equal.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AclDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, field) in self.fields().iter().enumerate() {
            if index > 0 {
                write!(f, "{}", ID_SEPARATOR)?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}
