//! Enum codec between declaration tokens and Kafka wire codes
//!
//! Each ACL enum family is a closed Rust enum whose discriminant is the code
//! Kafka puts on the wire. Tokens are the exact, case-sensitive strings used in
//! declarations and canonical identifiers.

use crate::error::{AclError, Result};
use std::fmt;

/// Token returned when a wire code has no known mapping. Diagnostic only.
pub const UNKNOWN_CONVERSION: &str = "unknownConversion";

/// The four independent enum families an ACL declaration references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    Operation,
    PermissionType,
    ResourceType,
    PatternType,
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnumKind::Operation => "operation",
            EnumKind::PermissionType => "permission type",
            EnumKind::ResourceType => "resource type",
            EnumKind::PatternType => "pattern type filter",
        };
        f.write_str(name)
    }
}

/// Bidirectional mapping for one enum family.
///
/// `from_token` and `from_code` are partial: anything outside the family's
/// vocabulary maps to `None`, never to a coerced default.
pub trait WireEnum: Copy + Sized + 'static {
    const KIND: EnumKind;
    const ALL: &'static [Self];

    fn code(self) -> i8;

    fn token(self) -> &'static str;

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.token() == token)
    }

    fn from_code(code: i8) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.code() == code)
    }

    /// Forward mapping that reports unmapped tokens as validation errors
    fn parse_token(token: &str) -> Result<Self> {
        Self::from_token(token).ok_or_else(|| AclError::UnknownToken {
            kind: Self::KIND,
            token: token.to_string(),
        })
    }

    /// Inverse mapping for raw codes read off the wire
    fn token_for_code(code: i8) -> &'static str {
        Self::from_code(code)
            .map(Self::token)
            .unwrap_or(UNKNOWN_CONVERSION)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum AclOperation {
    Unknown = 0,
    Any = 1,
    All = 2,
    Read = 3,
    Write = 4,
    Create = 5,
    Delete = 6,
    Alter = 7,
    Describe = 8,
    ClusterAction = 9,
    DescribeConfigs = 10,
    AlterConfigs = 11,
    IdempotentWrite = 12,
}

impl WireEnum for AclOperation {
    const KIND: EnumKind = EnumKind::Operation;
    const ALL: &'static [Self] = &[
        AclOperation::Unknown,
        AclOperation::Any,
        AclOperation::All,
        AclOperation::Read,
        AclOperation::Write,
        AclOperation::Create,
        AclOperation::Delete,
        AclOperation::Alter,
        AclOperation::Describe,
        AclOperation::ClusterAction,
        AclOperation::DescribeConfigs,
        AclOperation::AlterConfigs,
        AclOperation::IdempotentWrite,
    ];

    fn code(self) -> i8 {
        self as i8
    }

    fn token(self) -> &'static str {
        match self {
            AclOperation::Unknown => "Unknown",
            AclOperation::Any => "Any",
            AclOperation::All => "All",
            AclOperation::Read => "Read",
            AclOperation::Write => "Write",
            AclOperation::Create => "Create",
            AclOperation::Delete => "Delete",
            AclOperation::Alter => "Alter",
            AclOperation::Describe => "Describe",
            AclOperation::ClusterAction => "ClusterAction",
            AclOperation::DescribeConfigs => "DescribeConfigs",
            AclOperation::AlterConfigs => "AlterConfigs",
            AclOperation::IdempotentWrite => "IdempotentWrite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum AclPermissionType {
    Unknown = 0,
    Any = 1,
    Deny = 2,
    Allow = 3,
}

impl WireEnum for AclPermissionType {
    const KIND: EnumKind = EnumKind::PermissionType;
    const ALL: &'static [Self] = &[
        AclPermissionType::Unknown,
        AclPermissionType::Any,
        AclPermissionType::Deny,
        AclPermissionType::Allow,
    ];

    fn code(self) -> i8 {
        self as i8
    }

    fn token(self) -> &'static str {
        match self {
            AclPermissionType::Unknown => "Unknown",
            AclPermissionType::Any => "Any",
            AclPermissionType::Deny => "Deny",
            AclPermissionType::Allow => "Allow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum AclResourceType {
    Unknown = 0,
    Any = 1,
    Topic = 2,
    Group = 3,
    Cluster = 4,
    TransactionalId = 5,
}

impl AclResourceType {
    /// Resource types a full cluster listing walks, in request order
    pub const LISTABLE: [AclResourceType; 4] = [
        AclResourceType::Topic,
        AclResourceType::Group,
        AclResourceType::Cluster,
        AclResourceType::TransactionalId,
    ];
}

impl WireEnum for AclResourceType {
    const KIND: EnumKind = EnumKind::ResourceType;
    const ALL: &'static [Self] = &[
        AclResourceType::Unknown,
        AclResourceType::Any,
        AclResourceType::Topic,
        AclResourceType::Group,
        AclResourceType::Cluster,
        AclResourceType::TransactionalId,
    ];

    fn code(self) -> i8 {
        self as i8
    }

    fn token(self) -> &'static str {
        match self {
            AclResourceType::Unknown => "Unknown",
            AclResourceType::Any => "Any",
            AclResourceType::Topic => "Topic",
            AclResourceType::Group => "Group",
            AclResourceType::Cluster => "Cluster",
            AclResourceType::TransactionalId => "TransactionalID",
        }
    }
}

/// Resource pattern type. Wire code 0 is Kafka's "unknown" and has no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum AclPatternType {
    Any = 1,
    Match = 2,
    Literal = 3,
    Prefixed = 4,
}

impl WireEnum for AclPatternType {
    const KIND: EnumKind = EnumKind::PatternType;
    const ALL: &'static [Self] = &[
        AclPatternType::Any,
        AclPatternType::Match,
        AclPatternType::Literal,
        AclPatternType::Prefixed,
    ];

    fn code(self) -> i8 {
        self as i8
    }

    fn token(self) -> &'static str {
        match self {
            AclPatternType::Any => "Any",
            AclPatternType::Match => "Match",
            AclPatternType::Literal => "Literal",
            AclPatternType::Prefixed => "Prefixed",
        }
    }
}
