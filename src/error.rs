use crate::acl::codec::EnumKind;
use crate::transport::error_codes::BrokerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AclError>;

pub const IMPORT_ID_FORMAT: &str =
    "acl_principal|acl_host|acl_operation|acl_permission_type|resource_type|resource_name|resource_pattern_type_filter";

#[derive(Error, Debug)]
pub enum AclError {
    #[error("Unknown {kind}: '{token}'")]
    UnknownToken { kind: EnumKind, token: String },

    #[error(
        "Failed importing resource; expected format is {} - got {segments} segments instead of 7",
        IMPORT_ID_FORMAT
    )]
    InvalidImportId { segments: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("No controller broker known to the cluster metadata")]
    NoController,

    #[error("No brokers available")]
    NoBrokersAvailable,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Broker(BrokerError),

    #[error("There were no ACLs matching this filter")]
    NoMatchingAcls,

    #[error("Unable to list ACLs before deleting -- can't be sure we're doing the right thing: {0}")]
    ListBeforeDelete(Box<AclError>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<BrokerError> for AclError {
    fn from(err: BrokerError) -> Self {
        AclError::Broker(err)
    }
}

impl AclError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AclError::UnknownToken { .. } | AclError::InvalidImportId { .. } => "validation",
            AclError::Io(_) | AclError::Connection(_) => "connection",
            AclError::Timeout { .. } => "timeout",
            AclError::NoController | AclError::NoBrokersAvailable => "broker_unavailable",
            AclError::Protocol(_) => "protocol",
            AclError::Broker(_) => "broker",
            AclError::NoMatchingAcls => "not_found",
            AclError::ListBeforeDelete(_) => "list_before_delete",
            AclError::Config(_) | AclError::InvalidConfig(_) => "configuration",
        }
    }

    /// Validation errors are raised before any request leaves the process
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AclError::UnknownToken { .. } | AclError::InvalidImportId { .. }
        )
    }
}
