//! Kafka protocol error codes seen by admin ACL requests
//!
//! See: <https://kafka.apache.org/protocol#protocol_error_codes>

use std::fmt;

/// No error - operation succeeded
pub const NONE: i16 = 0;
/// Unknown server error
pub const UNKNOWN_SERVER_ERROR: i16 = -1;
/// Request timed out
pub const REQUEST_TIMED_OUT: i16 = 7;
/// Broker not available
pub const BROKER_NOT_AVAILABLE: i16 = 8;
/// Network exception during request
pub const NETWORK_EXCEPTION: i16 = 13;
/// Topic authorization failed
pub const TOPIC_AUTHORIZATION_FAILED: i16 = 29;
/// Group authorization failed
pub const GROUP_AUTHORIZATION_FAILED: i16 = 30;
/// Cluster authorization failed
pub const CLUSTER_AUTHORIZATION_FAILED: i16 = 31;
/// Unsupported version
pub const UNSUPPORTED_VERSION: i16 = 35;
/// Not controller
pub const NOT_CONTROLLER: i16 = 41;
/// Invalid request
pub const INVALID_REQUEST: i16 = 42;
/// Security features are disabled on the broker
pub const SECURITY_DISABLED: i16 = 54;
/// Transactional id authorization failed
pub const TRANSACTIONAL_ID_AUTHORIZATION_FAILED: i16 = 53;
/// Broker cannot parse the principal
pub const INVALID_PRINCIPAL_TYPE: i16 = 67;

/// Human-readable description of a response code
pub fn describe(code: i16) -> &'static str {
    match code {
        NONE => "kafka server: Not an error",
        UNKNOWN_SERVER_ERROR => "kafka server: Unexpected (unknown?) server error",
        REQUEST_TIMED_OUT => "kafka server: Request exceeded the user-specified time limit in the request",
        BROKER_NOT_AVAILABLE => "kafka server: Broker not available",
        NETWORK_EXCEPTION => "kafka server: The server disconnected before a response was received",
        TOPIC_AUTHORIZATION_FAILED => "kafka server: The client is not authorized to access this topic",
        GROUP_AUTHORIZATION_FAILED => "kafka server: The client is not authorized to access this group",
        CLUSTER_AUTHORIZATION_FAILED => "kafka server: The client is not authorized to send this request type",
        UNSUPPORTED_VERSION => "kafka server: The version of API is not supported",
        NOT_CONTROLLER => "kafka server: This is not the correct controller for this cluster",
        INVALID_REQUEST => "kafka server: This most likely occurs because of a request being malformed by the client library or the message was sent to an incompatible broker",
        TRANSACTIONAL_ID_AUTHORIZATION_FAILED => "kafka server: Transactional ID authorization failed",
        SECURITY_DISABLED => "kafka server: Security features are disabled",
        INVALID_PRINCIPAL_TYPE => "kafka server: Invalid principal type",
        _ => "kafka server: unrecognised error code",
    }
}

/// Non-zero status carried by a response or one of its items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerError {
    pub code: i16,
    pub message: Option<String>,
}

impl BrokerError {
    /// `None` when `code` is the "no error" status
    pub fn check(code: i16, message: Option<&str>) -> Option<Self> {
        if code == NONE {
            return None;
        }
        Some(Self {
            code,
            message: message.filter(|m| !m.is_empty()).map(str::to_string),
        })
    }
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", describe(self.code), self.code)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}
