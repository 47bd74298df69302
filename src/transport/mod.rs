//! Cluster transport seam
//!
//! The gateway talks to the cluster only through these two traits: one to find
//! brokers and keep metadata fresh, one to send typed admin requests to a single
//! broker. `KafkaTransport` is the TCP implementation; tests supply their own.

pub mod error_codes;
pub mod kafka;

use crate::error::Result;

use async_trait::async_trait;
use kafka_protocol::messages::{
    CreateAclsRequest, CreateAclsResponse, DeleteAclsRequest, DeleteAclsResponse,
    DescribeAclsRequest, DescribeAclsResponse,
};
use std::sync::Arc;

pub use error_codes::BrokerError;
pub use kafka::KafkaTransport;

/// A broker that accepts ACL admin requests
#[async_trait]
pub trait AdminBroker: Send + Sync {
    /// Node id as reported by cluster metadata
    fn id(&self) -> i32;

    async fn create_acls(&self, request: CreateAclsRequest) -> Result<CreateAclsResponse>;

    async fn delete_acls(&self, request: DeleteAclsRequest) -> Result<DeleteAclsResponse>;

    async fn describe_acls(&self, request: DescribeAclsRequest) -> Result<DescribeAclsResponse>;
}

/// Broker discovery and metadata for one cluster
#[async_trait]
pub trait ClusterTransport: Send + Sync {
    /// The broker currently acting as controller
    async fn controller(&self) -> Result<Arc<dyn AdminBroker>>;

    /// Any broker that can be reached right now
    async fn any_available_broker(&self) -> Result<Arc<dyn AdminBroker>>;

    async fn refresh_metadata(&self) -> Result<()>;
}
