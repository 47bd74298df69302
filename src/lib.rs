pub mod acl;
pub mod config;
pub mod error;
pub mod gateway;
pub mod resource;
pub mod transport;

pub use acl::{Acl, AclDeclaration, Reconciliation, Resource};
pub use config::ClientConfig;
pub use error::{AclError, Result};
pub use gateway::AclGateway;
pub use resource::{AclResource, ResourceData, ResourceState};
pub use transport::KafkaTransport;
