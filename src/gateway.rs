//! Cluster ACL gateway
//!
//! Issues CreateAcls, DeleteAcls and DescribeAcls requests for declarations.
//! Every call either fully succeeds or returns the first error it meets;
//! nothing is retried.

use crate::acl::{
    to_creation_spec, to_filter_spec, AclDeclaration, AclResourceType, FilterSpec, ObservedAcls,
    ResourceAcls, WireEnum,
};
use crate::error::{AclError, Result};
use crate::transport::{BrokerError, ClusterTransport};

use kafka_protocol::messages::{CreateAclsRequest, DeleteAclsRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Create, delete, list and describe ACLs through a cluster transport
pub struct AclGateway {
    transport: Arc<dyn ClusterTransport>,
}

impl AclGateway {
    pub fn new(transport: Arc<dyn ClusterTransport>) -> Self {
        Self { transport }
    }

    /// Create exactly one ACL on the controller
    pub async fn create_acl(&self, decl: &AclDeclaration) -> Result<()> {
        debug!("Creating ACL {}", decl);
        let spec = to_creation_spec(decl)?;
        let broker = self.transport.controller().await?;

        let request = CreateAclsRequest::default().with_creations(vec![spec.to_creation()]);
        let response = broker.create_acls(request).await?;

        for result in &response.results {
            if let Some(err) =
                BrokerError::check(result.error_code, result.error_message.as_deref())
            {
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Delete the ACLs matching a declaration. Matching nothing is an error.
    pub async fn delete_acl(&self, decl: &AclDeclaration) -> Result<()> {
        info!("Deleting ACL {}", decl);
        let filter = to_filter_spec(decl)?;
        let broker = self.transport.controller().await?;

        let acls_before_delete = self
            .list_acls()
            .await
            .map_err(|e| AclError::ListBeforeDelete(Box::new(e)))?;
        info!("Acls before deletion: {}", acls_before_delete.acl_count());
        for acl in acls_before_delete.declarations() {
            debug!("ACL: {}", acl);
        }

        let request = DeleteAclsRequest::default().with_filters(vec![filter.to_delete_filter()]);
        let response = broker.delete_acls(request).await?;

        let mut matching_acl_count = 0;
        for result in &response.filter_results {
            matching_acl_count += result.matching_acls.len();
            if let Some(err) =
                BrokerError::check(result.error_code, result.error_message.as_deref())
            {
                return Err(err.into());
            }
        }

        if matching_acl_count == 0 {
            return Err(AclError::NoMatchingAcls);
        }
        info!("Deleted {} ACL(s) matching {}", matching_acl_count, decl);
        Ok(())
    }

    /// List every ACL in the cluster, one resource type at a time.
    ///
    /// Requests go out in the order Topic, Group, Cluster, TransactionalID and
    /// the first failure discards everything gathered so far.
    pub async fn list_acls(&self) -> Result<ObservedAcls> {
        info!("Listing all ACLs");
        let broker = self.transport.controller().await?;
        self.transport.refresh_metadata().await?;

        let mut observed = ObservedAcls::new();
        for resource_type in AclResourceType::LISTABLE {
            let request = FilterSpec::all_of_type(resource_type).to_describe_request();
            let response = broker.describe_acls(request).await?;

            if let Some(err) =
                BrokerError::check(response.error_code, response.error_message.as_deref())
            {
                return Err(err.into());
            }
            debug!(
                "{} {} resource group(s) listed",
                response.resources.len(),
                resource_type.token()
            );
            observed.extend(response.resources.into_iter().map(ResourceAcls::from));
        }
        Ok(observed)
    }

    /// ACL groups matching one declaration, from any reachable broker
    pub async fn describe_acls(&self, decl: &AclDeclaration) -> Result<Vec<ResourceAcls>> {
        debug!("Describing ACL {}", decl);
        let filter = to_filter_spec(decl)?;
        let broker = self.transport.any_available_broker().await?;
        self.transport.refresh_metadata().await?;

        let response = broker.describe_acls(filter.to_describe_request()).await?;
        if let Some(err) =
            BrokerError::check(response.error_code, response.error_message.as_deref())
        {
            return Err(err.into());
        }

        Ok(response
            .resources
            .into_iter()
            .map(ResourceAcls::from)
            .collect())
    }
}
