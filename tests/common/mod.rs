//! In-memory cluster used by the integration tests
//!
//! Holds ACL bindings, answers the three ACL admin requests with broker-side
//! filter semantics, records every call and can be told to fail.

#![allow(dead_code)]

use async_trait::async_trait;
use kafka_acl::acl::{to_creation_spec, AclDeclaration};
use kafka_acl::transport::{AdminBroker, BrokerError, ClusterTransport};
use kafka_acl::{AclError, Result};
use kafka_protocol::messages::create_acls_response::AclCreationResult;
use kafka_protocol::messages::delete_acls_request::DeleteAclsFilter;
use kafka_protocol::messages::delete_acls_response::{DeleteAclsFilterResult, DeleteAclsMatchingAcl};
use kafka_protocol::messages::describe_acls_response::{AclDescription, DescribeAclsResource};
use kafka_protocol::messages::{
    CreateAclsRequest, CreateAclsResponse, DeleteAclsRequest, DeleteAclsResponse,
    DescribeAclsRequest, DescribeAclsResponse,
};
use kafka_protocol::protocol::StrBytes;
use parking_lot::Mutex;
use std::sync::Arc;

const ANY: i8 = 1;
const MATCH: i8 = 2;

/// One stored ACL, in wire codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub resource_type: i8,
    pub resource_name: String,
    pub pattern_type: i8,
    pub principal: String,
    pub host: String,
    pub operation: i8,
    pub permission_type: i8,
}

impl Binding {
    pub fn from_declaration(decl: &AclDeclaration) -> Self {
        let spec = to_creation_spec(decl).expect("test declaration should be valid");
        Self {
            resource_type: spec.resource.resource_type as i8,
            resource_name: spec.resource.name,
            pattern_type: spec.resource.pattern_type as i8,
            principal: spec.acl.principal,
            host: spec.acl.host,
            operation: spec.acl.operation as i8,
            permission_type: spec.acl.permission_type as i8,
        }
    }
}

/// Transport and broker calls, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Controller,
    AnyBroker,
    RefreshMetadata,
    CreateAcls,
    DeleteAcls,
    /// Carries the resource type filter of the request
    DescribeAcls(i8),
}

#[derive(Default)]
struct ClusterState {
    bindings: Vec<Binding>,
    calls: Vec<Call>,
    create_error: Option<i16>,
    delete_error: Option<i16>,
    describe_errors: Vec<(i8, i16)>,
    no_controller: bool,
}

#[derive(Clone, Default)]
pub struct MockCluster {
    state: Arc<Mutex<ClusterState>>,
}

struct MockBroker {
    state: Arc<Mutex<ClusterState>>,
}

fn filter_matches(
    binding: &Binding,
    resource_type: i8,
    resource_name: &Option<StrBytes>,
    pattern_type: i8,
    principal: &Option<StrBytes>,
    host: &Option<StrBytes>,
    operation: i8,
    permission_type: i8,
) -> bool {
    let text = |filter: &Option<StrBytes>, value: &str| {
        filter.as_ref().map_or(true, |f| f.as_str() == value)
    };
    let code = |filter: i8, value: i8| filter == ANY || filter == value;

    code(resource_type, binding.resource_type)
        && text(resource_name, &binding.resource_name)
        && (pattern_type == MATCH || code(pattern_type, binding.pattern_type))
        && text(principal, &binding.principal)
        && text(host, &binding.host)
        && code(operation, binding.operation)
        && code(permission_type, binding.permission_type)
}

fn delete_matches(binding: &Binding, f: &DeleteAclsFilter) -> bool {
    filter_matches(
        binding,
        f.resource_type_filter,
        &f.resource_name_filter,
        f.pattern_type_filter,
        &f.principal_filter,
        &f.host_filter,
        f.operation,
        f.permission_type,
    )
}

fn describe_matches(binding: &Binding, r: &DescribeAclsRequest) -> bool {
    filter_matches(
        binding,
        r.resource_type_filter,
        &r.resource_name_filter,
        r.pattern_type_filter,
        &r.principal_filter,
        &r.host_filter,
        r.operation,
        r.permission_type,
    )
}

fn str_bytes(value: &str) -> StrBytes {
    StrBytes::from_string(value.to_string())
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, decl: &AclDeclaration) {
        self.seed_binding(Binding::from_declaration(decl));
    }

    pub fn seed_binding(&self, binding: Binding) {
        self.state.lock().bindings.push(binding);
    }

    pub fn bindings(&self) -> Vec<Binding> {
        self.state.lock().bindings.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Reject every CreateAcls item with `code`
    pub fn fail_create(&self, code: i16) {
        self.state.lock().create_error = Some(code);
    }

    /// Report `code` on every DeleteAcls filter result. Matching bindings are
    /// still listed but stay in place.
    pub fn fail_delete(&self, code: i16) {
        self.state.lock().delete_error = Some(code);
    }

    /// Reject DescribeAcls requests for one resource type with `code`
    pub fn fail_describe(&self, resource_type: i8, code: i16) {
        self.state.lock().describe_errors.push((resource_type, code));
    }

    pub fn drop_controller(&self) {
        self.state.lock().no_controller = true;
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }

    fn broker(&self) -> Arc<dyn AdminBroker> {
        Arc::new(MockBroker {
            state: self.state.clone(),
        })
    }
}

#[async_trait]
impl ClusterTransport for MockCluster {
    async fn controller(&self) -> Result<Arc<dyn AdminBroker>> {
        self.record(Call::Controller);
        if self.state.lock().no_controller {
            return Err(AclError::NoController);
        }
        Ok(self.broker())
    }

    async fn any_available_broker(&self) -> Result<Arc<dyn AdminBroker>> {
        self.record(Call::AnyBroker);
        Ok(self.broker())
    }

    async fn refresh_metadata(&self) -> Result<()> {
        self.record(Call::RefreshMetadata);
        Ok(())
    }
}

#[async_trait]
impl AdminBroker for MockBroker {
    fn id(&self) -> i32 {
        1
    }

    async fn create_acls(&self, request: CreateAclsRequest) -> Result<CreateAclsResponse> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateAcls);

        let mut results = Vec::new();
        for creation in request.creations {
            if let Some(code) = state.create_error {
                results.push(AclCreationResult::default().with_error_code(code));
                continue;
            }
            state.bindings.push(Binding {
                resource_type: creation.resource_type,
                resource_name: creation.resource_name.to_string(),
                pattern_type: creation.resource_pattern_type,
                principal: creation.principal.to_string(),
                host: creation.host.to_string(),
                operation: creation.operation,
                permission_type: creation.permission_type,
            });
            results.push(AclCreationResult::default());
        }
        Ok(CreateAclsResponse::default().with_results(results))
    }

    async fn delete_acls(&self, request: DeleteAclsRequest) -> Result<DeleteAclsResponse> {
        let mut state = self.state.lock();
        state.calls.push(Call::DeleteAcls);

        let mut filter_results = Vec::new();
        for filter in &request.filters {
            let (matched, kept): (Vec<Binding>, Vec<Binding>) = std::mem::take(&mut state.bindings)
                .into_iter()
                .partition(|binding| delete_matches(binding, filter));
            state.bindings = kept;
            if state.delete_error.is_some() {
                state.bindings.extend(matched.iter().cloned());
            }

            let matching_acls = matched
                .iter()
                .map(|b| {
                    DeleteAclsMatchingAcl::default()
                        .with_resource_type(b.resource_type)
                        .with_resource_name(str_bytes(&b.resource_name))
                        .with_pattern_type(b.pattern_type)
                        .with_principal(str_bytes(&b.principal))
                        .with_host(str_bytes(&b.host))
                        .with_operation(b.operation)
                        .with_permission_type(b.permission_type)
                })
                .collect();
            let mut result = DeleteAclsFilterResult::default().with_matching_acls(matching_acls);
            if let Some(code) = state.delete_error {
                result = result
                    .with_error_code(code)
                    .with_error_message(Some(StrBytes::from_static_str("injected failure")));
            }
            filter_results.push(result);
        }
        Ok(DeleteAclsResponse::default().with_filter_results(filter_results))
    }

    async fn describe_acls(&self, request: DescribeAclsRequest) -> Result<DescribeAclsResponse> {
        let mut state = self.state.lock();
        state.calls.push(Call::DescribeAcls(request.resource_type_filter));

        let injected = state
            .describe_errors
            .iter()
            .find(|(resource_type, _)| *resource_type == request.resource_type_filter)
            .map(|(_, code)| *code);
        if let Some(code) = injected {
            return Ok(DescribeAclsResponse::default()
                .with_error_code(code)
                .with_error_message(Some(StrBytes::from_static_str("injected failure"))));
        }

        let mut resources: Vec<DescribeAclsResource> = Vec::new();
        for binding in state.bindings.iter().filter(|b| describe_matches(b, &request)) {
            let entry = AclDescription::default()
                .with_principal(str_bytes(&binding.principal))
                .with_host(str_bytes(&binding.host))
                .with_operation(binding.operation)
                .with_permission_type(binding.permission_type);

            let existing = resources.iter_mut().find(|r| {
                r.resource_type == binding.resource_type
                    && r.resource_name.as_str() == binding.resource_name
                    && r.pattern_type == binding.pattern_type
            });
            match existing {
                Some(resource) => resource.acls.push(entry),
                None => resources.push(
                    DescribeAclsResource::default()
                        .with_resource_type(binding.resource_type)
                        .with_resource_name(str_bytes(&binding.resource_name))
                        .with_pattern_type(binding.pattern_type)
                        .with_acls(vec![entry]),
                ),
            }
        }
        Ok(DescribeAclsResponse::default().with_resources(resources))
    }
}

/// Broker error as the gateway would surface it, for assertions
pub fn broker_error(code: i16) -> String {
    BrokerError {
        code,
        message: Some("injected failure".to_string()),
    }
    .to_string()
}
