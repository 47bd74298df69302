//! TCP transport speaking the Kafka binary protocol
//!
//! Frames are a big-endian `i32` length followed by a request header and body
//! encoded with `kafka-protocol`. Each broker gets one cached connection;
//! requests on a connection are serialised and matched by correlation id.

use super::{AdminBroker, ClusterTransport};
use crate::config::{ApiVersions, ClientConfig};
use crate::error::{AclError, Result};

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use kafka_protocol::messages::{
    CreateAclsRequest, CreateAclsResponse, DeleteAclsRequest, DeleteAclsResponse,
    DescribeAclsRequest, DescribeAclsResponse, MetadataRequest, RequestHeader, ResponseHeader,
};
use kafka_protocol::protocol::{Decodable, Encodable, HeaderVersion, Request, StrBytes};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Upper bound on a single response frame
const MAX_FRAME_BYTES: i32 = 100 * 1024 * 1024;

/// Broker id used for bootstrap connections before metadata is known
const BOOTSTRAP_BROKER_ID: i32 = -1;

/// A broker as advertised in cluster metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub id: i32,
    pub host: String,
    pub port: i32,
}

impl BrokerAddress {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Brokers and controller from the latest Metadata response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMetadata {
    pub brokers: Vec<BrokerAddress>,
    pub controller_id: Option<i32>,
}

impl ClusterMetadata {
    pub fn controller(&self) -> Option<&BrokerAddress> {
        let controller_id = self.controller_id?;
        self.brokers.iter().find(|broker| broker.id == controller_id)
    }
}

/// Build a length-prefixed request frame
pub(crate) fn encode_request<R>(
    request: &R,
    version: i16,
    correlation_id: i32,
    client_id: &str,
) -> Result<Bytes>
where
    R: Request + Encodable + HeaderVersion,
{
    let header = RequestHeader::default()
        .with_request_api_key(R::KEY)
        .with_request_api_version(version)
        .with_correlation_id(correlation_id)
        .with_client_id(Some(StrBytes::from_string(client_id.to_string())));

    let mut body = BytesMut::new();
    header
        .encode(&mut body, <R as HeaderVersion>::header_version(version))
        .map_err(|e| AclError::Protocol(format!("Failed to encode request header: {}", e)))?;
    request
        .encode(&mut body, version)
        .map_err(|e| AclError::Protocol(format!("Failed to encode request: {}", e)))?;

    let mut frame = BytesMut::with_capacity(body.len() + 4);
    frame.put_i32(body.len() as i32);
    frame.extend_from_slice(&body);
    Ok(frame.freeze())
}

/// Decode a response payload (frame length already stripped)
pub(crate) fn decode_response<R>(
    mut payload: Bytes,
    version: i16,
    correlation_id: i32,
) -> Result<R::Response>
where
    R: Request,
    R::Response: Decodable + HeaderVersion,
{
    let header_version = <R::Response as HeaderVersion>::header_version(version);
    let header = ResponseHeader::decode(&mut payload, header_version)
        .map_err(|e| AclError::Protocol(format!("Failed to decode response header: {}", e)))?;

    if header.correlation_id != correlation_id {
        return Err(AclError::Protocol(format!(
            "Correlation id mismatch: expected {}, got {}",
            correlation_id, header.correlation_id
        )));
    }

    <R::Response as Decodable>::decode(&mut payload, version)
        .map_err(|e| AclError::Protocol(format!("Failed to decode response: {}", e)))
}

async fn exchange(stream: &mut TcpStream, frame: &[u8]) -> Result<Bytes> {
    stream.write_all(frame).await?;
    stream.flush().await?;

    let size = stream.read_i32().await?;
    if !(0..=MAX_FRAME_BYTES).contains(&size) {
        return Err(AclError::Protocol(format!("Invalid response frame size: {}", size)));
    }

    let mut payload = vec![0u8; size as usize];
    stream.read_exact(&mut payload).await?;
    Ok(Bytes::from(payload))
}

/// One TCP connection to one broker
pub struct BrokerConnection {
    id: i32,
    endpoint: String,
    client_id: String,
    versions: ApiVersions,
    connect_timeout: Duration,
    request_timeout: Duration,
    correlation_id: AtomicI32,
    stream: tokio::sync::Mutex<Option<TcpStream>>,
}

impl BrokerConnection {
    pub fn new(id: i32, endpoint: impl Into<String>, config: &ClientConfig) -> Self {
        Self {
            id,
            endpoint: endpoint.into(),
            client_id: config.client_id.clone(),
            versions: config.api_versions.clone(),
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            correlation_id: AtomicI32::new(0),
            stream: tokio::sync::Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn open(&self) -> Result<TcpStream> {
        debug!("Connecting to broker {} at {}", self.id, self.endpoint);
        let stream = timeout(self.connect_timeout, TcpStream::connect(&self.endpoint))
            .await
            .map_err(|_| AclError::Timeout {
                timeout_ms: self.connect_timeout.as_millis() as u64,
            })?
            .map_err(|e| {
                AclError::Connection(format!("Failed to connect to {}: {}", self.endpoint, e))
            })?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    /// Open the connection if it is not already open
    pub async fn ensure_connected(&self) -> Result<()> {
        let mut guard = self.stream.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        Ok(())
    }

    /// Send one request and wait for its response.
    ///
    /// Any I/O failure or timeout drops the connection so the next request
    /// reconnects.
    pub async fn send<R>(&self, request: &R, version: i16) -> Result<R::Response>
    where
        R: Request + Encodable + HeaderVersion + Sync,
        R::Response: Decodable + HeaderVersion,
    {
        let correlation_id = self.correlation_id.fetch_add(1, Ordering::Relaxed);
        let frame = encode_request(request, version, correlation_id, &self.client_id)?;

        let mut guard = self.stream.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        let stream = guard.as_mut().ok_or_else(|| {
            AclError::Connection(format!("No connection to broker {}", self.endpoint))
        })?;

        let payload = match timeout(self.request_timeout, exchange(stream, &frame)).await {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => {
                warn!("Request to broker {} failed: {}", self.endpoint, e);
                *guard = None;
                return Err(e);
            }
            Err(_) => {
                warn!("Request to broker {} timed out", self.endpoint);
                *guard = None;
                return Err(AclError::Timeout {
                    timeout_ms: self.request_timeout.as_millis() as u64,
                });
            }
        };
        drop(guard);

        decode_response::<R>(payload, version, correlation_id)
    }

    #[instrument(skip(self), fields(broker = %self.endpoint))]
    pub async fn fetch_metadata(&self) -> Result<ClusterMetadata> {
        let request = MetadataRequest::default().with_topics(Some(Vec::new()));
        let response = self.send(&request, self.versions.metadata).await?;

        let brokers = response
            .brokers
            .iter()
            .map(|broker| BrokerAddress {
                id: broker.node_id.0,
                host: broker.host.to_string(),
                port: broker.port,
            })
            .collect();
        let controller_id = Some(response.controller_id.0).filter(|id| *id >= 0);

        Ok(ClusterMetadata {
            brokers,
            controller_id,
        })
    }
}

#[async_trait]
impl AdminBroker for BrokerConnection {
    fn id(&self) -> i32 {
        self.id
    }

    #[instrument(skip(self, request), fields(broker = %self.endpoint))]
    async fn create_acls(&self, request: CreateAclsRequest) -> Result<CreateAclsResponse> {
        self.send(&request, self.versions.acls).await
    }

    #[instrument(skip(self, request), fields(broker = %self.endpoint))]
    async fn delete_acls(&self, request: DeleteAclsRequest) -> Result<DeleteAclsResponse> {
        self.send(&request, self.versions.acls).await
    }

    #[instrument(skip(self, request), fields(broker = %self.endpoint))]
    async fn describe_acls(&self, request: DescribeAclsRequest) -> Result<DescribeAclsResponse> {
        self.send(&request, self.versions.acls).await
    }
}

/// Cluster transport over plain TCP
pub struct KafkaTransport {
    config: ClientConfig,
    metadata: RwLock<ClusterMetadata>,
    connections: Mutex<HashMap<i32, Arc<BrokerConnection>>>,
}

impl KafkaTransport {
    /// Create a transport without contacting the cluster
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metadata: RwLock::new(ClusterMetadata::default()),
            connections: Mutex::new(HashMap::new()),
        })
    }

    /// Create a transport and load cluster metadata from the bootstrap servers
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        info!(
            "Connecting to Kafka cluster via {} bootstrap server(s)",
            config.bootstrap_servers.len()
        );
        let transport = Self::new(config)?;
        transport.refresh_metadata().await?;
        Ok(transport)
    }

    pub fn metadata(&self) -> ClusterMetadata {
        self.metadata.read().clone()
    }

    fn connection_for(&self, broker: &BrokerAddress) -> Arc<BrokerConnection> {
        let endpoint = broker.endpoint();
        let mut connections = self.connections.lock();
        if let Some(existing) = connections.get(&broker.id) {
            if existing.endpoint() == endpoint {
                return existing.clone();
            }
        }
        let connection = Arc::new(BrokerConnection::new(broker.id, endpoint, &self.config));
        connections.insert(broker.id, connection.clone());
        connection
    }

    /// Known brokers first, then bootstrap servers not already covered
    fn metadata_candidates(&self) -> Vec<Arc<BrokerConnection>> {
        let known = self.metadata.read().brokers.clone();
        let mut candidates: Vec<Arc<BrokerConnection>> =
            known.iter().map(|broker| self.connection_for(broker)).collect();

        for server in &self.config.bootstrap_servers {
            if candidates.iter().all(|c| c.endpoint() != server.as_str()) {
                candidates.push(Arc::new(BrokerConnection::new(
                    BOOTSTRAP_BROKER_ID,
                    server.clone(),
                    &self.config,
                )));
            }
        }
        candidates
    }
}

#[async_trait]
impl ClusterTransport for KafkaTransport {
    async fn controller(&self) -> Result<Arc<dyn AdminBroker>> {
        let known = self.metadata.read().controller().is_some();
        if !known {
            self.refresh_metadata().await?;
        }

        let controller = self.metadata.read().controller().cloned();
        let controller = controller.ok_or(AclError::NoController)?;
        debug!("Controller is broker {} at {}", controller.id, controller.endpoint());
        Ok(self.connection_for(&controller))
    }

    async fn any_available_broker(&self) -> Result<Arc<dyn AdminBroker>> {
        let known = !self.metadata.read().brokers.is_empty();
        if !known {
            self.refresh_metadata().await?;
        }

        let brokers = self.metadata.read().brokers.clone();
        for broker in &brokers {
            let connection = self.connection_for(broker);
            match connection.ensure_connected().await {
                Ok(()) => return Ok(connection),
                Err(e) => warn!("Broker {} unavailable: {}", broker.endpoint(), e),
            }
        }
        Err(AclError::NoBrokersAvailable)
    }

    #[instrument(skip(self))]
    async fn refresh_metadata(&self) -> Result<()> {
        let mut last_error = None;

        for candidate in self.metadata_candidates() {
            match candidate.fetch_metadata().await {
                Ok(metadata) => {
                    debug!(
                        "Metadata from {}: {} broker(s), controller {:?}",
                        candidate.endpoint(),
                        metadata.brokers.len(),
                        metadata.controller_id
                    );
                    *self.metadata.write() = metadata;
                    return Ok(());
                }
                Err(e) => {
                    warn!("Metadata request to {} failed: {}", candidate.endpoint(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(AclError::NoBrokersAvailable))
    }
}
