//! NetworkSink - UDP fire-and-forget streaming

use contracts::{ContractError, OutputSink, PipelineOutput};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    #[default]
    Json,
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    pub format: NetworkFormat,
    /// Larger datagrams are skipped
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = match params.get("max_packet_size") {
            Some(raw) => raw
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{}': {}", raw, e))?,
            None => 65000,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends one datagram per snapshot
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    #[instrument(name = "network_sink_new", skip(name, config), fields(target = %config.addr))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr = if config.addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(sink = %name, target = %config.addr, "network sink connected");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_connection(&name, e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))
    }

    /// Encode one snapshot in the configured format
    pub fn encode(&self, output: &PipelineOutput) -> Result<Vec<u8>, ContractError> {
        match self.config.format {
            NetworkFormat::Json => serde_json::to_vec(output)
                .map_err(|e| ContractError::sink_write(&self.name, format!("json error: {}", e))),
            NetworkFormat::Bincode => bincode::serialize(output).map_err(|e| {
                ContractError::sink_write(&self.name, format!("bincode error: {}", e))
            }),
        }
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket not connected"))
    }
}

impl OutputSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, output),
        fields(sink = %self.name, sequence = output.sequence)
    )]
    async fn write(&mut self, output: &PipelineOutput) -> Result<(), ContractError> {
        let data = self.encode(output)?;
        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "datagram too large, skipped"
            );
            return Err(ContractError::sink_write(&self.name, "datagram too large"));
        }

        // UDP is best-effort; a refused send is logged, not propagated
        match self.socket()?.send(&data).await {
            Ok(sent) => debug!(sink = %self.name, bytes = sent, "sent"),
            Err(e) => warn!(sink = %self.name, error = %e, "udp send failed"),
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "network sink closed");
        Ok(())
    }
}
