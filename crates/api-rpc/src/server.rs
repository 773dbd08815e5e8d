//! JSON-RPC Server
//!
//! Serves the queue API over HTTP/WebSocket on a TCP address.

use crate::handler::RpcHandler;
use crate::types::{
    AddEntryRequest, CompleteEntryRequest, CreateQueueRequest, EntryActionRequest,
    GetQueueByTypeRequest, ListQueuesRequest, PatientPositionRequest, QueueActionRequest,
    QueueStatsRequest, UpdateEntryRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use vaidya_core::application::{QueueEngine, QueueRegistry};

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9540;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Registers `$method` under `$name`, parsing params as `$req`
macro_rules! register {
    ($module:expr, $handler:expr, $name:literal, $req:ty, $method:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $req = params.parse()?;
                    handler.$method(req).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        registry: Arc<QueueRegistry>,
        engine: Arc<QueueEngine>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(registry, engine)),
        }
    }

    /// Build the method table
    pub fn into_module(self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let handler = self.handler;

        // Queue registry
        register!(module, handler, "queue.create.v1", CreateQueueRequest, create_queue);
        register!(module, handler, "queue.list.v1", ListQueuesRequest, list_queues);
        register!(
            module,
            handler,
            "queue.get_by_type.v1",
            GetQueueByTypeRequest,
            get_queue_by_type
        );
        register!(
            module,
            handler,
            "queue.deactivate.v1",
            QueueActionRequest,
            deactivate_queue
        );
        register!(module, handler, "queue.stats.v1", QueueStatsRequest, queue_stats);
        register!(module, handler, "queue.reorder.v1", QueueActionRequest, reorder);

        // Queue entries
        register!(module, handler, "entry.add.v1", AddEntryRequest, add_entry);
        register!(module, handler, "entry.update.v1", UpdateEntryRequest, update_entry);
        register!(module, handler, "entry.start.v1", EntryActionRequest, start_entry);
        register!(
            module,
            handler,
            "entry.complete.v1",
            CompleteEntryRequest,
            complete_entry
        );
        register!(module, handler, "entry.remove.v1", EntryActionRequest, remove_entry);
        register!(
            module,
            handler,
            "entry.position.v1",
            PatientPositionRequest,
            patient_position
        );

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the server handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.into_module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((local_addr, handle))
    }
}
