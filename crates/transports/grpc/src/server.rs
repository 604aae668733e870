//! Greeter service and tonic server setup
//!
//! [`EchoGreeter`] answers `Hello` with the event it received. The server
//! helpers serve any `Greeter` until a shutdown future resolves.

use crate::generated::example::greeter_server::{self, Greeter};
use crate::generated::v1::CloudEvent;
use crate::{Error, Result, ServerConfig};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::info;

/// `Greeter` that returns the request unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoGreeter;

#[tonic::async_trait]
impl Greeter for EchoGreeter {
    async fn hello(
        &self,
        request: Request<CloudEvent>,
    ) -> std::result::Result<Response<CloudEvent>, Status> {
        let remote = request.remote_addr();
        let event = request.into_inner();

        info!(
            remote = ?remote,
            id = %event.id,
            event_type = %event.r#type,
            "Received CloudEvent: {}",
            event.short_debug()
        );

        Ok(Response::new(event))
    }
}

/// Echo server bound from a [`ServerConfig`]
pub struct GreeterServer {
    config: ServerConfig,
}

impl GreeterServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bind the configured address and serve until `signal` resolves
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let addr: SocketAddr = self.config.bind_address.parse().map_err(|e| {
            Error::ConfigError(format!(
                "Invalid bind address '{}': {}",
                self.config.bind_address, e
            ))
        })?;

        let listener = TcpListener::bind(addr).await?;
        Self::serve_with_listener(listener, signal).await
    }

    /// Serve on an already-bound listener until `signal` resolves
    pub async fn serve_with_listener<F>(listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        serve_service_with_listener(EchoGreeter, listener, signal).await
    }
}

/// Serve any `Greeter` implementation on `listener` until `signal` resolves
pub async fn serve_service_with_listener<G, F>(
    greeter: G,
    listener: TcpListener,
    signal: F,
) -> Result<()>
where
    G: Greeter,
    F: Future<Output = ()> + Send,
{
    let addr = listener.local_addr()?;
    info!(%addr, "gRPC server listening");

    Server::builder()
        .trace_fn(|_| tracing::info_span!("grpc_request"))
        .add_service(greeter_server::GreeterServer::new(greeter))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
        .await?;

    info!(%addr, "Server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::greeting_event;
    use crate::EventBuilder;

    #[tokio::test]
    async fn test_echo_greeting() {
        let response = EchoGreeter
            .hello(Request::new(greeting_event()))
            .await
            .unwrap();
        assert_eq!(response.into_inner(), greeting_event());
    }

    #[tokio::test]
    async fn test_echo_keeps_attributes() {
        let event = EventBuilder::new()
            .id("abc")
            .source("urn:test")
            .spec_version("1.0")
            .event_type("com.example.echo")
            .extension("retries", 2)
            .binary_data(vec![0u8, 1, 2])
            .build()
            .unwrap();

        let response = EchoGreeter.hello(Request::new(event.clone())).await.unwrap();
        assert_eq!(response.into_inner(), event);
    }

    #[tokio::test]
    async fn test_invalid_bind_address() {
        let server = GreeterServer::new(ServerConfig {
            bind_address: "not-an-address".to_string(),
            ..ServerConfig::default()
        });

        let err = server
            .serve_with_shutdown(std::future::ready(()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_serve_stops_on_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(GreeterServer::serve_with_listener(listener, async {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
