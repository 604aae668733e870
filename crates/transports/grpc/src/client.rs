//! Blocking Greeter client
//!
//! The client borrows an existing [`ManagedChannel`]; it never owns or
//! shuts the channel down, so one channel can serve many clients.

use crate::event::greeting_event;
use crate::generated::example::greeter_client::GreeterClient;
use crate::generated::v1::CloudEvent;
use crate::ManagedChannel;
use tonic::transport::Channel;
use tonic::{Request, Status};
use tracing::{info, warn};

/// Blocking stub for the `Greeter` service
pub struct Client<'a> {
    stub: GreeterClient<Channel>,
    channel: &'a ManagedChannel,
}

impl<'a> Client<'a> {
    /// Construct a client over an existing channel
    pub fn new(channel: &'a ManagedChannel) -> Self {
        Self {
            stub: GreeterClient::new(channel.channel()),
            channel,
        }
    }

    /// Send `event` on `Hello` and wait for the reply
    ///
    /// Blocks the calling thread. Panics if called from within an async
    /// context.
    pub fn hello(&self, event: CloudEvent) -> Result<CloudEvent, Status> {
        let mut stub = self.stub.clone();
        self.channel
            .handle()
            .block_on(async move { stub.hello(Request::new(event)).await })
            .map(|response| response.into_inner())
    }

    /// Send the greeting event and log the outcome
    ///
    /// An RPC failure is logged at warn and swallowed; the response is
    /// returned only when the call succeeded.
    pub fn greet(&self) -> Option<CloudEvent> {
        let request = greeting_event();
        info!("Sending CloudEvent: {}", request.short_debug());

        let response = match self.hello(request) {
            Ok(response) => response,
            Err(status) => {
                warn!(
                    endpoint = %self.channel.target(),
                    code = ?status.code(),
                    detail = %status.message(),
                    "RPC failed"
                );
                return None;
            }
        };

        info!("Received response: {}", response.short_debug());
        Some(response)
    }
}
