pub mod client;
pub mod serialization;

pub use client::{
    ClientStats, CollectorClient, DeliveryConfig, DeliveryError, DeliveryReceipt, DeliveryStats,
};
pub use serialization::{BatchSerializer, SerializationError, WireSchema};

use crate::domain::Event;
use std::future::Future;

/// Destination for delivered batches.
///
/// The agent loop only talks to this seam; production uses
/// [`CollectorClient`], tests plug in in-process sinks.
pub trait BatchSink: Send + Sync {
    fn send(
        &self,
        events: &[Event],
    ) -> impl Future<Output = Result<DeliveryReceipt, DeliveryError>> + Send;

    fn endpoint(&self) -> &str;
}

impl BatchSink for CollectorClient {
    async fn send(&self, events: &[Event]) -> Result<DeliveryReceipt, DeliveryError> {
        self.send_events(events).await
    }

    fn endpoint(&self) -> &str {
        CollectorClient::endpoint(self)
    }
}
