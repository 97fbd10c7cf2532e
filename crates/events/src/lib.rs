//! In-process publish/subscribe bus.
//!
//! Delivery is at-most-once and best-effort: [`EventBus::emit`] spawns one task
//! per subscribed handler and returns without waiting. A handler that fails or
//! panics is logged and forgotten; the emitter never sees it.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A named notification with its payload.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub payload: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub emitted_at: OffsetDateTime,
}

impl Event {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            payload,
            emitted_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Something that reacts to events it was subscribed to.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

type Subscribers = HashMap<String, Vec<Arc<dyn EventHandler>>>;

/// Cloneable handle; every clone sees the same subscriptions.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, event: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event = event.into();
        tracing::debug!(
            target: "voyage-events",
            event = %event,
            handler = handler.name(),
            "handler subscribed"
        );
        self.subscribers
            .write()
            .await
            .entry(event)
            .or_default()
            .push(handler);
    }

    pub async fn subscriber_count(&self, event: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Hand `payload` to every handler subscribed to `name`.
    ///
    /// Returns the number of handlers the event was dispatched to; it says
    /// nothing about whether they succeeded.
    pub async fn emit(&self, name: &str, payload: Value) -> usize {
        let handlers = self
            .subscribers
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::trace!(target: "voyage-events", event = name, "no subscribers");
            return 0;
        }

        let event = Arc::new(Event::new(name, payload));
        for handler in &handlers {
            dispatch(handler.clone(), event.clone());
        }
        handlers.len()
    }
}

fn dispatch(handler: Arc<dyn EventHandler>, event: Arc<Event>) {
    let handler_name = handler.name();
    let event_name = event.name.clone();
    let event_id = event.id;

    let delivery = tokio::spawn(async move { handler.handle(event.as_ref()).await });

    tokio::spawn(async move {
        match delivery.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(
                target: "voyage-events",
                event = %event_name,
                event_id = %event_id,
                handler = handler_name,
                error = %err,
                "event handler failed"
            ),
            Err(join_err) => tracing::error!(
                target: "voyage-events",
                event = %event_name,
                event_id = %event_id,
                handler = handler_name,
                error = %join_err,
                "event handler panicked"
            ),
        }
    });
}
