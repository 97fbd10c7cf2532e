use async_trait::async_trait;
use voyage_events::{Event, EventHandler};

/// Logs every vehicle as it is created.
pub struct VehicleCreatedListener;

#[async_trait]
impl EventHandler for VehicleCreatedListener {
    fn name(&self) -> &'static str {
        "vehicles.log_created"
    }

    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let id = event
            .payload
            .get("id")
            .ok_or_else(|| anyhow::anyhow!("vehicleCreated payload carries no id"))?;
        tracing::info!(event_id = %event.id, vehicle_id = %id, "new vehicle created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn accepts_payloads_with_an_id() {
        let event = Event::new("vehicleCreated", json!({"id": 4, "model": "Civic", "year": 2020}));
        VehicleCreatedListener.handle(&event).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_payloads_without_an_id() {
        let event = Event::new("vehicleCreated", json!({"model": "Civic"}));
        assert!(VehicleCreatedListener.handle(&event).await.is_err());
    }
}
