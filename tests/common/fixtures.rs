//! Batch payload factories
//!
//! Build raw JSON payloads the way a producer would publish them.

use serde_json::{Value, json};
use uuid::Uuid;

/// Builder for raw batch payloads
#[derive(Debug, Clone)]
pub struct BatchFactory {
    correlation_id: String,
    actions: Vec<Value>,
}

impl Default for BatchFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchFactory {
    pub fn new() -> Self {
        Self {
            correlation_id: format!("test-{}", &Uuid::new_v4().to_string()[..8]),
            actions: Vec::new(),
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.correlation_id = id.to_string();
        self
    }

    /// Add a POST action with default timeout and statuses
    pub fn action(self, id: &str, url: &str) -> Self {
        self.raw_action(json!({ "id": id, "url": url }))
    }

    /// Add an action given in full
    pub fn raw_action(mut self, action: Value) -> Self {
        self.actions.push(action);
        self
    }

    pub fn build(&self) -> Value {
        json!({
            "correlationId": self.correlation_id,
            "actions": self.actions,
        })
    }

    pub fn bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.build()).expect("serialize batch")
    }
}
