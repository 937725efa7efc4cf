use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{OrderId, TransactionStatus};

pub const SUBMIT_ROUTE: &str = "/submit";

/// Extra field appended when the submit control carries `data-type`.
pub const TYPE_FIELD: &str = "type";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
    pub name: String,
    pub value: String,
}

/// Ordered multipart fields of one submission. Repeated names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPayload {
    entries: Vec<FormEntry>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(FormEntry {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn submit_type(&self) -> Option<&str> {
        self.get(TYPE_FIELD)
    }

    /// The submit type interpreted as a transaction status, when it is one.
    pub fn status(&self) -> Option<TransactionStatus> {
        self.submit_type()?.parse().ok()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormPayload {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut payload = FormPayload::new();
        for (name, value) in iter {
            payload.append(name, value);
        }
        payload
    }
}

/// Body returned by the submit endpoint. It is only ever logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitAck {
    Order {
        #[serde(rename = "orderId")]
        order_id: OrderId,
    },
    Message {
        message: String,
    },
    Other(Value),
}

impl SubmitAck {
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(SubmitAck::Other(value))
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            SubmitAck::Order { order_id } => Some(order_id),
            _ => None,
        }
    }
}
