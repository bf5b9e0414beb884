use super::Event;
use crate::config::types::InputConfig;
use serde_json::Value;
use std::collections::BTreeMap;

/// Generic per-event decoration: extra fields, tags and an event type.
#[derive(Debug, Clone, Default)]
pub struct Decorator {
    add_field: BTreeMap<String, String>,
    tags: Vec<String>,
    event_type: Option<String>,
}

impl Decorator {
    pub fn new(
        add_field: BTreeMap<String, String>,
        tags: Vec<String>,
        event_type: Option<String>,
    ) -> Self {
        Self {
            add_field,
            tags,
            event_type,
        }
    }

    pub fn from_config(input: &InputConfig) -> Self {
        Self::new(
            input.add_field.clone(),
            input.tags.clone(),
            input.event_type.clone(),
        )
    }

    pub fn decorate(&self, event: &mut Event) {
        if let Some(event_type) = &self.event_type {
            event
                .fields
                .entry("type")
                .or_insert_with(|| Value::String(event_type.clone()));
        }

        for (key, value) in &self.add_field {
            event
                .fields
                .entry(key.clone())
                .or_insert_with(|| Value::String(value.clone()));
        }

        if self.tags.is_empty() {
            return;
        }

        let tags = event
            .fields
            .entry("tags")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !tags.is_array() {
            let existing = tags.take();
            *tags = Value::Array(vec![existing]);
        }
        if let Value::Array(list) = tags {
            for tag in &self.tags {
                let tag = Value::String(tag.clone());
                if !list.contains(&tag) {
                    list.push(tag);
                }
            }
        }
    }
}
