//! Output registry - content type -> subscribers, in registration order.

use std::collections::HashMap;

/// Callback receiving `(resolved_content, passage_id)`.
pub type OutputCallback = Box<dyn FnMut(&str, &str)>;

/// Fan-out table from content type to subscriber callbacks.
#[derive(Default)]
pub struct OutputRegistry {
    outputs: HashMap<String, Vec<OutputCallback>>,
}

impl OutputRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for a content type.
    pub fn add<F>(&mut self, content_type: impl Into<String>, callback: F)
    where
        F: FnMut(&str, &str) + 'static,
    {
        self.outputs
            .entry(content_type.into())
            .or_default()
            .push(Box::new(callback));
    }

    /// Deliver content to every subscriber of `content_type`.
    ///
    /// Returns the number of subscribers called.
    pub fn emit(&mut self, content_type: &str, content: &str, passage_id: &str) -> usize {
        let Some(callbacks) = self.outputs.get_mut(content_type) else {
            return 0;
        };
        for callback in callbacks.iter_mut() {
            callback(content, passage_id);
        }
        callbacks.len()
    }

    /// Number of subscribers for a content type.
    pub fn subscriber_count(&self, content_type: &str) -> usize {
        self.outputs.get(content_type).map_or(0, Vec::len)
    }

    /// Content types with at least one subscriber.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for OutputRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .outputs
            .iter()
            .map(|(content_type, callbacks)| (content_type.as_str(), callbacks.len()))
            .collect();
        f.debug_struct("OutputRegistry")
            .field("subscribers", &counts)
            .finish()
    }
}
