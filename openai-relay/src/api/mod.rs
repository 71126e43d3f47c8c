//! Per-resource request and response types, and the [`Client`](crate::Client)
//! methods that use them.
//!
//! Completion-style endpoints (completions, edits, chat, embeddings, images)
//! answer with a loose [`Envelope`](crate::Envelope). Everything else decodes
//! into a per-resource type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::request::Query;

pub mod assistants;
pub mod audio;
pub mod chat;
pub mod completions;
pub mod edits;
pub mod embeddings;
pub mod files;
pub mod fine_tuning;
pub mod images;
pub mod messages;
pub mod models;
pub mod moderations;
pub mod runs;
pub mod threads;

/// Up to 16 caller-defined key/value pairs attached to an object.
pub type Metadata = HashMap<String, String>;

/// Replaces the metadata of a thread, message or run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyMetadata {
    /// Replacement metadata.
    pub metadata: Metadata,
}

/// A page of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Always `list`.
    #[serde(default)]
    pub object: String,
    /// Items on this page.
    pub data: Vec<T>,
    /// Id of the first item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_id: Option<String>,
    /// Id of the last item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
    /// Whether more pages follow.
    #[serde(default)]
    pub has_more: bool,
}

/// Result of a delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionStatus {
    /// Id of the deleted object.
    pub id: String,
    /// Object type.
    #[serde(default)]
    pub object: String,
    /// Whether the deletion happened.
    pub deleted: bool,
}

/// Sort order for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

impl Order {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Cursor pagination for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Page size, 1 to 100.
    pub limit: Option<u32>,
    /// Sort order by creation time.
    pub order: Option<Order>,
    /// Return objects after this id.
    pub after: Option<String>,
    /// Return objects before this id.
    pub before: Option<String>,
}

impl ListParams {
    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the `after` cursor.
    #[must_use]
    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    /// Sets the `before` cursor.
    #[must_use]
    pub fn before(mut self, id: impl Into<String>) -> Self {
        self.before = Some(id.into());
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .push_opt("limit", self.limit)
            .push_opt("order", self.order.map(Order::as_str))
            .push_opt("after", self.after.as_deref())
            .push_opt("before", self.before.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn list_params_to_query() {
        let query = ListParams::default()
            .limit(5)
            .order(Order::Desc)
            .after("obj_1")
            .to_query();
        let pairs: Vec<_> = query.iter().collect();
        assert_eq!(pairs, [("limit", "5"), ("order", "desc"), ("after", "obj_1")]);
        assert!(ListParams::default().to_query().is_empty());
    }

    #[test]
    fn list_response_decodes() {
        let page: ListResponse<DeletionStatus> = serde_json::from_str(
            r#"{"object":"list","data":[{"id":"a","object":"file","deleted":true}],"has_more":false}"#,
        )
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.data[0].deleted);
        assert!(page.first_id.is_none());
    }
}
