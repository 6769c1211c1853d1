//! Data types exchanged with the attribute and document stores.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document: a JSON object keyed by attribute (system keys start with `$`).
pub type Document = Map<String, Value>;

/// Key under which a document's ID is stored.
pub const DOCUMENT_ID_KEY: &str = "$id";

/// Key under which a document's owning collection is stored.
pub const DOCUMENT_COLLECTION_KEY: &str = "$collection";

/// Lifecycle status of an attribute.
///
/// Attributes are created asynchronously by the database worker; only
/// [`AttributeStatus::Available`] attributes exist in the physical schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeStatus {
    Available,
    Processing,
    Deleting,
    Stuck,
    Failed,
}

impl AttributeStatus {
    /// Returns `true` if the attribute participates in the schema.
    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// A declared field of a dynamically-defined collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Owning collection ID.
    pub collection_id: String,
    /// Attribute key as stored in documents.
    pub key: String,
    /// Raw type tag (`string`, `integer`, `double`, `boolean`, ...).
    #[serde(rename = "type")]
    pub attr_type: String,
    /// Whether the attribute holds a list of values.
    #[serde(default)]
    pub array: bool,
    /// Whether a value is mandatory on write.
    #[serde(default)]
    pub required: bool,
    /// Lifecycle status.
    pub status: AttributeStatus,
}

impl Attribute {
    /// Creates an available, optional, scalar attribute.
    pub fn new(
        collection_id: impl Into<String>,
        key: impl Into<String>,
        attr_type: impl Into<String>,
    ) -> Self {
        Self {
            collection_id: collection_id.into(),
            key: key.into(),
            attr_type: attr_type.into(),
            array: false,
            required: false,
            status: AttributeStatus::Available,
        }
    }

    /// Marks the attribute as list-valued.
    #[must_use]
    pub fn with_array(mut self, array: bool) -> Self {
        self.array = array;
        self
    }

    /// Marks the attribute as required.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the lifecycle status.
    #[must_use]
    pub fn with_status(mut self, status: AttributeStatus) -> Self {
        self.status = status;
        self
    }
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Asc,
    Desc,
}

impl OrderType {
    /// Parses an order type, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Parameters for listing documents in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Maximum number of documents to return.
    pub limit: usize,
    /// Number of documents to skip.
    pub offset: usize,
    /// Document ID after which to start listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Attributes to order by, in priority order.
    #[serde(default)]
    pub order_attributes: Vec<String>,
    /// Direction for each entry of `order_attributes`.
    #[serde(default)]
    pub order_types: Vec<OrderType>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            cursor: None,
            order_attributes: Vec::new(),
            order_types: Vec::new(),
        }
    }
}

impl ListQuery {
    /// Creates a query with default limit and no ordering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the offset.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Adds an ordering clause.
    #[must_use]
    pub fn with_order(mut self, attribute: impl Into<String>, order: OrderType) -> Self {
        self.order_attributes.push(attribute.into());
        self.order_types.push(order);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_deserialize() {
        let attr: Attribute = serde_json::from_value(json!({
            "collectionId": "posts",
            "key": "title",
            "type": "string",
            "required": true,
            "status": "processing"
        }))
        .unwrap();

        assert_eq!(attr.collection_id, "posts");
        assert_eq!(attr.attr_type, "string");
        assert!(attr.required);
        assert!(!attr.array);
        assert!(!attr.status.is_available());
    }

    #[test]
    fn test_order_type_parse() {
        assert_eq!(OrderType::parse("asc"), Some(OrderType::Asc));
        assert_eq!(OrderType::parse("DESC"), Some(OrderType::Desc));
        assert_eq!(OrderType::parse("sideways"), None);
    }

    #[test]
    fn test_list_query_builder() {
        let query = ListQuery::new()
            .with_limit(10)
            .with_offset(5)
            .with_order("title", OrderType::Desc);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 5);
        assert_eq!(query.order_attributes, vec!["title".to_string()]);
        assert_eq!(query.order_types, vec![OrderType::Desc]);
    }
}
