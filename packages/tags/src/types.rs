// ABOUTME: Tag type definitions
// ABOUTME: Tags, their associations with records, and query scopes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCreateInput {
    pub name: String,
}

/// A tagged record, identified by its content type and id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedObject {
    pub content_type: String,
    pub object_id: String,
}

/// A tag together with the number of records it appears on, when requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountedTag {
    #[serde(flatten)]
    pub tag: Tag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

/// Extra restrictions applied when searching tags by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagFilter {
    /// Only tags attached to at least one record of this content type
    pub content_type: Option<String>,
}

/// The set of records a tag query runs over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectSource {
    /// Every record of a content type
    Model(String),
    /// A content type restricted to the listed object ids
    Queryset {
        content_type: String,
        object_ids: Vec<String>,
    },
}

impl ObjectSource {
    pub fn content_type(&self) -> &str {
        match self {
            ObjectSource::Model(content_type) => content_type,
            ObjectSource::Queryset { content_type, .. } => content_type,
        }
    }

    pub fn object_ids(&self) -> Option<&[String]> {
        match self {
            ObjectSource::Model(_) => None,
            ObjectSource::Queryset { object_ids, .. } => Some(object_ids),
        }
    }
}
