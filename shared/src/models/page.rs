//! Page Model (page-builder content)

use serde::{Deserialize, Serialize};

/// CMS page entity
///
/// `content` is the page builder's block document and is stored opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: serde_json::Value,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create page payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCreate {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: serde_json::Value,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_published: Option<bool>,
}

/// Update page payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageUpdate {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<serde_json::Value>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_published: Option<bool>,
}
