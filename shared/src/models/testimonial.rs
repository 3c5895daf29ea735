//! Testimonial Model

use serde::{Deserialize, Serialize};

/// Client testimonial shown on the public site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Testimonial {
    pub id: i64,
    pub author_name: String,
    pub content: String,
    /// 1..=5 stars
    pub rating: i32,
    pub photo_url: Option<String>,
    pub is_published: bool,
    pub position: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialCreate {
    pub author_name: String,
    pub content: String,
    pub rating: i32,
    pub photo_url: Option<String>,
    pub is_published: Option<bool>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestimonialUpdate {
    pub author_name: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i32>,
    pub photo_url: Option<String>,
    pub is_published: Option<bool>,
    pub position: Option<i32>,
}
