use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Элемент портфолио. Источники различаются по набору полей,
/// поэтому почти всё необязательное.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
}

/// Документ источника: список лежит под `events`, `projects` или `films`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryDocument {
    #[serde(default)]
    pub events: Option<Vec<GalleryItem>>,
    #[serde(default)]
    pub projects: Option<Vec<GalleryItem>>,
    #[serde(default)]
    pub films: Option<Vec<GalleryItem>>,
}

impl GalleryDocument {
    pub fn into_items(self) -> Vec<GalleryItem> {
        self.events
            .or(self.projects)
            .or(self.films)
            .unwrap_or_default()
    }
}

/// Карточка, готовая к отрисовке.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryCard {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
}
