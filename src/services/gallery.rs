//! gallery.rs
//!
//! Витрина портфолио: события, корпоративные проекты и фильмы.
//! Источник загружается по сети, при сбое берутся данные, вшитые в сборку.

use futures::future::join_all;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, warn};

use crate::cache::CacheService;
use crate::config::SourcesConfig;
use crate::models::{
    event::year_of,
    gallery::{GalleryCard, GalleryDocument, GalleryItem},
};
use crate::remote_client::RemoteClient;

pub const FILTER_ALL: &str = "all";
pub const UPCOMING_STATUS: &str = "upcoming";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GallerySource {
    Events,
    Corporate,
    Films,
}

impl GallerySource {
    pub fn key(&self) -> &'static str {
        match self {
            GallerySource::Events => "events",
            GallerySource::Corporate => "corporate",
            GallerySource::Films => "films",
        }
    }

    fn url<'a>(&self, sources: &'a SourcesConfig) -> &'a str {
        match self {
            GallerySource::Events => &sources.events_source,
            GallerySource::Corporate => &sources.corporate_source,
            GallerySource::Films => &sources.films_source,
        }
    }

    fn fallback(&self) -> &'static str {
        match self {
            GallerySource::Events => include_str!("../../data/live-events.json"),
            GallerySource::Corporate => include_str!("../../data/corporate.json"),
            GallerySource::Films => include_str!("../../data/films.json"),
        }
    }
}

impl FromStr for GallerySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "events" | "live-events" => Ok(GallerySource::Events),
            "corporate" => Ok(GallerySource::Corporate),
            "films" => Ok(GallerySource::Films),
            other => Err(format!("unknown gallery source '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GalleryView {
    Cards { cards: Vec<GalleryCard> },
    Empty { message: &'static str },
    Error { message: &'static str },
}

impl GalleryView {
    fn empty() -> Self {
        GalleryView::Empty { message: "No projects found for this filter." }
    }

    fn error() -> Self {
        GalleryView::Error { message: "Unable to load projects. Please try again later." }
    }
}

/// `all` пропускает всё, иначе совпадение по status, category или type.
pub fn filter_items<'a>(items: &'a [GalleryItem], filter: &str) -> Vec<&'a GalleryItem> {
    if filter == FILTER_ALL {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            [&item.status, &item.category, &item.kind]
                .into_iter()
                .any(|field| field.as_deref() == Some(filter))
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn year_label(item: &GalleryItem) -> Option<String> {
    match &item.year {
        Some(serde_json::Value::Number(n)) if n.as_f64() != Some(0.0) => return Some(n.to_string()),
        Some(serde_json::Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        _ => {}
    }
    item.date
        .as_deref()
        .and_then(year_of)
        .map(|y| y.to_string())
}

fn booking_url(booking_page: &str, event_id: &str) -> Option<String> {
    let query = serde_urlencoded::to_string([("eventId", event_id)]).ok()?;
    Some(format!("{}?{}", booking_page, query))
}

/// Карточка портфолио. Кнопка бронирования только у предстоящих событий.
pub fn card(item: &GalleryItem, index: usize, source: GallerySource, booking_page: &str) -> GalleryCard {
    let category = [&item.client, &item.venue, &item.role, &item.status]
        .into_iter()
        .find_map(non_empty)
        .unwrap_or_else(|| "Project".to_string());

    let bookable = source == GallerySource::Events
        && item.status.as_deref() == Some(UPCOMING_STATUS);

    GalleryCard {
        index,
        id: item.id.clone(),
        title: item.title.clone(),
        description: item.description.clone().unwrap_or_default(),
        thumbnail: non_empty(&item.thumbnail),
        video_url: non_empty(&item.video_url),
        category,
        year: year_label(item),
        booking_url: if bookable { booking_url(booking_page, &item.id) } else { None },
    }
}

#[derive(Clone)]
pub struct GalleryService {
    client: RemoteClient,
    cache: CacheService,
    sources: SourcesConfig,
}

impl GalleryService {
    pub fn new(client: RemoteClient, cache: CacheService, sources: SourcesConfig) -> Self {
        Self { client, cache, sources }
    }

    /// Список элементов источника: кеш, затем сеть, затем вшитые данные.
    pub async fn items(&self, source: GallerySource) -> Option<Arc<Vec<GalleryItem>>> {
        if let Some(items) = self.cache.get_gallery_items(source.key()).await {
            return Some(items);
        }

        match self
            .client
            .get_json::<GalleryDocument>(source.url(&self.sources), &[])
            .await
        {
            Ok(doc) => Some(self.cache.put_gallery_items(source.key(), doc.into_items()).await),
            Err(e) => {
                warn!("Failed to load {} gallery, using bundled data: {}", source.key(), e);
                match serde_json::from_str::<GalleryDocument>(source.fallback()) {
                    Ok(doc) => Some(Arc::new(doc.into_items())),
                    Err(e) => {
                        error!("Bundled {} gallery data is invalid: {}", source.key(), e);
                        None
                    }
                }
            }
        }
    }

    pub async fn view(&self, source: GallerySource, filter: Option<&str>) -> GalleryView {
        let Some(items) = self.items(source).await else {
            return GalleryView::error();
        };

        let filter = filter.filter(|f| !f.is_empty()).unwrap_or(FILTER_ALL);
        let cards: Vec<GalleryCard> = filter_items(&items, filter)
            .into_iter()
            .enumerate()
            .map(|(index, item)| card(item, index, source, &self.sources.booking_page))
            .collect();

        if cards.is_empty() {
            GalleryView::empty()
        } else {
            GalleryView::Cards { cards }
        }
    }

    /// Прогрев кеша при старте, источники грузятся параллельно
    pub async fn warmup(&self) {
        let sources = [GallerySource::Events, GallerySource::Corporate, GallerySource::Films];
        join_all(sources.into_iter().map(|source| self.items(source))).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base: &str, ttl: u64) -> GalleryService {
        let sources = SourcesConfig::under(base, format!("{}/exec", base));
        let http = HttpConfig { timeout_seconds: 5, catalog_cache_ttl_seconds: ttl };
        let client = RemoteClient::new(&sources, &http).unwrap();
        GalleryService::new(client, CacheService::new(ttl), sources)
    }

    fn item(value: serde_json::Value) -> GalleryItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn filter_matches_status_category_or_type() {
        let items = vec![
            item(json!({"id": "1", "status": "upcoming"})),
            item(json!({"id": "2", "category": "brand"})),
            item(json!({"id": "3", "type": "short"})),
            item(json!({"id": "4", "status": "completed"})),
        ];
        let ids = |f: &str| filter_items(&items, f).iter().map(|i| i.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids("all"), vec!["1", "2", "3", "4"]);
        assert_eq!(ids("upcoming"), vec!["1"]);
        assert_eq!(ids("brand"), vec!["2"]);
        assert_eq!(ids("short"), vec!["3"]);
        assert!(ids("nothing").is_empty());
    }

    #[test]
    fn upcoming_events_get_booking_link() {
        let upcoming = item(json!({
            "id": "event 001", "title": "Summit", "date": "2025-03-15",
            "venue": "Marina Bay Sands", "status": "upcoming", "thumbnail": ""
        }));
        let c = card(&upcoming, 0, GallerySource::Events, "booking.html");
        assert_eq!(c.category, "Marina Bay Sands");
        assert_eq!(c.year.as_deref(), Some("2025"));
        assert_eq!(c.booking_url.as_deref(), Some("booking.html?eventId=event+001"));
        assert!(c.thumbnail.is_none());

        // тот же элемент вне раздела событий без кнопки
        let c = card(&upcoming, 0, GallerySource::Films, "booking.html");
        assert!(c.booking_url.is_none());

        let done = item(json!({"id": "event-002", "status": "completed"}));
        assert!(card(&done, 1, GallerySource::Events, "booking.html").booking_url.is_none());
    }

    #[test]
    fn category_falls_back_to_project() {
        let film = item(json!({"id": "film-001", "role": "", "year": 2024}));
        let c = card(&film, 0, GallerySource::Films, "booking.html");
        assert_eq!(c.category, "Project");
        assert_eq!(c.year.as_deref(), Some("2024"));
    }

    #[tokio::test]
    async fn loads_and_filters_remote_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/corporate.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [
                    {"id": "corp-001", "title": "Brand Story", "client": "DBS Bank", "year": 2024, "category": "brand"},
                    {"id": "corp-003", "title": "Launch", "client": "Shopee", "year": 2024, "category": "product"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gallery = service(&server.uri(), 60);
        let GalleryView::Cards { cards } = gallery.view(GallerySource::Corporate, Some("product")).await else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].category, "Shopee");

        // второй запрос обслуживается из кеша
        assert_eq!(gallery.view(GallerySource::Corporate, Some("nope")).await, GalleryView::empty());
    }

    #[tokio::test]
    async fn warmup_fills_cache_for_every_source() {
        let server = MockServer::start().await;
        for (file, key) in [("live-events", "events"), ("corporate", "projects"), ("films", "films")] {
            Mock::given(method("GET"))
                .and(path(format!("/data/{}.json", file)))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(r#"{{"{}": [{{"id": "{}"}}]}}"#, key, file)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let gallery = service(&server.uri(), 60);
        gallery.warmup().await;

        let films = gallery.items(GallerySource::Films).await.unwrap();
        assert_eq!(films[0].id, "films");
    }

    #[tokio::test]
    async fn falls_back_to_bundled_data_when_source_is_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gallery = service(&server.uri(), 0);
        let GalleryView::Cards { cards } = gallery.view(GallerySource::Events, Some(UPCOMING_STATUS)).await else {
            panic!("expected bundled cards");
        };
        assert!(!cards.is_empty());
        assert!(cards.iter().all(|c| c.booking_url.is_some()));
    }
}
