use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

impl Event {
    /// Строка под заголовком: "Площадка • 15 Mar 2025".
    pub fn meta_line(&self) -> String {
        format!("{} • {}", self.venue, format_date_label(&self.date))
    }
}

/// Каталог событий: `{ "events": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventCatalog {
    #[serde(default)]
    pub events: Vec<Event>,
}

impl EventCatalog {
    pub fn find(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }
}

/// Дата в виде "15 Mar 2025". Нераспознанная строка возвращается как есть.
pub fn format_date_label(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d %b %Y").to_string();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%d %b %Y").to_string();
    }
    raw.to_string()
}

/// Год из даты события, если её удалось разобрать.
pub fn year_of(raw: &str) -> Option<i32> {
    use chrono::Datelike;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.year())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.year()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_dates() {
        assert_eq!(format_date_label("2025-03-15"), "15 Mar 2025");
        assert_eq!(format_date_label("2024-08-01T19:30:00+08:00"), "01 Aug 2024");
    }

    #[test]
    fn passes_through_unparsable_dates() {
        assert_eq!(format_date_label(""), "");
        assert_eq!(format_date_label("sometime soon"), "sometime soon");
    }

    #[test]
    fn extracts_year() {
        assert_eq!(year_of("2024-11-20"), Some(2024));
        assert_eq!(year_of("2023-01-05T10:00:00Z"), Some(2023));
        assert_eq!(year_of("TBA"), None);
    }

    #[test]
    fn catalog_lookup_by_id() {
        let catalog: EventCatalog = serde_json::from_str(
            r#"{"events":[{"id":"event-001","title":"Summit","date":"2025-03-15","venue":"Marina Bay Sands","status":"upcoming"}]}"#,
        )
        .unwrap();

        let event = catalog.find("event-001").unwrap();
        assert_eq!(event.meta_line(), "Marina Bay Sands • 15 Mar 2025");
        assert!(catalog.find("event-999").is_none());
    }
}
