use std::env;
use std::str::FromStr;

use crate::services::layout::{LayoutPolicy, SectionSpec};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub sources: SourcesConfig,
    pub http: HttpConfig,
    pub sessions: SessionConfig,
    pub seatmap: SeatmapConfig,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Откуда берутся данные страницы
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub events_source: String,
    pub seatmap_source: String,
    /// Скрипт таблицы: GET - занятые места, POST - бронь.
    pub booking_endpoint: String,
    pub corporate_source: String,
    pub films_source: String,
    /// Страница бронирования, на которую ведут карточки событий.
    pub booking_page: String,
}

// Настройки HTTP-клиента
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub catalog_cache_ttl_seconds: u64,
}

// Время жизни сессий бронирования
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_seconds: u64,
    pub sweep_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SeatmapConfig {
    pub policy: LayoutPolicy,
}

impl SourcesConfig {
    /// Все источники сайта относительно одного базового адреса.
    pub fn under(base: &str, booking_endpoint: impl Into<String>) -> Self {
        let base = base.trim_end_matches('/');
        SourcesConfig {
            events_source: format!("{}/data/live-events.json", base),
            seatmap_source: format!("{}/data/seatmap.json", base),
            booking_endpoint: booking_endpoint.into(),
            corporate_source: format!("{}/data/corporate.json", base),
            films_source: format!("{}/data/films.json", base),
            booking_page: "booking.html".to_string(),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn number<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}

/// `SEATPLAN` или `PREMIUM=Premium,PLATINUM=Platinum`.
pub fn parse_sections(raw: &str) -> Vec<SectionSpec> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, display)) => SectionSpec {
                key: key.trim().to_string(),
                display: display.to_string(),
            },
            None => SectionSpec { key: entry.to_string(), display: entry.to_string() },
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Без SEATMAP_SECTIONS - одна секция с пустым заголовком, как на сайте
        let policy = match env::var("SEATMAP_SECTIONS") {
            Ok(raw) if !raw.trim().is_empty() => LayoutPolicy {
                sections: parse_sections(&raw),
                ..LayoutPolicy::default()
            },
            _ => LayoutPolicy::default(),
        };

        // Источники по умолчанию лежат рядом с сайтом
        let site = SourcesConfig::under(
            &var_or("SITE_BASE_URL", "http://localhost:8080"),
            required("BOOKING_ENDPOINT")?,
        );

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: number("PORT", "8000")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "seat_booking=debug,tower_http=debug"),
            },
            sources: SourcesConfig {
                events_source: var_or("EVENTS_SOURCE", &site.events_source),
                seatmap_source: var_or("SEATMAP_SOURCE", &site.seatmap_source),
                corporate_source: var_or("CORPORATE_SOURCE", &site.corporate_source),
                films_source: var_or("FILMS_SOURCE", &site.films_source),
                booking_page: var_or("BOOKING_PAGE", &site.booking_page),
                booking_endpoint: site.booking_endpoint,
            },
            http: HttpConfig {
                timeout_seconds: number("HTTP_TIMEOUT_SECONDS", "30")?,
                catalog_cache_ttl_seconds: number("CATALOG_CACHE_TTL_SECONDS", "300")?,
            },
            sessions: SessionConfig {
                ttl_seconds: number("SESSION_TTL_SECONDS", "1800")?,
                sweep_seconds: number("SESSION_SWEEP_SECONDS", "300")?,
            },
            seatmap: SeatmapConfig { policy },
        })
    }
}
