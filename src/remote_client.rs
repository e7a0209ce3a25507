//! remote_client.rs
//!
//! HTTP-клиент для внешних источников страницы бронирования:
//! каталог событий, схема зала, занятые места и приём заявок
//! (скрипт, который пишет брони в таблицу).

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{HttpConfig, SourcesConfig};
use crate::models::{
    booking::{BookedSeatsResponse, BookingRequest, SubmitOutcome},
    event::EventCatalog,
    layout::{LayoutError, SeatLayout},
    seat::SeatId,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Нет ответа: сеть, DNS, таймаут.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream responded with {0}")]
    Status(StatusCode),
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Клиент внешних источников
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    events_source: String,
    seatmap_source: String,
    booking_endpoint: String,
}

impl RemoteClient {
    pub fn new(sources: &SourcesConfig, http: &HttpConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .build()?;

        Ok(Self {
            http: client,
            events_source: sources.events_source.clone(),
            seatmap_source: sources.seatmap_source.clone(),
            booking_endpoint: sources.booking_endpoint.clone(),
        })
    }

    /// Общий путь для GET-запросов: статус не 2xx - ошибка, тело разбирается как JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_catalog(&self) -> Result<EventCatalog, ClientError> {
        self.get_json(&self.events_source, &[]).await
    }

    pub async fn fetch_layout(&self, event_id: &str) -> Result<SeatLayout, ClientError> {
        let raw: serde_json::Value = self
            .get_json(&self.seatmap_source, &[("eventId", event_id)])
            .await?;
        let layout = SeatLayout::from_value(&raw)?;
        debug!("Loaded seat layout for {}: {} sections", event_id, layout.sections.len());
        Ok(layout)
    }

    pub async fn fetch_booked_seats(&self, event_id: &str) -> Result<BTreeSet<SeatId>, ClientError> {
        let response: BookedSeatsResponse = self
            .get_json(&self.booking_endpoint, &[("eventId", event_id)])
            .await?;
        let booked: BTreeSet<SeatId> = response.seat_ids().into_iter().collect();
        debug!("Booked seats for {}: {}", event_id, booked.len());
        Ok(booked)
    }

    /// Отправляет заявку одним полем формы `data`.
    ///
    /// Ошибкой считается только отсутствие ответа. Статус HTTP не проверяется,
    /// тело, которое не удалось прочитать или разобрать, даёт `Ambiguous`.
    pub async fn submit_booking(&self, request: &BookingRequest) -> Result<SubmitOutcome, ClientError> {
        let payload = serde_json::to_string(request)?;

        info!(
            "Submitting booking: event={}, seats={}, total={}",
            request.event_id,
            request.seats.len(),
            request.total_price
        );

        let response = self
            .http
            .post(&self.booking_endpoint)
            .form(&[("data", payload.as_str())])
            .send()
            .await?;

        let status = response.status();
        let outcome = match response.text().await {
            Ok(body) => SubmitOutcome::from_body(&body),
            Err(e) => {
                debug!("Could not read booking response body: {}", e);
                SubmitOutcome::Ambiguous
            }
        };
        info!("Booking response {}: {:?}", status, outcome);
        Ok(outcome)
    }
}

/// Клиент для тестов: все источники на одном адресе, заявки на `/exec`.
#[cfg(test)]
pub(crate) fn client_for_base(base: &str, timeout_seconds: u64) -> RemoteClient {
    let sources = SourcesConfig::under(base, format!("{}/exec", base));
    let http = HttpConfig { timeout_seconds, catalog_cache_ttl_seconds: 0 };
    RemoteClient::new(&sources, &http).unwrap()
}
