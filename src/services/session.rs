//! session.rs
//!
//! Сессия страницы бронирования: одна на один просмотр страницы.
//!
//! Жизненный цикл: `Loading -> Ready -> Submitting -> (итог) -> Loading -> Ready`.
//! Событие, схема и занятые места загружаются строго последовательно.
//! Схема, занятые места и выбор заменяются целиком при каждом обновлении.
//!
//! Переходы состояния синхронные (`begin_*` / `finish_*`), сетевые запросы
//! идут между ними без блокировки сессии. Поэтому во время загрузки и
//! отправки снимок сессии доступен и показывает `Loading` / `Submitting`.
//!
//! Терминальные состояния страницы (`NoEventSelected`, `NotFound`,
//! `EventLoadFailed`) дальнейших загрузок не делают.

use serde::Serialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::{
    booking::{BookingRequest, ContactDetails, StatusMessage, SubmitOutcome},
    event::Event,
    layout::SeatLayout,
    seat::SeatId,
};
use crate::remote_client::{ClientError, RemoteClient};
use crate::services::{
    layout::{apply_zone_colors, interpret_with, LayoutPolicy, RenderModel},
    selection::{build_request, compute_total, derive_selection, selection_text, validate, SelectionState, ValidationFailure},
};

pub const SUBMIT_LABEL: &str = "Confirm Booking";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Loading,
    Ready,
    Submitting,
    /// В адресе нет eventId, сеть не трогаем.
    NoEventSelected,
    NotFound,
    EventLoadFailed,
    LayoutUnavailable,
}

impl Phase {
    /// Состояния, после которых страница больше ничего не загружает.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::NoEventSelected | Phase::NotFound | Phase::EventLoadFailed)
    }

    /// Идёт сетевой запрос.
    pub fn in_flight(&self) -> bool {
        matches!(self, Phase::Loading | Phase::Submitting)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("event {0} not found")]
    NotFound(String),
    #[error("failed to load {resource}: {source}")]
    LoadFailure {
        resource: &'static str,
        #[source]
        source: ClientError,
    },
}

/// Что случилось с попыткой отправки.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReport {
    /// До сети дело не дошло.
    Invalid(ValidationFailure),
    /// Сервер ответил (в том числе невнятно).
    Completed(SubmitOutcome),
    /// Ответа не было. Выбор и контакты сохранены.
    NetworkFailure,
    /// Страница не готова к отправке, в том числе уже идёт отправка.
    NotReady(Phase),
}

/* ---------- загрузки ---------- */

pub async fn load_event(client: &RemoteClient, event_id: &str) -> Result<Event, LoadError> {
    let catalog = client
        .fetch_catalog()
        .await
        .map_err(|source| LoadError::LoadFailure { resource: "event catalog", source })?;

    catalog
        .find(event_id)
        .cloned()
        .ok_or_else(|| LoadError::NotFound(event_id.to_string()))
}

pub async fn load_layout(client: &RemoteClient, event_id: &str) -> Result<SeatLayout, LoadError> {
    client
        .fetch_layout(event_id)
        .await
        .map_err(|source| LoadError::LoadFailure { resource: "seat layout", source })
}

/// Занятые места - данные "по возможности". `None`: узнать не удалось.
pub async fn load_booked_seats(client: &RemoteClient, event_id: &str) -> Option<BTreeSet<SeatId>> {
    match client.fetch_booked_seats(event_id).await {
        Ok(booked) => Some(booked),
        Err(e) => {
            warn!("Failed to load booked seats for {}: {}", event_id, e);
            None
        }
    }
}

/// Загрузка события, выданная сессией.
pub struct PendingOpen {
    client: RemoteClient,
    event_id: String,
}

impl PendingOpen {
    pub async fn fetch(self) -> Result<Event, LoadError> {
        load_event(&self.client, &self.event_id).await
    }
}

/// Загрузка схемы и занятых мест.
pub struct PendingReload {
    client: RemoteClient,
    event_id: String,
}

pub enum FetchedLayout {
    Unavailable(LoadError),
    Loaded {
        layout: SeatLayout,
        booked: Option<BTreeSet<SeatId>>,
    },
}

impl PendingReload {
    /// Схема, и только если она загрузилась - занятые места.
    pub async fn fetch(self) -> FetchedLayout {
        match load_layout(&self.client, &self.event_id).await {
            Ok(layout) => FetchedLayout::Loaded {
                layout,
                booked: load_booked_seats(&self.client, &self.event_id).await,
            },
            Err(e) => FetchedLayout::Unavailable(e),
        }
    }
}

/// Собранная заявка, ожидающая отправки.
pub struct PendingSubmit {
    client: RemoteClient,
    request: BookingRequest,
}

impl PendingSubmit {
    pub async fn send(self) -> Result<SubmitOutcome, ClientError> {
        self.client.submit_booking(&self.request).await
    }
}

/* ---------- сессия ---------- */

/// Снимок сессии для фронтенда.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: Phase,
    pub title: String,
    pub event_meta: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<RenderModel>,
    pub selection: Vec<SeatId>,
    pub selection_text: String,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusMessage>,
    pub contact: ContactDetails,
    pub availability_degraded: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}

pub struct BookingSession {
    client: RemoteClient,
    policy: LayoutPolicy,
    event_id: Option<String>,
    phase: Phase,
    title: String,
    meta: String,
    grid_message: Option<&'static str>,
    event: Option<Event>,
    layout: Option<SeatLayout>,
    booked: BTreeSet<SeatId>,
    grid: Option<RenderModel>,
    selection: SelectionState,
    contact: ContactDetails,
    status: Option<StatusMessage>,
    availability_degraded: bool,
    touched_at: Instant,
}

impl BookingSession {
    /// Новая сессия в `Loading`. Без eventId сразу терминальное состояние.
    pub fn new(client: RemoteClient, policy: LayoutPolicy, event_id: Option<String>) -> Self {
        let event_id = event_id.filter(|id| !id.is_empty());
        let mut session = Self {
            client,
            policy,
            phase: Phase::Loading,
            title: String::new(),
            meta: String::new(),
            grid_message: None,
            event: None,
            layout: None,
            booked: BTreeSet::new(),
            grid: None,
            selection: SelectionState::new(),
            contact: ContactDetails::default(),
            status: None,
            availability_degraded: false,
            touched_at: Instant::now(),
            event_id,
        };

        if session.event_id.is_none() {
            session.phase = Phase::NoEventSelected;
            session.title = "Event not found".to_string();
            session.meta = "Missing event ID.".to_string();
            session.grid_message = Some("No event selected.");
        }
        session
    }

    /// Открывает страницу целиком: событие, затем схема, затем занятые места.
    pub async fn open(client: RemoteClient, policy: LayoutPolicy, event_id: Option<String>) -> Self {
        let session = Mutex::new(Self::new(client, policy, event_id));
        drive_open(&session).await;
        session.into_inner()
    }

    pub fn begin_open(&mut self) -> Option<PendingOpen> {
        if self.phase != Phase::Loading || self.event.is_some() {
            return None;
        }
        let event_id = self.event_id.clone()?;
        Some(PendingOpen { client: self.client.clone(), event_id })
    }

    pub fn finish_open(&mut self, result: Result<Event, LoadError>) -> Option<PendingReload> {
        match result {
            Ok(event) => {
                self.title = event.title.clone();
                self.meta = event.meta_line();
                self.event = Some(event);
                self.start_loading()
            }
            Err(LoadError::NotFound(id)) => {
                warn!("Event {} not found in catalog", id);
                self.phase = Phase::NotFound;
                self.title = "Event not found".to_string();
                self.meta = "Please go back and choose an event again.".to_string();
                None
            }
            Err(e) => {
                error!("Failed to load event {:?}: {}", self.event_id, e);
                self.phase = Phase::EventLoadFailed;
                self.title = "Error loading event".to_string();
                self.meta = "Please try again later.".to_string();
                None
            }
        }
    }

    fn start_loading(&mut self) -> Option<PendingReload> {
        if self.phase.is_terminal() || self.event.is_none() {
            return None;
        }
        let event_id = self.event_id.clone()?;
        self.phase = Phase::Loading;
        self.touch();
        Some(PendingReload { client: self.client.clone(), event_id })
    }

    /// Ручная перезагрузка. Пока идёт другой запрос - ничего не делает.
    pub fn begin_reload(&mut self) -> Option<PendingReload> {
        match self.phase {
            Phase::Ready | Phase::LayoutUnavailable => self.start_loading(),
            _ => None,
        }
    }

    /// Пересобирает сетку из свежей схемы и занятых мест.
    pub fn finish_reload(&mut self, fetched: FetchedLayout) {
        if self.phase != Phase::Loading {
            return;
        }

        let (layout, booked) = match fetched {
            FetchedLayout::Loaded { layout, booked } => (layout, booked),
            FetchedLayout::Unavailable(e) => {
                error!("{}", e);
                self.phase = Phase::LayoutUnavailable;
                self.grid_message = Some("Unable to load seating layout.");
                self.layout = None;
                self.grid = None;
                self.selection = SelectionState::new();
                return;
            }
        };

        self.availability_degraded = booked.is_none();
        let booked = booked.unwrap_or_default();

        let mut grid = interpret_with(&layout, &booked, &self.policy);
        apply_zone_colors(&mut grid, &layout.zones);

        // Выбор пересобирается на новой сетке: только что занятые места выпадают
        let selection = derive_selection(&self.selection, &grid);

        info!(
            "Seat map ready for {:?}: {} seats, {} booked",
            self.event_id,
            grid.seats().count(),
            booked.len()
        );

        self.layout = Some(layout);
        self.booked = booked;
        self.grid = Some(grid);
        self.selection = selection;
        self.grid_message = None;
        self.phase = Phase::Ready;
    }

    /// Пересобирает выбор из отмеченных мест и возвращает новую сумму.
    pub fn toggle<I, S>(&mut self, checked: I) -> f64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.touch();
        self.selection = match &self.grid {
            Some(grid) => derive_selection(checked, grid),
            None => SelectionState::new(),
        };
        self.total()
    }

    pub fn total(&self) -> f64 {
        match (&self.grid, &self.layout) {
            (Some(grid), Some(layout)) => compute_total(&self.selection, grid, &layout.zones),
            _ => 0.0,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Проверка и сборка заявки. При успехе сессия переходит в `Submitting`.
    pub fn begin_submit(&mut self, contact: ContactDetails) -> Result<PendingSubmit, SubmitReport> {
        self.touch();

        if self.phase != Phase::Ready {
            return Err(SubmitReport::NotReady(self.phase));
        }
        let (Some(event), Some(grid), Some(layout)) = (&self.event, &self.grid, &self.layout) else {
            return Err(SubmitReport::NotReady(self.phase));
        };

        self.contact = contact;
        if let Err(failure) = validate(&self.selection, &self.contact) {
            self.status = Some(StatusMessage::warning(failure.to_string()));
            return Err(SubmitReport::Invalid(failure));
        }

        let request = build_request(event, &self.selection, grid, &layout.zones, &self.contact);

        self.phase = Phase::Submitting;
        self.status = Some(StatusMessage::neutral(""));
        Ok(PendingSubmit { client: self.client.clone(), request })
    }

    /// Сверка с ответом сервера.
    ///
    /// После любого ответа выбор и контакты сбрасываются и схема
    /// перезагружается. При сетевой ошибке ничего не сбрасывается.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmitOutcome, ClientError>,
    ) -> (SubmitReport, Option<PendingReload>) {
        self.touch();
        match result {
            Ok(outcome) => {
                self.status = Some(outcome.status());
                self.selection = SelectionState::new();
                self.contact = ContactDetails::default();
                let reload = self.start_loading();
                (SubmitReport::Completed(outcome), reload)
            }
            Err(e) => {
                error!("Booking error: {}", e);
                self.status = Some(StatusMessage::warning(NETWORK_ERROR_MESSAGE));
                self.phase = Phase::Ready;
                (SubmitReport::NetworkFailure, None)
            }
        }
    }

    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.touched_at.elapsed()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            title: self.title.clone(),
            event_meta: self.meta.clone(),
            grid_message: self.grid_message,
            event: self.event.clone(),
            grid: self.grid.clone(),
            selection: self.selection.iter().cloned().collect(),
            selection_text: selection_text(&self.selection),
            total: self.total(),
            status: self.status.clone(),
            contact: self.contact.clone(),
            availability_degraded: self.availability_degraded,
            submit_enabled: self.phase == Phase::Ready,
            submit_label: if self.phase == Phase::Submitting { SUBMITTING_LABEL } else { SUBMIT_LABEL },
        }
    }
}

/* ---------- сценарии над общей сессией ---------- */

// Мьютекс держится только на время переходов, не на время запросов.

async fn run_reload(session: &Mutex<BookingSession>, pending: Option<PendingReload>) {
    let Some(pending) = pending else { return };
    let fetched = pending.fetch().await;
    session.lock().await.finish_reload(fetched);
}

pub async fn drive_open(session: &Mutex<BookingSession>) {
    let pending = session.lock().await.begin_open();
    let Some(pending) = pending else { return };

    let event = pending.fetch().await;
    let reload = session.lock().await.finish_open(event);
    run_reload(session, reload).await;
}

pub async fn drive_reload(session: &Mutex<BookingSession>) {
    let reload = session.lock().await.begin_reload();
    run_reload(session, reload).await;
}

pub async fn drive_submit(session: &Mutex<BookingSession>, contact: ContactDetails) -> SubmitReport {
    let pending = session.lock().await.begin_submit(contact);
    let pending = match pending {
        Ok(pending) => pending,
        Err(report) => return report,
    };

    let result = pending.send().await;
    let (report, reload) = session.lock().await.finish_submit(result);
    run_reload(session, reload).await;
    report
}
