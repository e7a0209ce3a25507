use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::seat::SeatId;

/// Контактные данные из формы бронирования.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl ContactDetails {
    /// Копия с обрезанными пробелами по краям.
    pub fn trimmed(&self) -> ContactDetails {
        ContactDetails {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        let c = self.trimmed();
        !c.name.is_empty() && !c.email.is_empty() && !c.phone.is_empty()
    }
}

/// Одна строка заказа: место, его зона и цена.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookedSeatLine {
    pub seat: SeatId,
    pub zone: Option<String>,
    pub price: f64,
}

/// Тело запроса на бронирование; уходит в поле формы `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub event_id: String,
    pub event_title: String,
    pub event_date: String,
    pub venue: String,
    pub seats: Vec<BookedSeatLine>,
    pub total_price: f64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Ответ `GET <endpoint>?eventId=...`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSeatsResponse {
    #[serde(default)]
    pub booked_seats: Value,
}

impl BookedSeatsResponse {
    /// Всё, что не массив, считается "занятых мест нет".
    pub fn seat_ids(&self) -> Vec<SeatId> {
        match &self.booked_seats {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(SeatId::from(s.as_str())),
                    Value::Number(n) => Some(SeatId::from(n.to_string())),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Результат отправки брони.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SubmitOutcome {
    Confirmed { message: Option<String> },
    Conflict { seats: Vec<String> },
    Failed { message: Option<String> },
    /// Ответ не разобран или в нём нет `success`: считаем, что заявка принята.
    Ambiguous,
}

impl SubmitOutcome {
    /// Разбор тела ответа так же, как это делает страница.
    pub fn from_body(body: &str) -> SubmitOutcome {
        let Ok(Value::Object(data)) = serde_json::from_str::<Value>(body) else {
            return SubmitOutcome::Ambiguous;
        };

        let Some(success) = data.get("success") else {
            return SubmitOutcome::Ambiguous;
        };

        let message = match data.get("message") {
            Some(Value::String(m)) if !m.is_empty() => Some(m.clone()),
            _ => None,
        };

        if is_truthy(success) {
            return SubmitOutcome::Confirmed { message };
        }

        if data.get("conflict").is_some_and(is_truthy) {
            let seats = match data.get("conflictSeats") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                _ => Vec::new(),
            };
            return SubmitOutcome::Conflict { seats };
        }

        SubmitOutcome::Failed { message }
    }

    pub fn status(&self) -> StatusMessage {
        match self {
            SubmitOutcome::Confirmed { message } => StatusMessage::success(
                message.clone().unwrap_or_else(|| "Booking confirmed!".to_string()),
            ),
            SubmitOutcome::Conflict { seats } => StatusMessage::warning(format!(
                "Sorry, these seats were just booked: {}. Choose others.",
                seats.join(", ")
            )),
            SubmitOutcome::Failed { message } => StatusMessage::warning(
                message.clone().unwrap_or_else(|| "Booking failed.".to_string()),
            ),
            SubmitOutcome::Ambiguous => {
                StatusMessage::success("Booking submitted! We will contact you soon.")
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Success,
    Warning,
}

/// Строка статуса под формой вместе с цветовым тоном.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub tone: Tone,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Success }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Warning }
    }

    pub fn neutral(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Neutral }
    }
}
