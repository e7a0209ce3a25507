use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Маркер прохода в описании ряда.
pub const AISLE_MARKER: &str = "AISLE";

/// Полный идентификатор места: ряд + номер, например "A12".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(String);

impl SeatId {
    pub fn new(row: &str, number: &str) -> Self {
        SeatId(format!("{}{}", row, number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SeatId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SeatId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SeatId {
    fn from(value: &str) -> Self {
        SeatId(value.to_string())
    }
}

impl From<String> for SeatId {
    fn from(value: String) -> Self {
        SeatId(value)
    }
}

/// Вид указателя на схеме зала.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignKind {
    Toilet,
    Exit,
    Other(String),
}

impl SignKind {
    fn from_type(kind: &str) -> Self {
        match kind {
            "TOILET" => SignKind::Toilet,
            "EXIT" => SignKind::Exit,
            other => SignKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SignKind::Toilet => "TOILET",
            SignKind::Exit => "EXIT",
            SignKind::Other(kind) => kind,
        }
    }
}

/// Ячейка ряда после классификации.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Пустая позиция, занимает одну колонку.
    Gap,
    /// Проход, узкая пустая колонка.
    Aisle,
    /// Указатель (туалет, выход и т.п.), выбрать нельзя.
    Signage {
        kind: SignKind,
        label: Option<String>,
    },
    /// Место. Зона может отсутствовать.
    Seat {
        number: String,
        zone: Option<String>,
    },
}

impl Cell {
    /// Разбирает произвольное JSON-значение из массива ряда.
    /// Ничего не бросает: всё нераспознанное становится `Gap`.
    pub fn classify(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Gap,
            Value::String(s) if s.is_empty() => Cell::Gap,
            Value::String(s) if s == AISLE_MARKER => Cell::Aisle,
            Value::String(s) => Cell::Seat { number: s.clone(), zone: None },
            Value::Number(n) => Cell::Seat { number: number_label(n), zone: None },
            Value::Object(map) => {
                if let Some(Value::String(kind)) = map.get("type") {
                    if !kind.is_empty() {
                        let label = match map.get("label") {
                            Some(Value::String(l)) if !l.is_empty() => Some(l.clone()),
                            _ => None,
                        };
                        return Cell::Signage { kind: SignKind::from_type(kind), label };
                    }
                }

                let number = match map.get("seat") {
                    Some(Value::Number(n)) => number_label(n),
                    Some(Value::String(s)) if !s.is_empty() => s.clone(),
                    _ => return Cell::Gap,
                };
                let zone = match map.get("zone") {
                    Some(Value::String(z)) if !z.is_empty() => Some(z.clone()),
                    _ => None,
                };
                Cell::Seat { number, zone }
            }
            Value::Bool(_) | Value::Array(_) => Cell::Gap,
        }
    }

    /// Пустая ячейка: `Gap` или `Aisle`.
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Gap | Cell::Aisle)
    }
}

// 12 -> "12", 12.0 -> "12", 1.5 -> "1.5"
fn number_label(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}
