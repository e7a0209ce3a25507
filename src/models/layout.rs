use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::seat::Cell;

/// Ключ верхнего уровня с таблицей зон; все остальные ключи - секции.
pub const ZONES_KEY: &str = "zones";

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("seat layout must be a JSON object")]
    NotAnObject,
    #[error("seat layout is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Цена и цвет зоны.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

pub type ZoneTable = HashMap<String, Zone>;

/// Ряд в порядке документа: идентификатор и классифицированные ячейки.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub id: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub rows: Vec<RowLayout>,
}

impl Section {
    pub fn row(&self, id: &str) -> Option<&RowLayout> {
        self.rows.iter().find(|r| r.id == id)
    }
}

/// Схема зала после разбора: секции в порядке документа и таблица зон.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatLayout {
    pub sections: Vec<Section>,
    pub zones: ZoneTable,
}

impl SeatLayout {
    pub fn from_json_str(raw: &str) -> Result<Self, LayoutError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, LayoutError> {
        let root = value.as_object().ok_or(LayoutError::NotAnObject)?;
        let mut layout = SeatLayout::default();

        for (key, section_value) in root {
            if key == ZONES_KEY {
                layout.zones = parse_zones(section_value);
                continue;
            }

            // Секция, которая не является объектом, просто пустая
            let rows = match section_value.as_object() {
                Some(row_map) => row_map
                    .iter()
                    .map(|(id, cells)| RowLayout {
                        id: id.clone(),
                        cells: cells
                            .as_array()
                            .map(|arr| arr.iter().map(Cell::classify).collect())
                            .unwrap_or_default(),
                    })
                    .collect(),
                None => Vec::new(),
            };
            layout.sections.push(Section { name: key.clone(), rows });
        }

        Ok(layout)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

// Битые записи зон пропускаются, а не валят всю схему
fn parse_zones(value: &Value) -> ZoneTable {
    let Some(map) = value.as_object() else {
        return ZoneTable::new();
    };
    map.iter()
        .filter_map(|(key, zone)| {
            match serde_json::from_value::<Zone>(zone.clone()) {
                Ok(z) => Some((key.clone(), z)),
                Err(e) => {
                    tracing::warn!("Skipping malformed zone {}: {}", key, e);
                    None
                }
            }
        })
        .collect()
}
