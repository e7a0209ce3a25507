//! layout.rs
//!
//! Превращает разобранную схему зала в модель для отрисовки.
//!
//! 1.  Порядок рядов: буквенные ряды сортируются, служебные ряды
//!     (пробелы и прочие разделители) вставляются после якорных рядов
//!     "I" и "S", остальные служебные ряды идут в конец.
//! 2.  Ряд, в котором только пустоты и проходы, рисуется как разделитель без подписи.
//! 3.  Занятые места видны, но недоступны для выбора.
//! 4.  Цвет зоны накладывается отдельным проходом после построения сетки.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

use crate::models::{
    layout::{Section, SeatLayout, ZoneTable},
    seat::{Cell, SeatId, SignKind},
};

/// Секция, которую нужно нарисовать, и её заголовок.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    pub key: String,
    pub display: String,
}

/// Правила раскладки. По умолчанию одна секция `SEATPLAN` с пустым заголовком.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPolicy {
    pub sections: Vec<SectionSpec>,
    /// (после какого ряда, какой служебный ряд вставить)
    pub anchors: Vec<(String, String)>,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            sections: vec![SectionSpec { key: "SEATPLAN".to_string(), display: " ".to_string() }],
            anchors: vec![
                ("I".to_string(), " ".to_string()),
                ("S".to_string(), "  ".to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSeat {
    pub id: SeatId,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cell", rename_all = "lowercase")]
pub enum RenderCell {
    Gap,
    Aisle,
    Sign {
        sign: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<&'static str>,
        text: String,
        title: String,
    },
    Seat(RenderedSeat),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderRow {
    /// Пустая широкая строка без подписи.
    Spacer,
    Row { label: String, cells: Vec<RenderCell> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub name: String,
    pub rows: Vec<RenderRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderModel {
    pub sections: Vec<RenderedSection>,
}

impl RenderModel {
    pub fn seats(&self) -> impl Iterator<Item = &RenderedSeat> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .filter_map(|row| match row {
                RenderRow::Row { cells, .. } => Some(cells.iter()),
                RenderRow::Spacer => None,
            })
            .flatten()
            .filter_map(|cell| match cell {
                RenderCell::Seat(seat) => Some(seat),
                _ => None,
            })
    }

    fn seats_mut(&mut self) -> impl Iterator<Item = &mut RenderedSeat> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.rows.iter_mut())
            .filter_map(|row| match row {
                RenderRow::Row { cells, .. } => Some(cells.iter_mut()),
                RenderRow::Spacer => None,
            })
            .flatten()
            .filter_map(|cell| match cell {
                RenderCell::Seat(seat) => Some(seat),
                _ => None,
            })
    }

    /// Первое вхождение места с таким идентификатором.
    pub fn seat(&self, id: &str) -> Option<&RenderedSeat> {
        self.seats().find(|s| s.id.as_str() == id)
    }

    /// Место есть на схеме и не занято.
    pub fn is_selectable(&self, id: &str) -> bool {
        self.seat(id).is_some_and(|s| !s.disabled)
    }
}

fn is_letter_row(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 1 && bytes[0].is_ascii_uppercase()
}

/// Порядок отрисовки рядов секции.
pub fn row_order<'a>(section: &'a Section, anchors: &[(String, String)]) -> Vec<&'a str> {
    let mut letters: Vec<&str> = section
        .rows
        .iter()
        .map(|r| r.id.as_str())
        .filter(|id| is_letter_row(id))
        .collect();
    letters.sort_unstable();

    let specials: Vec<&str> = section
        .rows
        .iter()
        .map(|r| r.id.as_str())
        .filter(|id| !is_letter_row(id))
        .collect();

    let mut placed: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::with_capacity(section.rows.len());

    for letter in letters {
        ordered.push(letter);
        for (after, special) in anchors {
            if after != letter {
                continue;
            }
            if let Some(&row) = specials.iter().find(|s| **s == special.as_str()) {
                if placed.insert(row) {
                    ordered.push(row);
                }
            }
        }
    }

    for row in specials {
        if placed.insert(row) {
            ordered.push(row);
        }
    }

    ordered
}

fn render_sign(kind: &SignKind, label: Option<&str>) -> RenderCell {
    let text = label.unwrap_or(kind.as_str()).to_uppercase();
    match kind {
        SignKind::Toilet => RenderCell::Sign {
            sign: kind.as_str().to_string(),
            icon: Some("🚻"),
            title: label.unwrap_or("Toilet").to_string(),
            text: if text == "TOILET" { "WC".to_string() } else { text },
        },
        SignKind::Exit => RenderCell::Sign {
            sign: kind.as_str().to_string(),
            icon: Some("⛔"),
            title: label.unwrap_or("Exit").to_string(),
            text,
        },
        SignKind::Other(_) => RenderCell::Sign {
            sign: kind.as_str().to_string(),
            icon: None,
            title: text.clone(),
            text,
        },
    }
}

fn render_section(
    section: &Section,
    display: &str,
    booked: &BTreeSet<SeatId>,
    anchors: &[(String, String)],
    seen: &mut HashSet<SeatId>,
) -> RenderedSection {
    let mut rows = Vec::with_capacity(section.rows.len());

    for row_id in row_order(section, anchors) {
        let Some(row) = section.row(row_id) else { continue };

        if row.cells.iter().all(Cell::is_blank) {
            rows.push(RenderRow::Spacer);
            continue;
        }

        let cells = row
            .cells
            .iter()
            .map(|cell| match cell {
                Cell::Gap => RenderCell::Gap,
                Cell::Aisle => RenderCell::Aisle,
                Cell::Signage { kind, label } => render_sign(kind, label.as_deref()),
                Cell::Seat { number, zone } => {
                    let id = SeatId::new(row_id, number);
                    if !seen.insert(id.clone()) {
                        warn!("Duplicate seat {} in section {}", id, section.name);
                    }
                    RenderCell::Seat(RenderedSeat {
                        disabled: booked.contains(&id),
                        id,
                        number: number.clone(),
                        zone: zone.clone(),
                        color: None,
                    })
                }
            })
            .collect();

        rows.push(RenderRow::Row { label: row_id.to_string(), cells });
    }

    RenderedSection { name: display.to_string(), rows }
}

/// Модель отрисовки с правилами по умолчанию.
pub fn interpret(layout: &SeatLayout, booked: &BTreeSet<SeatId>) -> RenderModel {
    interpret_with(layout, booked, &LayoutPolicy::default())
}

pub fn interpret_with(
    layout: &SeatLayout,
    booked: &BTreeSet<SeatId>,
    policy: &LayoutPolicy,
) -> RenderModel {
    let mut seen = HashSet::new();

    // Пустой список секций в политике - рисуем все секции документа
    let specs: Vec<SectionSpec> = if policy.sections.is_empty() {
        layout
            .sections
            .iter()
            .map(|s| SectionSpec { key: s.name.clone(), display: s.name.clone() })
            .collect()
    } else {
        policy.sections.clone()
    };

    let sections = specs
        .iter()
        .filter_map(|spec| match layout.section(&spec.key) {
            Some(section) => Some(render_section(
                section,
                &spec.display,
                booked,
                &policy.anchors,
                &mut seen,
            )),
            None => {
                warn!("Seat layout has no section {}", spec.key);
                None
            }
        })
        .collect();

    RenderModel { sections }
}

/// Проставляет цвета зон. Отсутствие цвета или зоны - не ошибка.
pub fn apply_zone_colors(model: &mut RenderModel, zones: &ZoneTable) {
    for seat in model.seats_mut() {
        seat.color = seat
            .zone
            .as_ref()
            .and_then(|z| zones.get(z))
            .and_then(|z| z.color.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn layout(value: serde_json::Value) -> SeatLayout {
        SeatLayout::from_value(&value).unwrap()
    }

    fn labels(model: &RenderModel) -> Vec<String> {
        model.sections[0]
            .rows
            .iter()
            .map(|r| match r {
                RenderRow::Spacer => "<spacer>".to_string(),
                RenderRow::Row { label, .. } => label.clone(),
            })
            .collect()
    }

    fn seat(id: &str, number: &str) -> RenderCell {
        RenderCell::Seat(RenderedSeat {
            id: SeatId::from(id),
            number: number.to_string(),
            zone: None,
            disabled: false,
            color: None,
        })
    }

    #[test]
    fn renders_basic_row_in_array_order() {
        let model = interpret(
            &layout(json!({"SEATPLAN": {"A": [1, 2, null, "AISLE", 3]}})),
            &BTreeSet::new(),
        );

        assert_eq!(model.sections.len(), 1);
        assert_eq!(
            model.sections[0].rows,
            vec![RenderRow::Row {
                label: "A".to_string(),
                cells: vec![
                    seat("A1", "1"),
                    seat("A2", "2"),
                    RenderCell::Gap,
                    RenderCell::Aisle,
                    seat("A3", "3"),
                ],
            }]
        );
    }

    #[test]
    fn blank_rows_become_unlabelled_spacers() {
        let model = interpret(
            &layout(json!({"SEATPLAN": {"A": [1], "B": [null, "AISLE", ""], "C": []}})),
            &BTreeSet::new(),
        );
        assert_eq!(labels(&model), vec!["A", "<spacer>", "<spacer>"]);
    }

    #[test]
    fn letter_rows_sort_regardless_of_input_order() {
        let model = interpret(
            &layout(json!({"SEATPLAN": {"C": [1], "A": [1], "B": [1]}})),
            &BTreeSet::new(),
        );
        assert_eq!(labels(&model), vec!["A", "B", "C"]);
    }

    #[test]
    fn special_rows_are_spliced_after_anchors() {
        let section = layout(json!({"SEATPLAN": {
            "J": [1], "  ": [null], "I": [1], "T": [1], "S": [1], " ": ["AISLE"], "--": [null], "A": [1]
        }}));
        let order = row_order(
            section.section("SEATPLAN").unwrap(),
            &LayoutPolicy::default().anchors,
        );
        assert_eq!(order, vec!["A", "I", " ", "J", "S", "  ", "T", "--"]);
    }

    #[test]
    fn special_rows_without_anchor_are_appended_once() {
        let section = layout(json!({"SEATPLAN": {" ": [null], "B": [1], "A": [1]}}));
        let anchors = vec![
            ("A".to_string(), "missing".to_string()),
            ("B".to_string(), " ".to_string()),
            ("A".to_string(), " ".to_string()),
        ];
        assert_eq!(row_order(section.section("SEATPLAN").unwrap(), &anchors), vec!["A", " ", "B"]);

        // без якорей - в конец
        assert_eq!(row_order(section.section("SEATPLAN").unwrap(), &[]), vec!["A", "B", " "]);
    }

    #[test]
    fn booked_seats_stay_visible_but_disabled() {
        let booked: BTreeSet<SeatId> = [SeatId::from("A2")].into_iter().collect();
        let model = interpret(&layout(json!({"SEATPLAN": {"A": [1, 2]}})), &booked);

        assert!(model.seat("A2").unwrap().disabled);
        assert_eq!(model.seat("A2").unwrap().number, "2");
        assert!(model.is_selectable("A1"));
        assert!(!model.is_selectable("A2"));
        assert!(!model.is_selectable("Z9"));
    }

    #[test]
    fn signage_labels() {
        let model = interpret(
            &layout(json!({"SEATPLAN": {"A": [
                {"type": "TOILET"},
                {"type": "EXIT", "label": "Fire exit"},
                {"type": "BAR"},
                1
            ]}})),
            &BTreeSet::new(),
        );
        let RenderRow::Row { cells, .. } = &model.sections[0].rows[0] else {
            panic!("expected a labelled row");
        };
        assert_eq!(
            cells[0],
            RenderCell::Sign { sign: "TOILET".into(), icon: Some("🚻"), text: "WC".into(), title: "Toilet".into() }
        );
        assert_eq!(
            cells[1],
            RenderCell::Sign { sign: "EXIT".into(), icon: Some("⛔"), text: "FIRE EXIT".into(), title: "Fire exit".into() }
        );
        assert_eq!(
            cells[2],
            RenderCell::Sign { sign: "BAR".into(), icon: None, text: "BAR".into(), title: "BAR".into() }
        );
    }

    #[test]
    fn row_of_only_signage_is_not_a_spacer() {
        let model = interpret(
            &layout(json!({"SEATPLAN": {"A": [{"type": "EXIT"}, null]}})),
            &BTreeSet::new(),
        );
        assert_eq!(labels(&model), vec!["A"]);
    }

    #[test]
    fn missing_or_empty_sections_render_nothing() {
        let model = interpret(&layout(json!({"OTHER": {"A": [1]}})), &BTreeSet::new());
        assert!(model.sections.is_empty());

        let model = interpret(&layout(json!({"SEATPLAN": {}})), &BTreeSet::new());
        assert!(model.sections[0].rows.is_empty());
    }

    #[test]
    fn configured_sections_render_in_policy_order() {
        let policy = LayoutPolicy {
            sections: vec![
                SectionSpec { key: "PLATINUM".into(), display: "Platinum".into() },
                SectionSpec { key: "PREMIUM".into(), display: "Premium".into() },
            ],
            anchors: Vec::new(),
        };
        let model = interpret_with(
            &layout(json!({"PREMIUM": {"A": [1]}, "PLATINUM": {"A": [5]}})),
            &BTreeSet::new(),
            &policy,
        );
        let names: Vec<&str> = model.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Platinum", "Premium"]);
        assert_eq!(model.seat("A5").unwrap().number, "5");
    }

    #[test]
    fn zone_colors_are_applied_in_a_separate_pass() {
        let parsed = layout(json!({
            "SEATPLAN": {"A": [{"seat": 1, "zone": "VIP"}, {"seat": 2, "zone": "GHOST"}, 3]},
            "zones": {"VIP": {"price": 100, "color": "#c9a227"}}
        }));
        let mut model = interpret(&parsed, &BTreeSet::new());
        assert!(model.seat("A1").unwrap().color.is_none());

        apply_zone_colors(&mut model, &parsed.zones);
        assert_eq!(model.seat("A1").unwrap().color.as_deref(), Some("#c9a227"));
        // неизвестная зона сохраняется как метка, но без цвета
        assert_eq!(model.seat("A2").unwrap().zone.as_deref(), Some("GHOST"));
        assert!(model.seat("A2").unwrap().color.is_none());
        assert!(model.seat("A3").unwrap().color.is_none());
    }

    proptest! {
        #[test]
        fn letter_rows_always_render_sorted(rows in proptest::collection::btree_set("[A-Z]", 1..12)) {
            let mut map = serde_json::Map::new();
            // обратный порядок вставки
            for row in rows.iter().rev() {
                map.insert(row.clone(), json!([1]));
            }
            let model = interpret(
                &layout(json!({"SEATPLAN": serde_json::Value::Object(map)})),
                &BTreeSet::new(),
            );
            let expected: Vec<String> = rows.iter().cloned().collect();
            prop_assert_eq!(labels(&model), expected);
        }

        #[test]
        fn seat_id_is_row_plus_number(row in "[A-Z]", number in 1u32..500) {
            let mut map = serde_json::Map::new();
            map.insert(row.clone(), json!([number]));
            let model = interpret(
                &layout(json!({"SEATPLAN": serde_json::Value::Object(map)})),
                &BTreeSet::new(),
            );
            let expected = format!("{}{}", row, number);
            prop_assert!(model.seat(&expected).is_some());
        }
    }
}
