use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{
    booking::{BookedSeatLine, BookingRequest, ContactDetails},
    event::Event,
    layout::ZoneTable,
    seat::SeatId,
};
use crate::services::layout::RenderModel;

/// Выбранные пользователем места. Отсортированы лексикографически.
pub type SelectionState = BTreeSet<SeatId>;

/// Пересобирает выбор с нуля из отмеченных мест.
/// Неизвестные и занятые места отбрасываются.
pub fn derive_selection<I, S>(checked: I, model: &RenderModel) -> SelectionState
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    checked
        .into_iter()
        .filter(|id| model.is_selectable(id.as_ref()))
        .map(|id| SeatId::from(id.as_ref()))
        .collect()
}

/// "A1, A3" - то, что уходит в скрытое поле формы.
pub fn selection_text(selection: &SelectionState) -> String {
    selection
        .iter()
        .map(SeatId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn seat_price(seat: &SeatId, model: &RenderModel, zones: &ZoneTable) -> (Option<String>, f64) {
    let zone = model.seat(seat.as_str()).and_then(|s| s.zone.clone());
    let price = zone
        .as_ref()
        .and_then(|z| zones.get(z))
        .map(|z| z.price)
        .unwrap_or(0.0);
    (zone, price)
}

/// Сумма цен зон по выбранным местам. Место без известной зоны стоит 0.
pub fn compute_total(selection: &SelectionState, model: &RenderModel, zones: &ZoneTable) -> f64 {
    selection
        .iter()
        .map(|seat| seat_price(seat, model, zones).1)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationIssue {
    EmptySelection,
    IncompleteContact,
}

impl ValidationIssue {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationIssue::EmptySelection => "Please select at least one seat.",
            ValidationIssue::IncompleteContact => "Please fill in all details.",
        }
    }
}

/// Все найденные проблемы; первая - та, что показывается пользователю.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    // не пустой: собирается только в validate
    issues: Vec<ValidationIssue>,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.primary().message())
    }
}

impl std::error::Error for ValidationFailure {}

impl ValidationFailure {
    pub fn primary(&self) -> ValidationIssue {
        self.issues[0]
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

pub fn validate(selection: &SelectionState, contact: &ContactDetails) -> Result<(), ValidationFailure> {
    let mut issues = Vec::new();
    if selection.is_empty() {
        issues.push(ValidationIssue::EmptySelection);
    }
    if !contact.is_complete() {
        issues.push(ValidationIssue::IncompleteContact);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { issues })
    }
}

/// Собирает запрос на бронирование. Итог пересчитывается здесь же.
pub fn build_request(
    event: &Event,
    selection: &SelectionState,
    model: &RenderModel,
    zones: &ZoneTable,
    contact: &ContactDetails,
) -> BookingRequest {
    let contact = contact.trimmed();
    let seats: Vec<BookedSeatLine> = selection
        .iter()
        .map(|seat| {
            let (zone, price) = seat_price(seat, model, zones);
            BookedSeatLine { seat: seat.clone(), zone, price }
        })
        .collect();

    BookingRequest {
        event_id: event.id.clone(),
        event_title: event.title.clone(),
        event_date: event.date.clone(),
        venue: event.venue.clone(),
        total_price: compute_total(selection, model, zones),
        seats,
        name: contact.name,
        email: contact.email,
        phone: contact.phone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::SeatLayout;
    use crate::services::layout::interpret;
    use proptest::prelude::*;
    use serde_json::json;

    fn model_and_zones(value: serde_json::Value, booked: &[&str]) -> (RenderModel, ZoneTable) {
        let layout = SeatLayout::from_value(&value).unwrap();
        let booked: BTreeSet<SeatId> = booked.iter().map(|s| SeatId::from(*s)).collect();
        (interpret(&layout, &booked), layout.zones)
    }

    fn contact() -> ContactDetails {
        ContactDetails { name: "Ann".into(), email: "ann@example.com".into(), phone: "+65 8123 4567".into() }
    }

    #[test]
    fn selection_is_rebuilt_and_sorted() {
        let (model, _) = model_and_zones(json!({"SEATPLAN": {"A": [1, 2, null, "AISLE", 3]}}), &[]);

        let selection = derive_selection(["A3", "A1"], &model);
        assert_eq!(selection_text(&selection), "A1, A3");

        // повторный вызов не накапливает старое состояние
        let selection = derive_selection(["A2"], &model);
        assert_eq!(selection_text(&selection), "A2");
    }

    #[test]
    fn disabled_and_unknown_seats_never_enter_selection() {
        let (model, _) = model_and_zones(json!({"SEATPLAN": {"A": [1, 2]}}), &["A2"]);
        let selection = derive_selection(vec!["A1".to_string(), "A2".to_string(), "Q9".to_string()], &model);
        assert_eq!(selection.into_iter().collect::<Vec<_>>(), vec![SeatId::from("A1")]);
    }

    #[test]
    fn total_counts_only_resolvable_zones() {
        let (model, zones) = model_and_zones(
            json!({
                "SEATPLAN": {"A": [{"seat": 1, "zone": "VIP"}, 2, {"seat": 3, "zone": "GHOST"}]},
                "zones": {"VIP": {"price": 100}}
            }),
            &[],
        );

        let selection = derive_selection(["A1", "A2"], &model);
        assert_eq!(compute_total(&selection, &model, &zones), 100.0);

        let selection = derive_selection(["A2", "A3"], &model);
        assert_eq!(compute_total(&selection, &model, &zones), 0.0);

        assert_eq!(compute_total(&SelectionState::new(), &model, &zones), 0.0);
    }

    #[test]
    fn empty_selection_takes_precedence() {
        let err = validate(&SelectionState::new(), &contact()).unwrap_err();
        assert_eq!(err.issues(), [ValidationIssue::EmptySelection]);

        let err = validate(&SelectionState::new(), &ContactDetails::default()).unwrap_err();
        assert_eq!(err.issues(), [ValidationIssue::EmptySelection, ValidationIssue::IncompleteContact]);
        assert_eq!(err.to_string(), "Please select at least one seat.");
    }

    #[test]
    fn blank_contact_fields_fail_validation() {
        let selection: SelectionState = [SeatId::from("A1")].into_iter().collect();
        let mut c = contact();
        c.phone = "   ".into();
        let err = validate(&selection, &c).unwrap_err();
        assert_eq!(err.primary(), ValidationIssue::IncompleteContact);
        assert_eq!(err.to_string(), "Please fill in all details.");

        assert!(validate(&selection, &contact()).is_ok());
    }

    #[test]
    fn request_carries_seat_lines_and_trimmed_contact() {
        let (model, zones) = model_and_zones(
            json!({
                "SEATPLAN": {"A": [{"seat": 1, "zone": "VIP"}, 2]},
                "zones": {"VIP": {"price": 120.5}}
            }),
            &[],
        );
        let event = Event {
            id: "event-001".into(),
            title: "Summit".into(),
            date: "2025-03-15".into(),
            venue: "Marina Bay Sands".into(),
            description: String::new(),
            status: "upcoming".into(),
        };
        let selection = derive_selection(["A2", "A1"], &model);
        let mut c = contact();
        c.name = "  Ann  ".into();

        let request = build_request(&event, &selection, &model, &zones, &c);
        assert_eq!(request.total_price, 120.5);
        assert_eq!(request.name, "Ann");

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["eventId"], "event-001");
        assert_eq!(body["totalPrice"], 120.5);
        assert_eq!(
            body["seats"],
            json!([
                {"seat": "A1", "zone": "VIP", "price": 120.5},
                {"seat": "A2", "zone": null, "price": 0.0}
            ])
        );
    }

    proptest! {
        #[test]
        fn total_is_sum_of_zone_prices(prices in proptest::collection::vec(0u32..1000, 1..20)) {
            let cells: Vec<serde_json::Value> = prices
                .iter()
                .enumerate()
                .map(|(i, _)| json!({"seat": i + 1, "zone": format!("Z{}", i)}))
                .collect();
            let zones: serde_json::Map<String, serde_json::Value> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| (format!("Z{}", i), json!({"price": p})))
                .collect();
            let (model, zones) = model_and_zones(json!({"SEATPLAN": {"A": cells}, "zones": zones}), &[]);

            let checked: Vec<String> = (1..=prices.len()).map(|n| format!("A{}", n)).collect();
            let selection = derive_selection(&checked, &model);
            let expected: f64 = prices.iter().map(|p| *p as f64).sum();
            prop_assert_eq!(compute_total(&selection, &model, &zones), expected);
        }
    }
}
