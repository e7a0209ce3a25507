pub mod booking;
pub mod event;
pub mod gallery;
pub mod layout;
pub mod seat;

pub use booking::{BookingRequest, ContactDetails, StatusMessage, SubmitOutcome, Tone};
pub use event::{Event, EventCatalog};
pub use layout::{SeatLayout, Zone, ZoneTable};
pub use seat::{Cell, SeatId};
