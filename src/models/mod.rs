pub mod booking;
pub mod seat;
pub mod views;

pub use booking::{Booking, BookingStatus};
pub use seat::{SeatAvailability, SeatStatus};
pub use views::{ProjectionCheckpoint, ScheduleAvailability, TicketView};
