pub mod booking_commands;
pub mod enrichment;
pub mod projector;
pub mod publisher;
pub mod queries;
pub mod sweeper;
