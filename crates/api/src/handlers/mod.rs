pub mod admin;
pub mod back_office;
pub mod intake;
pub mod listings;
pub mod uploads;
