pub mod calendar;
pub mod estimate;
pub mod notice;
pub mod route;
pub mod session;
pub mod summary;
pub mod transaction;
