//! Prebuilt scenarios, replaying what happens in the home at startup, on an
//! occupancy change and over a day.

mod home_startup;
pub use home_startup::home_startup;

mod occupancy_change;
pub use occupancy_change::occupancy_change;

mod daily_schedule;
pub use daily_schedule::{daily_schedule, movements};
