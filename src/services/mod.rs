pub mod cpu_driver;
pub mod dispatch;
pub mod picking_worker;
pub mod registry;
pub mod timers;

pub use registry::{GameRecord, SessionRegistry};
