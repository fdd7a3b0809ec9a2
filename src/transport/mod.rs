pub mod http;
pub mod protocol;
pub mod ws;

pub use http::{router, AppState};
