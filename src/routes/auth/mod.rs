mod handler;
mod model;

pub use handler::{logout, me};
pub use model::MeResponse;
