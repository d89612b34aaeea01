mod handler;
pub mod model;

pub use handler::activate_account;
pub use model::EmailToken;
