mod handler;
pub mod model;

pub use handler::{create_nivel, delete_nivel, get_nivel, list_niveles, update_nivel};
