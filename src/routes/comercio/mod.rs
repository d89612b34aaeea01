mod handler;
pub mod model;

pub use handler::{
    create_comercio,
    delete_comercio,
    get_comercio,
    list_comercios,
    mis_comercios,
    update_comercio,
};
