mod handler;
pub mod model;

pub use handler::{
    create_servicio,
    delete_servicio,
    get_servicio,
    list_servicios_por_comercio,
    update_servicio,
};
