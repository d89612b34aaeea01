mod handler;
pub mod model;

pub use handler::{
    create_servicio_comunidad,
    delete_servicio_comunidad,
    get_servicio_comunidad,
    list_servicios_comunidad,
    update_servicio_comunidad,
};
