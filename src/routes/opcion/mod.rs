mod handler;
pub mod model;

pub use handler::{
    create_opcion,
    delete_opcion,
    get_opcion,
    list_opciones_por_servicio,
    update_opcion,
};
