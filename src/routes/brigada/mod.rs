mod handler;
pub mod model;

pub use handler::{
    create_asesor, create_brigadista, create_carrera,
    delete_asesor, delete_brigadista, delete_carrera,
    list_asesores, list_brigadistas, list_carreras,
    update_asesor, update_brigadista, update_carrera,
};
