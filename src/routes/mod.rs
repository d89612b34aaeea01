pub mod activacion;
pub mod auth;
pub mod brigada;
pub mod categoria;
pub mod comercio;
pub mod comunidad;
pub mod imagenes;
pub mod nivel;
pub mod opcion;
pub mod servicio;
pub mod usuario;
