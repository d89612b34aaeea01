mod handler;
pub mod model;

pub use handler::{
    delete_comercio_image, delete_comunidad_image, delete_servicio_image,
    upload_comercio_images, upload_comunidad_images, upload_general_images,
    upload_servicio_images,
};
