mod handler;
pub mod model;

pub use handler::{
    create_categoria,
    delete_categoria,
    get_categoria,
    list_categorias,
    update_categoria,
};
