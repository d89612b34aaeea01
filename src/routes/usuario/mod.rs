mod handler;
pub mod model;

pub use handler::{
    delete_usuario,
    get_usuario,
    list_usuarios,
    me,
    register,
    resend_activation,
    update_usuario,
};
