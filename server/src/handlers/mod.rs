pub mod auth;
pub mod fallback;
pub mod status;
pub mod tareas;
