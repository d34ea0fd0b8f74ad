pub mod password;
pub mod template;
pub mod validation;
