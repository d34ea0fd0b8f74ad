/// Minimum username length, counted in characters after trimming.
pub const MIN_USERNAME_CHARS: usize = 3;
/// Minimum password length, counted in characters. Passwords are not trimmed.
pub const MIN_PASSWORD_CHARS: usize = 4;

/// Validates a registration request and returns the trimmed username.
///
/// Rules, checked in this order:
/// 1. Username has at least 3 characters once surrounding whitespace is gone
/// 2. Username has no `:` and no control characters
/// 3. Password has at least 4 characters
pub fn validate_registration<'a>(username: &'a str, password: &str) -> Result<&'a str, String> {
    let username = username.trim();

    if username.chars().count() < MIN_USERNAME_CHARS {
        return Err(format!(
            "El nombre de usuario debe tener al menos {} caracteres",
            MIN_USERNAME_CHARS
        ));
    }

    // Basic auth sends "user:password" and splits on the first colon, so a
    // colon in the username would make the account unreachable on /tareas.
    if username.chars().any(|c| c == ':' || c.is_control()) {
        return Err("El nombre de usuario contiene caracteres no permitidos".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_CHARS
        ));
    }

    Ok(username)
}
