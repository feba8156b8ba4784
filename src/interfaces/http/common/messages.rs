//! Response messages. Clients of this API read Spanish, so the wording is
//! part of the contract.

pub const USER_REGISTERED: &str = "Usuario registrado correctamente";
pub const FIELDS_REQUIRED: &str = "Todos los campos son obligatorios";
pub const REGISTER_FAILED: &str = "Error al registrar el usuario";

pub const INVALID_CREDENTIALS: &str = "Credenciales incorrectas";
pub const LOGIN_FAILED: &str = "Error al iniciar sesión";

pub const TOKEN_MISSING: &str = "Token faltante";
pub const TOKEN_INVALID: &str = "Token inválido";
pub const USER_NOT_FOUND: &str = "Usuario no encontrado";
pub const LOOKUP_FAILED: &str = "Error al obtener los datos del usuario";

pub const INVALID_JSON: &str = "Cuerpo JSON inválido";
