/// Row to insert. The password is already hashed by the time it gets here.
#[derive(Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub language: String,
}

impl std::fmt::Debug for CreateUserDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserDto")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("language", &self.language)
            .finish()
    }
}
