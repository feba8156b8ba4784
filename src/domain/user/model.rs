/// A registered account as stored in `usuarios`, keyed by email.
///
/// `role` and `language` are free-form and never interpreted by the service.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub language: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("language", &self.language)
            .finish()
    }
}
