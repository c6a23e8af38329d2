use std::fmt;

/// Identity of the signed in user as reported by the identity service.
///
/// The application never builds or mutates a principal itself; it only holds
/// whatever the last auth state notification delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    uid: String,
    email: Option<String>,
    display_name: Option<String>,
    email_verified: bool,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            email_verified: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn verified(mut self, email_verified: bool) -> Self {
        self.email_verified = email_verified;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn email_verified(&self) -> bool {
        self.email_verified
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.display_name, &self.email) {
            (Some(name), _) => write!(f, "{} ({})", name, self.uid),
            (None, Some(email)) => write!(f, "{} ({})", email, self.uid),
            (None, None) => write!(f, "{}", self.uid),
        }
    }
}
