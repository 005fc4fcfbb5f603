use std::fmt;
use subtle::ConstantTimeEq;

/// Shared secret that authorizes administrative flushes
#[derive(Clone)]
pub struct AdminKey(String);

impl AdminKey {
    pub fn new(secret: impl Into<String>) -> Self {
        AdminKey(secret.into())
    }

    /// Compare a presented secret in constant time. An empty secret never matches.
    pub fn verify(&self, presented: &str) -> bool {
        if self.0.is_empty() || presented.is_empty() {
            return false;
        }
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("AdminKey(<redacted>)")
    }
}
