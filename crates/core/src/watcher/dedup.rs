//! Single-slot duplicate suppression.

/// Remembers the last accepted file name.
///
/// Some platforms emit more than one creation notification for one logical
/// file. Only an immediate repeat is dropped: `A, B, A` accepts all three.
#[derive(Debug, Default)]
pub struct LastAccepted {
    name: Option<String>,
}

impl LastAccepted {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `name` equals the held name, otherwise stores it
    /// and returns `true`.
    pub fn accept(&mut self, name: &str) -> bool {
        if self.name.as_deref() == Some(name) {
            return false;
        }
        self.name = Some(name.to_owned());
        true
    }

    /// The currently held name.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
