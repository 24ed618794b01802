//! Time-ordered identifiers for sessions and messages.

use ulid::Ulid;

/// ID prefix types for different entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Session,
    Message,
}

impl IdPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Session => "ses",
            IdPrefix::Message => "msg",
        }
    }
}

/// Generate a lowercase `<prefix>_<ulid>` id; later ids sort after earlier
/// ones.
pub fn ascending(prefix: IdPrefix) -> String {
    format!("{}_{}", prefix.as_str(), Ulid::new().to_string().to_lowercase())
}
