//! Scope for checking permissions
use std::fmt;

// All - every object of the resource.
// Owned - only objects owned by the caller.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Scope {
    All,
    Owned,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Scope::All => write!(f, "all"),
            Scope::Owned => write!(f, "owned"),
        }
    }
}
