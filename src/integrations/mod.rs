//! External model integrations.

pub mod classifier {
    pub use crate::classifier::*;
}
