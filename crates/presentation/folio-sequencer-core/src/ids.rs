//! Identifiers and simple allocators for page entities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-assigned card identifier (document order index in practice).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Handle of one running loader-dot animation on the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LoaderHandle(pub u32);

/// Monotonic allocator for loader animation handles.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_loader: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_loader(&mut self) -> LoaderHandle {
        let id = LoaderHandle(self.next_loader);
        self.next_loader = self.next_loader.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_loader(), LoaderHandle(0));
        assert_eq!(alloc.alloc_loader(), LoaderHandle(1));
    }

    #[test]
    fn card_id_display() {
        assert_eq!(CardId(7).to_string(), "card#7");
    }
}
