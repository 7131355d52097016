use std::fmt;

/// Opaque identifier of one registered structure.
///
/// Handles are plain machine words so they can cross a C boundary unchanged.
/// `Handle::INVALID` (zero) is never issued by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub(crate) usize);

impl Handle {
    pub const INVALID: Handle = Handle(0);

    /// Wraps a raw value received from the boundary. No validation happens here;
    /// the registry decides whether the value was ever issued.
    pub const fn from_raw(raw: usize) -> Self {
        Handle(raw)
    }

    /// Returns the raw numeric identifier handed out to callers.
    pub const fn as_raw(self) -> usize {
        self.0
    }

    pub const fn is_invalid(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of structure a handle resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    Map,
    Queue,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureKind::Map => f.write_str("map"),
            StructureKind::Queue => f.write_str("queue"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip_and_invalid() {
        let h = Handle::from_raw(17);
        assert_eq!(h.as_raw(), 17);
        assert!(!h.is_invalid());
        assert!(Handle::INVALID.is_invalid());
        assert_eq!(Handle::from_raw(0), Handle::INVALID);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Handle::from_raw(3).to_string(), "#3");
        assert_eq!(StructureKind::Map.to_string(), "map");
        assert_eq!(StructureKind::Queue.to_string(), "queue");
    }
}
