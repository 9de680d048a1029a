use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for device identifiers.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identifier of a device marker (stimulator, recorder, ...) in the scene.
/// Names compare by interner key, so ids are cheap to copy and hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(Spur);

impl DeviceId {
    /// Intern a device name, or return the existing id if already interned.
    pub fn intern(s: &str) -> Self {
        DeviceId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DeviceId::intern(&s))
    }
}

/// Handle of a live selection region, unique for the lifetime of an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = DeviceId::intern("dc_generator");
        let b = DeviceId::intern("dc_generator");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "dc_generator");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DeviceId::intern("spike_detector");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"spike_detector\"");
        let back: DeviceId = serde_json::from_str("\"spike_detector\"").unwrap();
        assert_eq!(back, id);
    }
}
