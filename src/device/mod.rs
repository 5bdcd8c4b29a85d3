//! Run destination descriptors
//!
//! Normalizes the raw device record of an action into a [`TargetDevice`].
//! Grouped runs fold several devices together, so their descriptor is
//! anonymized: the identifier is cleared and the unique identifier is the
//! [`ANONYMOUS_DEVICE_ID`] sentinel.

use std::cmp::Ordering;

use serde::Serialize;
use xcreport_model::DeviceRecord;

use crate::log::Logger;

/// Unique identifier shared by every anonymized device.
pub const ANONYMOUS_DEVICE_ID: &str = "Any";

/// Comparable description of the device a run executed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TargetDevice {
    identifier: String,
    unique_identifier: String,
    os_version: String,
    model: String,
}

impl TargetDevice {
    /// Describe a single device, keeping its identifier and minting a fresh
    /// unique identifier.
    pub fn identified(record: &DeviceRecord, logger: &dyn Logger) -> Self {
        logger.substep("Parsing ActionDeviceRecord");
        Self {
            identifier: record.identifier.clone(),
            unique_identifier: uuid::Uuid::new_v4().to_string().to_uppercase(),
            os_version: record.operating_system_version.clone(),
            model: record.model_name.clone(),
        }
    }

    /// Describe a device standing in for several, without identifiers.
    pub fn anonymized(record: &DeviceRecord, logger: &dyn Logger) -> Self {
        logger.substep("Parsing ActionDeviceRecord");
        Self {
            identifier: String::new(),
            unique_identifier: ANONYMOUS_DEVICE_ID.to_string(),
            os_version: record.operating_system_version.clone(),
            model: record.model_name.clone(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn unique_identifier(&self) -> &str {
        &self.unique_identifier
    }

    pub fn os_version(&self) -> &str {
        &self.os_version
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_anonymized(&self) -> bool {
        self.identifier.is_empty() && self.unique_identifier == ANONYMOUS_DEVICE_ID
    }
}

impl Ord for TargetDevice {
    fn cmp(&self, other: &Self) -> Ordering {
        self.model
            .cmp(&other.model)
            .then_with(|| self.os_version.cmp(&other.os_version))
            .then_with(|| self.identifier.cmp(&other.identifier))
            .then_with(|| self.unique_identifier.cmp(&other.unique_identifier))
    }
}

impl PartialOrd for TargetDevice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogLevel, MemoryLogger};

    fn record(identifier: &str, os: &str, model: &str) -> DeviceRecord {
        DeviceRecord {
            identifier: identifier.to_string(),
            operating_system_version: os.to_string(),
            model_name: model.to_string(),
        }
    }

    fn device(identifier: &str, unique: &str, os: &str, model: &str) -> TargetDevice {
        TargetDevice {
            identifier: identifier.to_string(),
            unique_identifier: unique.to_string(),
            os_version: os.to_string(),
            model: model.to_string(),
        }
    }

    #[test]
    fn test_identified_keeps_identifier() {
        let logger = MemoryLogger::new();
        let device = TargetDevice::identified(&record("UDID-1", "17.2", "iPhone 15"), &logger);

        assert_eq!(device.identifier(), "UDID-1");
        assert_eq!(device.os_version(), "17.2");
        assert_eq!(device.model(), "iPhone 15");
        assert!(uuid::Uuid::parse_str(device.unique_identifier()).is_ok());
        assert!(!device.is_anonymized());
        assert_eq!(logger.messages(LogLevel::Substep).len(), 1);
    }

    #[test]
    fn test_identified_unique_ids_differ() {
        let logger = MemoryLogger::new();
        let r = record("UDID-1", "17.2", "iPhone 15");
        let a = TargetDevice::identified(&r, &logger);
        let b = TargetDevice::identified(&r, &logger);
        assert_ne!(a.unique_identifier(), b.unique_identifier());
        assert_ne!(a, b);
    }

    #[test]
    fn test_anonymized_uses_sentinel() {
        let logger = MemoryLogger::new();
        let a = TargetDevice::anonymized(&record("UDID-1", "17.2", "iPhone 15"), &logger);
        let b = TargetDevice::anonymized(&record("UDID-2", "17.2", "iPhone 15"), &logger);

        assert_eq!(a.identifier(), "");
        assert_eq!(a.unique_identifier(), ANONYMOUS_DEVICE_ID);
        assert!(a.is_anonymized());
        assert_eq!(a, b);
    }

    #[test]
    fn test_ordering_cascades_by_field() {
        let a = device("x", "u", "17.0", "iPad");
        let b = device("a", "a", "16.0", "iPhone");
        assert!(a < b, "model decides first");

        let a = device("z", "z", "16.0", "iPhone");
        let b = device("a", "a", "17.0", "iPhone");
        assert!(a < b, "os version decides on equal model");

        let a = device("a", "z", "17.0", "iPhone");
        let b = device("b", "a", "17.0", "iPhone");
        assert!(a < b, "identifier decides next");

        let a = device("a", "a", "17.0", "iPhone");
        let b = device("a", "b", "17.0", "iPhone");
        assert!(a < b, "unique identifier decides last");
    }

    #[test]
    fn test_ordering_ignores_later_fields_once_decided() {
        // A field-by-field "any field is smaller" check would call both of
        // these less than the other.
        let a = device("z", "z", "18.0", "iPad");
        let b = device("a", "a", "16.0", "iPhone");
        assert!(a < b);
        assert!(!(b < a));
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_eq!(b.cmp(&a), Ordering::Greater);
    }

    #[test]
    fn test_sorting_is_stable_under_permutation() {
        let mut devices = vec![
            device("b", "2", "17.0", "iPhone"),
            device("a", "1", "17.0", "iPhone"),
            device("", "Any", "16.4", "iPad"),
        ];
        let mut reversed = devices.clone();
        reversed.reverse();
        devices.sort();
        reversed.sort();
        assert_eq!(devices, reversed);
        assert_eq!(devices[0].model(), "iPad");
        assert_eq!(devices[1].identifier(), "a");
    }
}
