//! Most recently published extended signal values.

use crate::api::models::SignalValues;

/// Holds the last published snapshot for one device.
///
/// A cleared store reports every measurement as `(false, 0.0)`.
#[derive(Debug, Clone, Default)]
pub(crate) struct SnapshotStore {
    values: SignalValues,
}

impl SnapshotStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn values(&self) -> &SignalValues {
        &self.values
    }

    pub(crate) fn update(&mut self, values: SignalValues) {
        self.values = values;
    }

    /// Resets every technology to unavailable.
    pub(crate) fn clear(&mut self) {
        self.values = SignalValues::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{LteSignal, Technology, UmtsSignal};

    fn sample() -> SignalValues {
        SignalValues {
            umts: Some(UmtsSignal {
                rssi: -77.0,
                ecio: -8.0,
            }),
            lte: Some(LteSignal {
                rssi: -65.0,
                rsrq: -10.0,
                rsrp: -95.0,
                snr: 18.0,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn new_store_is_cleared() {
        let store = SnapshotStore::new();
        assert_eq!(*store.values(), SignalValues::default());
        for tech in Technology::ALL {
            assert!(!store.values().record(tech).available);
        }
    }

    #[test]
    fn update_replaces_every_technology() {
        let mut store = SnapshotStore::new();
        store.update(sample());
        assert_eq!(store.values().reading(Technology::Lte, "snr"), (true, 18.0));

        store.update(SignalValues {
            umts: Some(UmtsSignal {
                rssi: -90.0,
                ecio: -12.0,
            }),
            ..Default::default()
        });
        assert_eq!(store.values().reading(Technology::Lte, "snr"), (false, 0.0));
        assert_eq!(store.values().reading(Technology::Umts, "rssi"), (true, -90.0));
    }

    #[test]
    fn clear_zeroes_values() {
        let mut store = SnapshotStore::new();
        store.update(sample());
        assert_ne!(*store.values(), SignalValues::default());

        store.clear();
        assert_eq!(*store.values(), SignalValues::default());
        assert_eq!(store.values().reading(Technology::Umts, "ecio"), (false, 0.0));
    }
}
