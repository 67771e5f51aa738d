use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::types::constants::{bus, defaults, modem_state};

/// ModemManager modem states.
///
/// Represents the lifecycle state of a modem as reported by the
/// `org.freedesktop.ModemManager1.Modem.State` property. The numeric codes
/// grow as the modem moves towards being connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemState {
    /// The modem is unusable.
    Failed,
    /// State unknown or not reportable.
    Unknown,
    /// The modem is currently being initialized.
    Initializing,
    /// The modem needs to be unlocked.
    Locked,
    /// The modem is not enabled and is powered down.
    Disabled,
    /// The modem is currently transitioning to the disabled state.
    Disabling,
    /// The modem is currently transitioning to the enabled state.
    Enabling,
    /// The modem is enabled and powered on but not registered.
    Enabled,
    /// The modem is searching for a network provider to register with.
    Searching,
    /// The modem is registered with a network provider.
    Registered,
    /// The modem is disconnecting and deactivating the last active bearer.
    Disconnecting,
    /// The modem is activating and connecting the first bearer.
    Connecting,
    /// One or more bearers are active and connected.
    Connected,
    /// Unknown state code not mapped to a specific variant.
    Other(i32),
}

impl ModemState {
    /// Returns the raw ModemManager state code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Failed => modem_state::FAILED,
            Self::Unknown => modem_state::UNKNOWN,
            Self::Initializing => modem_state::INITIALIZING,
            Self::Locked => modem_state::LOCKED,
            Self::Disabled => modem_state::DISABLED,
            Self::Disabling => modem_state::DISABLING,
            Self::Enabling => modem_state::ENABLING,
            Self::Enabled => modem_state::ENABLED,
            Self::Searching => modem_state::SEARCHING,
            Self::Registered => modem_state::REGISTERED,
            Self::Disconnecting => modem_state::DISCONNECTING,
            Self::Connecting => modem_state::CONNECTING,
            Self::Connected => modem_state::CONNECTED,
            Self::Other(code) => *code,
        }
    }

    /// Returns `true` once the modem is enabling or in any later state.
    ///
    /// Periodic signal refresh only runs past this point.
    pub fn is_enabling_or_later(&self) -> bool {
        self.code() >= modem_state::ENABLING
    }
}

impl From<i32> for ModemState {
    fn from(code: i32) -> Self {
        match code {
            modem_state::FAILED => Self::Failed,
            modem_state::UNKNOWN => Self::Unknown,
            modem_state::INITIALIZING => Self::Initializing,
            modem_state::LOCKED => Self::Locked,
            modem_state::DISABLED => Self::Disabled,
            modem_state::DISABLING => Self::Disabling,
            modem_state::ENABLING => Self::Enabling,
            modem_state::ENABLED => Self::Enabled,
            modem_state::SEARCHING => Self::Searching,
            modem_state::REGISTERED => Self::Registered,
            modem_state::DISCONNECTING => Self::Disconnecting,
            modem_state::CONNECTING => Self::Connecting,
            modem_state::CONNECTED => Self::Connected,
            v => Self::Other(v),
        }
    }
}

impl Display for ModemState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed => write!(f, "failed"),
            Self::Unknown => write!(f, "unknown"),
            Self::Initializing => write!(f, "initializing"),
            Self::Locked => write!(f, "locked"),
            Self::Disabled => write!(f, "disabled"),
            Self::Disabling => write!(f, "disabling"),
            Self::Enabling => write!(f, "enabling"),
            Self::Enabled => write!(f, "enabled"),
            Self::Searching => write!(f, "searching"),
            Self::Registered => write!(f, "registered"),
            Self::Disconnecting => write!(f, "disconnecting"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Other(v) => write!(f, "unknown state ({v})"),
        }
    }
}

/// Radio access technology families with extended signal reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Technology {
    Cdma,
    Evdo,
    Gsm,
    Umts,
    Lte,
}

impl Technology {
    /// All technologies, in the order they are published.
    pub const ALL: [Technology; 5] = [
        Technology::Cdma,
        Technology::Evdo,
        Technology::Gsm,
        Technology::Umts,
        Technology::Lte,
    ];

    /// Lowercase tag used in logs and property names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cdma => "cdma",
            Self::Evdo => "evdo",
            Self::Gsm => "gsm",
            Self::Umts => "umts",
            Self::Lte => "lte",
        }
    }

    /// Names of the measurements reported for this technology, in order.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Cdma => &["rssi", "ecio"],
            Self::Evdo => &["rssi", "ecio", "sinr", "io"],
            Self::Gsm => &["rssi"],
            Self::Umts => &["rssi", "ecio"],
            Self::Lte => &["rssi", "rsrq", "rsrp", "snr"],
        }
    }
}

impl Display for Technology {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CDMA 1x measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CdmaSignal {
    /// Received signal strength indication, in dBm.
    pub rssi: f64,
    /// Ec/Io, in dB.
    pub ecio: f64,
}

/// CDMA EV-DO measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvdoSignal {
    /// Received signal strength indication, in dBm.
    pub rssi: f64,
    /// Ec/Io, in dB.
    pub ecio: f64,
    /// Signal to interference and noise ratio, in dB.
    pub sinr: f64,
    /// Received total power, in dBm.
    pub io: f64,
}

/// GSM measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GsmSignal {
    /// Received signal strength indication, in dBm.
    pub rssi: f64,
}

/// UMTS measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UmtsSignal {
    /// Received signal strength indication, in dBm.
    pub rssi: f64,
    /// Ec/Io, in dB.
    pub ecio: f64,
}

/// LTE measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LteSignal {
    /// Received signal strength indication, in dBm.
    pub rssi: f64,
    /// Reference signal received quality, in dB.
    pub rsrq: f64,
    /// Reference signal received power, in dBm.
    pub rsrp: f64,
    /// Signal to noise ratio, in dB.
    pub snr: f64,
}

/// One complete set of extended signal measurements.
///
/// This is what a device driver's signal query returns. A technology set to
/// `None` is not available and is reported with zeroed values.
///
/// # Example
///
/// ```rust
/// use mmrs::{LteSignal, SignalValues, Technology};
///
/// let values = SignalValues {
///     lte: Some(LteSignal { rssi: -71.0, rsrq: -9.0, rsrp: -98.0, snr: 12.5 }),
///     ..Default::default()
/// };
///
/// assert!(values.is_available(Technology::Lte));
/// assert!(!values.is_available(Technology::Gsm));
/// assert_eq!(values.reading(Technology::Lte, "rsrp"), (true, -98.0));
/// assert_eq!(values.reading(Technology::Gsm, "rssi"), (false, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalValues {
    pub cdma: Option<CdmaSignal>,
    pub evdo: Option<EvdoSignal>,
    pub gsm: Option<GsmSignal>,
    pub umts: Option<UmtsSignal>,
    pub lte: Option<LteSignal>,
}

impl SignalValues {
    /// Returns `true` if measurements for `technology` are present.
    pub fn is_available(&self, technology: Technology) -> bool {
        match technology {
            Technology::Cdma => self.cdma.is_some(),
            Technology::Evdo => self.evdo.is_some(),
            Technology::Gsm => self.gsm.is_some(),
            Technology::Umts => self.umts.is_some(),
            Technology::Lte => self.lte.is_some(),
        }
    }

    /// Returns the record for `technology`, zero-filled when unavailable.
    pub fn record(&self, technology: Technology) -> TechnologyRecord {
        match technology {
            Technology::Cdma => {
                TechnologyRecord::new(technology, self.cdma.map(|s| vec![s.rssi, s.ecio]))
            }
            Technology::Evdo => TechnologyRecord::new(
                technology,
                self.evdo.map(|s| vec![s.rssi, s.ecio, s.sinr, s.io]),
            ),
            Technology::Gsm => TechnologyRecord::new(technology, self.gsm.map(|s| vec![s.rssi])),
            Technology::Umts => {
                TechnologyRecord::new(technology, self.umts.map(|s| vec![s.rssi, s.ecio]))
            }
            Technology::Lte => TechnologyRecord::new(
                technology,
                self.lte.map(|s| vec![s.rssi, s.rsrq, s.rsrp, s.snr]),
            ),
        }
    }

    /// Returns the published `(available, value)` pair for one measurement.
    ///
    /// Unknown field names read as `(false, 0.0)`.
    pub fn reading(&self, technology: Technology, field: &str) -> Reading {
        self.record(technology).get(field)
    }

    /// Records for every technology, in publication order.
    pub fn records(&self) -> Vec<TechnologyRecord> {
        Technology::ALL.iter().map(|t| self.record(*t)).collect()
    }

    /// Lists the readings whose `(available, value)` pair differs from
    /// `previous`, in [`Technology::ALL`] and field order.
    pub fn changed_readings(&self, previous: &SignalValues) -> Vec<(Technology, &'static str)> {
        Technology::ALL
            .iter()
            .flat_map(|tech| tech.field_names().iter().map(move |field| (*tech, *field)))
            .filter(|(tech, field)| self.reading(*tech, field) != previous.reading(*tech, field))
            .collect()
    }
}

/// Published form of a single measurement: `(available, value)`.
pub type Reading = (bool, f64);

/// Per-technology view of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyRecord {
    pub technology: Technology,
    pub available: bool,
    /// Named measurements in [`Technology::field_names`] order.
    pub fields: Vec<(&'static str, f64)>,
}

impl TechnologyRecord {
    fn new(technology: Technology, values: Option<Vec<f64>>) -> Self {
        let names = technology.field_names();
        let available = values.is_some();
        let values = values.unwrap_or_else(|| vec![0.0; names.len()]);

        Self {
            technology,
            available,
            fields: names.iter().copied().zip(values).collect(),
        }
    }

    /// Returns the `(available, value)` pair for `field`.
    pub fn get(&self, field: &str) -> Reading {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| (self.available, *value))
            .unwrap_or((false, 0.0))
    }
}

/// Identity of the bus peer that issued a request.
///
/// For requests arriving over D-Bus this is the sender's unique name
/// (e.g. `:1.42`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requester(String);

impl Requester {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Requester {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authorization kinds a request may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationKind {
    /// Changing how the device operates.
    DeviceControl,
}

impl AuthorizationKind {
    /// The polkit action identifier for this kind.
    pub fn action_id(&self) -> &'static str {
        match self {
            Self::DeviceControl => "org.freedesktop.ModemManager1.Device.Control",
        }
    }
}

impl Display for AuthorizationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_id())
    }
}

/// Configuration for a device's signal interface and refresh loop.
///
/// # Examples
///
/// ```rust
/// use mmrs::SignalConfig;
///
/// let config = SignalConfig::new()
///     .with_object_path("/org/freedesktop/ModemManager1/Modem/3")
///     .with_initial_rate(10);
///
/// assert_eq!(config.initial_rate, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalConfig {
    /// Object path the signal interface is exported at.
    pub object_path: String,
    /// Refresh rate (seconds) the device starts with; `0` keeps reporting off.
    pub initial_rate: u32,
    /// Capacity of the request queue feeding the device's event loop.
    pub request_queue_capacity: usize,
}

impl SignalConfig {
    /// Returns the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object_path(mut self, path: impl Into<String>) -> Self {
        self.object_path = path.into();
        self
    }

    pub fn with_initial_rate(mut self, rate: u32) -> Self {
        self.initial_rate = rate;
        self
    }

    pub fn with_request_queue_capacity(mut self, capacity: usize) -> Self {
        self.request_queue_capacity = capacity;
        self
    }

    /// Checks the configuration for values the event loop cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.request_queue_capacity == 0 {
            return Err(ModemError::InvalidArgument(
                "request queue capacity must be greater than zero".into(),
            ));
        }
        zvariant::ObjectPath::try_from(self.object_path.as_str()).map_err(|e| {
            ModemError::InvalidArgument(format!(
                "invalid object path '{}': {e}",
                self.object_path
            ))
        })?;
        Ok(())
    }
}

impl Default for SignalConfig {
    /// Defaults:
    /// - `object_path`: `/org/freedesktop/ModemManager1/Modem/0`
    /// - `initial_rate`: `0` (reporting off until a `Setup` request)
    /// - `request_queue_capacity`: `16`
    fn default() -> Self {
        Self {
            object_path: bus::DEFAULT_MODEM_PATH.to_string(),
            initial_rate: defaults::INITIAL_RATE,
            request_queue_capacity: defaults::REQUEST_QUEUE_CAPACITY,
        }
    }
}

/// Errors that can occur while driving a modem's signal interface or
/// decoding firmware update settings.
///
/// # Examples
///
/// ```rust
/// use mmrs::{FirmwareUpdateSettings, ModemError, WirePayload};
/// use mmrs::constants::firmware_method;
///
/// let payload = WirePayload::new(firmware_method::FASTBOOT);
/// match FirmwareUpdateSettings::decode(&payload) {
///     Err(ModemError::InvalidArgument(msg)) => assert!(msg.contains("fastboot-at")),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum ModemError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A D-Bus operation failed, with context about what was attempted.
    #[error("{context}: {source}")]
    DbusOperation {
        context: String,
        #[source]
        source: zbus::Error,
    },

    /// A value could not be converted to or from its wire representation.
    #[error("variant error: {0}")]
    Variant(#[from] zvariant::Error),

    /// The device does not implement the requested capability.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The requester is not allowed to perform the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An internal precondition did not hold.
    #[error("failed: {0}")]
    Failed(String),

    /// A request carried malformed or incomplete arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<ModemError> for zbus::fdo::Error {
    fn from(err: ModemError) -> Self {
        match err {
            ModemError::Unsupported(msg) => zbus::fdo::Error::NotSupported(msg),
            ModemError::Unauthorized(msg) => zbus::fdo::Error::AccessDenied(msg),
            ModemError::InvalidArgument(msg) => zbus::fdo::Error::InvalidArgs(msg),
            ModemError::Failed(msg) => zbus::fdo::Error::Failed(msg),
            ModemError::Dbus(e) => zbus::fdo::Error::Failed(e.to_string()),
            err @ ModemError::DbusOperation { .. } => zbus::fdo::Error::Failed(err.to_string()),
            ModemError::Variant(e) => zbus::fdo::Error::InvalidArgs(e.to_string()),
        }
    }
}
