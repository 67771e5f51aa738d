//! Firmware update settings and their wire encoding.
//!
//! A modem that supports firmware upgrades publishes the settings a flashing
//! tool needs as a `(ua{sv})` value: the update method tag followed by a
//! dictionary of method-specific fields. Internally the settings are a proper
//! sum type; the dictionary only exists at the wire boundary.
//!
//! # Example
//!
//! ```rust
//! use mmrs::{FirmwareUpdateMethod, FirmwareUpdateSettings};
//!
//! let settings = FirmwareUpdateSettings::fastboot("AT^FASTBOOT");
//! let payload = settings.encode();
//!
//! assert_eq!(payload.method, 1);
//! assert!(payload.fields.contains_key("fastboot-at"));
//!
//! let decoded = FirmwareUpdateSettings::decode(&payload).unwrap();
//! assert_eq!(decoded.method(), FirmwareUpdateMethod::Fastboot);
//! assert_eq!(decoded.fastboot_at(), "AT^FASTBOOT");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use zvariant::{OwnedValue, Str, Type, Value};

use crate::api::models::ModemError;
use crate::types::constants::{firmware_method, settings_key};
use crate::Result;

/// D-Bus signature of an encoded settings value.
const WIRE_SIGNATURE: &str = "(ua{sv})";

/// Method used to put the module into firmware update mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirmwareUpdateMethod {
    /// No method is known.
    Unknown,
    /// The module is reset into fastboot mode with an AT command.
    Fastboot,
    /// A method tag this crate has no field schema for.
    Other(u32),
}

impl FirmwareUpdateMethod {
    /// Returns the wire tag for this method.
    pub fn code(&self) -> u32 {
        match self {
            Self::Unknown => firmware_method::UNKNOWN,
            Self::Fastboot => firmware_method::FASTBOOT,
            Self::Other(code) => *code,
        }
    }
}

impl From<u32> for FirmwareUpdateMethod {
    fn from(code: u32) -> Self {
        match code {
            firmware_method::UNKNOWN => Self::Unknown,
            firmware_method::FASTBOOT => Self::Fastboot,
            v => Self::Other(v),
        }
    }
}

impl Display for FirmwareUpdateMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Fastboot => write!(f, "fastboot"),
            Self::Other(v) => write!(f, "unknown method ({v})"),
        }
    }
}

/// Wire form of [`FirmwareUpdateSettings`]: `(method, {key: variant})`.
///
/// Only key presence is significant; dictionary order carries no meaning.
#[derive(Debug, PartialEq, Type, Serialize, Deserialize)]
pub struct WirePayload {
    pub method: u32,
    pub fields: HashMap<String, OwnedValue>,
}

impl WirePayload {
    /// Creates a payload for `method` with an empty field dictionary.
    pub fn new(method: u32) -> Self {
        Self {
            method,
            fields: HashMap::new(),
        }
    }

    /// Adds a string field to the dictionary.
    pub fn with_str(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.into(), OwnedValue::from(Str::from(value.into())));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Settings {
    Unknown,
    Fastboot { at: String },
    Unrecognized(u32),
}

/// Settings exposed to aid a firmware update operation.
///
/// An immutable value: every constructor either yields a complete value for
/// its method or fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareUpdateSettings(Settings);

impl FirmwareUpdateSettings {
    /// Settings carrying no update method.
    pub fn unknown() -> Self {
        Self(Settings::Unknown)
    }

    /// Fastboot settings; `at` is the command that resets the module into
    /// fastboot mode.
    pub fn fastboot(at: impl Into<String>) -> Self {
        Self(Settings::Fastboot { at: at.into() })
    }

    /// Creates settings for a method that carries no extra fields.
    ///
    /// # Errors
    ///
    /// Returns `ModemError::InvalidArgument` for [`FirmwareUpdateMethod::Fastboot`],
    /// which cannot exist without its AT command; use [`Self::fastboot`].
    pub fn new(method: FirmwareUpdateMethod) -> Result<Self> {
        // Normalize hand-built tags such as `Other(1)`.
        match FirmwareUpdateMethod::from(method.code()) {
            FirmwareUpdateMethod::Unknown => Ok(Self::unknown()),
            FirmwareUpdateMethod::Fastboot => Err(missing_field(settings_key::FASTBOOT_AT)),
            FirmwareUpdateMethod::Other(code) => Ok(Self(Settings::Unrecognized(code))),
        }
    }

    /// Gets the method to use during the firmware update operation.
    pub fn method(&self) -> FirmwareUpdateMethod {
        match &self.0 {
            Settings::Unknown => FirmwareUpdateMethod::Unknown,
            Settings::Fastboot { .. } => FirmwareUpdateMethod::Fastboot,
            Settings::Unrecognized(code) => FirmwareUpdateMethod::Other(*code),
        }
    }

    /// Gets the AT command that triggers a reset into fastboot mode.
    ///
    /// # Panics
    ///
    /// Panics if the method is not [`FirmwareUpdateMethod::Fastboot`]. Use
    /// [`Self::try_fastboot_at`] when the method is not known up front.
    pub fn fastboot_at(&self) -> &str {
        match &self.0 {
            Settings::Fastboot { at } => at,
            _ => panic!(
                "fastboot_at is only available for fastboot settings (method: {})",
                self.method()
            ),
        }
    }

    /// Returns the fastboot AT command, or `None` for other methods.
    pub fn try_fastboot_at(&self) -> Option<&str> {
        match &self.0 {
            Settings::Fastboot { at } => Some(at),
            _ => None,
        }
    }

    /// Returns a copy with the fastboot AT command replaced.
    ///
    /// # Panics
    ///
    /// Panics if the method is not [`FirmwareUpdateMethod::Fastboot`].
    pub fn with_fastboot_at(self, at: impl Into<String>) -> Self {
        assert!(
            matches!(self.0, Settings::Fastboot { .. }),
            "with_fastboot_at is only valid for fastboot settings (method: {})",
            self.method()
        );
        Self::fastboot(at)
    }

    /// Encodes the settings into their wire payload.
    ///
    /// Methods without extra fields produce an empty dictionary.
    pub fn encode(&self) -> WirePayload {
        let payload = WirePayload::new(self.method().code());
        match &self.0 {
            Settings::Fastboot { at } => payload.with_str(settings_key::FASTBOOT_AT, at.clone()),
            Settings::Unknown | Settings::Unrecognized(_) => payload,
        }
    }

    /// Decodes settings from a wire payload.
    ///
    /// Every key is validated before anything is built, so a failure never
    /// leaves a partially decoded value behind.
    ///
    /// # Errors
    ///
    /// Returns `ModemError::InvalidArgument` naming the key when the
    /// dictionary contains an unexpected key, a value of the wrong type, or
    /// lacks a field the method requires.
    pub fn decode(payload: &WirePayload) -> Result<Self> {
        let method = FirmwareUpdateMethod::from(payload.method);

        // Unknown keys are reported before any value is inspected, lowest first.
        let unexpected = payload
            .fields
            .keys()
            .filter(|key| key.as_str() != settings_key::FASTBOOT_AT)
            .min();
        if let Some(key) = unexpected {
            return Err(ModemError::InvalidArgument(format!(
                "Invalid settings dictionary, unexpected key '{key}'"
            )));
        }

        let fastboot_at = payload
            .fields
            .get(settings_key::FASTBOOT_AT)
            .map(|value| string_field(settings_key::FASTBOOT_AT, value))
            .transpose()?;

        match method {
            FirmwareUpdateMethod::Fastboot => match fastboot_at {
                Some(at) => Ok(Self::fastboot(at)),
                None => Err(missing_field(settings_key::FASTBOOT_AT)),
            },
            FirmwareUpdateMethod::Unknown | FirmwareUpdateMethod::Other(_) => {
                if fastboot_at.is_some() {
                    return Err(ModemError::InvalidArgument(format!(
                        "'{}' is only valid with the fastboot method (method: {method})",
                        settings_key::FASTBOOT_AT
                    )));
                }
                Self::new(method)
            }
        }
    }

    /// Decodes settings from an untyped variant, as read from a property.
    ///
    /// # Errors
    ///
    /// Returns `ModemError::InvalidArgument` if no value is given, if the value
    /// is not a `(ua{sv})` structure, or if [`Self::decode`] rejects it.
    pub fn from_variant(value: Option<&Value<'_>>) -> Result<Self> {
        let value = match value {
            Some(Value::Value(inner)) => inner.as_ref(),
            Some(value) => value,
            None => return Err(ModemError::InvalidArgument("No input given".into())),
        };

        if value.value_signature().to_string() != WIRE_SIGNATURE {
            return Err(ModemError::InvalidArgument("Invalid input type".into()));
        }

        let Value::Structure(structure) = value else {
            return Err(ModemError::InvalidArgument("Invalid input type".into()));
        };

        let (method, dict) = match structure.fields() {
            [Value::U32(method), dict @ Value::Dict(_)] => (*method, dict),
            _ => return Err(ModemError::InvalidArgument("Invalid input type".into())),
        };

        let fields = HashMap::<String, OwnedValue>::try_from(dict.try_clone()?)?;
        Self::decode(&WirePayload { method, fields })
    }
}

impl From<&FirmwareUpdateSettings> for WirePayload {
    fn from(settings: &FirmwareUpdateSettings) -> Self {
        settings.encode()
    }
}

impl TryFrom<&WirePayload> for FirmwareUpdateSettings {
    type Error = ModemError;

    fn try_from(payload: &WirePayload) -> Result<Self> {
        Self::decode(payload)
    }
}

impl Default for FirmwareUpdateSettings {
    fn default() -> Self {
        Self::unknown()
    }
}

fn string_field(key: &str, value: &Value<'_>) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.as_str().to_string()),
        Value::Value(inner) => string_field(key, inner),
        other => Err(ModemError::InvalidArgument(format!(
            "Invalid settings dictionary, '{key}' must be a string (got '{}')",
            other.value_signature()
        ))),
    }
}

fn missing_field(key: &str) -> ModemError {
    ModemError::InvalidArgument(format!("Fastboot method requires the '{key}' setting"))
}
