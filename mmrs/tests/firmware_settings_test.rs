//! Tests for the firmware update settings codec.

use std::collections::HashMap;
use zvariant::serialized::Context;
use zvariant::{LE, OwnedValue, Type, Value, to_bytes};

use mmrs::constants::firmware_method;
use mmrs::{FirmwareUpdateMethod, FirmwareUpdateSettings, ModemError, WirePayload};

fn invalid_argument(result: mmrs::Result<FirmwareUpdateSettings>) -> String {
    match result {
        Err(ModemError::InvalidArgument(msg)) => msg,
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn test_unknown_survives_encode_decode() {
    let settings = FirmwareUpdateSettings::unknown();
    let decoded = FirmwareUpdateSettings::decode(&settings.encode()).unwrap();
    assert_eq!(decoded, settings);
    assert_eq!(decoded.method(), FirmwareUpdateMethod::Unknown);
}

#[test]
fn test_fastboot_survives_encode_decode() {
    let settings = FirmwareUpdateSettings::fastboot("AT+FASTBOOT");
    let decoded = FirmwareUpdateSettings::decode(&settings.encode()).unwrap();
    assert_eq!(decoded, settings);
    assert_eq!(decoded.fastboot_at(), "AT+FASTBOOT");
}

#[test]
fn test_fastboot_without_command_names_missing_key() {
    let payload = WirePayload::new(firmware_method::FASTBOOT);
    let msg = invalid_argument(FirmwareUpdateSettings::decode(&payload));
    assert!(msg.contains("fastboot-at"), "message was: {msg}");
}

#[test]
fn test_unexpected_key_is_named() {
    let payload = WirePayload::new(firmware_method::FASTBOOT).with_str("bogus", "x");
    let msg = invalid_argument(FirmwareUpdateSettings::decode(&payload));
    assert!(msg.contains("bogus"), "message was: {msg}");
}

#[test]
fn test_unexpected_key_fails_even_with_valid_command() {
    let payload = WirePayload::new(firmware_method::FASTBOOT)
        .with_str("fastboot-at", "AT^RESET")
        .with_str("reset-delay", "5");
    let msg = invalid_argument(FirmwareUpdateSettings::decode(&payload));
    assert!(msg.contains("reset-delay"), "message was: {msg}");
}

#[test]
fn test_wire_signature() {
    assert_eq!(WirePayload::SIGNATURE.to_string(), "(ua{sv})");
}

#[test]
fn test_payload_crosses_the_wire() {
    let payload = FirmwareUpdateSettings::fastboot("AT^FASTBOOT").encode();

    let ctxt = Context::new_dbus(LE, 0);
    let bytes = to_bytes(ctxt, &payload).unwrap();
    let (received, _): (WirePayload, _) = bytes.deserialize().unwrap();

    let settings = FirmwareUpdateSettings::try_from(&received).unwrap();
    assert_eq!(settings.fastboot_at(), "AT^FASTBOOT");
}

#[test]
fn test_property_value_decodes() {
    let mut fields: HashMap<String, Value<'static>> = HashMap::new();
    fields.insert("fastboot-at".into(), Value::from("AT+QFASTBOOT"));
    let property = OwnedValue::try_from(Value::from((firmware_method::FASTBOOT, fields))).unwrap();

    let settings = FirmwareUpdateSettings::from_variant(Some(&*property)).unwrap();
    assert_eq!(settings.method(), FirmwareUpdateMethod::Fastboot);
    assert_eq!(settings.fastboot_at(), "AT+QFASTBOOT");
}

#[test]
fn test_property_of_wrong_type_is_rejected() {
    let property = Value::from(firmware_method::FASTBOOT);
    let msg = invalid_argument(FirmwareUpdateSettings::from_variant(Some(&property)));
    assert_eq!(msg, "Invalid input type");
}
