//! Tests for the extended signal refresh loop.
//!
//! These drive a `SignalService` through its handle with a fake modem and
//! bus, on a paused clock so refresh cadence is exact.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::sleep;

use common::{admin, lte_values, spawn_device, stranger};
use mmrs::{LifecycleState, ModemError, ModemState, SignalValues, Technology};

#[tokio::test(start_paused = true)]
async fn test_initialize_exports_zeroed_interface() {
    let device = spawn_device(true, ModemState::Disabled);
    device.handle.initialize().await.unwrap();

    assert!(device.bus.exported.load(Ordering::SeqCst));
    assert_eq!(device.bus.last_snapshot(), Some(SignalValues::default()));
    assert_eq!(*device.bus.rates.lock().unwrap(), vec![0]);

    let status = device.handle.status().await.unwrap();
    assert_eq!(status.state, LifecycleState::Initialized);
    for tech in Technology::ALL {
        for field in tech.field_names() {
            assert_eq!(status.values.reading(tech, field), (false, 0.0));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_rate_zero_clears_values_and_timer() {
    let device = spawn_device(true, ModemState::Registered);
    device.handle.initialize().await.unwrap();
    device.handle.enable().await.unwrap();
    device.handle.setup(5, admin()).await.unwrap();

    sleep(Duration::from_secs(1)).await;
    let status = device.handle.status().await.unwrap();
    assert_eq!(status.values, lte_values());

    device.handle.setup(0, admin()).await.unwrap();
    let status = device.handle.status().await.unwrap();
    assert_eq!(status.rate, 0);
    assert!(status.timer.is_none());
    assert_eq!(status.values, SignalValues::default());
    assert_eq!(device.bus.last_snapshot(), Some(SignalValues::default()));

    sleep(Duration::from_secs(20)).await;
    assert_eq!(device.modem.unwrap().queries(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_same_rate_twice_keeps_timer() {
    let device = spawn_device(true, ModemState::Enabled);
    device.handle.initialize().await.unwrap();
    device.handle.setup(5, admin()).await.unwrap();
    let first = device.handle.status().await.unwrap();

    device.handle.setup(5, admin()).await.unwrap();
    let second = device.handle.status().await.unwrap();

    assert!(first.timer.is_some());
    assert_eq!(first.timer, second.timer);
    assert_eq!(first.queries_started, second.queries_started);
}

#[tokio::test(start_paused = true)]
async fn test_new_rate_replaces_timer_and_queries_immediately() {
    let device = spawn_device(true, ModemState::Enabled);
    device.handle.initialize().await.unwrap();
    device.handle.setup(5, admin()).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    let before = device.handle.status().await.unwrap();

    device.handle.setup(30, admin()).await.unwrap();
    let after = device.handle.status().await.unwrap();

    assert_ne!(before.timer, after.timer);
    assert_eq!(after.timer_period, Some(Duration::from_secs(30)));
    assert_eq!(after.queries_started, before.queries_started + 1);
    assert_eq!(*device.bus.rates.lock().unwrap(), vec![0, 5, 30]);
}

#[tokio::test(start_paused = true)]
async fn test_enable_queries_immediately_then_at_stored_interval() {
    let device = spawn_device(true, ModemState::Disabled);
    device.handle.initialize().await.unwrap();

    device.handle.setup(10, admin()).await.unwrap();
    let status = device.handle.status().await.unwrap();
    assert_eq!(status.rate, 10);
    assert!(status.timer.is_none());
    assert_eq!(status.queries_started, 0);

    device.state.send(ModemState::Enabled).unwrap();
    device.handle.enable().await.unwrap();
    let status = device.handle.status().await.unwrap();
    assert_eq!(status.state, LifecycleState::Enabled);
    assert_eq!(status.timer_period, Some(Duration::from_secs(10)));
    assert_eq!(status.queries_started, 1);

    sleep(Duration::from_secs(25)).await;
    let status = device.handle.status().await.unwrap();
    assert_eq!(status.queries_started, 3);
    assert_eq!(device.modem.unwrap().queries(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_enable_without_query_support_is_unsupported() {
    let device = spawn_device(false, ModemState::Connected);

    let err = device.handle.initialize().await.unwrap_err();
    assert!(matches!(err, ModemError::Unsupported(_)));
    assert!(!device.bus.exported.load(Ordering::SeqCst));

    device.handle.setup(5, admin()).await.unwrap();
    let err = device.handle.enable().await.unwrap_err();
    assert!(matches!(err, ModemError::Unsupported(_)));

    let status = device.handle.status().await.unwrap();
    assert!(!status.supported);
    assert_eq!(status.rate, 5);
    assert!(status.timer.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_enable_unsupported_before_initialize() {
    let device = spawn_device(false, ModemState::Connected);

    let err = device.handle.enable().await.unwrap_err();
    assert!(matches!(err, ModemError::Unsupported(_)));

    let status = device.handle.status().await.unwrap();
    assert_eq!(status.state, LifecycleState::Uninitialized);
    assert!(status.timer.is_none());
    assert_eq!(status.queries_started, 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_query_clears_values_and_keeps_ticking() {
    let device = spawn_device(true, ModemState::Registered);
    let modem = device.modem.clone().unwrap();
    device.handle.initialize().await.unwrap();
    device.handle.setup(5, admin()).await.unwrap();

    sleep(Duration::from_secs(1)).await;
    let status = device.handle.status().await.unwrap();
    assert!(status.values.is_available(Technology::Lte));

    modem.failing.store(true, Ordering::SeqCst);
    sleep(Duration::from_secs(5)).await;
    let status = device.handle.status().await.unwrap();
    assert_eq!(status.values, SignalValues::default());
    assert_eq!(device.bus.last_snapshot(), Some(SignalValues::default()));

    modem.failing.store(false, Ordering::SeqCst);
    sleep(Duration::from_secs(5)).await;
    let status = device.handle.status().await.unwrap();
    assert_eq!(status.values.reading(Technology::Umts, "ecio"), (true, -6.5));
    assert_eq!(modem.queries(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_setup_without_authorization_changes_nothing() {
    let device = spawn_device(true, ModemState::Enabled);
    device.handle.initialize().await.unwrap();
    device.handle.enable().await.unwrap();

    let err = device.handle.setup(5, stranger()).await.unwrap_err();
    match err {
        ModemError::Unauthorized(msg) => assert!(msg.contains(":1.99")),
        other => panic!("unexpected error: {other:?}"),
    }

    let status = device.handle.status().await.unwrap();
    assert_eq!(status.rate, 0);
    assert!(status.timer.is_none());
    assert_eq!(status.queries_started, 0);
    assert_eq!(*device.bus.rates.lock().unwrap(), vec![0]);
}

#[tokio::test(start_paused = true)]
async fn test_disable_keeps_stored_rate() {
    let device = spawn_device(true, ModemState::Connected);
    device.handle.initialize().await.unwrap();
    device.handle.enable().await.unwrap();
    device.handle.setup(5, admin()).await.unwrap();
    let enabled = device.handle.status().await.unwrap();

    device.handle.disable().await.unwrap();
    let disabled = device.handle.status().await.unwrap();
    assert_eq!(disabled.state, LifecycleState::Disabled);
    assert_eq!(disabled.rate, 5);
    assert!(disabled.timer.is_none());
    assert_eq!(disabled.values, SignalValues::default());

    device.handle.enable().await.unwrap();
    let reenabled = device.handle.status().await.unwrap();
    assert!(reenabled.timer.is_some());
    assert_ne!(reenabled.timer, enabled.timer);
    assert_eq!(reenabled.timer_period, Some(Duration::from_secs(5)));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_unexports_once() {
    let device = spawn_device(true, ModemState::Connected);
    device.handle.initialize().await.unwrap();
    device.handle.setup(2, admin()).await.unwrap();

    device.handle.shutdown().await.unwrap();
    device.handle.shutdown().await.unwrap();
    assert!(!device.bus.exported.load(Ordering::SeqCst));

    let status = device.handle.status().await.unwrap();
    assert_eq!(status.state, LifecycleState::ShutDown);
    assert!(status.timer.is_none());

    let err = device.handle.setup(4, admin()).await.unwrap_err();
    assert!(matches!(err, ModemError::Failed(_)));
    assert!(matches!(
        device.handle.enable().await,
        Err(ModemError::Failed(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_every_handle_shuts_down() {
    let device = spawn_device(true, ModemState::Connected);
    device.handle.initialize().await.unwrap();
    assert!(device.bus.exported.load(Ordering::SeqCst));

    let bus = device.bus.clone();
    drop(device);
    sleep(Duration::from_millis(10)).await;
    assert!(!bus.exported.load(Ordering::SeqCst));
}
