//! Fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use mmrs::{
    AuthorizationKind, Authorizer, LteSignal, ModemError, ModemState, Requester, SignalController,
    SignalExporter, SignalHandle, SignalService, SignalSkeleton, SignalSource, SignalValues,
    UmtsSignal,
};

pub fn lte_values() -> SignalValues {
    SignalValues {
        lte: Some(LteSignal {
            rssi: -63.0,
            rsrq: -11.0,
            rsrp: -97.0,
            snr: 9.5,
        }),
        umts: Some(UmtsSignal {
            rssi: -80.0,
            ecio: -6.5,
        }),
        ..Default::default()
    }
}

/// Counts queries and fails on demand.
pub struct Modem {
    pub queries: AtomicUsize,
    pub failing: AtomicBool,
}

impl Modem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queries: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        })
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalSource for Modem {
    async fn load_values(&self) -> mmrs::Result<SignalValues> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(ModemError::Failed("AT+CESQ timed out".into()))
        } else {
            Ok(lte_values())
        }
    }
}

/// Allows only the listed requesters.
pub struct AllowList(pub Vec<&'static str>);

#[async_trait]
impl Authorizer for AllowList {
    async fn authorize(&self, requester: &Requester, kind: AuthorizationKind) -> mmrs::Result<()> {
        if self.0.contains(&requester.as_str()) {
            Ok(())
        } else {
            Err(ModemError::Unauthorized(format!(
                "{requester} is not allowed to perform {kind}"
            )))
        }
    }
}

#[derive(Default)]
pub struct Bus {
    pub rates: Mutex<Vec<u32>>,
    pub snapshots: Mutex<Vec<SignalValues>>,
    pub exported: AtomicBool,
}

impl Bus {
    pub fn last_snapshot(&self) -> Option<SignalValues> {
        self.snapshots.lock().unwrap().last().copied()
    }
}

struct BusSkeleton(Arc<Bus>);

#[async_trait]
impl SignalSkeleton for BusSkeleton {
    async fn set_rate(&self, rate: u32) -> mmrs::Result<()> {
        self.0.rates.lock().unwrap().push(rate);
        Ok(())
    }

    async fn publish(&self, values: &SignalValues) -> mmrs::Result<()> {
        self.0.snapshots.lock().unwrap().push(*values);
        Ok(())
    }
}

pub struct BusExporter(pub Arc<Bus>);

#[async_trait]
impl SignalExporter for BusExporter {
    fn create_skeleton(&self) -> Arc<dyn SignalSkeleton> {
        Arc::new(BusSkeleton(self.0.clone()))
    }

    async fn export(&self) -> mmrs::Result<()> {
        self.0.exported.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn unexport(&self) -> mmrs::Result<()> {
        self.0.exported.store(false, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Device {
    pub handle: SignalHandle,
    pub modem: Option<Arc<Modem>>,
    pub bus: Arc<Bus>,
    pub state: watch::Sender<ModemState>,
}

/// Spawns a service for a device; `supported` decides whether the driver
/// provides a query hook.
pub fn spawn_device(supported: bool, state: ModemState) -> Device {
    let bus = Arc::new(Bus::default());
    let (state_tx, state_rx) = watch::channel(state);
    let modem = supported.then(Modem::new);

    let mut builder = SignalController::builder(
        Arc::new(state_rx),
        Arc::new(AllowList(vec![":1.10"])),
        Arc::new(BusExporter(bus.clone())),
    );
    if let Some(modem) = &modem {
        builder = builder.source(modem.clone());
    }
    let controller = builder.build().unwrap();

    let (handle, requests) = SignalHandle::channel(16);
    tokio::spawn(SignalService::new(controller, requests).run());

    Device {
        handle,
        modem,
        bus,
        state: state_tx,
    }
}

pub fn admin() -> Requester {
    Requester::new(":1.10")
}

pub fn stranger() -> Requester {
    Requester::new(":1.99")
}
