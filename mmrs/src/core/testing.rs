//! In-crate fakes for the collaborator traits.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::Result;
use crate::api::hooks::{Authorizer, SignalExporter, SignalSkeleton, SignalSource};
use crate::api::models::{
    AuthorizationKind, GsmSignal, LteSignal, ModemError, Requester, SignalValues,
};

pub(crate) fn sample_values() -> SignalValues {
    SignalValues {
        gsm: Some(GsmSignal { rssi: -71.0 }),
        lte: Some(LteSignal {
            rssi: -60.0,
            rsrq: -9.0,
            rsrp: -92.0,
            snr: 14.5,
        }),
        ..Default::default()
    }
}

pub(crate) struct FakeSource {
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
    values: SignalValues,
}

impl FakeSource {
    pub(crate) fn new(values: SignalValues) -> Arc<Self> {
        Self::with_delay(values, Duration::ZERO)
    }

    pub(crate) fn with_delay(values: SignalValues, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay,
            values,
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SignalSource for FakeSource {
    async fn load_values(&self) -> Result<SignalValues> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ModemError::Failed("query failed".into()));
        }
        Ok(self.values)
    }
}

#[derive(Default)]
pub(crate) struct RecordingSkeleton {
    rates: Mutex<Vec<u32>>,
    published: Mutex<Vec<SignalValues>>,
}

impl RecordingSkeleton {
    pub(crate) fn rates(&self) -> Vec<u32> {
        self.rates.lock().unwrap().clone()
    }

    pub(crate) fn published(&self) -> Vec<SignalValues> {
        self.published.lock().unwrap().clone()
    }

    pub(crate) fn last_published(&self) -> Option<SignalValues> {
        self.published.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl SignalSkeleton for RecordingSkeleton {
    async fn set_rate(&self, rate: u32) -> Result<()> {
        self.rates.lock().unwrap().push(rate);
        Ok(())
    }

    async fn publish(&self, values: &SignalValues) -> Result<()> {
        self.published.lock().unwrap().push(*values);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeExporter {
    pub(crate) skeleton: Arc<RecordingSkeleton>,
    pub(crate) created: AtomicUsize,
    pub(crate) exported: AtomicUsize,
    pub(crate) unexported: AtomicUsize,
}

#[async_trait]
impl SignalExporter for FakeExporter {
    fn create_skeleton(&self) -> Arc<dyn SignalSkeleton> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.skeleton.clone()
    }

    async fn export(&self) -> Result<()> {
        self.exported.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unexport(&self) -> Result<()> {
        self.unexported.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct FakeAuthorizer {
    allow: bool,
    delay: Duration,
    pub(crate) calls: Mutex<Vec<(Requester, AuthorizationKind)>>,
}

impl FakeAuthorizer {
    pub(crate) fn allowing() -> Arc<Self> {
        Self::build(true, Duration::ZERO)
    }

    pub(crate) fn denying() -> Arc<Self> {
        Self::build(false, Duration::ZERO)
    }

    pub(crate) fn slow(delay: Duration) -> Arc<Self> {
        Self::build(true, delay)
    }

    fn build(allow: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            allow,
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Authorizer for FakeAuthorizer {
    async fn authorize(&self, requester: &Requester, kind: AuthorizationKind) -> Result<()> {
        self.calls.lock().unwrap().push((requester.clone(), kind));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.allow {
            Ok(())
        } else {
            Err(ModemError::Unauthorized(format!(
                "{requester} may not perform {kind}"
            )))
        }
    }
}
