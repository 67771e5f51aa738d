//! A modem that makes up its measurements.

use async_trait::async_trait;
use log::{debug, info};
use std::sync::atomic::{AtomicU64, Ordering};

use mmrs::{
    AuthorizationKind, Authorizer, LteSignal, ModemError, Requester, SignalSource, SignalValues,
    UmtsSignal,
};

/// Reports LTE and UMTS readings that drift a little on every query.
#[derive(Debug, Default)]
pub struct SimulatedModem {
    queries: AtomicU64,
}

impl SimulatedModem {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalSource for SimulatedModem {
    async fn load_values(&self) -> mmrs::Result<SignalValues> {
        let n = self.queries.fetch_add(1, Ordering::Relaxed);
        // Walks 0..=4 dB and back.
        let drift = (n % 8).min(8 - n % 8) as f64;
        debug!("Simulated signal query #{n} (drift {drift} dB)");

        Ok(SignalValues {
            lte: Some(LteSignal {
                rssi: -65.0 - drift,
                rsrq: -10.0 - drift / 2.0,
                rsrp: -95.0 - drift,
                snr: 12.0 - drift,
            }),
            umts: Some(UmtsSignal {
                rssi: -82.0 - drift,
                ecio: -7.0,
            }),
            ..Default::default()
        })
    }
}

/// Grants or refuses every request, regardless of who asks.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuthorizer {
    allow: bool,
}

impl StaticAuthorizer {
    pub fn new(allow: bool) -> Self {
        Self { allow }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn authorize(&self, requester: &Requester, kind: AuthorizationKind) -> mmrs::Result<()> {
        if self.allow {
            info!("Granting {kind} to {requester}");
            Ok(())
        } else {
            info!("Refusing {kind} to {requester}");
            Err(ModemError::Unauthorized(format!(
                "{requester} is not allowed to perform {kind}"
            )))
        }
    }
}
