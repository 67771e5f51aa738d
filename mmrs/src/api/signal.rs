//! Lifecycle of a device's extended signal interface.
//!
//! [`SignalController`] ties the refresh scheduler to the modem's lifecycle:
//! it creates and exports the interface on `initialize`, starts and stops
//! refreshing on `enable`/`disable`, handles `Setup` requests and removes the
//! interface on `shutdown`.
//!
//! The controller is not shared between tasks. A daemon normally wraps it in
//! a [`SignalService`](crate::SignalService), which serializes every request
//! and timer event for the device.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use mmrs::{
//!     AuthorizationKind, ModemState, Requester, SignalController, SignalExporter,
//!     SignalSkeleton, SignalValues, Authorizer,
//! };
//!
//! struct Quiet;
//!
//! #[async_trait]
//! impl SignalSkeleton for Quiet {
//!     async fn set_rate(&self, _rate: u32) -> mmrs::Result<()> { Ok(()) }
//!     async fn publish(&self, _values: &SignalValues) -> mmrs::Result<()> { Ok(()) }
//! }
//!
//! #[async_trait]
//! impl SignalExporter for Quiet {
//!     fn create_skeleton(&self) -> Arc<dyn SignalSkeleton> { Arc::new(Quiet) }
//!     async fn export(&self) -> mmrs::Result<()> { Ok(()) }
//!     async fn unexport(&self) -> mmrs::Result<()> { Ok(()) }
//! }
//!
//! #[async_trait]
//! impl Authorizer for Quiet {
//!     async fn authorize(&self, _: &Requester, _: AuthorizationKind) -> mmrs::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> mmrs::Result<()> {
//! let mut controller = SignalController::builder(
//!     Arc::new(|| ModemState::Disabled),
//!     Arc::new(Quiet),
//!     Arc::new(Quiet),
//! )
//! .build()?;
//!
//! // No driver query hook was given, so the interface is unsupported.
//! assert!(controller.initialize().await.is_err());
//! assert!(!controller.is_supported());
//! # Ok(())
//! # }
//! ```

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use crate::Result;
use crate::api::hooks::{Authorizer, ModemStateSource, SignalExporter, SignalSource};
use crate::api::models::{
    AuthorizationKind, ModemError, ModemState, Requester, SignalConfig, SignalValues,
};
use crate::core::refresh::{RefreshEvent, RefreshScheduler, TimerId};

const NO_SKELETON: &str = "Couldn't get interface skeleton";
const NOT_SUPPORTED: &str = "Extended signal information reporting not supported";

/// Where the interface is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    /// Skeleton created; exported only if the device is supported.
    Initialized,
    Enabled,
    Disabled,
    /// Terminal.
    ShutDown,
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::ShutDown => "shut down",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of a device's signal interface.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalStatus {
    pub state: LifecycleState,
    pub supported: bool,
    /// Stored refresh rate in seconds.
    pub rate: u32,
    /// The active refresh timer, if any.
    pub timer: Option<TimerId>,
    pub timer_period: Option<Duration>,
    /// Number of device queries issued so far.
    pub queries_started: u64,
    /// Last published snapshot.
    pub values: SignalValues,
}

/// Builder for [`SignalController`].
pub struct SignalControllerBuilder {
    config: SignalConfig,
    source: Option<Arc<dyn SignalSource>>,
    modem: Arc<dyn ModemStateSource>,
    authorizer: Arc<dyn Authorizer>,
    exporter: Arc<dyn SignalExporter>,
}

impl SignalControllerBuilder {
    /// Sets the driver's query hook. Without one the device is unsupported.
    pub fn source(mut self, source: Arc<dyn SignalSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn config(mut self, config: SignalConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and builds the controller.
    pub fn build(self) -> Result<SignalController> {
        self.config.validate()?;
        Ok(SignalController {
            state: LifecycleState::Uninitialized,
            scheduler: RefreshScheduler::new(self.config.initial_rate, self.source),
            modem: self.modem,
            authorizer: self.authorizer,
            exporter: self.exporter,
            exported: false,
        })
    }
}

/// Owns one device's signal interface.
pub struct SignalController {
    state: LifecycleState,
    scheduler: RefreshScheduler,
    modem: Arc<dyn ModemStateSource>,
    authorizer: Arc<dyn Authorizer>,
    exporter: Arc<dyn SignalExporter>,
    exported: bool,
}

impl SignalController {
    pub fn builder(
        modem: Arc<dyn ModemStateSource>,
        authorizer: Arc<dyn Authorizer>,
        exporter: Arc<dyn SignalExporter>,
    ) -> SignalControllerBuilder {
        SignalControllerBuilder {
            config: SignalConfig::default(),
            source: None,
            modem,
            authorizer,
            exporter,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the driver can report extended signal information.
    pub fn is_supported(&self) -> bool {
        self.scheduler.is_supported()
    }

    pub fn rate(&self) -> u32 {
        self.scheduler.rate()
    }

    pub fn status(&self) -> SignalStatus {
        SignalStatus {
            state: self.state,
            supported: self.is_supported(),
            rate: self.scheduler.rate(),
            timer: self.scheduler.timer_id(),
            timer_period: self.scheduler.timer_period(),
            queries_started: self.scheduler.queries_started(),
            values: *self.scheduler.values(),
        }
    }

    /// Creates the interface object and, if the device is supported, exports
    /// it with every technology cleared.
    ///
    /// Calling this again reuses the existing object.
    ///
    /// # Errors
    ///
    /// Returns `ModemError::Unsupported` when the driver has no query hook;
    /// the object still exists but is not exported.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.state == LifecycleState::ShutDown {
            return Err(ModemError::Failed(NO_SKELETON.into()));
        }

        if self.scheduler.skeleton().is_none() {
            let skeleton = self.exporter.create_skeleton();
            if let Err(e) = skeleton.set_rate(self.scheduler.rate()).await {
                warn!("Couldn't publish initial refresh rate: {e}");
            }
            self.scheduler.attach(skeleton);
        }

        if self.state == LifecycleState::Uninitialized {
            self.state = LifecycleState::Initialized;
        }

        if !self.is_supported() {
            debug!("{NOT_SUPPORTED}");
            return Err(ModemError::Unsupported(NOT_SUPPORTED.into()));
        }

        if !self.exported {
            self.scheduler.clear_values().await;
            self.exporter.export().await?;
            self.exported = true;
            debug!("Extended signal interface exported");
        }
        Ok(())
    }

    /// Starts refreshing at the stored rate.
    ///
    /// # Errors
    ///
    /// `ModemError::Unsupported` when the driver has no query hook, whatever
    /// the lifecycle state. Otherwise `ModemError::Failed` before `initialize`
    /// or after `shutdown`.
    pub async fn enable(&mut self) -> Result<()> {
        if !self.is_supported() {
            return Err(ModemError::Unsupported(NOT_SUPPORTED.into()));
        }
        if self.scheduler.skeleton().is_none() {
            return Err(ModemError::Failed(NO_SKELETON.into()));
        }

        let modem_state = self.modem.modem_state();
        self.scheduler.reconfigure(None, modem_state).await;
        self.state = LifecycleState::Enabled;
        Ok(())
    }

    /// Stops refreshing and clears every value. Always succeeds.
    pub async fn disable(&mut self) -> Result<()> {
        if self.state == LifecycleState::ShutDown {
            return Ok(());
        }
        self.scheduler.disable().await;
        if self.state == LifecycleState::Enabled {
            self.state = LifecycleState::Disabled;
        }
        Ok(())
    }

    /// Disables refreshing, removes the interface and drops the object.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.state == LifecycleState::ShutDown {
            return Ok(());
        }

        self.scheduler.shutdown().await;
        if self.exported {
            if let Err(e) = self.exporter.unexport().await {
                warn!("Couldn't unexport extended signal interface: {e}");
            }
            self.exported = false;
        }
        self.state = LifecycleState::ShutDown;
        debug!("Extended signal interface shut down");
        Ok(())
    }

    /// Handles a `Setup(rate)` request: authorize, then apply.
    ///
    /// An authorization failure is returned unchanged and leaves every state
    /// untouched.
    pub async fn handle_setup_request(&mut self, rate: u32, requester: Requester) -> Result<()> {
        self.authorize_setup(requester).await?;
        self.apply_setup(rate).await
    }

    /// Starts the authorization check for a `Setup` request.
    ///
    /// The returned future does not borrow the controller, so a caller can
    /// keep serving other events while it is pending.
    pub(crate) fn authorize_setup(&self, requester: Requester) -> BoxFuture<'static, Result<()>> {
        let authorizer = self.authorizer.clone();
        async move {
            authorizer
                .authorize(&requester, AuthorizationKind::DeviceControl)
                .await
        }
        .boxed()
    }

    /// Applies an authorized `Setup` request.
    pub(crate) async fn apply_setup(&mut self, rate: u32) -> Result<()> {
        if self.scheduler.skeleton().is_none() {
            return Err(ModemError::Failed(NO_SKELETON.into()));
        }
        let modem_state: ModemState = self.modem.modem_state();
        debug!("Setting up extended signal refresh rate: {rate} (modem {modem_state})");
        self.scheduler.reconfigure(Some(rate), modem_state).await;
        Ok(())
    }

    pub(crate) async fn next_refresh_event(&mut self) -> RefreshEvent {
        self.scheduler.next_event().await
    }

    pub(crate) async fn handle_refresh_event(&mut self, event: RefreshEvent) {
        self.scheduler.handle_event(event).await;
    }
}
