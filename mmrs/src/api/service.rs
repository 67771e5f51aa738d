//! Per-device event loop for the signal interface.
//!
//! A [`SignalService`] owns one [`SignalController`] and processes, one at a
//! time, lifecycle requests, `Setup` requests and refresh events. Callers talk
//! to it through a cloneable [`SignalHandle`].
//!
//! Authorization checks run concurrently with the loop: while a `Setup`
//! request waits on its check, timer ticks and other requests are still
//! served. The rate change itself is applied back on the loop.
//!
//! # Example
//!
//! ```no_run
//! use mmrs::{Requester, SignalController, SignalHandle, SignalService};
//!
//! # async fn example(controller: SignalController) -> mmrs::Result<()> {
//! let (handle, requests) = SignalHandle::channel(16);
//! tokio::spawn(SignalService::new(controller, requests).run());
//!
//! handle.initialize().await?;
//! handle.enable().await?;
//! handle.setup(5, Requester::new(":1.42")).await?;
//! # Ok(())
//! # }
//! ```

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};

use crate::Result;
use crate::api::models::{ModemError, Requester};
use crate::api::signal::{SignalController, SignalStatus};

type Reply<T> = oneshot::Sender<Result<T>>;

enum Request {
    Initialize(Reply<()>),
    Enable(Reply<()>),
    Disable(Reply<()>),
    Shutdown(Reply<()>),
    Setup {
        rate: u32,
        requester: Requester,
        reply: Reply<()>,
    },
    Status(Reply<SignalStatus>),
}

/// Receiving end of a [`SignalHandle`] channel, consumed by
/// [`SignalService::new`].
pub struct SignalRequests(mpsc::Receiver<Request>);

/// Cloneable handle to a running [`SignalService`].
#[derive(Debug, Clone)]
pub struct SignalHandle {
    tx: mpsc::Sender<Request>,
}

impl SignalHandle {
    /// Creates a handle and the request queue for a service.
    pub fn channel(capacity: usize) -> (Self, SignalRequests) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, SignalRequests(rx))
    }

    pub async fn initialize(&self) -> Result<()> {
        self.request(Request::Initialize).await
    }

    pub async fn enable(&self) -> Result<()> {
        self.request(Request::Enable).await
    }

    pub async fn disable(&self) -> Result<()> {
        self.request(Request::Disable).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.request(Request::Shutdown).await
    }

    /// Requests a new refresh rate in seconds on behalf of `requester`.
    pub async fn setup(&self, rate: u32, requester: Requester) -> Result<()> {
        self.request(|reply| Request::Setup {
            rate,
            requester,
            reply,
        })
        .await
    }

    pub async fn status(&self) -> Result<SignalStatus> {
        self.request(Request::Status).await
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Request) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| service_gone())?;
        response.await.map_err(|_| service_gone())?
    }
}

fn service_gone() -> ModemError {
    ModemError::Failed("signal service is not running".into())
}

type PendingSetup = (u32, Result<()>, Reply<()>);

/// Single-owner event loop for one device.
pub struct SignalService {
    controller: SignalController,
    requests: mpsc::Receiver<Request>,
    pending: FuturesUnordered<BoxFuture<'static, PendingSetup>>,
}

impl SignalService {
    pub fn new(controller: SignalController, requests: SignalRequests) -> Self {
        Self {
            controller,
            requests: requests.0,
            pending: FuturesUnordered::new(),
        }
    }

    /// Runs until every [`SignalHandle`] is dropped, then shuts the
    /// interface down.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.dispatch(request).await,
                    None => break,
                },
                Some((rate, authorized, reply)) = self.pending.next(), if !self.pending.is_empty() => {
                    let result = match authorized {
                        Ok(()) => self.controller.apply_setup(rate).await,
                        Err(e) => {
                            debug!("Setup request rejected: {e}");
                            Err(e)
                        }
                    };
                    let _ = reply.send(result);
                }
                event = self.controller.next_refresh_event() => {
                    self.controller.handle_refresh_event(event).await;
                }
            }
        }

        debug!("All signal handles dropped, stopping service");
        if let Err(e) = self.controller.shutdown().await {
            warn!("Couldn't shut down signal interface: {e}");
        }
    }

    async fn dispatch(&mut self, request: Request) {
        match request {
            Request::Initialize(reply) => {
                let _ = reply.send(self.controller.initialize().await);
            }
            Request::Enable(reply) => {
                let _ = reply.send(self.controller.enable().await);
            }
            Request::Disable(reply) => {
                let _ = reply.send(self.controller.disable().await);
            }
            Request::Shutdown(reply) => {
                let _ = reply.send(self.controller.shutdown().await);
            }
            Request::Setup {
                rate,
                requester,
                reply,
            } => {
                debug!("Setup request from {requester}: rate {rate}");
                let authorization = self.controller.authorize_setup(requester);
                self.pending
                    .push(async move { (rate, authorization.await, reply) }.boxed());
            }
            Request::Status(reply) => {
                let _ = reply.send(Ok(self.controller.status()));
            }
        }
    }
}
