//! Periodic refresh of extended signal values.
//!
//! The scheduler owns everything that changes while reporting is active: the
//! stored rate, the refresh timer, the published snapshot and the queries
//! still in flight. It is driven from a single task; nothing in here is
//! shared.
//!
//! Queries cannot be cancelled once issued. Instead every query carries the
//! generation it was started in, and tearing the context down bumps the
//! generation so late results are dropped on arrival.

use futures::future::{self, BoxFuture};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt, select};
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::Result;
use crate::api::hooks::{SignalSkeleton, SignalSource};
use crate::api::models::{ModemState, SignalValues};
use crate::core::snapshot::SnapshotStore;

/// Identity of one refresh timer.
///
/// Every time the rate changes the old timer is dropped and a new one with a
/// fresh id takes its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl Display for TimerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

struct RefreshTimer {
    id: TimerId,
    period: Duration,
    interval: Interval,
}

impl RefreshTimer {
    fn start(id: TimerId, rate: u32) -> Self {
        let period = Duration::from_secs(u64::from(rate));
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            id,
            period,
            interval,
        }
    }
}

/// Present only while reporting is active at a non-zero rate.
struct RefreshContext {
    rate: u32,
    timer: RefreshTimer,
}

type LoadResult = (u64, Result<SignalValues>);

/// Something the scheduler has to react to.
pub(crate) enum RefreshEvent {
    TimerFired(TimerId),
    ValuesLoaded {
        generation: u64,
        result: Result<SignalValues>,
    },
}

pub(crate) struct RefreshScheduler {
    rate: u32,
    context: Option<RefreshContext>,
    store: SnapshotStore,
    source: Option<Arc<dyn SignalSource>>,
    skeleton: Option<Arc<dyn SignalSkeleton>>,
    in_flight: FuturesUnordered<BoxFuture<'static, LoadResult>>,
    generation: u64,
    next_timer: u64,
    queries_started: u64,
}

impl RefreshScheduler {
    pub(crate) fn new(initial_rate: u32, source: Option<Arc<dyn SignalSource>>) -> Self {
        Self {
            rate: initial_rate,
            context: None,
            store: SnapshotStore::new(),
            source,
            skeleton: None,
            in_flight: FuturesUnordered::new(),
            generation: 0,
            next_timer: 0,
            queries_started: 0,
        }
    }

    /// Stored rate in seconds, `0` meaning disabled.
    pub(crate) fn rate(&self) -> u32 {
        self.rate
    }

    pub(crate) fn is_supported(&self) -> bool {
        self.source.is_some()
    }

    pub(crate) fn timer_id(&self) -> Option<TimerId> {
        self.context.as_ref().map(|ctx| ctx.timer.id)
    }

    pub(crate) fn timer_period(&self) -> Option<Duration> {
        self.context.as_ref().map(|ctx| ctx.timer.period)
    }

    pub(crate) fn values(&self) -> &SignalValues {
        self.store.values()
    }

    pub(crate) fn queries_started(&self) -> u64 {
        self.queries_started
    }

    pub(crate) fn skeleton(&self) -> Option<&Arc<dyn SignalSkeleton>> {
        self.skeleton.as_ref()
    }

    pub(crate) fn attach(&mut self, skeleton: Arc<dyn SignalSkeleton>) {
        self.skeleton = Some(skeleton);
    }

    /// Applies a rate change and/or a modem state change.
    ///
    /// With `explicit_rate` the stored rate is replaced and mirrored to the
    /// skeleton first; without it the stored rate is reused.
    pub(crate) async fn reconfigure(&mut self, explicit_rate: Option<u32>, state: ModemState) {
        let rate = match explicit_rate {
            Some(rate) => {
                self.rate = rate;
                self.publish_rate().await;
                rate
            }
            None => self.rate,
        };

        if rate == 0 {
            if self.context.is_some() {
                debug!("Extended signal information reporting disabled (rate 0)");
            }
            self.teardown().await;
            return;
        }

        if !state.is_enabling_or_later() {
            debug!("Extended signal refresh deferred until the modem is enabled (state: {state})");
            return;
        }

        if self.source.is_none() {
            debug!("Extended signal information not supported, ignoring rate {rate}");
            return;
        }

        if self.context.as_ref().is_some_and(|ctx| ctx.rate == rate) {
            return;
        }

        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        // Replacing the context drops the previous timer.
        self.context = Some(RefreshContext {
            rate,
            timer: RefreshTimer::start(id, rate),
        });
        debug!("Extended signal information reporting enabled (rate: {rate} seconds, {id})");

        self.launch_query();
    }

    pub(crate) async fn disable(&mut self) {
        debug!("Extended signal information reporting disabled");
        self.teardown().await;
    }

    /// Disables reporting and releases the skeleton, returning it so the
    /// caller can unexport it.
    pub(crate) async fn shutdown(&mut self) -> Option<Arc<dyn SignalSkeleton>> {
        self.disable().await;
        self.skeleton.take()
    }

    /// Waits for the next timer tick or query completion.
    ///
    /// Cancel safe: dropping the returned future loses nothing.
    pub(crate) async fn next_event(&mut self) -> RefreshEvent {
        let timer = self.context.as_mut().map(|ctx| &mut ctx.timer);
        let tick = async move {
            match timer {
                Some(timer) => {
                    timer.interval.tick().await;
                    timer.id
                }
                None => future::pending().await,
            }
        };
        let in_flight = &mut self.in_flight;

        select! {
            id = tick.fuse() => RefreshEvent::TimerFired(id),
            (generation, result) = in_flight.select_next_some() => {
                RefreshEvent::ValuesLoaded { generation, result }
            }
        }
    }

    pub(crate) async fn handle_event(&mut self, event: RefreshEvent) {
        match event {
            RefreshEvent::TimerFired(id) => self.on_timer_fired(id),
            RefreshEvent::ValuesLoaded { generation, result } => {
                self.on_values_loaded(generation, result).await
            }
        }
    }

    fn on_timer_fired(&mut self, id: TimerId) {
        if self.timer_id() != Some(id) {
            debug!("Ignoring tick from replaced {id}");
            return;
        }
        self.launch_query();
    }

    async fn on_values_loaded(&mut self, generation: u64, result: Result<SignalValues>) {
        if generation != self.generation {
            debug!("Discarding extended signal values loaded before reporting was disabled");
            return;
        }

        match result {
            Ok(values) => match &self.skeleton {
                Some(skeleton) => {
                    self.store.update(values);
                    if let Err(e) = skeleton.publish(self.store.values()).await {
                        warn!("Couldn't publish extended signal information: {e}");
                    }
                }
                None => {
                    warn!("Cannot update extended signal information: interface not available");
                    self.store.clear();
                }
            },
            Err(e) => {
                warn!("Couldn't load extended signal information: {e}");
                self.clear_values().await;
            }
        }
    }

    fn launch_query(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        let generation = self.generation;
        self.queries_started += 1;
        self.in_flight
            .push(async move { (generation, source.load_values().await) }.boxed());
    }

    /// Resets every technology to unavailable and publishes the result.
    pub(crate) async fn clear_values(&mut self) {
        self.store.clear();
        if let Some(skeleton) = &self.skeleton
            && let Err(e) = skeleton.publish(self.store.values()).await
        {
            warn!("Couldn't publish cleared extended signal information: {e}");
        }
    }

    async fn publish_rate(&mut self) {
        if let Some(skeleton) = &self.skeleton
            && let Err(e) = skeleton.set_rate(self.rate).await
        {
            warn!("Couldn't publish extended signal refresh rate: {e}");
        }
    }

    async fn teardown(&mut self) {
        self.context = None;
        self.generation += 1;
        self.clear_values().await;
    }
}
