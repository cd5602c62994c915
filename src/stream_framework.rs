//! # Stream Framework
//!
//! Hot, replaying publish/subscribe channels and the combined-latest join used
//! by every catalog stream.
//!
//! A [`Replay`] is the producing side. It is owned by a service task and shared
//! with the clients that hand out [`Subscription`]s. Subscribers always observe
//! the latest value; intermediate values may be skipped when a subscriber is
//! slower than its producer. A stream ends with either completion or a failure,
//! and a failure is replayed to every subscriber, including late ones.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

use crate::error::CatalogError;

// =============================================================================
// 1. THE SHARED STATE
// =============================================================================

#[derive(Debug, Clone)]
enum Terminal {
    Completed,
    Failed(CatalogError),
}

#[derive(Debug, Clone)]
struct Snapshot<T> {
    seq: u64,
    value: Option<T>,
    terminal: Option<Terminal>,
}

struct Shared<T> {
    tx: watch::Sender<Snapshot<T>>,
    demanded: AtomicBool,
    demand: Notify,
}

// =============================================================================
// 2. THE PRODUCER SIDE
// =============================================================================

/// A hot stream that replays its latest value to late subscribers.
pub struct Replay<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Replay<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Replay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Replay<T> {
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot {
            seq: 0,
            value: None,
            terminal: None,
        })
    }

    /// A stream that starts with `value`, like a cell with an initial state.
    pub fn with_value(value: T) -> Self {
        Self::from_snapshot(Snapshot {
            seq: 1,
            value: Some(value),
            terminal: None,
        })
    }

    fn from_snapshot(snapshot: Snapshot<T>) -> Self {
        let (tx, _rx) = watch::channel(snapshot);
        Self {
            shared: Arc::new(Shared {
                tx,
                demanded: AtomicBool::new(false),
                demand: Notify::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        if !self.shared.demanded.swap(true, Ordering::AcqRel) {
            self.shared.demand.notify_one();
        }
        Subscription {
            rx: self.shared.tx.subscribe(),
            seen: 0,
            done: false,
        }
    }

    /// Resolves once the stream has had at least one subscriber.
    ///
    /// Producers await this before doing any work, which keeps streams lazy.
    /// Only one task per stream may wait on it.
    pub async fn demanded(&self) {
        if self.shared.demanded.load(Ordering::Acquire) {
            return;
        }
        self.shared.demand.notified().await;
    }

    /// Publishes a value. Returns `false` if the stream has already ended.
    pub fn publish(&self, value: T) -> bool {
        self.shared.tx.send_if_modified(|snapshot| {
            if snapshot.terminal.is_some() {
                return false;
            }
            snapshot.seq += 1;
            snapshot.value = Some(value);
            true
        })
    }

    /// Ends the stream with an error. The last value is discarded so that
    /// subscribers see the failure and nothing else.
    pub fn fail(&self, error: CatalogError) -> bool {
        self.shared.tx.send_if_modified(|snapshot| {
            if snapshot.terminal.is_some() {
                return false;
            }
            snapshot.value = None;
            snapshot.terminal = Some(Terminal::Failed(error));
            true
        })
    }

    /// Ends the stream. A value not yet observed is still delivered first.
    pub fn complete(&self) -> bool {
        self.shared.tx.send_if_modified(|snapshot| {
            if snapshot.terminal.is_some() {
                return false;
            }
            snapshot.terminal = Some(Terminal::Completed);
            true
        })
    }

    pub fn latest(&self) -> Option<T> {
        self.shared.tx.borrow().value.clone()
    }

    pub fn is_ended(&self) -> bool {
        self.shared.tx.borrow().terminal.is_some()
    }
}

// =============================================================================
// 3. THE CONSUMER SIDE
// =============================================================================

/// A subscriber's view of a [`Replay`].
pub struct Subscription<T> {
    rx: watch::Receiver<Snapshot<T>>,
    seen: u64,
    done: bool,
}

impl<T: Clone> Subscription<T> {
    /// Waits for the next value.
    ///
    /// Returns `Some(Err(_))` once if the stream failed, and `None` after the
    /// stream has ended. Cancel safe.
    pub async fn next(&mut self) -> Option<Result<T, CatalogError>> {
        loop {
            if self.done {
                return None;
            }
            {
                let snapshot = self.rx.borrow_and_update();
                if snapshot.seq > self.seen {
                    if let Some(value) = &snapshot.value {
                        self.seen = snapshot.seq;
                        return Some(Ok(value.clone()));
                    }
                }
                match &snapshot.terminal {
                    Some(Terminal::Failed(error)) => {
                        self.done = true;
                        return Some(Err(error.clone()));
                    }
                    Some(Terminal::Completed) => {
                        self.done = true;
                        return None;
                    }
                    None => {}
                }
            }
            if self.rx.changed().await.is_err() {
                self.done = true;
                return None;
            }
        }
    }
}

/// Polls an optional subscription; an absent one never yields.
pub async fn next_from<T: Clone>(
    subscription: &mut Option<Subscription<T>>,
) -> Option<Result<T, CatalogError>> {
    match subscription.as_mut() {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// 4. COMBINED-LATEST JOIN
// =============================================================================

/// Last known value of each side of a join.
#[derive(Debug)]
pub struct LatestPair<A, B> {
    left: Option<A>,
    right: Option<B>,
}

impl<A, B> Default for LatestPair<A, B> {
    fn default() -> Self {
        Self {
            left: None,
            right: None,
        }
    }
}

impl<A, B> LatestPair<A, B> {
    pub fn set_left(&mut self, value: A) {
        self.left = Some(value);
    }

    pub fn set_right(&mut self, value: B) {
        self.right = Some(value);
    }

    /// Both sides, once each has been set at least once.
    pub fn both(&self) -> Option<(&A, &B)> {
        Some((self.left.as_ref()?, self.right.as_ref()?))
    }
}

/// Publishes `project(left, right)` into `output` whenever either input emits,
/// once both have emitted.
///
/// Completes `output` when both inputs have ended, or as soon as one ends
/// without ever emitting. An input failure or a projection failure is returned
/// without touching `output`, so the caller decides how the failure surfaces.
pub async fn combine_latest<A, B, O, F>(
    mut left: Subscription<A>,
    mut right: Subscription<B>,
    output: &Replay<O>,
    mut project: F,
) -> Result<(), CatalogError>
where
    A: Clone,
    B: Clone,
    O: Clone + Send + Sync + 'static,
    F: FnMut(&A, &B) -> Result<O, CatalogError>,
{
    let mut state = LatestPair::default();
    let mut left_open = true;
    let mut right_open = true;

    loop {
        tokio::select! {
            item = left.next(), if left_open => match item {
                Some(Ok(value)) => state.set_left(value),
                Some(Err(e)) => return Err(e),
                None => {
                    left_open = false;
                    if state.left.is_none() || !right_open {
                        output.complete();
                        return Ok(());
                    }
                    continue;
                }
            },
            item = right.next(), if right_open => match item {
                Some(Ok(value)) => state.set_right(value),
                Some(Err(e)) => return Err(e),
                None => {
                    right_open = false;
                    if state.right.is_none() || !left_open {
                        output.complete();
                        return Ok(());
                    }
                    continue;
                }
            },
        }

        if let Some((a, b)) = state.both() {
            output.publish(project(a, b)?);
        }
    }
}

/// Runs `work` once `output` is subscribed, failing `output` if it errors.
pub async fn when_demanded<O, Fut>(output: Replay<O>, work: impl FnOnce(Replay<O>) -> Fut)
where
    O: Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CatalogError>>,
{
    output.demanded().await;
    if let Err(e) = work(output.clone()).await {
        output.fail(e);
    }
}
