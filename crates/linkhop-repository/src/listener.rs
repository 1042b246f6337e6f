use linkhop_core::{InvalidationMessage, InvalidationSource, ShortCode, StoreError, Subscription};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};
use typed_builder::TypedBuilder;

/// Connection state of an [`InvalidationListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Disconnected,
    Connecting,
    Subscribed,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct ListenerSettings {
    /// Pause after a failed connect or a dropped subscription.
    #[builder(default = Duration::from_secs(1))]
    pub backoff: Duration,

    /// A subscription silent for this long gets pinged.
    #[builder(default = Duration::from_secs(30))]
    pub health_check_interval: Duration,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Long-lived subscriber that evicts locally cached codes deleted by any
/// instance.
///
/// The listener never gives up: every failure, whether connecting,
/// receiving or answering a health probe, sends it back to
/// [`ListenerState::Disconnected`] after a fixed backoff. Only
/// [`ListenerHandle::shutdown`] stops it.
pub struct InvalidationListener<F> {
    source: Arc<dyn InvalidationSource>,
    on_delete: F,
    settings: ListenerSettings,
    state: watch::Sender<ListenerState>,
}

/// Owner-side handle of a spawned listener task.
#[derive(Debug)]
pub struct ListenerHandle {
    task: JoinHandle<()>,
    state: watch::Receiver<ListenerState>,
}

impl ListenerHandle {
    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes every state transition.
    pub fn watch(&self) -> watch::Receiver<ListenerState> {
        self.state.clone()
    }

    pub async fn shutdown(self) {
        self.task.abort();
        // The only possible error here is the cancellation we just asked for.
        let _ = self.task.await;
        debug!("invalidation listener stopped");
    }
}

impl<F> InvalidationListener<F>
where
    F: Fn(ShortCode) + Send + Sync + 'static,
{
    /// `on_delete` is called, on the listener task, for every delete
    /// notification received.
    pub fn new(source: Arc<dyn InvalidationSource>, on_delete: F, settings: ListenerSettings) -> Self {
        let (state, _) = watch::channel(ListenerState::Disconnected);
        Self {
            source,
            on_delete,
            settings,
            state,
        }
    }

    pub fn spawn(self) -> ListenerHandle {
        let state = self.state.subscribe();
        let task = tokio::spawn(self.run());
        ListenerHandle { task, state }
    }

    async fn run(self) {
        let mut state = ListenerState::Disconnected;
        let mut subscription = None;

        loop {
            self.state.send_replace(state);
            state = self.step(state, &mut subscription).await;
        }
    }

    async fn step(
        &self,
        state: ListenerState,
        subscription: &mut Option<Box<dyn Subscription>>,
    ) -> ListenerState {
        match state {
            ListenerState::Disconnected => ListenerState::Connecting,
            ListenerState::Connecting => match self.source.connect().await {
                Ok(connected) => {
                    info!("invalidation listener subscribed");
                    *subscription = Some(connected);
                    ListenerState::Subscribed
                }
                Err(e) => {
                    warn!(error = %e, backoff = ?self.settings.backoff, "invalidation subscribe failed, retrying");
                    tokio::time::sleep(self.settings.backoff).await;
                    ListenerState::Disconnected
                }
            },
            ListenerState::Subscribed => {
                let Some(active) = subscription.as_mut() else {
                    return ListenerState::Disconnected;
                };

                match self.receive(active.as_mut()).await {
                    Ok(()) => ListenerState::Subscribed,
                    Err(e) => {
                        error!(error = %e, backoff = ?self.settings.backoff, "invalidation subscription lost, reconnecting");
                        *subscription = None;
                        tokio::time::sleep(self.settings.backoff).await;
                        ListenerState::Disconnected
                    }
                }
            }
        }
    }

    /// Waits for one message, or probes the connection if none arrives
    /// within the health check interval.
    async fn receive(&self, subscription: &mut dyn Subscription) -> Result<(), StoreError> {
        let interval = self.settings.health_check_interval;
        match tokio::time::timeout(interval, subscription.next_message()).await {
            Ok(Ok(raw)) => {
                self.dispatch(&raw);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                trace!("invalidation channel idle, sending health check");
                subscription.ping().await
            }
        }
    }

    fn dispatch(&self, raw: &str) {
        match InvalidationMessage::parse(raw) {
            InvalidationMessage::Delete(code) => {
                trace!(code = %code, "received delete message");
                (self.on_delete)(code);
            }
            InvalidationMessage::Unknown { kind, payload } => {
                warn!(kind = %kind, payload = %payload, "ignoring unknown invalidation message");
            }
        }
    }
}
