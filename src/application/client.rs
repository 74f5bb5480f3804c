use crate::domain::config::ClientOptions;
use crate::domain::credential::Credential;
use crate::domain::ports::{ClientSdkLoader, RuntimeConfigRef};
use crate::error::LoaderError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// Snapshot of the process-wide client state.
pub struct LoadState<H> {
    handle: Option<H>,
    episode: Option<watch::Receiver<Outcome<H>>>,
}

impl<H: Clone> LoadState<H> {
    /// The cached handle, if a non-manual load has succeeded.
    pub fn handle(&self) -> Option<H> {
        self.handle.clone()
    }

    /// `true` strictly while a load episode is in flight.
    pub fn is_loading(&self) -> bool {
        self.episode.is_some()
    }
}

/// Result of one load episode, broadcast to every caller that joined it.
enum Outcome<H> {
    Pending,
    Settled(Option<H>),
}

impl<H: Clone> Outcome<H> {
    fn is_settled(&self) -> bool {
        matches!(self, Outcome::Settled(_))
    }

    fn handle(&self) -> Option<H> {
        match self {
            Outcome::Pending => None,
            Outcome::Settled(handle) => handle.clone(),
        }
    }
}

enum Step<H> {
    Cached(H),
    MissingKey,
    Join(watch::Receiver<Outcome<H>>),
    Lead(watch::Sender<Outcome<H>>, Credential),
}

struct Shared<L: ClientSdkLoader> {
    loader: L,
    config: RuntimeConfigRef,
    state: watch::Sender<LoadState<L::Handle>>,
}

/// Coordinated access to the client-side SDK handle.
///
/// One instance is created per process; clones share the same state, so any
/// number of consumers can call [`load`](Self::load) and at most one call to the
/// underlying loader is ever in flight.
pub struct ClientStripeLoader<L: ClientSdkLoader> {
    shared: Arc<Shared<L>>,
}

impl<L: ClientSdkLoader> Clone for ClientStripeLoader<L> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<L: ClientSdkLoader> ClientStripeLoader<L> {
    /// Creates the shared loader state.
    ///
    /// # Arguments
    ///
    /// * `loader` - The external SDK loader.
    /// * `config` - Provider of the public configuration, read on every load attempt.
    pub fn new(loader: L, config: RuntimeConfigRef) -> Self {
        let (state, _) = watch::channel(LoadState {
            handle: None,
            episode: None,
        });
        Self {
            shared: Arc::new(Shared {
                loader,
                config,
                state,
            }),
        }
    }

    pub fn loader(&self) -> &L {
        &self.shared.loader
    }

    /// The cached handle, if any.
    pub fn handle(&self) -> Option<L::Handle> {
        self.shared.state.borrow().handle()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().is_loading()
    }

    /// Change notification for consumers that react to the handle becoming
    /// available or the loading flag flipping.
    pub fn subscribe(&self) -> watch::Receiver<LoadState<L::Handle>> {
        self.shared.state.subscribe()
    }

    /// Loads the SDK with the configured key and options.
    pub async fn load(&self) -> Option<L::Handle> {
        self.load_with(None, None).await
    }

    /// Loads the SDK, overriding the configured key and/or options.
    ///
    /// Never fails: a missing key, a loader error or a timeout are reported
    /// through `tracing` and yield `None`.
    pub async fn load_with(
        &self,
        key: Option<&Credential>,
        options: Option<&ClientOptions>,
    ) -> Option<L::Handle> {
        let config = self.shared.config.client();
        let manual = config.manual_client_load;
        let key = key
            .or(config.key.as_ref())
            .filter(|key| !key.is_empty())
            .cloned();
        let options = options.or(config.options.as_ref()).cloned();

        match self.begin(manual, key) {
            Step::Cached(handle) => {
                debug!("Returning cached Stripe client");
                Some(handle)
            }
            Step::MissingKey => {
                warn!("{}", LoaderError::MissingCredential("publishable"));
                None
            }
            Step::Join(episode) => self.join(episode, config.load_timeout()).await,
            Step::Lead(outcome, key) => {
                let episode = Episode {
                    state: &self.shared.state,
                    outcome: Some(outcome),
                };
                self.lead(episode, &key, options.as_ref(), manual, config.load_timeout())
                    .await
            }
        }
    }

    /// Activation hook: loads the SDK automatically unless manual-load mode is on,
    /// a handle is already cached or a load is in flight.
    pub async fn on_mounted(&self) {
        if self.shared.config.client().manual_client_load {
            return;
        }
        let idle = {
            let state = self.shared.state.borrow();
            state.handle.is_none() && state.episode.is_none()
        };
        if idle {
            self.load().await;
        }
    }

    /// Decides what this call does, atomically with respect to other callers.
    fn begin(&self, manual: bool, key: Option<Credential>) -> Step<L::Handle> {
        let mut step = Step::MissingKey;
        self.shared.state.send_if_modified(|state| {
            if !manual && let Some(handle) = &state.handle {
                step = Step::Cached(handle.clone());
                return false;
            }
            let Some(key) = key else {
                return false;
            };
            if let Some(episode) = &state.episode {
                step = Step::Join(episode.clone());
                return false;
            }
            let (outcome, episode) = watch::channel(Outcome::Pending);
            state.episode = Some(episode);
            step = Step::Lead(outcome, key);
            true
        });
        step
    }

    async fn lead(
        &self,
        episode: Episode<'_, L::Handle>,
        key: &Credential,
        options: Option<&ClientOptions>,
        manual: bool,
        timeout: Option<Duration>,
    ) -> Option<L::Handle> {
        debug!(manual, "Loading Stripe client");
        let attempt = async {
            self.shared
                .loader
                .load(key, options)
                .await
                .map_err(LoaderError::ExternalLoad)
        };
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .unwrap_or(Err(LoaderError::LoadTimeout(limit))),
            None => attempt.await,
        };

        match result {
            Ok(handle) => {
                episode.settle(handle.clone(), !manual);
                handle
            }
            Err(error) => {
                error!(%error, "Failed to load Stripe client");
                episode.settle(None, false);
                None
            }
        }
    }

    async fn join(
        &self,
        mut episode: watch::Receiver<Outcome<L::Handle>>,
        timeout: Option<Duration>,
    ) -> Option<L::Handle> {
        debug!("Waiting for in-flight Stripe client load");
        let settled = async {
            match episode.wait_for(Outcome::is_settled).await.map(|o| o.handle()) {
                Ok(handle) => handle,
                // The leader was dropped before settling.
                Err(_) => self.handle(),
            }
        };
        match timeout {
            None => settled.await,
            Some(limit) => match tokio::time::timeout(limit, settled).await {
                Ok(handle) => handle,
                Err(_) => {
                    let error = LoaderError::LoadTimeout(limit);
                    error!(%error, "Failed to load Stripe client");
                    None
                }
            },
        }
    }
}

/// Leadership of one load episode. Dropping it unsettled clears the loading flag
/// and closes the episode so waiters are released.
struct Episode<'a, H> {
    state: &'a watch::Sender<LoadState<H>>,
    outcome: Option<watch::Sender<Outcome<H>>>,
}

impl<H: Clone> Episode<'_, H> {
    fn settle(mut self, handle: Option<H>, cache: bool) {
        self.state.send_modify(|state| {
            state.episode = None;
            if cache {
                state.handle = handle.clone();
            }
        });
        if let Some(outcome) = self.outcome.take() {
            outcome.send_replace(Outcome::Settled(handle));
        }
    }
}

impl<H> Drop for Episode<'_, H> {
    fn drop(&mut self) {
        if self.outcome.take().is_some() {
            warn!("Stripe client load abandoned before settling");
            self.state.send_modify(|state| state.episode = None);
        }
    }
}
