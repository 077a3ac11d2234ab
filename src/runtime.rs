//! `RewardAds`: the registry, the event broadcaster and the engine factory
//! behind one handle. Every dispatcher command lands on one of the methods
//! here; they can also be called directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::broadcast::{EventBroadcaster, EventReceiver, EventSink};
use crate::config::{ReinitPolicy, RewardAdsConfig};
use crate::engine::{AdEngineFactory, LoadRequest};
use crate::error::AdError;
use crate::instance::{AdId, AdInstance, InstanceHandle, LifecycleState, Reward};
use crate::method::Method;
use crate::registry::InstanceRegistry;

/// Reward ad runtime.
///
/// Lifetime is explicit: create one at service start, call
/// [`RewardAds::shutdown`] when done.
///
/// ## Example
///
/// ```
/// use reward_ads::{InMemoryEngineFactory, LoadRequest, RewardAds};
///
/// let factory = InMemoryEngineFactory::new();
/// let ads = RewardAds::new(factory.clone());
///
/// ads.init(1).unwrap();
/// let events = ads.subscribe(1).unwrap();
/// ads.load(1, LoadRequest::new("testx9dtjwj8hp", Default::default())).unwrap();
///
/// factory.engine(1).unwrap().fire_loaded();
/// assert!(ads.is_loaded(1).unwrap());
/// assert_eq!(events.try_recv().unwrap().name(), "loaded");
/// ```
pub struct RewardAds {
    config: RewardAdsConfig,
    registry: InstanceRegistry,
    events: Arc<EventBroadcaster>,
    factory: Box<dyn AdEngineFactory>,
    generations: AtomicU64,
    // Held across registry insert and channel open so both agree on the
    // live generation for an id.
    inits: Mutex<()>,
}

fn lock(handle: &InstanceHandle) -> Result<MutexGuard<'_, AdInstance>, AdError> {
    handle
        .lock()
        .map_err(|_| AdError::LockPoisoned("ad instance"))
}

impl RewardAds {
    pub fn new<F>(factory: F) -> Self
    where
        F: AdEngineFactory + 'static,
    {
        Self::with_config(factory, RewardAdsConfig::default())
    }

    pub fn with_config<F>(factory: F, config: RewardAdsConfig) -> Self
    where
        F: AdEngineFactory + 'static,
    {
        Self {
            events: Arc::new(EventBroadcaster::new(config.event_buffer)),
            config,
            registry: InstanceRegistry::new(),
            factory: Box::new(factory),
            generations: AtomicU64::new(1),
            inits: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RewardAdsConfig {
        &self.config
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Run `f` on the live instance for `id` under its lock.
    fn with_instance<T>(
        &self,
        id: AdId,
        method: Method,
        f: impl FnOnce(&mut AdInstance) -> Result<T, AdError>,
    ) -> Result<T, AdError> {
        let handle = self.registry.require(id, method)?;
        let mut instance = lock(&handle)?;
        f(&mut instance)
    }

    /// Create the ad instance for `id` and open its event channel.
    ///
    /// Under [`ReinitPolicy::Replace`] a live instance already registered
    /// for `id` is destroyed first; under [`ReinitPolicy::Reject`] the call
    /// fails with `DuplicateId`.
    pub fn init(&self, id: AdId) -> Result<(), AdError> {
        let _init = self
            .inits
            .lock()
            .map_err(|_| AdError::LockPoisoned("init"))?;
        if self.config.reinit_policy == ReinitPolicy::Reject && self.registry.get(id)?.is_some() {
            return Err(AdError::DuplicateId { id });
        }

        let engine = self
            .factory
            .create(id)
            .map_err(|e| AdError::EngineUnavailable {
                id,
                reason: e.0,
            })?;
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let handle = AdInstance::create(id, generation, engine, Arc::clone(&self.events));

        // Nothing can reach the new instance before its channel is open.
        let guard = lock(&handle)?;
        let previous = match self.config.reinit_policy {
            ReinitPolicy::Replace => self.registry.create(id, Arc::clone(&handle))?,
            ReinitPolicy::Reject => {
                self.registry.create_unique(id, Arc::clone(&handle))?;
                None
            }
        };
        self.events.open(id, generation)?;
        drop(guard);

        if let Some(previous) = previous {
            let mut previous = lock(&previous)?;
            if !previous.is_destroyed() {
                previous.destroy()?;
                info!(ad_id = id, "previous instance destroyed on re-init");
            }
        }

        info!(ad_id = id, generation, "reward ad initialized");
        Ok(())
    }

    /// Start loading the ad for `id`.
    ///
    /// Returns as soon as the engine has been asked; the outcome arrives as
    /// a `loaded` or `load_failed` event. A load while one is in flight or
    /// after success is accepted without a second engine load.
    pub fn load(&self, id: AdId, request: LoadRequest) -> Result<(), AdError> {
        self.with_instance(id, Method::Load, |ad| ad.load(request))
            .map(|_started| ())
    }

    pub fn show(&self, id: AdId) -> Result<(), AdError> {
        self.with_instance(id, Method::Show, |ad| ad.show())
    }

    /// The last reward granted to `id`, or `NoReward`.
    pub fn reward(&self, id: AdId) -> Result<Reward, AdError> {
        self.with_instance(id, Method::GetReward, |ad| ad.reward())
    }

    pub fn is_loaded(&self, id: AdId) -> Result<bool, AdError> {
        self.with_instance(id, Method::IsAdLoaded, |ad| ad.is_loaded())
    }

    pub fn pause(&self, id: AdId) -> Result<(), AdError> {
        self.with_instance(id, Method::Pause, |ad| ad.pause())
            .map(|_| ())
    }

    pub fn resume(&self, id: AdId) -> Result<(), AdError> {
        self.with_instance(id, Method::Resume, |ad| ad.resume())
            .map(|_| ())
    }

    pub fn state(&self, id: AdId) -> Result<LifecycleState, AdError> {
        let handle = self
            .registry
            .get(id)?
            .ok_or(AdError::NotFound { id, method: "state" })?;
        let instance = lock(&handle)?;
        Ok(instance.state())
    }

    /// Destroy the ad for `id`: release the engine, detach the event
    /// channel and drop the registry entry. A second destroy is `NotFound`.
    pub fn destroy(&self, id: AdId) -> Result<(), AdError> {
        let handle = self.registry.require(id, Method::Destroy)?;
        {
            let mut instance = lock(&handle)?;
            instance.destroy()?;
            // Detached under the instance lock: a callback racing this destroy
            // either emitted already or will find the instance destroyed.
            self.events.detach_generation(id, instance.generation())?;
        }
        self.registry.remove_if(id, &handle)?;
        info!(ad_id = id, "reward ad destroyed");
        Ok(())
    }

    /// Receive `id`'s events. See [`EventBroadcaster::subscribe`].
    pub fn subscribe(&self, id: AdId) -> Result<EventReceiver, AdError> {
        self.events.subscribe(id)
    }

    /// Push `id`'s events into `sink` instead of a queue.
    ///
    /// The sink runs on its own thread and may call back into this runtime,
    /// for example to read the reward when a `rewarded` event arrives.
    pub fn attach<S>(&self, id: AdId, sink: S) -> Result<(), AdError>
    where
        S: EventSink + 'static,
    {
        self.events.attach(id, sink)
    }

    /// Stop delivering `id`'s events without destroying the ad. A later
    /// `attach` or `subscribe` resumes delivery.
    pub fn detach(&self, id: AdId) -> Result<bool, AdError> {
        self.events.detach(id)
    }

    /// Destroy every live ad and close every event channel.
    pub fn shutdown(&self) -> Result<(), AdError> {
        let _init = self
            .inits
            .lock()
            .map_err(|_| AdError::LockPoisoned("init"))?;
        let instances = self.registry.clear()?;
        let count = instances.len();
        for (id, handle) in instances {
            match lock(&handle) {
                Ok(mut instance) if !instance.is_destroyed() => {
                    instance.destroy()?;
                }
                Ok(_) => {}
                Err(e) => warn!(ad_id = id, error = %e, "skipping poisoned instance"),
            }
        }
        self.events.clear()?;
        debug!(count, "reward ads shut down");
        Ok(())
    }
}
