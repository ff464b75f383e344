//! [`Broadcast`] [`Bus`] implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use common::operations::{By, Publish, Subscribe};
use futures::{
    future,
    stream::{self, BoxStream},
    StreamExt as _,
};
use serde::Deserialize;
use smart_default::SmartDefault;
use tokio::sync::broadcast;
use tracerr::Traced;

use super::{Bus, Error};
use crate::event::Event;

/// [`Broadcast`] configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Maximum number of [`Event`]s buffered per topic for slow subscribers.
    ///
    /// Subscribers lagging further behind skip the oldest [`Event`]s.
    #[default(1024)]
    pub capacity: usize,
}

/// Topic senders of a [`Broadcast`], or [`None`] once it's closed.
type Topics = Option<HashMap<&'static str, broadcast::Sender<Arc<str>>>>;

/// In-process [`Bus`] delivering every [`Event`] of a topic to all the
/// subscribers of that topic.
///
/// [`Event`]s are carried as JSON payloads.
#[derive(Clone, Debug)]
pub struct Broadcast {
    /// [`Config`] of this [`Broadcast`].
    config: Config,

    /// Senders of the known topics.
    topics: Arc<Mutex<Topics>>,
}

impl Broadcast {
    /// Creates a new [`Broadcast`] with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            topics: Arc::new(Mutex::new(Some(HashMap::new()))),
        }
    }

    /// Closes this [`Broadcast`].
    ///
    /// All the active subscriptions end, and any further operation fails
    /// with [`Error::Closed`].
    pub fn close(&self) {
        let topics = self
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::debug!(
            topics = topics.map_or(0, |t| t.len()),
            "event bus closed",
        );
    }

    /// Returns the [`broadcast::Sender`] of the provided `topic`, creating it
    /// if it doesn't exist yet.
    fn sender(
        &self,
        topic: &'static str,
    ) -> Result<broadcast::Sender<Arc<str>>, Error> {
        let mut topics =
            self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        let topics = topics.as_mut().ok_or(Error::Closed)?;
        Ok(topics
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.config.capacity.max(1)).0)
            .clone())
    }
}

impl Default for Broadcast {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<E: Event> Bus<Publish<E>> for Broadcast {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Publish(event): Publish<E>,
    ) -> Result<Self::Ok, Self::Err> {
        let payload = serde_json::to_string(&event)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let sender = self.sender(E::TOPIC).map_err(tracerr::wrap!())?;

        // Having no subscribers is not an error.
        let receivers = sender.send(payload.into()).unwrap_or_default();
        tracing::debug!(topic = E::TOPIC, receivers, "event published");

        Ok(())
    }
}

impl<E, F> Bus<Subscribe<By<E, F>>> for Broadcast
where
    E: Event,
    F: FnMut(&E) -> bool + Send + 'static,
{
    type Ok = BoxStream<'static, E>;
    type Err = Traced<Error>;

    /// Subscribes to the [`Event`]s of the `E` topic passing the provided
    /// filter.
    ///
    /// Only [`Event`]s published after the subscription are delivered.
    async fn execute(
        &self,
        Subscribe(by): Subscribe<By<E, F>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut filter = by.into_inner();
        let receiver = self
            .sender(E::TOPIC)
            .map_err(tracerr::wrap!())?
            .subscribe();

        let payloads = stream::unfold(receiver, |mut rx| async move {
            use broadcast::error::RecvError;

            loop {
                match rx.recv().await {
                    Ok(payload) => return Some((payload, rx)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber lagged behind");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(payloads
            .filter_map(move |payload| {
                future::ready(match serde_json::from_str::<E>(&payload) {
                    Ok(ev) => filter(&ev).then_some(ev),
                    Err(e) => {
                        tracing::error!(
                            topic = E::TOPIC,
                            "failed to decode event: {e}",
                        );
                        None
                    }
                })
            })
            .boxed())
    }
}
