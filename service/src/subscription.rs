//! [`Subscription`] definition.

use common::operations::{By, Subscribe};
use tracerr::Traced;

use crate::{
    event::{self, Event},
    infra::{bus, Bus},
    Service,
};

/// [`Subscription`] of the [`Service`].
pub use common::Handler as Subscription;

/// [`Subscription`] to the [`Event`]s on a [`Bus`] topic.
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct EventSubscription<T>(T);

impl<E, F> EventSubscription<By<E, F>> {
    /// Creates a new [`EventSubscription`] to the `E` [`Event`]s passing the
    /// provided `filter`.
    #[must_use]
    pub fn by(filter: F) -> Self {
        Self(By::new(filter))
    }
}

impl<Db, Bs, E, F> Subscription<EventSubscription<By<E, F>>> for Service<Db, Bs>
where
    Bs: Bus<Subscribe<By<E, F>>, Err = Traced<bus::Error>>,
    E: Event,
{
    type Ok = Bs::Ok;
    type Err = Traced<bus::Error>;

    async fn execute(
        &self,
        EventSubscription(by): EventSubscription<By<E, F>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.bus()
            .execute(Subscribe(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Subscribes to [`event::CommentAdded`]s passing the filter `F`.
pub type CommentAdded<F> = EventSubscription<By<event::CommentAdded, F>>;
