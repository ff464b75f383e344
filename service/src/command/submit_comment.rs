//! [`Command`] for commenting an [`Entry`].

use common::operations::{By, Insert, Publish, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{comment, repository, user, Comment, Entry},
    event::CommentAdded,
    infra::{bus, database, Bus, Database},
    Service,
};

use super::Command;

/// [`Command`] for commenting an [`Entry`].
///
/// Publishes a [`CommentAdded`] event once the [`Comment`] is stored.
#[derive(Clone, Debug)]
pub struct SubmitComment {
    /// [`repository::FullName`] of the [`Entry`] to comment.
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the author.
    pub posted_by: user::Login,

    /// [`comment::Content`] of the new [`Comment`].
    pub content: comment::Content,
}

impl<Db, Bs> Command<SubmitComment> for Service<Db, Bs>
where
    Db: Database<
            Select<By<Option<Entry>, repository::FullName>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<comment::New>,
            Ok = comment::Id,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Comment>, comment::Id>>,
            Ok = Option<Comment>,
            Err = Traced<database::Error>,
        >,
    Bs: Bus<Publish<CommentAdded>, Ok = (), Err = Traced<bus::Error>>,
{
    type Ok = Comment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SubmitComment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitComment {
            repository_name,
            posted_by,
            content,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Entry>, _>::new(
                    repository_name.clone(),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::EntryNotExists(repository_name.clone()))
                .map_err(tracerr::wrap!())?,
        );

        let id = self
            .database()
            .execute(Insert(comment::New {
                repository_name,
                posted_by,
                content,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let comment = self
            .database()
            .execute(Select(By::<Option<Comment>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CommentNotExists(id))
            .map_err(tracerr::wrap!())?;

        // The comment is already stored, so a failed notification doesn't
        // fail the whole command.
        if let Err(e) =
            self.bus().execute(Publish(CommentAdded(comment.clone()))).await
        {
            tracing::error!(
                comment.id = %comment.id,
                "failed to publish `CommentAdded` event: {e}",
            );
        }

        Ok(comment)
    }
}

/// Error of [`SubmitComment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Entry`] to comment doesn't exist.
    #[display("entry for repository \"{_0}\" not found")]
    #[from(ignore)]
    EntryNotExists(#[error(not(source))] repository::FullName),

    /// [`Comment`] doesn't exist after being created.
    #[display("`Comment(id: {_0})` does not exist")]
    #[from(ignore)]
    CommentNotExists(#[error(not(source))] comment::Id),
}

#[cfg(test)]
mod spec {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    use common::operations::{By, Insert, Publish, Select, Subscribe};
    use futures::{FutureExt as _, StreamExt as _};
    use tracerr::Traced;

    use super::{ExecutionError, SubmitComment};
    use crate::{
        command::Command as _,
        domain::{comment, entry, repository, user, Comment, Entry},
        event::CommentAdded,
        infra::{bus, database, Broadcast, Bus, Database, Memory},
        Config, Service,
    };

    fn name(s: &str) -> repository::FullName {
        repository::FullName::new(s).unwrap()
    }

    fn cmd(repo: &str) -> SubmitComment {
        SubmitComment {
            repository_name: name(repo),
            posted_by: user::Login::new("octocat").unwrap(),
            content: comment::Content::new("Nice repo!").unwrap(),
        }
    }

    fn config() -> Config {
        Config::hs256(b"secret", Duration::ZERO)
    }

    #[tokio::test]
    async fn stores_and_publishes_comment() {
        let db = Memory::new();
        _ = db
            .execute(Insert(entry::New {
                repository_name: name("a/b"),
                posted_by: user::Login::new("hubot").unwrap(),
            }))
            .await
            .unwrap();
        let bus = Broadcast::default();
        let mut events = bus
            .execute(Subscribe(By::<CommentAdded, _>::new(|_: &_| true)))
            .await
            .unwrap();
        let svc = Service::new(config(), db, bus);

        let comment = svc.execute(cmd("a/b")).await.unwrap();

        assert_eq!(comment.content.as_ref(), "Nice repo!");
        assert_eq!(
            events.next().now_or_never().flatten(),
            Some(CommentAdded(comment)),
        );
        assert!(events.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn rejects_comment_for_missing_entry() {
        let bus = Broadcast::default();
        let mut events = bus
            .execute(Subscribe(By::<CommentAdded, _>::new(|_: &_| true)))
            .await
            .unwrap();
        let svc = Service::new(config(), Memory::new(), bus);

        let err = svc.execute(cmd("a/b")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EntryNotExists(_)));
        assert!(events.next().now_or_never().is_none());
    }

    /// [`Database`] losing every created [`Comment`].
    #[derive(Debug)]
    struct Lossy;

    impl Database<Select<By<Option<Entry>, repository::FullName>>> for Lossy {
        type Ok = Option<Entry>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Entry>, repository::FullName>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(Some(Entry {
                id: entry::Id::from(1),
                repository_name: by.into_inner(),
                posted_by: user::Login::new("hubot").unwrap(),
                score: 1,
                created_at: common::DateTime::now().coerce(),
            }))
        }
    }

    impl Database<Insert<comment::New>> for Lossy {
        type Ok = comment::Id;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Insert<comment::New>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(comment::Id::from(1))
        }
    }

    impl Database<Select<By<Option<Comment>, comment::Id>>> for Lossy {
        type Ok = Option<Comment>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Option<Comment>, comment::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(None)
        }
    }

    /// [`Bus`] counting published events and failing to deliver them.
    #[derive(Debug, Default)]
    struct Counting {
        published: AtomicUsize,
        events: Mutex<Vec<CommentAdded>>,
    }

    impl Bus<Publish<CommentAdded>> for Counting {
        type Ok = ();
        type Err = Traced<bus::Error>;

        async fn execute(
            &self,
            Publish(ev): Publish<CommentAdded>,
        ) -> Result<Self::Ok, Self::Err> {
            _ = self.published.fetch_add(1, Ordering::SeqCst);
            self.events.lock().unwrap().push(ev);
            Err(tracerr::new!(bus::Error::Closed))
        }
    }

    #[tokio::test]
    async fn publishes_nothing_when_refetch_fails() {
        let svc = Service::new(config(), Lossy, Counting::default());

        let err = svc.execute(cmd("a/b")).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::CommentNotExists(_)));
        assert_eq!(svc.bus().published.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn succeeds_despite_publish_failure() {
        let db = Memory::new();
        _ = db
            .execute(Insert(entry::New {
                repository_name: name("a/b"),
                posted_by: user::Login::new("hubot").unwrap(),
            }))
            .await
            .unwrap();
        let svc = Service::new(config(), db, Counting::default());

        let comment = svc.execute(cmd("a/b")).await.unwrap();

        assert_eq!(svc.bus().published.load(Ordering::SeqCst), 1);
        assert_eq!(
            svc.bus().events.lock().unwrap().as_slice(),
            [CommentAdded(comment)],
        );
    }
}
