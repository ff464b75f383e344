//! [`Command`] for voting for an [`Entry`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{repository, user, vote, Entry, Vote},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for voting for an [`Entry`].
///
/// Replaces the previous [`Vote`] of the same voter, if any.
#[derive(Clone, Debug)]
pub struct VoteForEntry {
    /// [`repository::FullName`] of the [`Entry`] to vote for.
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the voter.
    pub voter: user::Login,

    /// [`vote::Value`] to set.
    pub value: vote::Value,
}

impl<Db, Bs> Command<VoteForEntry> for Service<Db, Bs>
where
    Db: Database<
            Select<By<Option<Entry>, repository::FullName>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<Update<Vote>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VoteForEntry) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VoteForEntry {
            repository_name,
            voter,
            value,
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

        self.database()
            .execute(Update(Vote {
                repository_name: repository_name.clone(),
                voter,
                value,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.database()
            .execute(Select(By::<Option<Entry>, _>::new(
                repository_name.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::EntryNotExists(repository_name))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`VoteForEntry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Entry`] to vote for doesn't exist.
    #[display("entry for repository \"{_0}\" not found")]
    #[from(ignore)]
    EntryNotExists(#[error(not(source))] repository::FullName),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::Insert;

    use super::{ExecutionError, VoteForEntry};
    use crate::{
        command::Command as _,
        domain::{entry, repository, user, vote},
        infra::{Database as _, Memory},
        Config, Service,
    };

    fn name(s: &str) -> repository::FullName {
        repository::FullName::new(s).unwrap()
    }

    fn cmd(voter: &str, value: vote::Value) -> VoteForEntry {
        VoteForEntry {
            repository_name: name("a/b"),
            voter: user::Login::new(voter).unwrap(),
            value,
        }
    }

    async fn service() -> Service<Memory, ()> {
        let db = Memory::new();
        _ = db
            .execute(Insert(entry::New {
                repository_name: name("a/b"),
                posted_by: user::Login::new("hubot").unwrap(),
            }))
            .await
            .unwrap();
        Service::new(Config::hs256(b"secret", Duration::ZERO), db, ())
    }

    #[tokio::test]
    async fn applies_signed_vote_effect() {
        let svc = service().await;

        let up = svc.execute(cmd("octocat", vote::Value::UP)).await.unwrap();
        assert_eq!(up.score, 2);

        let down = svc
            .execute(cmd("octocat", vote::Value::DOWN))
            .await
            .unwrap();
        assert_eq!(down.score, 0);

        let cancel = svc
            .execute(cmd("octocat", vote::Value::CANCEL))
            .await
            .unwrap();
        assert_eq!(cancel.score, 1);
    }

    #[tokio::test]
    async fn rejects_vote_for_missing_entry() {
        let svc = Service::new(
            Config::hs256(b"secret", Duration::ZERO),
            Memory::new(),
            (),
        );

        let err = svc
            .execute(cmd("octocat", vote::Value::UP))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EntryNotExists(_)));
    }
}
