//! [`Command`] for submitting a [`Repository`] to the feed.

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{entry, repository, user, Entry, Repository},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for submitting a [`Repository`] to the feed.
///
/// Re-submitting an already submitted [`Repository`] keeps its [`Entry`].
#[derive(Clone, Debug)]
pub struct SubmitRepository {
    /// Full name of the [`Repository`] to submit, as provided by the client.
    ///
    /// Malformed names are reported as not existing [`Repository`]s.
    pub repository_name: String,

    /// [`user::Login`] of the submitter.
    pub posted_by: user::Login,
}

impl<Db, Bs> Command<SubmitRepository> for Service<Db, Bs>
where
    Db: Database<
            Select<By<Option<Repository>, repository::FullName>>,
            Ok = Option<Repository>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<entry::New>,
            Ok = entry::Id,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Entry>, repository::FullName>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitRepository,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitRepository {
            repository_name: raw_name,
            posted_by,
        } = cmd;

        let Some(repository_name) = repository::FullName::new(raw_name.as_str())
        else {
            return Err(tracerr::new!(E::RepositoryNotExists(raw_name)));
        };

        // Any failure of the lookup means the repository cannot be submitted.
        let repository = self
            .database()
            .execute(Select(By::<Option<Repository>, _>::new(
                repository_name.clone(),
            )))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    repository = %repository_name,
                    "repository lookup failed: {e}",
                );
                None
            });
        if repository.is_none() {
            return Err(tracerr::new!(E::RepositoryNotExists(raw_name)));
        }

        _ = self
            .database()
            .execute(Insert(entry::New {
                repository_name: repository_name.clone(),
                posted_by,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.database()
            .execute(Select(By::<Option<Entry>, _>::new(repository_name.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::EntryNotExists(repository_name))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`SubmitRepository`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Repository`] doesn't exist.
    #[display("NotFound: repository \"{_0}\"")]
    #[from(ignore)]
    RepositoryNotExists(#[error(not(source))] String),

    /// [`Entry`] doesn't exist after being submitted.
    #[display("`Entry(repository: {_0})` does not exist")]
    #[from(ignore)]
    EntryNotExists(#[error(not(source))] repository::FullName),
}
