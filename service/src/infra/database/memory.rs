//! In-memory [`Database`] implementation.
//!
//! Plays the role of the `Entries`, `Comments` and `Repositories`
//! collaborators without any external storage.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use common::{
    operations::{By, Insert, Select, Update},
    DateTime,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{
        comment, entry, repository, vote, Comment, Entry, Repository, Vote,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`].
///
/// All the clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every further [`Entry`] or [`Comment`] insertion fail with
    /// [`Error::IdsExhausted`].
    #[cfg(feature = "test-util")]
    pub async fn exhaust_ids(&self) {
        let mut state = self.0.lock().await;
        state.last_entry_id = i32::MAX;
        state.last_comment_id = i32::MAX;
    }
}

/// State of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Catalog of known [`Repository`]s.
    repositories: HashMap<repository::FullName, Repository>,

    /// Submitted [`Entry`]s.
    entries: BTreeMap<entry::Id, Entry>,

    /// Index of [`Entry`]s by their [`repository::FullName`].
    entry_ids: HashMap<repository::FullName, entry::Id>,

    /// Current [`vote::Value`]s of every voter.
    votes: HashMap<vote::Key, vote::Value>,

    /// Added [`Comment`]s.
    comments: BTreeMap<comment::Id, Comment>,

    /// Last assigned [`entry::Id`].
    last_entry_id: i32,

    /// Last assigned [`comment::Id`].
    last_comment_id: i32,
}

impl State {
    /// Advances the provided `last` ID counter and returns the next ID.
    fn next_id(last: &mut i32) -> Result<i32, Error> {
        *last = last.checked_add(1).ok_or(Error::IdsExhausted)?;
        Ok(*last)
    }
}

impl Database<Insert<Repository>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(repository): Insert<Repository>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self
            .0
            .lock()
            .await
            .repositories
            .insert(repository.full_name.clone(), repository);
        Ok(())
    }
}

impl Database<Select<By<Option<Repository>, repository::FullName>>>
    for Memory
{
    type Ok = Option<Repository>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Repository>, repository::FullName>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.lock().await.repositories.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Option<Entry>, repository::FullName>>> for Memory {
    type Ok = Option<Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Entry>, repository::FullName>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.0.lock().await;
        Ok(state
            .entry_ids
            .get(by.inner())
            .and_then(|id| state.entries.get(id))
            .cloned())
    }
}

impl Database<Select<By<Vec<Entry>, read::feed::Selector>>> for Memory {
    type Ok = Vec<Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Entry>, read::feed::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        use read::feed::Kind;

        let read::feed::Selector {
            kind,
            offset,
            limit,
        } = by.into_inner();

        let mut entries = self
            .0
            .lock()
            .await
            .entries
            .values()
            .cloned()
            .collect::<Vec<_>>();

        let now = DateTime::now();
        match kind {
            Kind::Hot => entries.sort_by(|a, b| {
                b.hot_score(now)
                    .total_cmp(&a.hot_score(now))
                    .then_with(|| b.id.cmp(&a.id))
            }),
            Kind::New => entries.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
            Kind::Top => entries.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| b.created_at.cmp(&a.created_at))
                    .then_with(|| b.id.cmp(&a.id))
            }),
        }

        Ok(entries.into_iter().skip(offset).take(limit).collect())
    }
}

impl Database<Insert<entry::New>> for Memory {
    type Ok = entry::Id;
    type Err = Traced<database::Error>;

    /// Inserts a new [`Entry`] along with its submitter's upvote.
    ///
    /// Returns the ID of the existing [`Entry`] if the [`Repository`] has
    /// been submitted already.
    async fn execute(
        &self,
        Insert(new): Insert<entry::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let entry::New {
            repository_name,
            posted_by,
        } = new;

        let mut state = self.0.lock().await;
        if let Some(id) = state.entry_ids.get(&repository_name) {
            return Ok(*id);
        }

        let id = State::next_id(&mut state.last_entry_id)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?
            .into();
        let entry = Entry {
            id,
            repository_name: repository_name.clone(),
            posted_by: posted_by.clone(),
            score: vote::Value::UP.into(),
            created_at: DateTime::now().coerce(),
        };

        _ = state.votes.insert(
            vote::Key {
                repository_name: repository_name.clone(),
                voter: posted_by,
            },
            vote::Value::UP,
        );
        _ = state.entry_ids.insert(repository_name, id);
        _ = state.entries.insert(id, entry);

        Ok(id)
    }
}

impl Database<Update<Vote>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    /// Replaces the previous [`Vote`] of the voter (if any) and adjusts the
    /// [`Entry`] score accordingly.
    async fn execute(
        &self,
        Update(vote): Update<Vote>,
    ) -> Result<Self::Ok, Self::Err> {
        let Vote {
            repository_name,
            voter,
            value,
        } = vote;

        let mut guard = self.0.lock().await;
        let state = &mut *guard;

        let id = *state
            .entry_ids
            .get(&repository_name)
            .ok_or_else(|| Error::EntryNotExists(repository_name.clone()))
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;

        let previous = state
            .votes
            .insert(
                vote::Key {
                    repository_name,
                    voter,
                },
                value,
            )
            .unwrap_or_default();
        if let Some(entry) = state.entries.get_mut(&id) {
            entry.score += i32::from(value) - i32::from(previous);
        }

        Ok(())
    }
}

impl Database<Select<By<Option<vote::Value>, vote::Key>>> for Memory {
    type Ok = Option<vote::Value>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<vote::Value>, vote::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.lock().await.votes.get(by.inner()).copied())
    }
}

impl Database<Insert<comment::New>> for Memory {
    type Ok = comment::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<comment::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let comment::New {
            repository_name,
            posted_by,
            content,
        } = new;

        let mut state = self.0.lock().await;
        if !state.entry_ids.contains_key(&repository_name) {
            return Err(tracerr::new!(database::Error::from(
                Error::EntryNotExists(repository_name)
            )));
        }

        let id = State::next_id(&mut state.last_comment_id)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?
            .into();
        _ = state.comments.insert(
            id,
            Comment {
                id,
                repository_name,
                posted_by,
                content,
                created_at: DateTime::now().coerce(),
            },
        );

        Ok(id)
    }
}

impl Database<Select<By<Option<Comment>, comment::Id>>> for Memory {
    type Ok = Option<Comment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Comment>, comment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.lock().await.comments.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Vec<Comment>, read::comment::list::Selector>>>
    for Memory
{
    type Ok = Vec<Comment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Comment>, read::comment::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::comment::list::Selector {
            repository_name,
            offset,
            limit,
        } = by.into_inner();

        // IDs are assigned sequentially, so the reversed order is the
        // newest first.
        Ok(self
            .0
            .lock()
            .await
            .comments
            .values()
            .rev()
            .filter(|c| c.repository_name == repository_name)
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

impl Database<Select<By<comment::Count, repository::FullName>>> for Memory {
    type Ok = comment::Count;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<comment::Count, repository::FullName>>,
    ) -> Result<Self::Ok, Self::Err> {
        let count = self
            .0
            .lock()
            .await
            .comments
            .values()
            .filter(|c| &c.repository_name == by.inner())
            .count();
        Ok(i32::try_from(count).unwrap_or(i32::MAX).into())
    }
}

/// [`Memory`] database error.
#[derive(Clone, Debug, Display, StdError)]
pub enum Error {
    /// [`Entry`] doesn't exist.
    #[display("`Entry(repository: {_0})` does not exist")]
    EntryNotExists(#[error(not(source))] repository::FullName),

    /// No more IDs can be assigned.
    #[display("IDs are exhausted")]
    IdsExhausted,
}
