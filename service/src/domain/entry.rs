//! [`Entry`] definitions.

use common::{DateTime, DateTimeOf};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use super::{repository, user};

/// [`Repository`] submitted to the feed.
///
/// [`Repository`]: super::Repository
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// [`repository::FullName`] of the submitted [`Repository`].
    ///
    /// [`Repository`]: super::Repository
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the [`User`] who submitted this [`Entry`].
    ///
    /// [`User`]: super::User
    pub posted_by: user::Login,

    /// Aggregate score of all the votes for this [`Entry`].
    pub score: i32,

    /// [`DateTime`] when this [`Entry`] was created.
    pub created_at: CreationDateTime,
}

impl Entry {
    /// Gravity of the [`Entry::hot_score()`] time decay.
    const GRAVITY: f64 = 1.8;

    /// Calculates the "hot" score of this [`Entry`] at the provided moment.
    ///
    /// The submitter's own vote is discounted, and the rest of the score
    /// decays with the age of this [`Entry`] in hours.
    #[must_use]
    pub fn hot_score(&self, now: DateTime) -> f64 {
        let age = now - self.created_at.coerce();
        let hours = age.as_seconds_f64().max(0.0) / 3600.0;
        f64::from(self.score - 1) / (hours + 2.0).powf(Self::GRAVITY)
    }
}

/// ID of an [`Entry`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i32);

/// [`DateTime`] when an [`Entry`] was created.
pub type CreationDateTime = DateTimeOf<Entry>;

/// New [`Entry`] to be created.
#[derive(Clone, Debug)]
pub struct New {
    /// [`repository::FullName`] of the [`Repository`] to submit.
    ///
    /// [`Repository`]: super::Repository
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the submitter.
    pub posted_by: user::Login,
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Entry, Id};
    use crate::domain::{repository, user};

    fn entry(score: i32, created_at_millis: i64) -> Entry {
        Entry {
            id: Id::from(1),
            repository_name: repository::FullName::new("a/b").unwrap(),
            posted_by: user::Login::new("octocat").unwrap(),
            score,
            created_at: DateTime::from_unix_timestamp_millis(
                created_at_millis,
            )
            .unwrap()
            .coerce(),
        }
    }

    #[test]
    fn hot_score_prefers_higher_score() {
        let now = DateTime::from_unix_timestamp_millis(0).unwrap();

        assert!(entry(10, 0).hot_score(now) > entry(5, 0).hot_score(now));
    }

    #[test]
    fn hot_score_decays_with_age() {
        let hour = 3_600_000;
        let now = DateTime::from_unix_timestamp_millis(48 * hour).unwrap();

        let fresh = entry(10, 47 * hour).hot_score(now);
        let stale = entry(10, 0).hot_score(now);
        assert!(fresh > stale, "{fresh} should be greater than {stale}");
    }

    #[test]
    fn hot_score_discounts_submitter_vote() {
        let now = DateTime::from_unix_timestamp_millis(0).unwrap();

        assert!(entry(1, 0).hot_score(now).abs() < f64::EPSILON);
    }
}
