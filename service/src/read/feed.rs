//! Feed of [`Entry`]s definitions.

use derive_more::Display;

#[cfg(doc)]
use crate::domain::Entry;

/// Ranking order of a feed.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Kind {
    /// [`Entry`]s ordered by their time-decayed score.
    #[display("HOT")]
    Hot,

    /// Most recent [`Entry`]s first.
    #[display("NEW")]
    New,

    /// [`Entry`]s with the highest score first.
    #[display("TOP")]
    Top,
}

/// Selector of a feed page.
#[derive(Clone, Copy, Debug)]
pub struct Selector {
    /// [`Kind`] of the feed.
    pub kind: Kind,

    /// Number of [`Entry`]s to skip.
    pub offset: usize,

    /// Maximum number of [`Entry`]s to return.
    pub limit: usize,
}

impl Selector {
    /// Maximum (and default) number of [`Entry`]s in a single page.
    pub const MAX_LIMIT: usize = 10;

    /// Creates a new [`Selector`] from the client provided arguments.
    ///
    /// Missing or negative `offset` starts from the beginning. Missing or out
    /// of `1..=`[`MAX_LIMIT`] `limit` is replaced with [`MAX_LIMIT`].
    ///
    /// [`MAX_LIMIT`]: Self::MAX_LIMIT
    #[must_use]
    pub fn new(kind: Kind, offset: Option<i32>, limit: Option<i32>) -> Self {
        let offset = offset.and_then(|o| usize::try_from(o).ok());
        let limit = limit
            .and_then(|l| usize::try_from(l).ok())
            .filter(|l| (1..=Self::MAX_LIMIT).contains(l));

        Self {
            kind,
            offset: offset.unwrap_or_default(),
            limit: limit.unwrap_or(Self::MAX_LIMIT),
        }
    }
}
