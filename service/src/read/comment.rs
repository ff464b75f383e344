//! [`Comment`] read definitions.

#[cfg(doc)]
use crate::domain::Comment;

pub mod list {
    //! [`Comment`]s list definitions.

    use crate::domain::repository;
    #[cfg(doc)]
    use crate::domain::{Comment, Entry};

    /// Selector of [`Comment`]s left on a single [`Entry`], newest first.
    #[derive(Clone, Debug)]
    pub struct Selector {
        /// [`repository::FullName`] of the commented [`Entry`].
        pub repository_name: repository::FullName,

        /// Number of [`Comment`]s to skip.
        pub offset: usize,

        /// Maximum number of [`Comment`]s to return, if any.
        pub limit: Option<usize>,
    }

    impl Selector {
        /// Creates a new [`Selector`] from the client provided arguments.
        ///
        /// Negative values are treated as zero.
        #[must_use]
        pub fn new(
            repository_name: repository::FullName,
            offset: Option<i32>,
            limit: Option<i32>,
        ) -> Self {
            let non_negative = |v: i32| usize::try_from(v).unwrap_or_default();

            Self {
                repository_name,
                offset: offset.map(non_negative).unwrap_or_default(),
                limit: limit.map(non_negative),
            }
        }
    }
}
