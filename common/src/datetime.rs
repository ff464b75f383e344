//! Date and time utilities.

use std::{cmp::Ordering, marker::PhantomData, ops};

use derive_more::Debug;

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time with a millisecond precision.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Inner representation of the date and time.
    inner: time::OffsetDateTime,

    /// Type parameter describing the kind of date and time.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// A [`DateTime`] representing the Unix epoch.
    pub const UNIX_EPOCH: Self = Self {
        inner: time::OffsetDateTime::UNIX_EPOCH,
        _of: PhantomData,
    };

    /// Creates a new [`DateTime`] representing the current date and time.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn now() -> Self {
        let inner = time::OffsetDateTime::now_utc();
        Self {
            _of: PhantomData,
            inner: inner
                .replace_millisecond(inner.millisecond())
                .expect("infallible"),
        }
    }

    /// Creates a new [`DateTime`] from the provided amount of milliseconds
    /// since the [`UNIX_EPOCH`].
    ///
    /// [`None`] is returned if the timestamp is out of range.
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[must_use]
    pub fn from_unix_timestamp_millis(millis: i64) -> Option<Self> {
        Some(Self {
            inner: time::OffsetDateTime::from_unix_timestamp_nanos(
                i128::from(millis) * 1_000_000,
            )
            .ok()?,
            _of: PhantomData,
        })
    }

    /// Returns the amount of milliseconds since the [`UNIX_EPOCH`] of this
    /// [`DateTime`].
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn unix_timestamp_millis(&self) -> i64 {
        i64::try_from(self.inner.unix_timestamp_nanos() / 1_000_000)
            .expect("`OffsetDateTime` range fits into `i64` milliseconds")
    }

    /// Coerces one kind of [`DateTime`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Signed distance between two [`DateTime`]s.
impl<Of: ?Sized> ops::Sub for DateTimeOf<Of> {
    type Output = time::Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        self.inner - rhs.inner
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! Module providing integration with [`serde`] crate.

    pub mod unix_timestamp_millis {
        //! Module providing serialization and deserialization of
        //! [`DateTimeOf`] as an amount of milliseconds since the Unix epoch.

        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        use crate::DateTimeOf;

        /// Serializes the [`DateTimeOf`] as a Unix timestamp in milliseconds.
        ///
        /// # Errors
        ///
        /// Returns an error if the `serializer` fails.
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            Of: ?Sized,
        {
            serializer.serialize_i64(dt.unix_timestamp_millis())
        }

        /// Deserializes the Unix timestamp in milliseconds into a
        /// [`DateTimeOf`].
        ///
        /// # Errors
        ///
        /// Returns an error if the timestamp is invalid.
        pub fn deserialize<'de, D, Of>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error>
        where
            D: Deserializer<'de>,
            Of: ?Sized,
        {
            DateTimeOf::from_unix_timestamp_millis(i64::deserialize(
                deserializer,
            )?)
            .ok_or_else(|| Error::custom("invalid timestamp"))
        }
    }
}
