// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// How a [`Lookup`] was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Served {
    /// Produced by a network fetch during this request, possibly one joined in flight.
    Fetched,
    /// Served from the cache, younger than the refresh interval.
    Fresh,
    /// Served from the cache without a network attempt, because the retry cooldown is active.
    Stale,
    /// Served from the cache after a refresh attempt failed.
    Fallback,
}

impl Served {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Fallback => "fallback",
        }
    }
}

/// The payload returned by [`DataCache::get`](crate::DataCache::get), tagged with how it was served.
#[derive(Clone, Debug, PartialEq)]
pub struct Lookup<V> {
    data: V,
    served: Served,
}

impl<V> Lookup<V> {
    /// Tags `data` with how it was served.
    #[must_use]
    pub const fn new(data: V, served: Served) -> Self {
        Self { data, served }
    }

    /// The payload.
    #[must_use]
    pub const fn data(&self) -> &V {
        &self.data
    }

    /// Consumes the lookup, returning the payload.
    #[must_use]
    pub fn into_data(self) -> V {
        self.data
    }

    /// How the payload was obtained.
    #[must_use]
    pub const fn served(&self) -> Served {
        self.served
    }

    /// `true` unless the payload came from a network fetch made for this request.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        !matches!(self.served, Served::Fetched)
    }

    /// `true` if the payload is older than the refresh interval.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self.served, Served::Stale | Served::Fallback)
    }

    /// `true` if the payload was served because a refresh attempt failed.
    #[must_use]
    pub const fn is_from_fallback(&self) -> bool {
        matches!(self.served, Served::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::fetched(Served::Fetched, false, false, false)]
    #[case::fresh(Served::Fresh, true, false, false)]
    #[case::stale(Served::Stale, true, true, false)]
    #[case::fallback(Served::Fallback, true, true, true)]
    fn flags(#[case] served: Served, #[case] cached: bool, #[case] stale: bool, #[case] fallback: bool) {
        let lookup = Lookup::new("data", served);
        assert_eq!(lookup.is_cached(), cached);
        assert_eq!(lookup.is_stale(), stale);
        assert_eq!(lookup.is_from_fallback(), fallback);
        assert_eq!(lookup.served(), served);
        assert_eq!(lookup.into_data(), "data");
    }

    #[test]
    fn served_names() {
        assert_eq!(Served::Fetched.as_str(), "fetched");
        assert_eq!(Served::Fresh.as_str(), "fresh");
        assert_eq!(Served::Stale.as_str(), "stale");
        assert_eq!(Served::Fallback.as_str(), "fallback");
    }
}
