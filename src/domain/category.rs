//! Trader categories and per-category containers.
//!
//! Every positioning report splits open interest into three trader groups.
//! Net positions and index values are computed once per group, so the
//! per-group data lives in [`PerCategory`], indexed by [`TraderCategory`].

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraderCategory {
    Commercial,
    LargeSpeculator,
    SmallSpeculator,
}

impl TraderCategory {
    pub const ALL: [TraderCategory; 3] = [
        TraderCategory::Commercial,
        TraderCategory::LargeSpeculator,
        TraderCategory::SmallSpeculator,
    ];

    /// Column prefix used in exported index and position headers.
    pub fn label(self) -> &'static str {
        match self {
            TraderCategory::Commercial => "Comm",
            TraderCategory::LargeSpeculator => "LrgSpec",
            TraderCategory::SmallSpeculator => "SmlSpec",
        }
    }

    /// Numeric `Type` code in event-list exports.
    pub fn event_code(self) -> u8 {
        match self {
            TraderCategory::Commercial => 1,
            TraderCategory::LargeSpeculator => 2,
            TraderCategory::SmallSpeculator => 3,
        }
    }

    fn slot(self) -> usize {
        match self {
            TraderCategory::Commercial => 0,
            TraderCategory::LargeSpeculator => 1,
            TraderCategory::SmallSpeculator => 2,
        }
    }
}

/// One value per trader category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerCategory<T>([T; 3]);

impl<T> PerCategory<T> {
    pub fn new(commercial: T, large: T, small: T) -> Self {
        Self([commercial, large, small])
    }

    pub fn from_fn(mut f: impl FnMut(TraderCategory) -> T) -> Self {
        Self(TraderCategory::ALL.map(&mut f))
    }

    pub fn try_from_fn<E>(
        mut f: impl FnMut(TraderCategory) -> Result<T, E>,
    ) -> Result<Self, E> {
        let [commercial, large, small] = TraderCategory::ALL;
        Ok(Self([f(commercial)?, f(large)?, f(small)?]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerCategory<U> {
        PerCategory::from_fn(|cat| f(&self[cat]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TraderCategory, &T)> {
        TraderCategory::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<TraderCategory> for PerCategory<T> {
    type Output = T;

    fn index(&self, cat: TraderCategory) -> &T {
        &self.0[cat.slot()]
    }
}

impl<T> IndexMut<TraderCategory> for PerCategory<T> {
    fn index_mut(&mut self, cat: TraderCategory) -> &mut T {
        &mut self.0[cat.slot()]
    }
}

/// Long and short contract counts reported for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LongShort {
    pub long: i64,
    pub short: i64,
}

impl LongShort {
    pub fn new(long: i64, short: i64) -> Self {
        Self { long, short }
    }

    /// long - short
    pub fn net(&self) -> i64 {
        self.long - self.short
    }
}
