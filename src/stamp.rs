//! Ordering tokens tagging datums for cross-edge synchronization.
//!
//! Grounded in the original `vistk::stamp` implementation: a single
//! global mutex-guarded color counter hands out a fresh color per
//! `Stamp::new`, and each color's increment rate is recorded in a side
//! table so `increment` doesn't need to carry it on every instance.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::rational::Rational;

pub type Color = u64;

static NEXT_COLOR: Mutex<Color> = Mutex::new(0);
static RATES: Mutex<Option<HashMap<Color, Rational>>> = Mutex::new(None);

fn next_color() -> Color {
    let mut guard = NEXT_COLOR.lock().expect("stamp color counter poisoned");
    let color = *guard;
    *guard += 1;
    color
}

fn record_rate(color: Color, rate: Rational) {
    let mut guard = RATES.lock().expect("stamp rate table poisoned");
    guard.get_or_insert_with(HashMap::new).insert(color, rate);
}

fn rate_for(color: Color) -> Rational {
    let guard = RATES.lock().expect("stamp rate table poisoned");
    guard
        .as_ref()
        .and_then(|m| m.get(&color).copied())
        .unwrap_or(Rational::ONE)
}

/// An immutable `(color, index)` pair. Two stamps of different colors
/// are never ordered, even if their indices happen to coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    color: Color,
    index: Rational,
}

impl Stamp {
    /// Allocates a fresh color with the given per-increment rate and
    /// returns the initial (index `0`) stamp for it.
    pub fn new(increment: Rational) -> Self {
        let color = next_color();
        record_rate(color, increment);
        Stamp {
            color,
            index: Rational::ZERO,
        }
    }

    /// Convenience constructor for a unit-rate color.
    pub fn new_default() -> Self {
        Self::new(Rational::ONE)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn index(&self) -> Rational {
        self.index
    }

    pub fn is_same_color(&self, other: &Stamp) -> bool {
        self.color == other.color
    }

    /// A new stamp of the same color, advanced by that color's rate.
    pub fn increment(&self) -> Stamp {
        Stamp {
            color: self.color,
            index: self.index + rate_for(self.color),
        }
    }

    /// A stamp with this stamp's index but another stamp's color.
    pub fn recolored(&self, other: &Stamp) -> Stamp {
        Stamp {
            color: other.color,
            index: self.index,
        }
    }
}

impl PartialOrd for Stamp {
    /// Only defined between same-color stamps; `None` otherwise, even
    /// if the indices happen to be equal.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.color != other.color {
            return None;
        }
        self.index.partial_cmp(&other.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_is_strictly_greater_same_color() {
        let s = Stamp::new_default();
        let s2 = s.increment();
        assert!(s2 > s);
        assert!(s.is_same_color(&s2));
    }

    #[test]
    fn different_colors_are_unordered() {
        let a = Stamp::new_default();
        let b = Stamp::new_default();
        assert_ne!(a.color(), b.color());
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn custom_rate_is_applied_on_increment() {
        let s = Stamp::new(Rational::new(1, 2));
        let s2 = s.increment();
        assert_eq!(s2.index(), Rational::new(1, 2));
        let s3 = s2.increment();
        assert_eq!(s3.index(), Rational::new(1, 1));
    }

    #[test]
    fn recolored_keeps_index_takes_color() {
        let a = Stamp::new_default().increment();
        let b = Stamp::new_default();
        let r = a.recolored(&b);
        assert_eq!(r.color(), b.color());
        assert_eq!(r.index(), a.index());
    }
}
