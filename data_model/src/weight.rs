//! Weight vectors as supplied by the caller and their fixed-point form.

use std::collections::HashSet;

use derive_more::Display;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::InvalidInputError;

/// Identifier of a target participant inside a network.
pub type Uid = u64;

/// Largest value carried by a [`FixedPointWeight`].
pub const FIXED_POINT_MAX: u16 = u16::MAX;

/// Map a chain-side `u16` fraction onto `[0, 1]`.
///
/// Chain parameters such as the max weight limit are stored as a share of
/// [`u16::MAX`].
pub fn u16_normalized_float(value: u16) -> f64 {
    f64::from(value) / f64::from(u16::MAX)
}

/// Ordered `(uid, weight)` pairs with unique uids and finite weights.
///
/// Order of insertion is kept for display purposes only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(Uid, f64)>", into = "Vec<(Uid, f64)>")]
pub struct WeightVector {
    entries: Vec<(Uid, f64)>,
}

impl WeightVector {
    /// Construct [`Self`] from `(uid, weight)` pairs.
    ///
    /// # Errors
    /// - A uid occurs twice
    /// - A weight is `NaN` or infinite
    pub fn new(entries: impl IntoIterator<Item = (Uid, f64)>) -> Result<Self, InvalidInputError> {
        let entries: Vec<_> = entries.into_iter().collect();
        let mut seen = HashSet::with_capacity(entries.len());

        for &(uid, weight) in &entries {
            if !seen.insert(uid) {
                return Err(InvalidInputError::DuplicateUid(uid));
            }
            if !weight.is_finite() {
                return Err(InvalidInputError::NonFiniteWeight(uid));
            }
        }

        Ok(Self { entries })
    }

    /// Construct [`Self`] from parallel slices of uids and weights.
    ///
    /// # Errors
    /// Fails if the slices differ in length, otherwise as [`Self::new`].
    pub fn from_parts(uids: &[Uid], weights: &[f64]) -> Result<Self, InvalidInputError> {
        if uids.len() != weights.len() {
            return Err(InvalidInputError::LengthMismatch {
                uids: uids.len(),
                weights: weights.len(),
            });
        }
        Self::new(uids.iter().copied().zip(weights.iter().copied()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(uid, weight)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Uid, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Weight assigned to `uid`, if any.
    pub fn get(&self, uid: Uid) -> Option<f64> {
        self.entries
            .iter()
            .find_map(|&(this, weight)| (this == uid).then_some(weight))
    }

    /// Largest weight, or `0.0` for an empty vector.
    pub fn max_weight(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, weight)| weight)
            .fold(0.0, f64::max)
    }

    /// First uid carrying a negative weight.
    pub fn first_negative(&self) -> Option<Uid> {
        self.entries
            .iter()
            .find_map(|&(uid, weight)| (weight < 0.0).then_some(uid))
    }

    /// Keep only the entries matching `predicate`. Uid uniqueness carries over.
    #[must_use]
    pub fn retain(&self, mut predicate: impl FnMut(Uid, f64) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .copied()
                .filter(|&(uid, weight)| predicate(uid, weight))
                .collect(),
        }
    }

    /// Apply `f` to every weight, keeping uids and order.
    ///
    /// # Errors
    /// Fails if `f` produces a non-finite weight.
    pub fn map_weights(&self, mut f: impl FnMut(f64) -> f64) -> Result<Self, InvalidInputError> {
        let entries = self
            .entries
            .iter()
            .map(|&(uid, weight)| {
                let mapped = f(weight);
                if mapped.is_finite() {
                    Ok((uid, mapped))
                } else {
                    Err(InvalidInputError::NonFiniteWeight(uid))
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }
}

impl TryFrom<Vec<(Uid, f64)>> for WeightVector {
    type Error = InvalidInputError;

    fn try_from(entries: Vec<(Uid, f64)>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<WeightVector> for Vec<(Uid, f64)> {
    fn from(vector: WeightVector) -> Self {
        vector.entries
    }
}

/// A weight as emitted on chain: a share of [`FIXED_POINT_MAX`].
#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Decode,
    Encode,
    Deserialize,
    Serialize,
)]
#[display(fmt = "{}:{}", uid, value)]
pub struct FixedPointWeight {
    uid: Uid,
    value: u16,
}

impl FixedPointWeight {
    /// Construct [`Self`].
    pub const fn new(uid: Uid, value: u16) -> Self {
        Self { uid, value }
    }

    /// Target uid
    pub const fn uid(&self) -> Uid {
        self.uid
    }

    /// Encoded value
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Value as a fraction of [`FIXED_POINT_MAX`], as shown to the user.
    pub fn as_fraction(&self) -> f64 {
        u16_normalized_float(self.value)
    }
}
