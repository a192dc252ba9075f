//! Weights go through three steps before emission: entries with no weight
//! are filtered out, the vector is rescaled so that no entry exceeds the
//! network's max weight limit, and the result is encoded as fixed-point
//! `u16` fractions of the largest weight.

use synapse_data_model::prelude::*;

use crate::Error;

/// Drop entries with a non-positive weight and check that at least
/// `min_allowed_weights` remain.
///
/// # Errors
/// [`Error::InsufficientWeights`] if too few entries remain.
pub fn filter_weights(weights: &WeightVector, min_allowed_weights: u64) -> Result<WeightVector, Error> {
    let filtered = weights.retain(|_, weight| weight > 0.0);
    let actual = filtered.len();
    if u64::try_from(actual).unwrap_or(u64::MAX) < min_allowed_weights {
        return Err(Error::InsufficientWeights {
            required: min_allowed_weights,
            actual,
        });
    }
    Ok(filtered)
}

/// Rescale `weights` so that the largest one equals `max_weight_limit`.
///
/// A vector whose maximum already equals the limit is returned unchanged,
/// which makes the operation idempotent. An all-zero vector stays all-zero.
///
/// # Errors
/// - `max_weight_limit` is outside of `(0, 1]`
/// - A weight is negative
#[allow(clippy::float_cmp)]
pub fn normalize_max_weight(
    weights: &WeightVector,
    max_weight_limit: f64,
) -> Result<WeightVector, InvalidInputError> {
    if !(max_weight_limit > 0.0 && max_weight_limit <= 1.0) {
        return Err(InvalidInputError::WeightLimitOutOfRange(max_weight_limit));
    }
    if let Some(uid) = weights.first_negative() {
        return Err(InvalidInputError::NegativeWeight(uid));
    }

    let max = weights.max_weight();
    if max == 0.0 || max == max_weight_limit {
        return Ok(weights.clone());
    }

    // divide first: `max_weight_limit / max` overflows for subnormal `max`
    weights.map_weights(|weight| {
        if weight == max {
            max_weight_limit
        } else {
            (weight / max * max_weight_limit).min(max_weight_limit)
        }
    })
}

/// Encode `weights` as fixed-point fractions of their maximum, sorted by uid.
///
/// The largest weight maps to [`FIXED_POINT_MAX`]. If every weight is zero,
/// every value is zero.
///
/// # Errors
/// If a weight is negative.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_for_emit(weights: &WeightVector) -> Result<Vec<FixedPointWeight>, InvalidInputError> {
    if let Some(uid) = weights.first_negative() {
        return Err(InvalidInputError::NegativeWeight(uid));
    }

    let max = weights.max_weight();
    let scale = f64::from(FIXED_POINT_MAX);
    let mut encoded: Vec<_> = weights
        .iter()
        .map(|(uid, weight)| {
            let value = if max > 0.0 {
                (weight / max * scale).round().min(scale) as u16
            } else {
                0
            };
            FixedPointWeight::new(uid, value)
        })
        .collect();
    encoded.sort_unstable_by_key(FixedPointWeight::uid);

    Ok(encoded)
}

/// Weights at every stage of preparation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedWeights {
    /// After dropping zero entries
    pub filtered: WeightVector,
    /// After applying the max weight limit
    pub normalized: WeightVector,
    /// Fixed-point form, sorted by uid
    pub emitted: Vec<FixedPointWeight>,
}

/// Filter, normalize and encode `weights`, in that order.
///
/// # Errors
/// As [`filter_weights`], [`normalize_max_weight`] and [`encode_for_emit`].
pub fn prepare_weights(
    weights: &WeightVector,
    min_allowed_weights: u64,
    max_weight_limit: f64,
) -> Result<PreparedWeights, Error> {
    let filtered = filter_weights(weights, min_allowed_weights)?;
    let normalized = normalize_max_weight(&filtered, max_weight_limit)?;
    let emitted = encode_for_emit(&normalized)?;

    Ok(PreparedWeights {
        filtered,
        normalized,
        emitted,
    })
}
