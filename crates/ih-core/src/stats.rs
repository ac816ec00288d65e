//! # Stats Aggregator
//!
//! Feedback numbers are never stored; every read recomputes them from the
//! current interaction rows of one idea.

use serde::{Deserialize, Serialize};

use crate::models::Interaction;

/// Aggregate feedback for one idea.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IdeaStats {
    pub total: usize,
    pub accepted: usize,
    pub rated: usize,
    /// accepted / total, 0.0 when nobody has judged the idea yet
    pub accept_fraction: f64,
    /// Mean of the recorded ratings to one decimal place. `None` means no
    /// one has rated the idea, which is different from a mean of zero.
    pub mean_rating: Option<f64>,
}

impl IdeaStats {
    /// "Would use" percentage as shown to people, rounded to an integer.
    pub fn accept_percentage(&self) -> u32 {
        (self.accept_fraction * 100.0).round() as u32
    }
}

/// Folds a set of interactions into `IdeaStats`.
///
/// Ratings are summed as integers, so the result is independent of input
/// order.
pub fn aggregate(interactions: &[Interaction]) -> IdeaStats {
    let total = interactions.len();
    let accepted = interactions.iter().filter(|i| i.swipe).count();

    let (rated, rating_sum) = interactions
        .iter()
        .filter_map(|i| i.rating)
        .fold((0usize, 0u64), |(n, sum), r| (n + 1, sum + u64::from(r.get())));

    let accept_fraction = if total == 0 {
        0.0
    } else {
        accepted as f64 / total as f64
    };

    let mean_rating = (rated > 0).then(|| round_one_decimal(rating_sum as f64 / rated as f64));

    IdeaStats {
        total,
        accepted,
        rated,
        accept_fraction,
        mean_rating,
    }
}

// f64::round rounds half away from zero.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
