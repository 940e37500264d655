//! The "spin the wheel" perk game. Nothing here is persisted.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::server::controller::error::ApiError;
use crate::server::util::validation::{validate_required_text, MAX_NAME_LEN};

pub(crate) const PRIZES: [&str; 8] = [
    "Free Breakfast",
    "Room Upgrade",
    "Late Checkout",
    "Spa Voucher",
    "Welcome Drink",
    "500 Points",
    "Free Parking",
    "Dinner 10% Off",
];

/// Full turns every spin makes before the random offset.
const MIN_TURNS: f64 = 5.0;
pub(crate) const SPIN_DURATION_MS: u64 = 3000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpinRequest {
    pub guest_name: String,
    #[serde(default)]
    pub previous_rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpinResult {
    pub guest_name: String,
    /// cumulative degrees
    pub rotation: f64,
    pub index: usize,
    pub prize: String,
    pub duration_ms: u64,
}

/// Segment under the pointer after the wheel turned clockwise by `rotation` degrees.
pub(crate) fn winning_index(rotation: f64, segments: usize) -> usize {
    if segments == 0 {
        return 0;
    }
    let seg = 360.0 / segments as f64;
    let angle = rotation.rem_euclid(360.0);
    let index = ((360.0 - angle + seg / 2.0).rem_euclid(360.0) / seg).floor() as usize;
    index.min(segments - 1)
}

pub(crate) fn spin<R: Rng>(request: &SpinRequest, rng: &mut R) -> Result<SpinResult, ApiError> {
    validate_required_text(&request.guest_name, "Please enter guest name first", MAX_NAME_LEN)?;
    let previous = if request.previous_rotation.is_finite() {
        request.previous_rotation
    } else {
        0.0
    };
    let rotation = previous + MIN_TURNS * 360.0 + rng.gen_range(0.0..360.0);
    let index = winning_index(rotation, PRIZES.len());
    Ok(SpinResult {
        guest_name: request.guest_name.trim().to_string(),
        rotation,
        index,
        prize: PRIZES[index].to_string(),
        duration_ms: SPIN_DURATION_MS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_rotation_is_deterministic() {
        let first = winning_index(0.0, 8);
        assert_eq!(first, 0);
        for _ in 0..10 {
            assert_eq!(winning_index(0.0, 8), first);
        }
        assert_eq!(winning_index(720.0, 8), first);
    }

    #[test]
    fn clockwise_turns_move_backwards_through_segments() {
        // one segment clockwise brings the last segment under the pointer
        assert_eq!(winning_index(45.0, 8), 7);
        assert_eq!(winning_index(90.0, 8), 6);
        assert_eq!(winning_index(22.4, 8), 0);
        assert_eq!(winning_index(22.6, 8), 7);
        assert_eq!(winning_index(359.9, 8), 0);
    }

    #[test]
    fn spin_adds_at_least_five_turns() {
        let mut rng = StdRng::seed_from_u64(7);
        let request = SpinRequest {
            guest_name: "John Smith".to_string(),
            previous_rotation: 100.0,
        };
        let result = spin(&request, &mut rng).unwrap();
        assert!(result.rotation >= 1900.0 && result.rotation < 2260.0);
        assert_eq!(result.index, winning_index(result.rotation, 8));
        assert_eq!(result.prize, PRIZES[result.index]);
        assert_eq!(result.duration_ms, 3000);
    }

    #[test]
    fn guest_name_required() {
        let request = SpinRequest {
            guest_name: " ".to_string(),
            previous_rotation: 0.0,
        };
        assert!(spin(&request, &mut rand::thread_rng()).is_err());
    }
}
