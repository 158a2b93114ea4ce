//! Score normalization: pure functions only.
//!
//! Every engine score is folded into one signed integer from the tracked
//! side's point of view before it is averaged or compared.

use shakmaty::Color;

use crate::engine::{PovScore, Score};

/// Magnitude substituted for any forced mate, regardless of its distance.
pub const MATE_SENTINEL: i32 = 10_000;

/// Convert an engine score into a signed value for `tracked`.
///
/// Finite scores pass through (negated when expressed for the other side);
/// mates become `±MATE_SENTINEL`, positive when `tracked` is the mating side.
pub fn normalize(score: PovScore, tracked: Color) -> i32 {
    let for_pov = match score.score {
        Score::Cp(cp) => cp,
        Score::Mate(n) if n > 0 => MATE_SENTINEL,
        // `mate 0` and negative distances: the pov side is getting mated
        Score::Mate(_) => -MATE_SENTINEL,
    };

    if score.pov == tracked {
        for_pov
    } else {
        -for_pov
    }
}
