//! End-to-end round planning: search, then leader rotation.

use rand::Rng;
use tracing::info;

use crate::error::GroupingResult;
use crate::leader::LeaderAdjuster;
use crate::models::Permutation;
use crate::search::{SearchControl, SearchRequest, Strategy};

/// Finds a round with `strategy` and rotates its leaders against the
/// request's history.
pub fn plan_round<R: Rng + ?Sized>(
    request: &SearchRequest,
    strategy: &Strategy,
    control: &SearchControl,
    adjuster: &LeaderAdjuster,
    rng: &mut R,
) -> GroupingResult<Permutation> {
    let chosen = strategy.run(request, control, rng)?;
    let round = adjuster.adjust(&chosen, &request.history, rng);
    info!(
        date = %round.date,
        groups = round.group_count(),
        participants = round.participant_count(),
        "planned round"
    );
    Ok(round)
}
