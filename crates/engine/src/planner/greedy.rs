use super::{Candidate, Limits, PlanItem, Take};

/// Single pass, catalog order, no backtracking.
pub(super) fn plan(candidates: &[Candidate], limits: &Limits, take: Take) -> Vec<PlanItem> {
    let mut pools = *limits;
    let mut plan = Vec::new();

    for candidate in candidates {
        if candidate.price > pools.gold {
            tracing::debug!(key = %candidate.key, price = candidate.price, gold = pools.gold, "skipped: not affordable");
            continue;
        }
        if candidate.restock_closed() {
            tracing::debug!(key = %candidate.key, "skipped: stock at threshold");
            continue;
        }

        let feasible = pools.max_units(candidate);
        let quantity = match take {
            Take::One => feasible.min(1),
            Take::Max => feasible,
        };
        if quantity <= 0 {
            continue;
        }

        pools.consume(candidate, quantity);
        plan.push(PlanItem {
            key: candidate.key.clone(),
            quantity,
        });
    }

    plan
}
