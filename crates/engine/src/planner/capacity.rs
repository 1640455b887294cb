use crate::{Balances, Capacity, CapacityPlan, config::CapacityConfig};

/// Buy at most one unit of each kind per day, potion capacity first.
///
/// A unit is bought when its stock reaches `utilization_percent` of the
/// ceiling and the gold left above `reserve_gold` covers it. ml utilization is
/// measured on the fullest channel.
pub(crate) fn plan(
    balances: &Balances,
    capacity: &Capacity,
    config: &CapacityConfig,
) -> CapacityPlan {
    let mut gold = balances.gold - config.reserve_gold;
    let mut plan = CapacityPlan::default();

    let crowded = |stock: i64, ceiling: i64| stock * 100 >= config.utilization_percent * ceiling;

    if crowded(balances.total_potions(), capacity.max_potions) && gold >= config.unit_cost {
        plan.potion_capacity = 1;
        gold -= config.unit_cost;
    }
    let fullest = balances.ml.iter().copied().max().unwrap_or(0);
    if crowded(fullest, capacity.max_ml_per_channel) && gold >= config.unit_cost {
        plan.ml_capacity = 1;
    }
    plan
}
