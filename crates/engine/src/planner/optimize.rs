use super::{
    Candidate, Limits, Objective, PlanItem,
    solver::{self, Problem, Row},
};

/// Integer program over one quantity per candidate:
///
/// ```text
/// max   Σ w_i·q_i + Σ b_i·[q_i > 0]
/// s.t.  Σ price_i·q_i        <= gold
///       Σ consumes_i[c]·q_i  <= ml_available[c]   for each channel c
///       Σ yields_i[c]·q_i    <= ml_headroom[c]    for each channel c
///       Σ potions_i·q_i      <= potion_headroom
///       0 <= q_i <= max_units_i  (0 when gated or unaffordable)
/// ```
pub(super) fn plan(
    candidates: &[Candidate],
    limits: &Limits,
    objective: Objective,
    node_limit: u64,
) -> Vec<PlanItem> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let (weights, bonus): (Vec<f64>, Vec<f64>) = candidates
        .iter()
        .map(|c| match objective {
            Objective::Yield => (c.yield_units() as f64, 0.0),
            Objective::ProfitVariety {
                profit_weight,
                variety_weight,
            } => (profit_weight * c.value as f64, variety_weight),
        })
        .unzip();

    let upper = candidates
        .iter()
        .map(|c| {
            if c.price > limits.gold || c.restock_closed() {
                0
            } else {
                limits.max_units(c)
            }
        })
        .collect();

    let mut rows = vec![row(candidates, limits.gold, |c| c.price)];
    for i in 0..4 {
        rows.push(row(candidates, limits.ml_available[i], |c| c.consumes[i]));
        rows.push(row(candidates, limits.ml_headroom[i], |c| c.yields[i]));
    }
    rows.push(row(candidates, limits.potion_headroom, |c| c.potions));
    rows.retain(|r| r.coefficients.iter().any(|a| *a > 0));

    let problem = Problem {
        objective: weights,
        bonus,
        upper,
        rows,
    };
    debug_assert!(
        solver::is_packing(&problem),
        "optimizer built a non-packing problem"
    );
    let solution = solver::solve(&problem, node_limit);
    if !solution.optimal {
        tracing::warn!(
            nodes = solution.nodes,
            "solver node budget exhausted, using best plan found"
        );
    }
    tracing::debug!(objective = solution.objective, nodes = solution.nodes, "solved");

    candidates
        .iter()
        .zip(solution.values)
        .filter(|(_, q)| *q > 0)
        .map(|(c, quantity)| PlanItem {
            key: c.key.clone(),
            quantity,
        })
        .collect()
}

fn row(candidates: &[Candidate], rhs: i64, coefficient: impl Fn(&Candidate) -> i64) -> Row {
    Row {
        coefficients: candidates.iter().map(coefficient).collect(),
        rhs,
    }
}
