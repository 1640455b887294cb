//! Branch-and-bound for small packing integer programs.
//!
//! Every constraint has the form `Σ a_j·x_j <= b` with `a_j >= 0`, and every
//! variable is an integer in `0..=upper_j`. Objective weights and bonuses are
//! non-negative, the bonus `bonus_j` being earned once when `x_j > 0`. With
//! these signs lowering any variable keeps a point feasible, which is what the
//! search relies on.
//!
//! Only packing problems are supported. A negative coefficient, weight or
//! bonus breaks the bound and the feasibility argument, so such a problem has
//! no meaningful solution here; callers check with [`is_packing`].
//!
//! Variables are fixed in index order, larger values first, so ties resolve to
//! the earliest variable. Each node is pruned with the tightest
//! single-constraint fractional knapsack bound.

const EPS: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Row {
    pub coefficients: Vec<i64>,
    pub rhs: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Problem {
    pub objective: Vec<f64>,
    pub bonus: Vec<f64>,
    pub upper: Vec<i64>,
    pub rows: Vec<Row>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Solution {
    pub values: Vec<i64>,
    pub objective: f64,
    /// `false` when the node budget ran out before the search finished.
    pub optimal: bool,
    pub nodes: u64,
}

/// True when every coefficient, weight and bonus is non-negative.
pub(crate) fn is_packing(problem: &Problem) -> bool {
    problem
        .rows
        .iter()
        .all(|r| r.coefficients.iter().all(|a| *a >= 0))
        && problem
            .objective
            .iter()
            .chain(&problem.bonus)
            .all(|w| *w >= 0.0)
}

pub(crate) fn solve(problem: &Problem, node_limit: u64) -> Solution {
    let n = problem.objective.len();
    let mut search = Search {
        problem,
        slack: problem.rows.iter().map(|r| r.rhs.max(0)).collect(),
        current: vec![0; n],
        best: vec![0; n],
        best_value: 0.0,
        nodes: 0,
        node_limit: node_limit.max(1),
        exhausted: false,
    };
    search.branch(0, 0.0);

    Solution {
        values: search.best,
        objective: search.best_value,
        optimal: !search.exhausted,
        nodes: search.nodes,
    }
}

struct Search<'a> {
    problem: &'a Problem,
    slack: Vec<i64>,
    current: Vec<i64>,
    best: Vec<i64>,
    best_value: f64,
    nodes: u64,
    node_limit: u64,
    exhausted: bool,
}

impl Search<'_> {
    fn branch(&mut self, depth: usize, value: f64) {
        if self.nodes >= self.node_limit {
            self.exhausted = true;
            return;
        }
        self.nodes += 1;

        if value > self.best_value + EPS {
            self.best_value = value;
            self.best.clone_from(&self.current);
        }
        if depth == self.current.len() {
            return;
        }
        if value + self.bound(depth) <= self.best_value + EPS {
            return;
        }

        let reachable = self.reachable(depth);
        for quantity in (0..=reachable).rev() {
            self.set(depth, quantity);
            let gained = if quantity > 0 {
                self.problem.objective[depth] * quantity as f64 + self.problem.bonus[depth]
            } else {
                0.0
            };
            self.branch(depth + 1, value + gained);
            self.set(depth, 0);
            if self.exhausted {
                return;
            }
        }
    }

    /// Largest value variable `j` can take given the remaining slack.
    fn reachable(&self, j: usize) -> i64 {
        let mut cap = self.problem.upper[j].max(0);
        for (row, slack) in self.problem.rows.iter().zip(&self.slack) {
            let a = row.coefficients[j];
            if a > 0 {
                cap = cap.min(slack / a);
            }
        }
        cap
    }

    fn set(&mut self, j: usize, quantity: i64) {
        let delta = quantity - self.current[j];
        for (row, slack) in self.problem.rows.iter().zip(self.slack.iter_mut()) {
            *slack -= row.coefficients[j] * delta;
        }
        self.current[j] = quantity;
    }

    /// Upper bound on what variables `depth..` can still add.
    fn bound(&self, depth: usize) -> f64 {
        let caps: Vec<(usize, i64)> = (depth..self.current.len())
            .map(|j| (j, self.reachable(j)))
            .filter(|(_, cap)| *cap > 0)
            .collect();
        let bonus: f64 = caps.iter().map(|(j, _)| self.problem.bonus[*j]).sum();

        let mut best: f64 = caps
            .iter()
            .map(|(j, cap)| self.problem.objective[*j] * *cap as f64)
            .sum();

        for (row, slack) in self.problem.rows.iter().zip(&self.slack) {
            let mut total = 0.0;
            let mut items: Vec<(f64, i64)> = Vec::new();
            for (j, cap) in &caps {
                let weight = self.problem.objective[*j];
                let a = row.coefficients[*j];
                if a == 0 {
                    total += weight * *cap as f64;
                } else {
                    items.push((weight / a as f64, a * cap));
                }
            }
            items.sort_by(|x, y| y.0.total_cmp(&x.0));

            let mut room = *slack as f64;
            for (ratio, usage) in items {
                if room <= 0.0 {
                    break;
                }
                let used = room.min(usage as f64);
                total += ratio * used;
                room -= used;
            }
            best = best.min(total);
        }

        best + bonus
    }
}
