//! Generalized assignment problem data.
//!
//! Five items are assigned to three agents. Assigning item `i` to agent `j`
//! earns `profits[i][j]` and uses `weights[i][j]` of the agent's capacity.

/// A generalized assignment instance (maximization).
#[derive(Debug, Clone, PartialEq)]
pub struct GapInstance {
    pub capacities: Vec<f64>,
    pub profits: Vec<Vec<f64>>,
    pub weights: Vec<Vec<f64>>,
}

impl GapInstance {
    /// The instance from Wolsey, *Integer Programming*, p. 182.
    pub fn wolsey() -> Self {
        Self {
            capacities: vec![15.0, 15.0, 15.0],
            profits: rows(&[
                [6.0, 10.0, 1.0],
                [12.0, 12.0, 5.0],
                [15.0, 4.0, 3.0],
                [10.0, 3.0, 9.0],
                [8.0, 9.0, 5.0],
            ]),
            weights: rows(&[
                [5.0, 7.0, 2.0],
                [14.0, 8.0, 7.0],
                [10.0, 6.0, 12.0],
                [8.0, 4.0, 15.0],
                [6.0, 12.0, 5.0],
            ]),
        }
    }

    /// Best integral profit of [`GapInstance::wolsey`].
    pub const WOLSEY_OPTIMUM: f64 = 43.0;

    pub fn items(&self) -> usize {
        self.profits.len()
    }

    pub fn agents(&self) -> usize {
        self.capacities.len()
    }

    /// Profit of an integral assignment, `assignment[i]` being the agent of
    /// item `i`.
    pub fn profit(&self, assignment: &[usize]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(i, &j)| self.profits[i][j])
            .sum()
    }

    /// True if no agent is loaded over its capacity.
    pub fn is_feasible(&self, assignment: &[usize]) -> bool {
        let mut load = vec![0.0; self.agents()];
        for (i, &j) in assignment.iter().enumerate() {
            load[j] += self.weights[i][j];
        }
        load.iter().zip(&self.capacities).all(|(l, cap)| l <= cap)
    }
}

fn rows(data: &[[f64; 3]]) -> Vec<Vec<f64>> {
    data.iter().map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_optimum_is_feasible() {
        let gap = GapInstance::wolsey();
        let best = [1, 1, 2, 0, 0];

        assert!(gap.is_feasible(&best));
        assert_eq!(gap.profit(&best), GapInstance::WOLSEY_OPTIMUM);
    }

    #[test]
    fn test_overloaded_agent_is_infeasible() {
        let gap = GapInstance::wolsey();
        assert!(!gap.is_feasible(&[0, 0, 0, 0, 0]));
    }
}
