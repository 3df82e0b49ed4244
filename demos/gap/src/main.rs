//! Generalized Assignment Example
//!
//! Five jobs are assigned to three machines (Wolsey, *Integer Programming*,
//! p. 182). Every job goes to exactly one machine and every machine has a
//! capacity. The assignment rows are dualized, leaving one knapsack per
//! machine in the subproblem.
//!
//! The assignment variables are binary, so every subproblem is a set of
//! 0/1 knapsacks solved by branch and bound, and the Lagrangian bound can
//! land below the LP relaxation bound. Run from this directory to pick up
//! `relaxation.toml`, with `RUST_LOG=relaxforge_solver=debug` for one line
//! per iteration.

use relaxforge::prelude::*;
use relaxforge::run_relaxation;

const CAPACITIES: [f64; 3] = [15.0, 15.0, 15.0];

const PROFITS: [[f64; 3]; 5] = [
    [6.0, 10.0, 1.0],
    [12.0, 12.0, 5.0],
    [15.0, 4.0, 3.0],
    [10.0, 3.0, 9.0],
    [8.0, 9.0, 5.0],
];

const WEIGHTS: [[f64; 3]; 5] = [
    [5.0, 7.0, 2.0],
    [14.0, 8.0, 7.0],
    [10.0, 6.0, 12.0],
    [8.0, 4.0, 15.0],
    [6.0, 12.0, 5.0],
];

fn main() -> relaxforge::Result<()> {
    let mut lr = LagrangianModel::new(MicrolpModel::new());

    // x[i][j] = 1 if job i is assigned to machine j
    let x: Vec<Vec<VarId>> = PROFITS
        .iter()
        .map(|row| {
            row.iter()
                .map(|_| lr.add_typed_var(VarBounds::between(0.0, 1.0), VarType::Binary))
                .collect()
        })
        .collect();
    lr.update()?;

    // sum_j x[i][j] == 1 for every job, relaxed
    for x_i in &x {
        lr.dualize(x_i.iter().copied().sum::<LinearExpr>().equals(1.0))?;
    }

    // sum_i a[i][j] x[i][j] <= b[j] for every machine, kept
    for (j, &capacity) in CAPACITIES.iter().enumerate() {
        let load: LinearExpr = x
            .iter()
            .zip(&WEIGHTS)
            .map(|(x_i, a_i)| a_i[j] * x_i[j])
            .sum();
        lr.add_constr(load.leq(capacity))?;
    }

    let profit: LinearExpr = x
        .iter()
        .zip(&PROFITS)
        .flat_map(|(x_i, c_i)| x_i.iter().zip(c_i).map(|(&x_ij, &c_ij)| c_ij * x_ij))
        .sum();
    lr.set_objective(profit, Direction::Maximize);

    let outcome = run_relaxation(&mut lr)?;

    println!();
    println!(
        "status = {:?} after {} iterations",
        outcome.status, outcome.iterations
    );
    if let Some(bound) = outcome.objective_value() {
        println!("objective = {:.4}", bound);
    }
    println!("multipliers = {:?}", lr.multipliers());

    println!("x = [");
    for x_i in &x {
        let row: Vec<u8> = x_i
            .iter()
            .map(|&x_ij| u8::from(lr.inner().value(x_ij).unwrap_or(0.0) >= 0.5))
            .collect();
        println!("    {:?}", row);
    }
    println!("]");

    Ok(())
}
