//! Unit tests for tour reconstruction and validation.

use mtz_tour::error::{Error, Invariant};
use mtz_tour::formulation::{Formulation, FormulationBuilder};
use mtz_tour::matrix::CostMatrix;
use mtz_tour::solution::{tour_cost, SolutionExtractor, Tour};
use mtz_tour::solver::{Assignment, SolveStatus};

fn create_four_city_matrix() -> CostMatrix {
    CostMatrix::from_dense(&[
        vec![0.0, 10.0, 15.0, 20.0],
        vec![10.0, 0.0, 35.0, 25.0],
        vec![15.0, 35.0, 0.0, 30.0],
        vec![20.0, 25.0, 30.0, 0.0],
    ])
    .unwrap()
}

/// Assignment selecting exactly the given edges, with the given objective.
fn assignment_for_edges(
    formulation: &Formulation,
    edges: &[(usize, usize)],
    value: f64,
    objective: f64,
) -> Assignment {
    let mut values = vec![0.0; formulation.model.variable_count()];
    for &(from, to) in edges {
        values[formulation.edges.var(from, to).unwrap()] = value;
    }
    Assignment { values, objective }
}

fn expect_invariant(result: Result<Tour, Error>) -> Invariant {
    match result {
        Err(Error::InconsistentSolution { invariant, .. }) => invariant,
        other => panic!("expected InconsistentSolution, got {:?}", other),
    }
}

#[test]
fn test_extract_valid_tour() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment =
        assignment_for_edges(&formulation, &[(0, 1), (1, 3), (3, 2), (2, 0)], 1.0, 80.0);

    let tour = SolutionExtractor::default()
        .extract(&formulation, &matrix, SolveStatus::Optimal, Some(&assignment))
        .unwrap();

    assert_eq!(tour.order, vec![0, 1, 3, 2]);
    assert_eq!(tour.cost, 80.0);
    assert_eq!(tour.solver_objective, 80.0);
    assert!(tour.proven_optimal);
    assert_eq!(
        tour.edges().collect::<Vec<_>>(),
        vec![(0, 1), (1, 3), (3, 2), (2, 0)]
    );
}

#[test]
fn test_near_binary_values_are_accepted() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let mut assignment =
        assignment_for_edges(&formulation, &[(0, 2), (2, 3), (3, 1), (1, 0)], 0.9999997, 80.0);
    // Noise on an unselected edge stays below the threshold
    assignment.values[formulation.edges.var(0, 1).unwrap()] = 2e-7;

    let tour = SolutionExtractor::default()
        .extract(&formulation, &matrix, SolveStatus::Feasible, Some(&assignment))
        .unwrap();

    assert_eq!(tour.order, vec![0, 2, 3, 1]);
    assert!(!tour.proven_optimal);
}

#[test]
fn test_matrix_of_another_size_is_rejected() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment =
        assignment_for_edges(&formulation, &[(0, 1), (1, 3), (3, 2), (2, 0)], 1.0, 80.0);
    let smaller = CostMatrix::from_dense(&[
        vec![0.0, 1.0, 2.0],
        vec![1.0, 0.0, 3.0],
        vec![2.0, 3.0, 0.0],
    ])
    .unwrap();

    let result = SolutionExtractor::default().extract(
        &formulation,
        &smaller,
        SolveStatus::Optimal,
        Some(&assignment),
    );

    assert!(matches!(result, Err(Error::InvalidMatrix(_))));
}

#[test]
fn test_missing_assignment() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();

    let invariant = expect_invariant(SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        None,
    ));
    assert_eq!(invariant, Invariant::MissingAssignment);
}

#[test]
fn test_truncated_assignment() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment = Assignment {
        values: vec![1.0; 3],
        objective: 0.0,
    };

    let invariant = expect_invariant(SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        Some(&assignment),
    ));
    assert_eq!(
        invariant,
        Invariant::TruncatedAssignment {
            expected: 15,
            got: 3
        }
    );
}

#[test]
fn test_non_finite_value() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let mut assignment =
        assignment_for_edges(&formulation, &[(0, 1), (1, 3), (3, 2), (2, 0)], 1.0, 80.0);
    let var = formulation.edges.var(2, 1).unwrap();
    assignment.values[var] = f64::NAN;

    let invariant = expect_invariant(SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        Some(&assignment),
    ));
    assert_eq!(invariant, Invariant::NonFiniteValue { variable: var });
}

#[test]
fn test_subtour_is_reported_with_cycles() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment =
        assignment_for_edges(&formulation, &[(0, 1), (1, 0), (2, 3), (3, 2)], 1.0, 110.0);

    let result = SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        Some(&assignment),
    );
    match result {
        Err(Error::InconsistentSolution {
            invariant,
            snapshot,
        }) => {
            assert_eq!(
                invariant,
                Invariant::Subtour {
                    cycles: vec![vec![0, 1], vec![2, 3]]
                }
            );
            assert_eq!(snapshot.n, 4);
            assert_eq!(snapshot.selected_edges.len(), 4);
            assert_eq!(snapshot.objective, Some(110.0));
        }
        other => panic!("expected InconsistentSolution, got {:?}", other),
    }
}

#[test]
fn test_no_outgoing_edge() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment = assignment_for_edges(&formulation, &[(0, 1), (1, 3)], 1.0, 35.0);

    let invariant = expect_invariant(SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        Some(&assignment),
    ));
    assert_eq!(invariant, Invariant::NoOutgoingEdge { location: 3 });
}

#[test]
fn test_multiple_outgoing_edges() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment = assignment_for_edges(
        &formulation,
        &[(0, 1), (0, 2), (1, 3), (3, 2), (2, 0)],
        1.0,
        95.0,
    );

    let invariant = expect_invariant(SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        Some(&assignment),
    ));
    assert_eq!(
        invariant,
        Invariant::MultipleOutgoingEdges {
            location: 0,
            targets: vec![1, 2]
        }
    );
}

#[test]
fn test_open_tour() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    // Visits everything but the last location points back into the path
    let assignment =
        assignment_for_edges(&formulation, &[(0, 1), (1, 3), (3, 2), (2, 1)], 1.0, 100.0);

    let invariant = expect_invariant(SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        Some(&assignment),
    ));
    assert_eq!(invariant, Invariant::OpenTour { last: 2 });
}

#[test]
fn test_objective_mismatch() {
    let matrix = create_four_city_matrix();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment =
        assignment_for_edges(&formulation, &[(0, 1), (1, 3), (3, 2), (2, 0)], 1.0, 75.0);

    let invariant = expect_invariant(SolutionExtractor::default().extract(
        &formulation,
        &matrix,
        SolveStatus::Optimal,
        Some(&assignment),
    ));
    assert_eq!(
        invariant,
        Invariant::ObjectiveMismatch {
            reported: 75.0,
            recomputed: 80.0
        }
    );

    // Within the relative tolerance the tour is accepted
    let close = assignment_for_edges(
        &formulation,
        &[(0, 1), (1, 3), (3, 2), (2, 0)],
        1.0,
        80.0 + 1e-5,
    );
    assert!(SolutionExtractor::default()
        .extract(&formulation, &matrix, SolveStatus::Optimal, Some(&close))
        .is_ok());
}

#[test]
fn test_two_location_tour() {
    let matrix = CostMatrix::from_dense(&[vec![0.0, 3.0], vec![7.0, 0.0]]).unwrap();
    let formulation = FormulationBuilder::build(&matrix).unwrap();
    let assignment = assignment_for_edges(&formulation, &[(0, 1), (1, 0)], 1.0, 10.0);

    let tour = SolutionExtractor::default()
        .extract(&formulation, &matrix, SolveStatus::Optimal, Some(&assignment))
        .unwrap();
    assert_eq!(tour.order, vec![0, 1]);
    assert_eq!(tour.cost, 10.0);
}

#[test]
fn test_tour_rotation_and_reversal() {
    let matrix = create_four_city_matrix();
    let tour = Tour {
        order: vec![0, 1, 3, 2],
        cost: 80.0,
        solver_objective: 80.0,
        proven_optimal: true,
    };

    assert_eq!(tour.rotated_to(3), Some(vec![3, 2, 0, 1]));
    assert_eq!(tour.rotated_to(9), None);
    assert_eq!(tour.reversed(), vec![0, 2, 3, 1]);

    // Symmetric costs are invariant under rotation and reversal
    assert_eq!(tour_cost(&matrix, &tour.rotated_to(2).unwrap()), 80.0);
    assert_eq!(tour_cost(&matrix, &tour.reversed()), 80.0);
    assert_eq!(tour.cost_under(&matrix), 80.0);
}

#[test]
fn test_tour_debug_output() {
    let tour = Tour {
        order: vec![0, 1],
        cost: 4.0,
        solver_objective: 4.0,
        proven_optimal: false,
    };
    let debug_output = format!("{:?}", tour);

    assert!(debug_output.contains("Cost:"));
    assert!(debug_output.contains("Proven Optimal: false"));
    assert!(debug_output.contains("Order: [0, 1]"));
}
