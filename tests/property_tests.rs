//! Property-based tests for data generation and expressions.

use l0mip::bigm::big_m;
use l0mip::prelude::*;
use proptest::prelude::*;

fn spec_strategy() -> impl Strategy<Value = RegressionSpec> {
    (1usize..12, 1usize..12, any::<u64>())
        .prop_flat_map(|(samples, features, seed)| {
            (0..=features).prop_map(move |informative| {
                RegressionSpec::new(samples, features, informative, seed)
            })
        })
}

proptest! {
    /// Same parameters, same dataset
    #[test]
    fn generator_is_deterministic(spec in spec_strategy()) {
        let first = make_regression(&spec).unwrap();
        let second = make_regression(&spec).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Shapes and support size follow the parameters
    #[test]
    fn generator_respects_shape(spec in spec_strategy()) {
        let data = make_regression(&spec).unwrap();
        prop_assert_eq!(data.samples(), spec.samples);
        prop_assert_eq!(data.features(), spec.features);
        prop_assert_eq!(data.y.len(), spec.samples);
        prop_assert!(data.support().len() <= spec.informative);
    }

    /// Big-M scales linearly with its factor
    #[test]
    fn big_m_is_linear_in_factor(seed in any::<u64>(), factor in 1.01f64..10.0) {
        let data = make_regression(&RegressionSpec::new(6, 4, 2, seed)).unwrap();
        prop_assume!(data.support().len() == 2);
        let base = big_m(&data.a, &data.y, 1.0).unwrap();
        let scaled = big_m(&data.a, &data.y, factor).unwrap();
        prop_assert!((scaled - factor * base).abs() <= 1e-9 * scaled.abs());
    }

    /// Expression evaluation is linear
    #[test]
    fn linear_expression_evaluation(
        c1 in prop::collection::vec(-10.0f64..10.0, 4),
        c2 in prop::collection::vec(-10.0f64..10.0, 4),
        point in prop::collection::vec(-10.0f64..10.0, 4),
        alpha in -5.0f64..5.0,
    ) {
        let mut model = Model::new("linearity");
        let x = model.add_vars(4, VariableBuilder::continuous());
        let build = |coeffs: &[f64]| {
            x.iter()
                .zip(coeffs)
                .fold(LinExpr::constant(1.0), |acc, (v, &c)| acc + c * v)
        };
        let e1 = build(&c1);
        let e2 = build(&c2);

        let combined = alpha * e1.clone() + e2.clone();
        let expected = alpha * e1.evaluate(&point) + e2.evaluate(&point);
        prop_assert!((combined.evaluate(&point) - expected).abs() < 1e-9 * (1.0 + expected.abs()));
    }

    /// A sum of squares never evaluates negative
    #[test]
    fn sum_squares_is_nonnegative(
        coeffs in prop::collection::vec(-10.0f64..10.0, 6),
        point in prop::collection::vec(-10.0f64..10.0, 3),
    ) {
        let mut model = Model::new("squares");
        let x = model.add_vars(3, VariableBuilder::continuous());
        let a = nalgebra::DMatrix::from_row_slice(2, 3, &coeffs);
        let y = nalgebra::DVector::from_vec(vec![1.0, -1.0]);
        let r = AffineVec::residual(&y, &a, &x).unwrap();
        let value = r.sum_squares().evaluate(&point);
        prop_assert!(value >= 0.0);
        let direct = r.evaluate(&point).norm_squared();
        prop_assert!((value - direct).abs() < 1e-9 * (1.0 + direct));
    }
}
