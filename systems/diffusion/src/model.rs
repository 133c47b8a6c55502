//! Adoption probability for a single uninformed cell.

use rumor_mill_core::DiffusionParameters;

/// Probability that an uninformed cell adopts during one generation.
///
/// Each informed weak tie and each informed network neighbour is an
/// independent exposure, and advertising is one more exposure that needs no
/// neighbour at all:
///
/// `P = 1 - (1 - a) * (1 - w)^j * (1 - n)^m`
///
/// where `j` is `weak_informed`, `m` is `network_informed`, and `a`, `w`, `n`
/// are the advertising, weak-tie and network effects.
#[must_use]
pub fn adoption_probability(
    weak_informed: u32,
    network_informed: u32,
    parameters: &DiffusionParameters,
) -> f64 {
    let untouched_by_advertising = 1.0 - parameters.advertising_effect();
    let untouched_by_weak_ties = (1.0 - parameters.weak_effect()).powi(exponent(weak_informed));
    let untouched_by_network =
        (1.0 - parameters.network_effect()).powi(exponent(network_informed));

    let retained = untouched_by_advertising * untouched_by_weak_ties * untouched_by_network;
    (1.0 - retained).clamp(0.0, 1.0)
}

fn exponent(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters(advertising: f64, weak: f64, network: f64) -> DiffusionParameters {
        DiffusionParameters::new(2, network, weak, advertising, 0)
    }

    #[test]
    fn no_exposure_means_no_adoption() {
        assert_eq!(adoption_probability(0, 0, &parameters(0.0, 0.7, 0.9)), 0.0);
        assert_eq!(adoption_probability(5, 3, &parameters(0.0, 0.0, 0.0)), 0.0);
        assert_eq!(adoption_probability(0, 3, &parameters(0.0, 0.4, 0.0)), 0.0);
    }

    #[test]
    fn full_advertising_guarantees_adoption() {
        assert_eq!(adoption_probability(0, 0, &parameters(1.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn combines_independent_exposures() {
        let probability = adoption_probability(0, 1, &parameters(0.5, 0.0, 0.5));
        assert!((probability - 0.75).abs() < 1e-12);

        let probability = adoption_probability(2, 0, &parameters(0.0, 0.5, 0.0));
        assert!((probability - 0.75).abs() < 1e-12);
    }

    #[test]
    fn stays_within_unit_interval_and_grows_with_exposure() {
        let effects = [0.0, 0.1, 0.5, 0.9, 1.0];
        for advertising in effects {
            for weak in effects {
                for network in effects {
                    let parameters = parameters(advertising, weak, network);
                    let mut previous = 0.0;
                    for count in 0..6 {
                        let probability = adoption_probability(count, count, &parameters);
                        assert!((0.0..=1.0).contains(&probability));
                        assert!(probability >= previous);
                        previous = probability;
                    }
                }
            }
        }
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let probability = adoption_probability(u32::MAX, u32::MAX, &parameters(0.0, 0.2, 0.2));
        assert!((probability - 1.0).abs() < 1e-12);
    }
}
