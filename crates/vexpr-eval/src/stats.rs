//! Reducing statistics: whole window in, one scalar out.
//!
//! Reductions with no defined value on an empty input return NaN, which
//! the classifier reports as a domain error.

/// Compensated sum (Kahan, with Neumaier's correction for addends larger
/// than the running total).
///
/// An infinite running total is returned as is; the compensation term
/// would otherwise turn it into NaN.
pub fn sum(values: &[f64]) -> f64 {
    let mut total = 0.0;
    let mut compensation = 0.0;
    for &x in values {
        let t = total + x;
        if t.is_infinite() {
            return t;
        }
        if f64::abs(total) >= f64::abs(x) {
            compensation += (total - t) + x;
        } else {
            compensation += (x - t) + total;
        }
        total = t;
    }
    total + compensation
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

/// Sample variance (divisor `n - 1`); zero below two elements.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let squares: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    squares / (values.len() - 1) as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Mean absolute deviation from the mean.
pub fn avg_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).abs()).sum::<f64>() / values.len() as f64
}

/// Sample standard deviation of `values` about `m`, or `None` when it is
/// zero (no spread to standardize by).
fn spread(values: &[f64], m: f64) -> Option<f64> {
    let squares: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    let sd = (squares / (values.len() - 1) as f64).sqrt();
    (sd != 0.0).then_some(sd)
}

/// Skewness from absolute deviations: `Σ|x - mean|³ / (n · var^1.5)`.
///
/// Deviations are cubed after taking their magnitude, so the statistic is
/// never negative. Deviations are standardized before cubing so large
/// but finite inputs do not overflow.
pub fn skew(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let Some(sd) = spread(values, m) else {
        return 0.0;
    };
    if sd.is_infinite() {
        return sd;
    }
    let cubes: f64 = values.iter().map(|x| ((x - m) / sd).abs().powi(3)).sum();
    cubes / n as f64
}

/// Excess kurtosis (Fisher): `Σ(x - mean)⁴ / (n · var²) - 3`.
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let Some(sd) = spread(values, m) else {
        return 0.0;
    };
    if sd.is_infinite() {
        return sd;
    }
    let fourths: f64 = values.iter().map(|x| ((x - m) / sd).powi(4)).sum();
    fourths / n as f64 - 3.0
}

/// Indices of `values` in ascending value order. Stable.
pub fn sorted_indices(values: &[f64]) -> Vec<usize> {
    let mut map: Vec<usize> = (0..values.len()).collect();
    map.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    map
}

/// Median of the order statistics named by `map`.
fn middle(values: &[f64], map: &[usize]) -> f64 {
    let n = map.len();
    if n == 0 {
        return f64::NAN;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        values[map[mid]]
    } else {
        (values[map[mid - 1]] + values[map[mid]]) * 0.5
    }
}

pub fn median(values: &[f64]) -> f64 {
    middle(values, &sorted_indices(values))
}

/// First quartile: the minimum below four elements, else the median of the
/// lower half of the order statistics.
pub fn q1(values: &[f64]) -> f64 {
    let map = sorted_indices(values);
    match map.len() {
        0 => f64::NAN,
        n if n < 4 => values[map[0]],
        n => middle(values, &map[..n / 2]),
    }
}

/// Third quartile: the maximum below four elements, else the median of the
/// upper half of the order statistics.
pub fn q3(values: &[f64]) -> f64 {
    let map = sorted_indices(values);
    match map.len() {
        0 => f64::NAN,
        n if n < 4 => values[map[n - 1]],
        n => middle(values, &map[n - n / 2..]),
    }
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

pub fn product(values: &[f64]) -> f64 {
    values.iter().product()
}

/// Number of elements equal to zero.
pub fn zero_count(values: &[f64]) -> f64 {
    values.iter().filter(|&&x| x == 0.0).count() as f64
}

pub fn length(values: &[f64]) -> f64 {
    values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_compensated_sum_beats_naive() {
        let data = [1e16, 1.0, -1e16];
        let naive: f64 = data.iter().fold(0.0, |acc, x| acc + x);
        let compensated = sum(&data);
        assert!((compensated - 1.0).abs() < (naive - 1.0).abs());
        assert_eq!(compensated, 1.0);
    }

    #[test]
    fn test_sum_many_small() {
        let data = vec![0.1; 1000];
        assert!(close(sum(&data), 100.0));
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn test_mean_and_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&data), 5.0);
        assert!(close(variance(&data), 32.0 / 7.0));
        assert!(close(std_dev(&data), (32.0f64 / 7.0).sqrt()));
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_variance_below_two_is_zero() {
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[3.0]), 0.0);
        assert_eq!(std_dev(&[3.0]), 0.0);
    }

    #[test]
    fn test_avg_deviation() {
        assert_eq!(avg_deviation(&[1.0, 2.0, 3.0, 4.0]), 1.0);
        assert!(avg_deviation(&[]).is_nan());
    }

    #[test]
    fn test_skew_uses_magnitudes() {
        let right = [1.0, 2.0, 3.0, 10.0];
        let left = [-1.0, -2.0, -3.0, -10.0];
        assert!(skew(&right) > 0.0);
        assert!(close(skew(&right), skew(&left)));
        assert_eq!(skew(&[5.0]), 0.0);
        assert_eq!(skew(&[5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_skew_value() {
        // mean 2, |d| = 1,0,1, var = 2/2 = 1, Σ|d|³ = 2
        assert!(close(skew(&[1.0, 2.0, 3.0]), 2.0 / 3.0));
    }

    #[test]
    fn test_kurtosis_value() {
        // mean 2.5, d² = 2.25,0.25,0.25,2.25; var = 5/3; Σd⁴ = 10.25
        let expected = 10.25 / (4.0 * (5.0 / 3.0) * (5.0 / 3.0)) - 3.0;
        assert!(close(kurtosis(&[1.0, 2.0, 3.0, 4.0]), expected));
        assert_eq!(kurtosis(&[1.0]), 0.0);
    }

    #[test]
    fn test_sum_stops_at_overflow() {
        assert_eq!(sum(&[1e308, 1e308]), f64::INFINITY);
        assert_eq!(sum(&[-1e308, -1e308, 1.0]), f64::NEG_INFINITY);
        assert_eq!(mean(&[1e308, 1e308]), f64::INFINITY);
    }

    #[test]
    fn test_shape_statistics_are_scale_invariant() {
        let small = [1.0, -1.0, 0.0];
        let large = [1e100, -1e100, 0.0];
        assert!(kurtosis(&large).is_finite());
        assert!(close(kurtosis(&large), kurtosis(&small)));
        assert!(close(kurtosis(&small), 2.0 / 3.0 - 3.0));
        assert!(close(skew(&[1e100, 2e100, 3e100]), 2.0 / 3.0));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[9.0, 1.0, 5.0]), 5.0);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_quartiles_small_inputs() {
        assert_eq!(q1(&[5.0, 1.0]), 1.0);
        assert_eq!(q3(&[5.0, 1.0]), 5.0);
        assert_eq!(q1(&[7.0]), 7.0);
        assert_eq!(q3(&[3.0, 9.0, 1.0]), 9.0);
        assert!(q1(&[]).is_nan());
    }

    #[test]
    fn test_quartiles_even_halves_average() {
        assert_eq!(q1(&[4.0, 3.0, 2.0, 1.0]), 1.5);
        assert_eq!(q3(&[4.0, 3.0, 2.0, 1.0]), 3.5);
        assert_eq!(q1(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]), 2.5);
        assert_eq!(q3(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]), 6.5);
    }

    #[test]
    fn test_quartiles_odd_halves_pick_center() {
        let data = [6.0, 1.0, 5.0, 2.0, 4.0, 3.0];
        assert_eq!(q1(&data), 2.0);
        assert_eq!(q3(&data), 5.0);
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(q1(&data), 2.0);
        assert_eq!(q3(&data), 6.0);
    }

    #[test]
    fn test_sorted_indices_is_stable_permutation() {
        let data = [3.0, 1.0, 3.0, 0.0];
        assert_eq!(sorted_indices(&data), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_min_max_product_counts() {
        let data = [3.0, -1.0, 0.0, 8.0, 0.0];
        assert_eq!(min(&data), -1.0);
        assert_eq!(max(&data), 8.0);
        assert_eq!(product(&[2.0, 3.0, 4.0]), 24.0);
        assert_eq!(product(&[]), 1.0);
        assert_eq!(zero_count(&data), 2.0);
        assert_eq!(length(&data), 5.0);
        assert!(min(&[]).is_nan());
        assert!(max(&[]).is_nan());
    }
}
