//! Moment and quantile helpers with pandas-compatible definitions: sample
//! standard deviation (ddof = 1), linear-interpolation quantiles, adjusted
//! Fisher-Pearson skewness and bias-corrected excess kurtosis. Helpers
//! return `None` when the statistic is undefined for the sample.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile of an unsorted sample, `q` in [0, 1], linear interpolation
/// between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Adjusted Fisher-Pearson skewness G1; undefined for n < 3 or a constant
/// sample.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if n < 3.0 {
        return None;
    }
    let m = mean(values)?;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / n;
    if m2 <= 0.0 {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Bias-corrected excess kurtosis G2; undefined for n < 4 or a constant
/// sample.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if n < 4.0 {
        return None;
    }
    let m = mean(values)?;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / n;
    if m2 <= 0.0 {
        return None;
    }
    let g2 = m4 / (m2 * m2) - 3.0;
    Some(((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

/// Pearson correlation coefficient; undefined when either sample is
/// constant or the inputs are mismatched.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }
    let denom = (vx * vy).sqrt();
    if denom == 0.0 {
        return None;
    }
    let r = cov / denom;
    r.is_finite().then_some(r)
}

/// Pairwise correlation matrix over column value vectors, undefined entries
/// normalized to zero.
pub fn correlation_matrix(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            matrix[i][j] = pearson(&columns[i], &columns[j]).unwrap_or(0.0);
        }
    }
    matrix
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_uses_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.25), Some(1.75));
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(quantile(&values, 0.75), Some(3.25));
        assert_eq!(median(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn sample_std_uses_ddof_one() {
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(sample_std(&[5.0]), None);
    }

    #[test]
    fn skewness_matches_adjusted_fisher_pearson() {
        // Symmetric sample has zero skew.
        assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap().abs() < 1e-12);
        // Right-tailed sample; reference value from the G1 definition.
        let skew = skewness(&[1.0, 2.0, 3.0, 4.0, 10.0]).unwrap();
        assert!((skew - 1.6970).abs() < 1e-3);
        assert_eq!(skewness(&[1.0, 1.0, 1.0]), None);
    }

    #[test]
    fn kurtosis_is_bias_corrected_excess() {
        // Uniform 1..=5 has G2 = -1.2.
        let kurt = excess_kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((kurt - (-1.2)).abs() < 1e-12);
        assert_eq!(excess_kurtosis(&[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn pearson_handles_perfect_and_degenerate_cases() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
    }

    #[test]
    fn correlation_matrix_zeroes_undefined_entries() {
        let matrix = correlation_matrix(&[vec![1.0, 2.0, 3.0], vec![4.0, 4.0, 4.0]]);
        assert_eq!(matrix[0][0], 1.0);
        assert_eq!(matrix[0][1], 0.0);
        assert_eq!(matrix[1][1], 0.0); // constant column, even on the diagonal
    }
}
