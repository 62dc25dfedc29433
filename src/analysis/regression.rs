use crate::errors::{AnalysisError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Ordinary least squares with an intercept
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Fits on centered data with a Householder QR factorization.
    ///
    /// Columns are pivoted by remaining norm; columns that are linear
    /// combinations of the ones already chosen (a negligible pivot in R)
    /// receive a coefficient of 0.
    pub fn fit(features: &[Vec<f64>], target: &[f64]) -> Result<Self> {
        let n = features.len();
        if n == 0 || n != target.len() {
            return Err(AnalysisError::InsufficientData(format!(
                "regression needs matching non-empty inputs, got {} rows and {} targets",
                n,
                target.len()
            )));
        }
        let p = features[0].len();
        if features.iter().any(|row| row.len() != p) {
            return Err(AnalysisError::DataError("feature rows have different widths".to_string()));
        }

        let x_mean: Vec<f64> = (0..p)
            .map(|j| features.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = target.iter().sum::<f64>() / n as f64;

        let mut a: Vec<Vec<f64>> = features
            .iter()
            .map(|row| row.iter().zip(&x_mean).map(|(v, m)| v - m).collect())
            .collect();
        let mut b: Vec<f64> = target.iter().map(|v| v - y_mean).collect();

        let perm = householder_qr(&mut a, &mut b);
        let solved = back_substitute(&a, &b, p);
        let mut coefficients = vec![0.0; p];
        for (k, &j) in perm.iter().enumerate() {
            coefficients[j] = solved[k];
        }

        let intercept = y_mean - coefficients.iter().zip(&x_mean).map(|(c, m)| c * m).sum::<f64>();
        Ok(Self { intercept, coefficients })
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(row).map(|(c, v)| c * v).sum::<f64>()
    }

    pub fn predict(&self, features: &[Vec<f64>]) -> Vec<f64> {
        features.iter().map(|row| self.predict_one(row)).collect()
    }
}

// 列主元 QR：就地把 a 变换为 R，b 变换为 Qᵀb，返回列置换
fn householder_qr(a: &mut [Vec<f64>], b: &mut [f64]) -> Vec<usize> {
    let n = a.len();
    let p = a.first().map(|r| r.len()).unwrap_or(0);
    let mut perm: Vec<usize> = (0..p).collect();

    for k in 0..n.min(p) {
        let mut pivot = k;
        let mut pivot_norm = -1.0;
        for j in k..p {
            let s: f64 = (k..n).map(|i| a[i][j] * a[i][j]).sum();
            if s > pivot_norm {
                pivot = j;
                pivot_norm = s;
            }
        }
        if pivot_norm <= 0.0 {
            break;
        }
        if pivot != k {
            for row in a.iter_mut() {
                row.swap(k, pivot);
            }
            perm.swap(k, pivot);
        }

        let norm = pivot_norm.sqrt();
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (k..n).map(|i| a[i][k]).collect();
        v[0] -= alpha;
        let v_norm2 = v.iter().map(|x| x * x).sum::<f64>();
        if v_norm2 == 0.0 {
            continue;
        }

        for j in k..p {
            let s: f64 = (k..n).map(|i| v[i - k] * a[i][j]).sum();
            let f = 2.0 * s / v_norm2;
            for i in k..n {
                a[i][j] -= f * v[i - k];
            }
        }
        let s: f64 = (k..n).map(|i| v[i - k] * b[i]).sum();
        let f = 2.0 * s / v_norm2;
        for i in k..n {
            b[i] -= f * v[i - k];
        }
    }

    perm
}

fn back_substitute(r: &[Vec<f64>], qtb: &[f64], p: usize) -> Vec<f64> {
    let n = r.len();
    let max_diag = (0..n.min(p)).map(|i| r[i][i].abs()).fold(0.0, f64::max);
    let tol = max_diag * 1e-10 * n.max(p) as f64;

    let mut beta = vec![0.0; p];
    for j in (0..p).rev() {
        if j >= n || r[j][j].abs() <= tol {
            continue;
        }
        let s: f64 = ((j + 1)..p).map(|l| r[j][l] * beta[l]).sum();
        beta[j] = (qtb[j] - s) / r[j][j];
    }
    beta
}

/// Shuffled train/test row indices; the test side holds `ceil(n * test_size)` rows.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    // 减去极小量，避免乘积的浮点误差向上多取一行
    let n_test = (n as f64 * test_size - 1e-9).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(AnalysisError::InsufficientData(format!(
            "cannot split {} rows with test size {}",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return f64::NAN;
    }
    actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n as f64
}

/// Coefficient of determination. A constant target scores 1.0 when predicted exactly, else 0.0.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return f64::NAN;
    }
    let mean = actual[..n].iter().sum::<f64>() / n as f64;
    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actual[..n].iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
