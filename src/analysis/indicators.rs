//! Rolling averages and return statistics over a close price series.

/// Rolling mean over `window` values with a minimum of one observation,
/// so the first `window - 1` entries average whatever history exists.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        out.push(sum / count as f64);
    }

    out
}

/// Relative change between consecutive values; one element shorter than the input.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Standard deviation of daily returns scaled by the square root of trading days per year
pub fn annualized_volatility(closes: &[f64], trading_days: f64) -> Option<f64> {
    let returns: Vec<f64> = pct_change(closes).into_iter().filter(|r| r.is_finite()).collect();
    sample_std(&returns).map(|s| s * trading_days.sqrt())
}

/// Percent change of the last value against the one before it
pub fn last_percent_change(values: &[f64]) -> Option<f64> {
    match values {
        [.., prev, last] if *prev != 0.0 => Some((last - prev) / prev * 100.0),
        _ => None,
    }
}

pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let (mx, my) = (mean(xs), mean(ys));

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}
