/// Metric name → raw text value pairs scraped from a statistics page, in page order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalMetrics {
    entries: Vec<(String, String)>,
}

impl FundamentalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a metric. A repeated name keeps its position and takes the new value.
    /// Returns `true` when the name was not present yet.
    pub fn insert(&mut self, name: &str, value: &str) -> bool {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(n, _)| n == name) {
            *existing = value.to_string();
            return false;
        }
        self.entries.push((name.to_string(), value.to_string()));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Looks a metric up by exact name, then by its label with footnote markers removed.
    ///
    /// Yahoo labels carry footnote digits and qualifiers such as
    /// `"Return on Equity (ttm)"` or `"Trailing P/E 3"`.
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some((_, v)) = self.entries.iter().find(|(n, _)| n == name) {
            return Some(v.as_str());
        }
        let wanted = name.to_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| {
                let label = strip_footnote(n).to_lowercase();
                label == wanted || label.starts_with(&format!("{} ", wanted))
            })
            .map(|(_, v)| v.as_str())
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(parse_metric_value)
    }
}

/// 去掉标签末尾的脚注编号
fn strip_footnote(label: &str) -> &str {
    label.trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace())
}

/// Parses values such as `12.34`, `-5.6%`, `1,234.5`. Placeholders yield `None`.
pub fn parse_metric_value(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect();
    if cleaned.is_empty() || cleaned == "N/A" || cleaned == "--" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FundamentalMetrics {
        let mut metrics = FundamentalMetrics::new();
        metrics.insert("Trailing P/E", "15.32");
        metrics.insert("Profit Margin", "7.85%");
        metrics.insert("Return on Equity (ttm)", "-1,204.50%");
        metrics.insert("Forward P/E 1", "N/A");
        metrics
    }

    #[test]
    fn repeated_name_takes_last_value_in_first_position() {
        let mut metrics = sample();
        assert!(!metrics.insert("Trailing P/E", "99"));
        assert_eq!(metrics.get("Trailing P/E"), Some("99"));
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics.iter().next(), Some(("Trailing P/E", "99")));
    }

    #[test]
    fn looks_up_labels_with_qualifiers_and_footnotes() {
        let metrics = sample();
        assert_eq!(metrics.get("Return on Equity"), Some("-1,204.50%"));
        assert_eq!(metrics.get("Forward P/E"), Some("N/A"));
        assert_eq!(metrics.get("Beta"), None);
    }

    #[test]
    fn parses_numeric_values() {
        let metrics = sample();
        assert_eq!(metrics.numeric("Trailing P/E"), Some(15.32));
        assert_eq!(metrics.numeric("Profit Margin"), Some(7.85));
        assert_eq!(metrics.numeric("Return on Equity"), Some(-1204.5));
        assert_eq!(metrics.numeric("Forward P/E"), None);
        assert_eq!(parse_metric_value("--"), None);
        assert_eq!(parse_metric_value("abc"), None);
    }
}
