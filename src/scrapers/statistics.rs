use crate::errors::{AnalysisError, Result};
use crate::models::fundamentals::FundamentalMetrics;
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};

/// Class attribute of the metric name cells on the key statistics page
pub const METRIC_NAME_CLASS: &str = "Fz(s) Fw(500) Ta(end) Pstart(10px) Miw(60px)";
/// Class attribute of the metric value cells
pub const METRIC_VALUE_CLASS: &str = "Fz(s) Ta(end) Pstart(10px) Miw(60px)";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AnalysisError::SelectorError(format!("{}: {}", css, e)))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 解析关键统计页面
///
/// Name and value cells are matched on their exact class attribute and paired
/// by position. When the page carries none of those cells (the markup changes
/// often), every table row with at least two cells is read as label / value.
pub fn parse_key_statistics(html: &str) -> Result<FundamentalMetrics> {
    let document = Html::parse_document(html);
    let td = selector("td")?;

    let mut names = Vec::new();
    let mut values = Vec::new();
    for cell in document.select(&td) {
        match cell.value().attr("class") {
            Some(METRIC_NAME_CLASS) => names.push(cell_text(&cell)),
            Some(METRIC_VALUE_CLASS) => values.push(cell_text(&cell)),
            _ => {}
        }
    }

    let mut metrics = FundamentalMetrics::new();

    if !names.is_empty() {
        if names.len() != values.len() {
            warn!("Found {} metric names but {} values", names.len(), values.len());
        }
        for (name, value) in names.iter().zip(values.iter()) {
            if !name.is_empty() {
                metrics.insert(name, value);
            }
        }
        debug!("Extracted {} metrics from class-keyed cells", metrics.len());
        return Ok(metrics);
    }

    let tr = selector("tr")?;
    for row in document.select(&tr) {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        if cells.len() < 2 {
            continue;
        }
        let name = cell_text(&cells[0]);
        if !name.is_empty() {
            metrics.insert(&name, &cell_text(&cells[1]));
        }
    }
    debug!("Extracted {} metrics from table rows", metrics.len());

    Ok(metrics)
}
