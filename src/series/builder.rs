//! Observation rows → per-product aligned price/demand series.
//!
//! Steps:
//! 1. aggregate by `(product, period)`: mean price, summed demand
//! 2. pivot into two period-indexed tables (one column per product)
//! 3. forward-fill each column independently
//! 4. drop periods where either side is still missing

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Observation, ProductSeries};

/// Period-indexed table with one column per product.
///
/// `periods` is the sorted union of periods observed across all products; each
/// column has exactly `periods.len()` slots.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTable {
    pub periods: Vec<i64>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl PeriodTable {
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Forward-fill every column in place.
    pub fn forward_fill(&mut self) {
        for column in self.columns.values_mut() {
            forward_fill(column);
        }
    }
}

/// Aggregated `(period, price, demand)` cell for one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodCell {
    pub period: i64,
    pub price: f64,
    pub demand: f64,
}

#[derive(Debug, Default)]
struct Accum {
    price_sum: f64,
    count: usize,
    demand_sum: f64,
}

/// Group by `(product, period)`: arithmetic mean of prices, sum of demand.
pub fn aggregate(observations: &[Observation]) -> BTreeMap<String, Vec<PeriodCell>> {
    let mut groups: BTreeMap<(String, i64), Accum> = BTreeMap::new();
    for obs in observations {
        let acc = groups.entry((obs.name.clone(), obs.period)).or_default();
        acc.price_sum += obs.price;
        acc.count += 1;
        acc.demand_sum += obs.demand;
    }

    let mut out: BTreeMap<String, Vec<PeriodCell>> = BTreeMap::new();
    for ((name, period), acc) in groups {
        out.entry(name).or_default().push(PeriodCell {
            period,
            price: acc.price_sum / acc.count as f64,
            demand: acc.demand_sum,
        });
    }
    out
}

/// Pivot aggregated cells into `(price_table, demand_table)`.
pub fn pivot(cells: &BTreeMap<String, Vec<PeriodCell>>) -> (PeriodTable, PeriodTable) {
    let periods: Vec<i64> = cells
        .values()
        .flatten()
        .map(|c| c.period)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: BTreeMap<i64, usize> = periods.iter().enumerate().map(|(i, &p)| (p, i)).collect();

    let mut prices = BTreeMap::new();
    let mut demand = BTreeMap::new();
    for (name, product_cells) in cells {
        let mut price_col = vec![None; periods.len()];
        let mut demand_col = vec![None; periods.len()];
        for cell in product_cells {
            let i = index[&cell.period];
            price_col[i] = Some(cell.price);
            demand_col[i] = Some(cell.demand);
        }
        prices.insert(name.clone(), price_col);
        demand.insert(name.clone(), demand_col);
    }

    (
        PeriodTable {
            periods: periods.clone(),
            columns: prices,
        },
        PeriodTable {
            periods,
            columns: demand,
        },
    )
}

/// Propagate the last non-missing value forward. Leading gaps stay missing.
pub fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for slot in values.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => *slot = last,
        }
    }
}

/// Build per-product series from observations already filtered to one selection.
///
/// Products with no fully paired period are left out.
pub fn build_series(observations: &[Observation]) -> Vec<ProductSeries> {
    let cells = aggregate(observations);
    let (mut prices, mut demand) = pivot(&cells);
    prices.forward_fill();
    demand.forward_fill();

    let mut out = Vec::with_capacity(prices.columns.len());
    for (name, price_col) in &prices.columns {
        let Some(demand_col) = demand.column(name) else {
            continue;
        };

        let mut series = ProductSeries {
            name: name.clone(),
            periods: Vec::new(),
            prices: Vec::new(),
            demand: Vec::new(),
        };
        for ((&period, price), qty) in prices.periods.iter().zip(price_col).zip(demand_col) {
            if let (Some(p), Some(q)) = (price, qty) {
                series.periods.push(period);
                series.prices.push(*p);
                series.demand.push(*q);
            }
        }

        if !series.is_empty() {
            out.push(series);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(name: &str, period: i64, price: f64, demand: f64) -> Observation {
        Observation {
            name: name.to_string(),
            merchant: "m".to_string(),
            category: "c".to_string(),
            period,
            price,
            demand,
            brand: None,
        }
    }

    #[test]
    fn aggregate_means_price_and_sums_demand() {
        let rows = vec![
            obs("A", 1, 10.0, 5.0),
            obs("A", 1, 14.0, 7.0),
            obs("A", 2, 9.0, 3.0),
        ];
        let cells = aggregate(&rows);
        let a = &cells["A"];
        assert_eq!(a.len(), 2);
        assert_eq!(a[0], PeriodCell { period: 1, price: 12.0, demand: 12.0 });
        assert_eq!(a[1], PeriodCell { period: 2, price: 9.0, demand: 3.0 });
    }

    #[test]
    fn pivot_uses_union_of_periods() {
        let rows = vec![obs("A", 1, 1.0, 1.0), obs("A", 3, 3.0, 3.0), obs("B", 2, 2.0, 2.0)];
        let (prices, demand) = pivot(&aggregate(&rows));
        assert_eq!(prices.periods, vec![1, 2, 3]);
        assert_eq!(prices.column("A").unwrap(), &[Some(1.0), None, Some(3.0)]);
        assert_eq!(demand.column("B").unwrap(), &[None, Some(2.0), None]);
    }

    #[test]
    fn forward_fill_never_fills_backwards() {
        let mut col = vec![None, Some(2.0), None, None, Some(5.0), None];
        forward_fill(&mut col);
        assert_eq!(col, vec![None, Some(2.0), Some(2.0), Some(2.0), Some(5.0), Some(5.0)]);
    }

    #[test]
    fn forward_fill_is_idempotent() {
        let mut col = vec![None, Some(1.0), None, Some(4.0), None];
        forward_fill(&mut col);
        let once = col.clone();
        forward_fill(&mut col);
        assert_eq!(col, once);
    }

    #[test]
    fn filled_gap_equals_nearest_preceding_value() {
        let mut col = vec![Some(7.0), None, Some(3.0), None, None];
        let original = col.clone();
        forward_fill(&mut col);
        for k in 0..col.len() {
            if original[k].is_none() {
                let prev = original[..k].iter().rev().find_map(|v| *v);
                assert_eq!(col[k], prev);
            }
        }
    }

    #[test]
    fn build_series_drops_leading_gaps_and_fills_inner_ones() {
        let rows = vec![
            obs("A", 1, 10.0, 100.0),
            obs("A", 2, 11.0, 90.0),
            obs("A", 3, 12.0, 80.0),
            obs("A", 4, 13.0, 70.0),
            obs("B", 2, 5.0, 50.0),
            obs("B", 4, 6.0, 40.0),
        ];
        let series = build_series(&rows);
        assert_eq!(series.len(), 2);

        let b = series.iter().find(|s| s.name == "B").unwrap();
        // Period 1 has nothing before it for B, period 3 is filled from period 2.
        assert_eq!(b.periods, vec![2, 3, 4]);
        assert_eq!(b.prices, vec![5.0, 5.0, 6.0]);
        assert_eq!(b.demand, vec![50.0, 50.0, 40.0]);
    }

    #[test]
    fn build_series_on_empty_input_is_empty() {
        assert!(build_series(&[]).is_empty());
    }
}
