//! Seeded demo datasets, so the dashboard has something to show without a file.

use crate::error::{DashError, Result, ResultExt as _};
use chrono::{Datelike as _, Days, NaiveDate};
use polars::prelude::*;
use rand::distr::Distribution as _;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RECORDS: usize = 2000;
pub const DEFAULT_SEED: u64 = 42;

const PRODUCTS: [(&str, &str, f64, f64); 10] = [
    // name, category, base price, weight
    ("Laptop", "Computers", 1200.0, 0.15),
    ("Phone", "Mobile", 800.0, 0.20),
    ("Tablet", "Mobile", 500.0, 0.12),
    ("Headphones", "Accessories", 150.0, 0.10),
    ("Mouse", "Accessories", 50.0, 0.08),
    ("Keyboard", "Accessories", 80.0, 0.07),
    ("Monitor", "Computers", 350.0, 0.13),
    ("Webcam", "Accessories", 100.0, 0.05),
    ("Speaker", "Accessories", 120.0, 0.06),
    ("Charger", "Accessories", 30.0, 0.04),
];

const REGIONS: [(&str, f64); 5] = [
    ("North", 0.22),
    ("South", 0.18),
    ("East", 0.25),
    ("West", 0.20),
    ("Central", 0.15),
];

const CHANNELS: [(&str, f64); 3] = [("Online", 0.45), ("Retail", 0.35), ("Partner", 0.20)];

const SEGMENTS: [(&str, f64); 3] = [("Enterprise", 0.25), ("SMB", 0.35), ("Consumer", 0.40)];

/// Quantity multiplier for January through December.
const MONTH_MULTIPLIERS: [f64; 12] = [
    0.8, 0.85, 0.9, 1.0, 1.0, 1.1, 1.15, 1.1, 1.0, 1.05, 1.3, 1.4,
];

const TOP_PRODUCTS: [&str; 10] = [
    "Laptop Pro",
    "Smartphone X",
    "Tablet Mini",
    "Wireless Headphones",
    "Gaming Mouse",
    "Mechanical Keyboard",
    "4K Monitor",
    "HD Webcam",
    "Bluetooth Speaker",
    "Fast Charger",
];

const SALES_REPS: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemoDataset {
    #[default]
    Sales,
    Monthly,
    TopProducts,
}

impl DemoDataset {
    pub const ALL: [Self; 3] = [Self::Sales, Self::Monthly, Self::TopProducts];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Monthly => "monthly",
            Self::TopProducts => "top-products",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sales => "Detailed sales",
            Self::Monthly => "Monthly statistics (12 months)",
            Self::TopProducts => "Top products (10 items)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Sales => {
                "Order-level sales with products, regions, channels and customer segments"
            }
            Self::Monthly => "Monthly revenue, order and customer totals for 2023",
            Self::TopProducts => "Best-selling products with sales metrics and ratings",
        }
    }

    /// Generates the dataset. `records` only applies to [`DemoDataset::Sales`].
    pub fn generate(&self, records: usize, seed: u64) -> Result<DataFrame> {
        let df = match self {
            Self::Sales => sales_data(records, seed)?,
            Self::Monthly => monthly_data(seed)?,
            Self::TopProducts => top_products_data(seed)?,
        };
        tracing::info!(
            dataset = self.tag(),
            seed,
            rows = df.height(),
            "Generated demo data"
        );
        Ok(df)
    }
}

impl fmt::Display for DemoDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DemoDataset {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|d| d.tag() == tag)
            .ok_or_else(|| DashError::Other(format!("Unknown demo dataset '{s}'")))
    }
}

/// Items drawn with fixed probabilities.
struct Weighted<T> {
    items: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T: Copy> Weighted<T> {
    fn new(choices: &[(T, f64)]) -> Result<Self> {
        let index = WeightedIndex::new(choices.iter().map(|c| c.1))
            .map_err(|e| DashError::Other(format!("Invalid demo weights: {e}")))?;
        Ok(Self {
            items: choices.iter().map(|c| c.0).collect(),
            index,
        })
    }

    #[expect(clippy::indexing_slicing)]
    fn pick(&self, rng: &mut StdRng) -> T {
        self.items[self.index.sample(rng)]
    }
}

/// Knuth's method; fine for the small means used here.
fn poisson(rng: &mut StdRng, mean: f64) -> u32 {
    let limit = (-mean).exp();
    let mut k = 0;
    let mut p: f64 = rng.random();
    while p > limit {
        k += 1;
        p *= rng.random::<f64>();
    }
    k
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn start_of_2023() -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .ok_or_else(|| DashError::Other("invalid demo start date".to_owned()))
}

fn millis(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
}

fn datetime_column(name: &str, dates: &[NaiveDate]) -> Result<Column> {
    let ms: Vec<i64> = dates.iter().map(|d| millis(*d)).collect();
    let series = Series::new(name.into(), ms)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(Column::from(series))
}

fn sales_data(records: usize, seed: u64) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = start_of_2023()?;

    let mut offsets: Vec<u64> = (0..records)
        .map(|_| (rng.random::<f64>() * 365.0) as u64)
        .collect();
    offsets.sort_unstable();
    let dates = offsets
        .into_iter()
        .map(|d| {
            start
                .checked_add_days(Days::new(d))
                .ok_or_else(|| DashError::Other(format!("demo day {d} out of range")))
        })
        .collect::<Result<Vec<_>>>()?;

    let products = Weighted::new(
        &PRODUCTS
            .iter()
            .map(|&(name, cat, price, weight)| ((name, cat, price), weight))
            .collect::<Vec<_>>(),
    )?;
    let regions = Weighted::new(&REGIONS)?;
    let channels = Weighted::new(&CHANNELS)?;
    let segments = Weighted::new(&SEGMENTS)?;
    let customers = (records / 3).max(1);

    let mut product = Vec::with_capacity(records);
    let mut category = Vec::with_capacity(records);
    let mut quantity = Vec::with_capacity(records);
    let mut unit_price = Vec::with_capacity(records);
    let mut revenue = Vec::with_capacity(records);
    let mut cost = Vec::with_capacity(records);
    let mut profit = Vec::with_capacity(records);
    let mut region = Vec::with_capacity(records);
    let mut channel = Vec::with_capacity(records);
    let mut segment = Vec::with_capacity(records);
    let mut customer_id = Vec::with_capacity(records);
    let mut sales_rep = Vec::with_capacity(records);

    for date in &dates {
        let (name, cat, base_price) = products.pick(&mut rng);
        let price = base_price * rng.random_range(0.8..1.2);
        let seasonal = MONTH_MULTIPLIERS
            .get(date.month0() as usize)
            .copied()
            .unwrap_or(1.0);
        let qty = (f64::from(poisson(&mut rng, 2.0) + 1) * seasonal) as i64;
        let line_revenue = price * qty as f64;
        let line_cost = price * rng.random_range(0.70..0.85) * qty as f64;

        product.push(name);
        category.push(cat);
        quantity.push(qty);
        unit_price.push(round2(price));
        revenue.push(round2(line_revenue));
        cost.push(round2(line_cost));
        profit.push(round2(line_revenue - line_cost));
        region.push(regions.pick(&mut rng));
        channel.push(channels.pick(&mut rng));
        segment.push(segments.pick(&mut rng));
        customer_id.push(format!("CUST{:05}", rng.random_range(1..=customers)));
        sales_rep.push(format!("Rep_{:02}", rng.random_range(1..=SALES_REPS)));
    }

    let order_id: Vec<String> = (1..=records).map(|i| format!("ORD{i:06}")).collect();

    DataFrame::new(vec![
        Column::new("Order_ID".into(), order_id),
        datetime_column("Date", &dates)?,
        Column::new("Customer_ID".into(), customer_id),
        Column::new("Product".into(), product),
        Column::new("Category".into(), category),
        Column::new("Quantity".into(), quantity),
        Column::new("Unit_Price".into(), unit_price),
        Column::new("Revenue".into(), revenue),
        Column::new("Cost".into(), cost),
        Column::new("Profit".into(), profit),
        Column::new("Region".into(), region),
        Column::new("Channel".into(), channel),
        Column::new("Customer_Segment".into(), segment),
        Column::new("Sales_Rep".into(), sales_rep),
    ])
    .context("Failed to assemble the demo sales table")
}

fn monthly_data(seed: u64) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let months = (1..=12)
        .map(|m| {
            NaiveDate::from_ymd_opt(2023, m, 1)
                .ok_or_else(|| DashError::Other(format!("invalid demo month {m}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut uniform = |lo: f64, hi: f64| -> Vec<f64> {
        (0..12).map(|_| round2(rng.random_range(lo..hi))).collect()
    };
    let total_revenue = uniform(150_000.0, 250_000.0);
    let avg_order_value = uniform(300.0, 500.0);

    let mut counts = |lo: i64, hi: i64| -> Vec<i64> {
        (0..12).map(|_| rng.random_range(lo..hi)).collect()
    };
    let total_orders = counts(400, 700);
    let customer_count = counts(300, 500);
    let new_customers = counts(50, 120);

    Ok(DataFrame::new(vec![
        datetime_column("Month", &months)?,
        Column::new("Total_Revenue".into(), total_revenue),
        Column::new("Total_Orders".into(), total_orders),
        Column::new("Avg_Order_Value".into(), avg_order_value),
        Column::new("Customer_Count".into(), customer_count),
        Column::new("New_Customers".into(), new_customers),
    ])?)
}

fn top_products_data(seed: u64) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = TOP_PRODUCTS.len();

    let units_sold: Vec<i64> = (0..n).map(|_| rng.random_range(500..2000)).collect();
    let revenue: Vec<f64> = (0..n)
        .map(|_| round2(rng.random_range(50_000.0..200_000.0)))
        .collect();
    let avg_rating: Vec<f64> = (0..n)
        .map(|_| (rng.random_range(3.5..5.0_f64) * 10.0).round() / 10.0)
        .collect();
    let return_rate: Vec<f64> = (0..n)
        .map(|_| round2(rng.random_range(1.0..8.0)))
        .collect();

    let df = DataFrame::new(vec![
        Column::new("Product".into(), TOP_PRODUCTS.to_vec()),
        Column::new("Units_Sold".into(), units_sold),
        Column::new("Revenue".into(), revenue),
        Column::new("Avg_Rating".into(), avg_rating),
        Column::new("Return_Rate".into(), return_rate),
    ])?;
    Ok(df.sort(
        ["Revenue"],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_maintain_order(true),
    )?)
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, clippy::indexing_slicing)]
    use super::*;
    use crate::analyser::logic::{classify, find_revenue_column};

    #[test]
    fn test_sales_shape_and_columns() -> anyhow::Result<()> {
        let df = DemoDataset::Sales.generate(300, DEFAULT_SEED)?;
        assert_eq!(df.shape(), (300, 14));

        let types = classify(&df);
        assert_eq!(types.datetime, vec!["Date".to_owned()]);
        assert!(types.numeric.contains(&"Revenue".to_owned()));
        assert!(types.categorical.contains(&"Region".to_owned()));
        assert_eq!(find_revenue_column(&df).as_deref(), Some("Revenue"));

        let first = df
            .column("Order_ID")?
            .as_materialized_series()
            .str()?
            .get(0)
            .unwrap()
            .to_owned();
        assert_eq!(first, "ORD000001");
        Ok(())
    }

    #[test]
    fn test_sales_dates_sorted_within_2023() -> anyhow::Result<()> {
        let df = DemoDataset::Sales.generate(200, 7)?;
        let ms: Vec<i64> = df
            .column("Date")?
            .as_materialized_series()
            .cast(&DataType::Int64)?
            .i64()?
            .into_no_null_iter()
            .collect();
        assert!(ms.windows(2).all(|w| w[0] <= w[1]));

        let start = millis(start_of_2023()?);
        let end = millis(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(ms.iter().all(|t| (start..end).contains(t)));
        Ok(())
    }

    #[test]
    fn test_same_seed_same_data() -> anyhow::Result<()> {
        for dataset in DemoDataset::ALL {
            let a = dataset.generate(100, 11)?;
            let b = dataset.generate(100, 11)?;
            assert!(a.equals(&b), "{dataset} is not deterministic");
        }
        let c = DemoDataset::Sales.generate(100, 12)?;
        assert!(!c.equals(&DemoDataset::Sales.generate(100, 11)?));
        Ok(())
    }

    #[test]
    fn test_monthly_and_top_products() -> anyhow::Result<()> {
        let monthly = DemoDataset::Monthly.generate(DEFAULT_RECORDS, DEFAULT_SEED)?;
        assert_eq!(monthly.shape(), (12, 6));

        let top = DemoDataset::TopProducts.generate(DEFAULT_RECORDS, DEFAULT_SEED)?;
        assert_eq!(top.height(), 10);
        let revenue: Vec<f64> = top
            .column("Revenue")?
            .as_materialized_series()
            .f64()?
            .into_no_null_iter()
            .collect();
        assert!(revenue.windows(2).all(|w| w[0] >= w[1]));
        Ok(())
    }

    #[test]
    fn test_profit_is_revenue_minus_cost() -> anyhow::Result<()> {
        let df = DemoDataset::Sales.generate(50, DEFAULT_SEED)?;
        let col = |name: &str| -> anyhow::Result<Vec<f64>> {
            Ok(df
                .column(name)?
                .as_materialized_series()
                .f64()?
                .into_no_null_iter()
                .collect())
        };
        let (revenue, cost, profit) = (col("Revenue")?, col("Cost")?, col("Profit")?);
        for ((r, c), p) in revenue.iter().zip(&cost).zip(&profit) {
            assert!((r - c - p).abs() <= 0.011);
        }
        Ok(())
    }

    #[test]
    fn test_dataset_tags_parse() {
        for dataset in DemoDataset::ALL {
            assert_eq!(dataset.tag().parse::<DemoDataset>().ok(), Some(dataset));
        }
        assert_eq!("top_products".parse::<DemoDataset>().ok(), Some(DemoDataset::TopProducts));
        assert!("weekly".parse::<DemoDataset>().is_err());
    }
}
