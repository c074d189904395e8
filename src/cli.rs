use anyhow::{Context as _, Result, bail};
use clap::{Args, Parser, Subcommand};
use polars::prelude::DataFrame;
use salesdash::analyser::logic::io::to_csv_string;
use salesdash::analyser::logic::{
    LoadOptions, StatsRecord, basic_stats, calculate_correlation, classify, clean_df,
    data_overview, describe, detect_outliers, filter_rows, group_and_aggregate,
    group_and_aggregate_by_tag, kpi_summary, load_df, numeric_columns_with_gaps, save_df, top_n,
};
use salesdash::charts::{ChartKind, ChartRequest, build_chart};
use salesdash::config::{DashboardConfig, get_config_path, save_config};
use salesdash::demo::DemoDataset;
use salesdash::utils::{fmt_bytes, fmt_f64, fmt_money, fmt_opt};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "salesdash",
    about = "Sales analytics: profile, clean, aggregate and chart tabular sales data"
)]
pub struct Cli {
    /// Log level (overrides the config file; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the table comes from.
#[derive(Args, Clone, Debug)]
pub struct Source {
    /// Data file (csv, xlsx, xls, xlsm, xlsb, ods, parquet, json)
    #[arg(short, long, conflicts_with = "demo")]
    pub file: Option<PathBuf>,

    /// Demo dataset instead of a file: sales, monthly or top-products
    #[arg(long)]
    pub demo: Option<DemoDataset>,

    /// Worksheet to read from a workbook. Defaults to the first sheet.
    #[arg(long)]
    pub sheet: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Row/column counts, column kinds and missing values
    Summary {
        #[command(flatten)]
        source: Source,
    },
    /// Descriptive statistics of one numeric column, or all of them
    Stats {
        #[command(flatten)]
        source: Source,

        /// Numeric column. Defaults to every numeric column.
        #[arg(short, long)]
        column: Option<String>,
    },
    /// Pearson correlation matrix
    Correlate {
        #[command(flatten)]
        source: Source,

        /// Comma-separated numeric columns. Defaults to every numeric column.
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },
    /// Group rows and aggregate a value column
    Group {
        #[command(flatten)]
        source: Source,

        /// Column to group by
        #[arg(long)]
        by: String,

        /// Column to aggregate
        #[arg(long)]
        value: String,

        /// sum, mean, count, min, max or median. Defaults to the configured aggregator.
        #[arg(long)]
        agg: Option<String>,
    },
    /// Flag values outside the IQR fence
    Outliers {
        #[command(flatten)]
        source: Source,

        #[arg(short, long)]
        column: String,

        /// Detection method. Defaults to the configured method (iqr).
        #[arg(long)]
        method: Option<String>,
    },
    /// Drop duplicate rows, fill numeric gaps with medians and save the result
    Clean {
        #[command(flatten)]
        source: Source,

        /// Output file (.csv or .parquet). Prints CSV to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a demo dataset to a file
    Demo {
        /// sales, monthly or top-products
        #[arg(long, default_value = "sales")]
        dataset: DemoDataset,

        /// Output file (.csv or .parquet)
        #[arg(short, long)]
        output: PathBuf,

        /// Sales records to generate. Defaults to the configured count.
        #[arg(long)]
        records: Option<usize>,

        /// Random seed. Defaults to the configured seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build a chart and write it as JSON
    Chart {
        #[command(flatten)]
        source: Source,

        /// line, bar, pie, scatter, heatmap, histogram or box-plot
        #[arg(long)]
        kind: ChartKind,

        #[arg(long)]
        x: Option<String>,

        #[arg(long)]
        y: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// JSON output file. Prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Headline revenue figures
    Kpi {
        #[command(flatten)]
        source: Source,
    },
    /// Show the effective configuration, or write it to the config file
    Config {
        /// Write the effective settings to the config file
        #[arg(long)]
        save: bool,
    },
    /// Rows with the largest values in a column
    Top {
        #[command(flatten)]
        source: Source,

        #[arg(short, long)]
        column: String,

        #[arg(short, default_value_t = 10)]
        n: usize,
    },
}

fn load_source(source: &Source, config: &DashboardConfig) -> Result<DataFrame> {
    match (&source.file, source.demo) {
        (Some(path), _) => {
            let options = LoadOptions {
                sheet: source.sheet.clone(),
                ..config.load_options()
            };
            load_df(path, &options).with_context(|| format!("Failed to load {}", path.display()))
        }
        (None, Some(dataset)) => Ok(dataset.generate(config.demo_records, config.demo_seed)?),
        (None, None) => bail!("Pass --file <path> or --demo <dataset>"),
    }
}

fn print_stats(name: &str, stats: &StatsRecord) {
    println!("{name}");
    for (field, value) in StatsRecord::FIELDS.iter().zip(stats.values()) {
        println!("  {field:<7} {}", fmt_f64(value));
    }
}

#[expect(clippy::too_many_lines)]
pub fn run_command(command: Commands, config: &DashboardConfig) -> Result<()> {
    match command {
        Commands::Summary { source } => {
            let df = load_source(&source, config)?;
            let overview = data_overview(&df);
            let types = classify(&df);
            println!(
                "{} rows x {} columns, {} missing values, ~{}",
                overview.row_count,
                overview.column_count,
                overview.missing_total,
                fmt_bytes(overview.estimated_bytes)
            );
            for c in &overview.columns {
                let kind = types.kind_of(&c.name).map_or("other", |k| k.as_str());
                println!("  {:<24} {:<12} {:<12} {} missing", c.name, c.dtype, kind, c.nulls);
            }
        }
        Commands::Stats { source, column } => {
            let df = load_source(&source, config)?;
            match column {
                Some(column) => print_stats(&column, &basic_stats(&df, &column)?),
                None => {
                    for (name, stats) in describe(&df)? {
                        print_stats(&name, &stats);
                    }
                }
            }
        }
        Commands::Correlate { source, columns } => {
            let df = load_source(&source, config)?;
            let matrix = calculate_correlation(&df, columns.as_deref())?;
            println!("{}", matrix.to_dataframe()?);
        }
        Commands::Group {
            source,
            by,
            value,
            agg,
        } => {
            let df = load_source(&source, config)?;
            let grouped = match agg {
                Some(tag) => group_and_aggregate_by_tag(&df, &by, &value, &tag)?,
                None => group_and_aggregate(&df, &by, &value, config.default_aggregator)?,
            };
            println!("{grouped}");
        }
        Commands::Outliers {
            source,
            column,
            method,
        } => {
            let df = load_source(&source, config)?;
            let method = method.unwrap_or_else(|| config.outlier_method.to_string());
            let mask = detect_outliers(&df, &column, &method)?;
            let flagged = filter_rows(&df, &mask)?;
            println!("{} of {} rows flagged in '{column}'", flagged.height(), df.height());
            if flagged.height() > 0 {
                println!("{flagged}");
            }
        }
        Commands::Clean { source, output } => {
            let df = load_source(&source, config)?;
            let gaps = numeric_columns_with_gaps(&df);
            let mut cleaned = clean_df(&df)?;
            let Some(output) = output else {
                print!("{}", to_csv_string(&mut cleaned)?);
                return Ok(());
            };
            save_df(&mut cleaned, &output)?;
            println!(
                "{} -> {} rows; imputed medians in: {}",
                df.height(),
                cleaned.height(),
                if gaps.is_empty() { "none".to_owned() } else { gaps.join(", ") }
            );
            println!("Saved to {}", output.display());
        }
        Commands::Demo {
            dataset,
            output,
            records,
            seed,
        } => {
            let mut df = dataset.generate(
                records.unwrap_or(config.demo_records),
                seed.unwrap_or(config.demo_seed),
            )?;
            save_df(&mut df, &output)?;
            println!("Wrote {} rows of '{}' to {}", df.height(), dataset.tag(), output.display());
        }
        Commands::Chart {
            source,
            kind,
            x,
            y,
            title,
            output,
        } => {
            let df = load_source(&source, config)?;
            let chart = build_chart(&df, &ChartRequest { kind, x, y, title })?;
            let json = chart.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote '{}' to {}", chart.title, path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Kpi { source } => {
            let df = load_source(&source, config)?;
            let kpi = kpi_summary(&df)?;
            println!("Records:          {}", kpi.record_count);
            println!("Columns:          {}", kpi.column_count);
            match &kpi.revenue_column {
                Some(name) => {
                    println!("Revenue column:   {name}");
                    let total = kpi.total_revenue.map_or_else(|| "n/a".to_owned(), fmt_money);
                    println!("Total revenue:    {total}");
                    println!("Average revenue:  {}", fmt_opt(kpi.average_revenue));
                    println!(
                        "Growth:           {}",
                        kpi.growth_pct.map_or_else(|| "n/a".to_owned(), |g| format!("{g:+.1}%"))
                    );
                }
                None => println!("Revenue column:   none found"),
            }
        }
        Commands::Config { save } => {
            let path = get_config_path();
            if save {
                save_config(config)?;
                println!("Saved configuration to {}", path.display());
            } else {
                println!("# {}", path.display());
                println!("{}", serde_json::to_string_pretty(config)?);
            }
        }
        Commands::Top { source, column, n } => {
            let df = load_source(&source, config)?;
            println!("{}", top_n(&df, &column, n)?);
        }
    }
    Ok(())
}
