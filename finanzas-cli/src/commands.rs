//! Command implementations. Every data command rebuilds the dataset from the
//! statements given on the command line; nothing is persisted between runs
//! except what `--out` writes.

use anyhow::{bail, Context, Result};
use chrono::Days;
use finanzas_ai::{
    categorize_uncategorized, BatchOptions, CategorizationService, OpenAiCategorizer, RuleCategorizer, RunStatus,
};
use finanzas_core::time::today_in;
use finanzas_core::{
    breakdown, kpis, monthly_averages, Dataset, FilterState, Flow, MergeReport, Projection, ProjectionRate,
    Transaction, TrendAnalysis, UnreachableReason, YearMonth,
};
use finanzas_ingest::{parse_file, write_native_file};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{auth, config, gendata, DataArgs};

struct Loaded {
    dataset: Dataset,
    imports: Vec<(PathBuf, usize, usize, MergeReport)>,
}

fn load(data: &DataArgs) -> Result<Loaded> {
    let mut dataset = Dataset::new();
    let mut imports = Vec::new();
    for path in &data.csv {
        let batch = parse_file(path).with_context(|| format!("importing {}", path.display()))?;
        let parsed = batch.transactions.len();
        let report = dataset.import(batch.transactions);
        imports.push((path.clone(), parsed, batch.dropped, report));
    }
    for &index in &data.hide {
        dataset
            .hide(index)
            .with_context(|| format!("--hide {index}"))?;
    }
    if !dataset.has_data() {
        bail!("no transactions found in the given files");
    }
    Ok(Loaded { dataset, imports })
}

fn view_filter(dataset: &Dataset, data: &DataArgs) -> Result<FilterState> {
    let (min, max) = dataset.date_range()?;
    if data.from_month.is_some() || data.to_month.is_some() {
        let from = data.from_month.unwrap_or_else(|| YearMonth::of(min));
        let to = data.to_month.unwrap_or_else(|| YearMonth::of(max));
        return Ok(FilterState::for_months(from, to, max, data.show_hidden)?);
    }
    Ok(FilterState::new(
        data.from.unwrap_or(min),
        data.to.unwrap_or(max),
        data.show_hidden,
    ))
}

fn filtered<'a>(dataset: &'a Dataset, data: &DataArgs) -> Result<(FilterState, Vec<&'a Transaction>)> {
    let filter = view_filter(dataset, data)?;
    let rows = dataset.filter(&filter)?;
    Ok((filter, rows))
}

fn eur(x: f64) -> String {
    format!("{x:.2}€")
}

fn label(category: &str, subcategory: &str) -> String {
    match (category.is_empty(), subcategory.is_empty()) {
        (true, _) => "(uncategorized)".to_string(),
        (false, true) => category.to_string(),
        (false, false) => format!("{category} / {subcategory}"),
    }
}

pub fn cmd_import(data: &DataArgs, out: Option<&Path>) -> Result<()> {
    let Loaded { dataset, imports } = load(data)?;

    for (path, parsed, dropped, report) in &imports {
        println!(
            "{}: {} rows parsed, {} accepted, {} duplicates, {} dropped",
            path.display(),
            parsed,
            report.accepted,
            report.duplicates,
            dropped
        );
    }
    let (min, max) = dataset.date_range()?;
    println!("Dataset: {} transactions from {} to {}", dataset.len(), min, max);

    if let Some(out) = out {
        write_native_file(out, dataset.transactions()).with_context(|| format!("writing {}", out.display()))?;
        println!("Wrote {}", out.display());
    }
    Ok(())
}

pub fn cmd_summary(data: &DataArgs) -> Result<()> {
    let Loaded { dataset, .. } = load(data)?;
    let (filter, rows) = filtered(&dataset, data)?;

    println!("Period: {} to {} ({} rows)", filter.first_day, filter.last_day, rows.len());
    let k = kpis(rows.iter().copied());
    println!("Income:   {:>12}", eur(k.total_income));
    println!("Expenses: {:>12}", eur(k.total_expenses));
    println!("Net:      {:>12}", eur(k.net()));

    for (title, flow) in [("Income", Flow::Income), ("Expenses", Flow::Expense)] {
        println!("\n## {title}\n");
        let totals = breakdown(rows.iter().copied(), flow);
        if totals.is_empty() {
            println!("(none)");
        }
        for t in totals {
            println!(
                "{:<40} {:>12}  ({} rows)",
                label(&t.category, &t.subcategory),
                eur(t.total),
                t.count
            );
        }
    }
    Ok(())
}

pub fn cmd_averages(data: &DataArgs) -> Result<()> {
    let Loaded { dataset, .. } = load(data)?;
    let (_, rows) = filtered(&dataset, data)?;

    let averages = monthly_averages(rows.iter().copied());
    if averages.is_empty() {
        println!("No expenses in the selected period");
        return Ok(());
    }
    println!("{:<40} {:>12}", "Category", "Per month");
    for a in averages {
        println!("{:<40} {:>12}", label(&a.category, &a.subcategory), eur(a.monthly_average));
    }
    Ok(())
}

pub fn cmd_trend(data: &DataArgs, target: f64, rate: Option<f64>) -> Result<()> {
    let cfg = config::load_config()?;
    let Loaded { dataset, .. } = load(data)?;
    let (_, rows) = filtered(&dataset, data)?;

    let analysis = TrendAnalysis::from_rows(rows.iter().copied())?;
    println!("Current balance:  {}", eur(analysis.current_balance));
    println!(
        "Data span:        {} to {} ({} days)",
        analysis.first_date, analysis.last_date, analysis.days_in_data
    );
    println!("Daily rate:       {}", eur(analysis.historical_daily_rate));
    println!("Monthly rate:     {}", eur(analysis.historical_monthly_rate));
    if let Some(pct) = analysis.monthly_growth_pct() {
        println!("Monthly growth:   {pct:.2}%");
    }

    let today = today_in(&cfg.projection.timezone)?;
    let rate = rate.map_or(ProjectionRate::Historical, ProjectionRate::Custom);
    println!();
    match analysis.project(target, rate, today) {
        Projection::Reachable(p) => {
            println!("Target {} reachable in {:.1} days", eur(p.target_balance), p.days_to_target);
            println!("Target date:      {}", p.target_date);
            println!("Rate used:        {}/month", eur(p.effective_rate));
            if let (Some(first), Some(last)) = (p.trajectory.first(), p.trajectory.last()) {
                println!(
                    "Trajectory:       {} points, {} {} -> {} {}",
                    p.trajectory.len(),
                    first.date,
                    eur(first.balance),
                    last.date,
                    eur(last.balance)
                );
            }
        }
        Projection::Unreachable {
            target_balance,
            monthly_rate,
            reason,
        } => {
            let why = match reason {
                UnreachableReason::DirectionMismatch => "the balance is moving away from it",
                UnreachableReason::NoMovement => "the balance is not changing",
                UnreachableReason::BeyondHorizon => "it is more than a hundred years away",
            };
            println!(
                "Target {} not reachable at {}/month: {}",
                eur(target_balance),
                eur(monthly_rate),
                why
            );
        }
    }
    Ok(())
}

pub fn cmd_search(data: &DataArgs, term: &str) -> Result<()> {
    let Loaded { dataset, .. } = load(data)?;
    let filter = view_filter(&dataset, data)?;

    let hits: Vec<_> = dataset
        .search(term)
        .into_iter()
        .filter(|(_, t)| filter.contains(t))
        .collect();
    for (index, t) in &hits {
        println!(
            "{:>5}  {}  {:<32} {:<28} {:>12}{}",
            index,
            t.date,
            t.concept,
            label(&t.category, &t.subcategory),
            eur(t.amount),
            if t.hidden { "  [hidden]" } else { "" }
        );
    }
    println!("{} matches", hits.len());
    Ok(())
}

pub struct CategorizeFlags {
    pub offline: bool,
    pub batch_size: Option<usize>,
    pub all_categories: bool,
    pub no_similar: bool,
}

fn build_service(cfg: &config::Config, offline: bool) -> Result<Box<dyn CategorizationService>> {
    if offline || cfg.ai.provider == "rules" {
        return Ok(Box::new(RuleCategorizer::new()));
    }
    if cfg.ai.provider != "openai" {
        bail!("unknown ai.provider '{}' (expected openai or rules)", cfg.ai.provider);
    }
    let service = OpenAiCategorizer::new(auth::openai_api_key()?)?
        .with_model(&cfg.ai.model)
        .with_base_url(&cfg.ai.base_url)
        .with_temperature(cfg.ai.temperature);
    Ok(Box::new(service))
}

pub async fn cmd_categorize(data: &DataArgs, out: &Path, flags: CategorizeFlags) -> Result<()> {
    let cfg = config::load_config()?;
    let Loaded { mut dataset, .. } = load(data)?;
    let service = build_service(&cfg, flags.offline)?;

    let options = BatchOptions {
        batch_size: flags.batch_size.unwrap_or(cfg.ai.batch_size),
        restrict_to_vocabulary: cfg.ai.restrict_to_vocabulary && !flags.all_categories,
        apply_to_similar: cfg.ai.apply_to_similar && !flags.no_similar,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let watcher = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping after the current batch");
                cancel.store(true, Ordering::SeqCst);
            }
        })
    };

    let report = categorize_uncategorized(&mut dataset, service.as_ref(), &options, &cancel);
    watcher.abort();

    for a in &report.applied {
        println!(
            "{:<32} {:>12}  -> {}{}",
            a.concept,
            eur(a.amount),
            label(&a.category, &a.subcategory),
            if a.rows_updated > 1 {
                format!("  ({} rows)", a.rows_updated)
            } else {
                String::new()
            }
        );
    }
    println!(
        "Processed {} of {} uncategorized rows, {} suggestions applied",
        report.processed,
        report.total_uncategorized,
        report.applied.len()
    );

    write_native_file(out, dataset.transactions()).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {}", out.display());

    match report.status {
        RunStatus::Completed => Ok(()),
        RunStatus::Cancelled => {
            println!("Stopped by user; progress so far was kept");
            Ok(())
        }
        RunStatus::Failed(e) => Err(e).context("categorization stopped; progress so far was kept"),
    }
}

pub fn cmd_gendata(out: &Path, days: u64, seed: Option<u64>, initial_balance: f64) -> Result<()> {
    let cfg = config::load_config()?;
    let end = today_in(&cfg.projection.timezone)?;
    let start = end
        .checked_sub_days(Days::new(days))
        .context("--days goes too far back")?;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let rows = gendata::generate_transactions(&mut rng, start, end, initial_balance, (1, 5));
    write_native_file(out, &rows).with_context(|| format!("writing {}", out.display()))?;

    info!(rows = rows.len(), %start, %end, "generated synthetic dataset");
    println!("Generated {} transactions from {} to {}", rows.len(), start, end);
    if let Some(last) = rows.last() {
        println!("Final balance: {}", eur(last.balance));
    }
    println!("Wrote {}", out.display());
    Ok(())
}
