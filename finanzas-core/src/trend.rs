//! Balance trend and linear projection toward a target balance.
//!
//! The historical rate is the straight line between the first and the last
//! point of the daily balance series; months are a flat 30 days.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::transaction::Transaction;

/// Days per month used for every rate conversion
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Projections further out than this are reported as unreachable instead of
/// materialising an enormous trajectory.
pub const MAX_PROJECTION_DAYS: f64 = 36_500.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub balance: f64,
}

/// One balance per distinct date, ascending.
///
/// When several rows share a date the one inserted last wins, regardless of
/// amounts.
pub fn trend_series<'a>(rows: impl IntoIterator<Item = &'a Transaction>) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for txn in rows {
        by_day.insert(txn.date, txn.balance);
    }
    by_day
        .into_iter()
        .map(|(date, balance)| TrendPoint { date, balance })
        .collect()
}

/// Rate used to extrapolate the balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionRate {
    /// The series' own historical monthly rate
    Historical,
    /// A user supplied change per month
    Custom(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnreachableReason {
    /// The rate moves the balance away from the target
    DirectionMismatch,
    /// A zero rate never gets anywhere
    NoMovement,
    /// The target is further away than `MAX_PROJECTION_DAYS`
    BeyondHorizon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachableProjection {
    pub target_balance: f64,
    /// `today` plus the whole days needed
    pub target_date: NaiveDate,
    /// Fractional days until the target is hit
    pub days_to_target: f64,
    /// Absolute monthly rate used
    pub effective_rate: f64,
    /// Points from the day after the last data point up to `target_date`
    pub trajectory: Vec<TrendPoint>,
}

/// Outcome of a projection. Not reaching the target is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Reachable(ReachableProjection),
    Unreachable {
        target_balance: f64,
        monthly_rate: f64,
        reason: UnreachableReason,
    },
}

impl Projection {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Projection::Reachable(_))
    }
}

/// Historical metrics of a filtered view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub points: Vec<TrendPoint>,
    pub current_balance: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Inclusive span of the series, at least one day
    pub days_in_data: i64,
    pub historical_daily_rate: f64,
    pub historical_monthly_rate: f64,
}

impl TrendAnalysis {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a Transaction>) -> Result<Self> {
        let points = trend_series(rows);
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(CoreError::EmptyDataset),
        };

        let days_in_data = ((last.date - first.date).num_days() + 1).max(1);
        let historical_daily_rate = (last.balance - first.balance) / days_in_data as f64;

        Ok(Self {
            current_balance: last.balance,
            first_date: first.date,
            last_date: last.date,
            days_in_data,
            historical_daily_rate,
            historical_monthly_rate: historical_daily_rate * DAYS_PER_MONTH,
            points,
        })
    }

    /// Monthly rate as a percentage of the current balance
    pub fn monthly_growth_pct(&self) -> Option<f64> {
        if self.current_balance == 0.0 {
            return None;
        }
        Some(self.historical_monthly_rate / self.current_balance * 100.0)
    }

    fn resolve_rate(&self, rate: ProjectionRate) -> f64 {
        match rate {
            ProjectionRate::Historical => self.historical_monthly_rate,
            ProjectionRate::Custom(r) => r,
        }
    }

    /// Project the balance toward `target_balance`.
    ///
    /// `today` anchors the target date; the trajectory itself starts the day
    /// after the last data point.
    pub fn project(&self, target_balance: f64, rate: ProjectionRate, today: NaiveDate) -> Projection {
        let monthly_rate = self.resolve_rate(rate);
        let unreachable = |reason| Projection::Unreachable {
            target_balance,
            monthly_rate,
            reason,
        };

        if monthly_rate == 0.0 || !monthly_rate.is_finite() {
            return unreachable(UnreachableReason::NoMovement);
        }

        let target_direction = if target_balance > self.current_balance { 1 } else { -1 };
        let rate_direction = if monthly_rate > 0.0 { 1 } else { -1 };
        if target_direction != rate_direction {
            return unreachable(UnreachableReason::DirectionMismatch);
        }

        let effective_rate = monthly_rate.abs();
        let days_to_target = ((target_balance - self.current_balance) / (effective_rate / DAYS_PER_MONTH)).abs();
        if !days_to_target.is_finite() || days_to_target > MAX_PROJECTION_DAYS {
            return unreachable(UnreachableReason::BeyondHorizon);
        }

        let target_date = match today.checked_add_days(Days::new(days_to_target.floor() as u64)) {
            Some(d) => d,
            None => return unreachable(UnreachableReason::BeyondHorizon),
        };

        let trajectory = match self.trajectory(target_balance, days_to_target.ceil() as u64, target_date) {
            Some(t) => t,
            None => return unreachable(UnreachableReason::BeyondHorizon),
        };

        Projection::Reachable(ReachableProjection {
            target_balance,
            target_date,
            days_to_target,
            effective_rate,
            trajectory,
        })
    }

    /// `steps` points after `last_date`, excluding the current balance and
    /// ending exactly on the target. Dates are spread evenly so the last one
    /// lands on `target_date`; when that window is shorter than `steps` days
    /// the points fall on consecutive days instead.
    fn trajectory(&self, target_balance: f64, steps: u64, target_date: NaiveDate) -> Option<Vec<TrendPoint>> {
        let window = (target_date - self.last_date).num_days().max(0) as u64;
        let span = target_balance - self.current_balance;
        let mut out = Vec::with_capacity(steps as usize);
        for k in 1..=steps {
            let offset = k.max((k * window).div_ceil(steps));
            let date = self.last_date.checked_add_days(Days::new(offset))?;
            let balance = if k == steps {
                target_balance
            } else {
                round_cents(self.current_balance + span * k as f64 / steps as f64)
            };
            out.push(TrendPoint { date, balance });
        }
        Some(out)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rows(points: &[(NaiveDate, f64)]) -> Vec<Transaction> {
        points
            .iter()
            .map(|(d, b)| Transaction::new(*d, "row", 0.0, *b))
            .collect()
    }

    fn analysis_at(balance: f64) -> TrendAnalysis {
        let data = rows(&[(day(2024, 1, 1), balance)]);
        TrendAnalysis::from_rows(&data).unwrap()
    }

    #[test]
    fn test_series_keeps_last_inserted_balance_per_day() {
        let data = rows(&[
            (day(2024, 1, 2), 50.0),
            (day(2024, 1, 1), 10.0),
            (day(2024, 1, 2), 20.0),
        ]);
        let series = trend_series(&data);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0], TrendPoint { date: day(2024, 1, 1), balance: 10.0 });
        assert_eq!(series[1], TrendPoint { date: day(2024, 1, 2), balance: 20.0 });
    }

    #[test]
    fn test_historical_rates() {
        let data = rows(&[(day(2024, 1, 1), 1000.0), (day(2024, 2, 1), 1300.0)]);
        let a = TrendAnalysis::from_rows(&data).unwrap();
        assert_eq!(a.days_in_data, 32);
        assert_eq!(a.current_balance, 1300.0);
        assert_eq!(a.last_date, day(2024, 2, 1));
        assert!((a.historical_daily_rate - 300.0 / 32.0).abs() < 1e-9);
        assert!((a.historical_monthly_rate - 300.0 / 32.0 * 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_day_span_is_one_day() {
        let a = analysis_at(500.0);
        assert_eq!(a.days_in_data, 1);
        assert_eq!(a.historical_daily_rate, 0.0);
    }

    #[test]
    fn test_empty_rows_error() {
        let data: Vec<Transaction> = Vec::new();
        assert_eq!(TrendAnalysis::from_rows(&data), Err(CoreError::EmptyDataset));
    }

    #[test]
    fn test_direction_mismatch_is_unreachable() {
        let a = analysis_at(1000.0);
        let p = a.project(500.0, ProjectionRate::Custom(200.0), day(2024, 6, 1));
        assert_eq!(
            p,
            Projection::Unreachable {
                target_balance: 500.0,
                monthly_rate: 200.0,
                reason: UnreachableReason::DirectionMismatch,
            }
        );
    }

    #[test]
    fn test_zero_rate_is_no_movement() {
        let a = analysis_at(1000.0);
        let p = a.project(2000.0, ProjectionRate::Historical, day(2024, 6, 1));
        match p {
            Projection::Unreachable { reason, .. } => assert_eq!(reason, UnreachableReason::NoMovement),
            other => panic!("expected unreachable, got {other:?}"),
        }
    }

    #[test]
    fn test_reachable_projection() {
        let a = analysis_at(1000.0);
        let today = day(2024, 6, 1);
        let p = a.project(1500.0, ProjectionRate::Custom(300.0), today);
        let Projection::Reachable(r) = p else {
            panic!("expected reachable");
        };
        // 500 / (300 / 30) = 50 days
        assert!((r.days_to_target - 50.0).abs() < 1e-9);
        assert_eq!(r.target_date, day(2024, 7, 21));
        assert_eq!(r.effective_rate, 300.0);
        assert_eq!(r.trajectory.len(), 50);
        // 202 days between last_date and target_date over 50 points
        assert_eq!(r.trajectory[0], TrendPoint { date: day(2024, 1, 6), balance: 1010.0 });
        let last = r.trajectory.last().unwrap();
        assert_eq!(last.balance, 1500.0);
        assert_eq!(last.date, r.target_date);
    }

    #[test]
    fn test_trajectory_dates_spread_to_target_date() {
        let a = analysis_at(2000.0);
        let p = a.project(1930.0, ProjectionRate::Custom(-90.0), day(2024, 3, 15));
        let Projection::Reachable(r) = p else {
            panic!("expected reachable");
        };
        // 70 / 3 per day = 23.33 days
        assert_eq!(r.trajectory.len(), 24);
        assert_eq!(r.target_date, day(2024, 4, 7));
        assert!(r.trajectory[0].date > a.last_date);
        assert!(r.trajectory.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(r.trajectory.last().unwrap().date, r.target_date);
        assert_eq!(r.trajectory.last().unwrap().balance, 1930.0);
    }

    #[test]
    fn test_fractional_days_round_trajectory_up() {
        let a = analysis_at(1000.0);
        // 100 / (90 / 30) = 33.33 days
        let p = a.project(900.0, ProjectionRate::Custom(-90.0), day(2024, 1, 1));
        let Projection::Reachable(r) = p else {
            panic!("expected reachable");
        };
        assert_eq!(r.trajectory.len(), 34);
        assert_eq!(r.target_date, day(2024, 2, 3));
        assert_eq!(r.trajectory.last().unwrap().balance, 900.0);
        // today is last_date: 33 days of window for 34 points, one per day
        assert_eq!(r.trajectory.last().unwrap().date, day(2024, 2, 4));
        // values are rounded to cents
        for p in &r.trajectory {
            assert!(((p.balance * 100.0).round() - p.balance * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_endpoint_exact_for_unrounded_target() {
        let a = analysis_at(0.0);
        let p = a.project(100.123, ProjectionRate::Custom(30.0), day(2024, 1, 1));
        let Projection::Reachable(r) = p else {
            panic!("expected reachable");
        };
        assert_eq!(r.trajectory.len(), (r.days_to_target).ceil() as usize);
        assert_eq!(r.trajectory.last().unwrap().balance, 100.123);
    }

    #[test]
    fn test_historical_rate_projection() {
        let data = rows(&[(day(2024, 1, 1), 1000.0), (day(2024, 1, 30), 1300.0)]);
        let a = TrendAnalysis::from_rows(&data).unwrap();
        // 300 over 30 days -> 300 / month
        assert!((a.historical_monthly_rate - 300.0).abs() < 1e-9);
        let p = a.project(1600.0, ProjectionRate::Historical, day(2024, 2, 1));
        assert!(p.is_reachable());
    }

    #[test]
    fn test_tiny_rate_beyond_horizon() {
        let a = analysis_at(0.0);
        let p = a.project(1_000_000.0, ProjectionRate::Custom(0.01), day(2024, 1, 1));
        match p {
            Projection::Unreachable { reason, .. } => assert_eq!(reason, UnreachableReason::BeyondHorizon),
            other => panic!("expected unreachable, got {other:?}"),
        }
    }

    #[test]
    fn test_growth_pct() {
        let data = rows(&[(day(2024, 1, 1), 1000.0), (day(2024, 1, 30), 1300.0)]);
        let a = TrendAnalysis::from_rows(&data).unwrap();
        let pct = a.monthly_growth_pct().unwrap();
        assert!((pct - 300.0 / 1300.0 * 100.0).abs() < 1e-9);
        assert_eq!(analysis_at(0.0).monthly_growth_pct(), None);
    }
}
