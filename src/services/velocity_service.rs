use chrono::{DateTime, Duration, Utc};

use crate::config::{
    TREND_DECREASE_FACTOR, TREND_INCREASE_FACTOR, VELOCITY_WINDOW_DAYS, VELOCITY_WINDOW_WEEKS,
};
use crate::models::analytics::{VelocityMetrics, VelocityTrend};
use crate::models::metrics::{TaskMetric, TaskStatus};
use crate::utils::numeric::{mean, round_to};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Throughput over completed tasks. Only `DONE` tasks carrying a completion
/// timestamp take part; the rest are ignored.
pub fn calculate_velocity(tasks: &[TaskMetric], now: DateTime<Utc>) -> VelocityMetrics {
    let completed: Vec<(&TaskMetric, DateTime<Utc>)> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Done)
        .filter_map(|task| task.completed_at.map(|at| (task, at)))
        .collect();

    if completed.is_empty() {
        return VelocityMetrics::default();
    }

    let durations: Vec<f64> = completed
        .iter()
        .map(|(task, completed_at)| completion_days(task.created_at, *completed_at))
        .collect();

    let window_start = now - Duration::days(VELOCITY_WINDOW_DAYS);
    let recent: Vec<DateTime<Utc>> = completed
        .iter()
        .map(|(_, completed_at)| *completed_at)
        .filter(|completed_at| *completed_at >= window_start)
        .collect();

    VelocityMetrics {
        average_completion_time: round_to(mean(&durations), 1),
        tasks_per_week: round_to(recent.len() as f64 / VELOCITY_WINDOW_WEEKS, 1),
        trend: trend_from_halves(recent.len()),
    }
}

/// Fractional days between creation and completion, floored at zero.
fn completion_days(created_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> f64 {
    let seconds = (completed_at - created_at).num_seconds() as f64;
    (seconds / SECONDS_PER_DAY).max(0.0)
}

/// Splits the window at `len / 2` and compares the halves' sizes.
fn trend_from_halves(len: usize) -> VelocityTrend {
    if len < 2 {
        return VelocityTrend::Stable;
    }
    let first = (len / 2) as f64;
    let second = (len - len / 2) as f64;

    if second > first * TREND_INCREASE_FACTOR {
        VelocityTrend::Increasing
    } else if second < first * TREND_DECREASE_FACTOR {
        VelocityTrend::Decreasing
    } else {
        VelocityTrend::Stable
    }
}
