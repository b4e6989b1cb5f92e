use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::models::analytics::{DateRange, KpiSummary, PriorityCount, StatusCount, WeeklyBucket};
use crate::models::metrics::{
    AnalyticsDataset, ProjectMetric, ProjectStatus, TaskMetric, TaskPriority, TaskStatus,
    TeamMemberMetric,
};
use crate::utils::numeric::{mean, round_to, safe_ratio};

const DAYS_PER_BUCKET: i64 = 7;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Headline figures for the dashboard. Counts cover the whole normalized
/// dataset; only `average_project_duration` is restricted to projects
/// completed inside `range`.
pub fn compute_kpis(dataset: &AnalyticsDataset, range: &DateRange) -> KpiSummary {
    let total_projects = dataset.projects.len();
    let completed_projects = dataset
        .projects
        .iter()
        .filter(|project| project.status == ProjectStatus::Completed)
        .count();

    let total_tasks = dataset.tasks.len();
    let completed_tasks = dataset
        .tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Done)
        .count();

    let total_users = dataset.team.len();
    let active_users = dataset.team.iter().filter(|m| is_active_member(m)).count();

    let summary = KpiSummary {
        total_projects,
        completed_projects,
        project_completion_rate: percentage(completed_projects, total_projects),
        total_tasks,
        completed_tasks,
        task_completion_rate: percentage(completed_tasks, total_tasks),
        total_hours_logged: round_to(dataset.tasks.iter().map(|task| task.actual_hours).sum(), 1),
        average_project_duration: average_project_duration(&dataset.projects, range),
        active_users,
        total_users,
        team_utilization: percentage(active_users, total_users),
        status_distribution: status_distribution(&dataset.tasks),
        priority_distribution: priority_distribution(&dataset.tasks),
    };

    debug!(
        target: "app::analytics",
        total_projects,
        total_tasks,
        total_users,
        "kpis computed"
    );

    summary
}

fn percentage(part: usize, whole: usize) -> f64 {
    round_to(safe_ratio(part as f64, whole as f64) * 100.0, 1)
}

fn is_active_member(member: &TeamMemberMetric) -> bool {
    member.hours_logged > 0.0 || member.workload > 0.0
}

/// Mean days from start to completion, over completed projects whose
/// completion falls in `range`. 0 when there are none.
pub fn average_project_duration(projects: &[ProjectMetric], range: &DateRange) -> f64 {
    let durations: Vec<f64> = projects
        .iter()
        .filter(|project| project.status == ProjectStatus::Completed)
        .filter_map(|project| {
            project
                .completed_at
                .filter(|completed_at| range.contains(*completed_at))
                .map(|completed_at| days_between(project.start_date, completed_at))
        })
        .collect();

    round_to(mean(&durations), 1)
}

fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    ((end - start).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0)
}

fn status_distribution(tasks: &[TaskMetric]) -> Vec<StatusCount> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: tasks.iter().filter(|task| task.status == status).count(),
        })
        .collect()
}

fn priority_distribution(tasks: &[TaskMetric]) -> Vec<PriorityCount> {
    TaskPriority::ALL
        .into_iter()
        .map(|priority| PriorityCount {
            priority,
            count: tasks.iter().filter(|task| task.priority == priority).count(),
        })
        .collect()
}

/// One bucket per 7-day window from the range's start date, in order, empty
/// windows included. Only timestamps whose date falls between the range's
/// first and last day are counted.
pub fn weekly_buckets(tasks: &[TaskMetric], range: &DateRange) -> Vec<WeeklyBucket> {
    let first_day = range.start.date_naive();
    let last_day = range.end.date_naive();

    let mut buckets = Vec::new();
    let mut week_start = first_day;
    while week_start <= last_day {
        buckets.push(WeeklyBucket {
            week_start,
            week_end: week_start + Duration::days(DAYS_PER_BUCKET - 1),
            created: 0,
            completed: 0,
        });
        week_start = week_start + Duration::days(DAYS_PER_BUCKET);
    }

    for task in tasks {
        if let Some(index) = bucket_index(first_day, last_day, task.created_at) {
            buckets[index].created += 1;
        }

        if task.status != TaskStatus::Done {
            continue;
        }
        if let Some(index) = task
            .completed_at
            .and_then(|completed_at| bucket_index(first_day, last_day, completed_at))
        {
            buckets[index].completed += 1;
        }
    }

    buckets
}

fn bucket_index(first_day: NaiveDate, last_day: NaiveDate, instant: DateTime<Utc>) -> Option<usize> {
    let day = instant.date_naive();
    if day < first_day || day > last_day {
        return None;
    }
    let offset = (day - first_day).num_days();
    usize::try_from(offset / DAYS_PER_BUCKET).ok()
}
