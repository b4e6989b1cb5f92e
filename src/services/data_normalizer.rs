use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::WorkloadProfile;
use crate::models::metrics::{
    AnalyticsDataset, ProjectMetric, ProjectStatus, TaskMetric, TaskPriority, TaskStatus,
    TeamMemberMetric,
};
use crate::models::raw::{RawProject, RawTask, RawUser, RawWorkspace};
use crate::utils::numeric::{clamp_percent, non_negative, safe_ratio};

const UNASSIGNED: &str = "Unassigned";
const UNTITLED_TASK: &str = "Untitled task";
const UNNAMED_PROJECT: &str = "Untitled project";
const UNKNOWN_MEMBER: &str = "Unknown member";
const DEFAULT_ROLE: &str = "member";

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Restricts the project selection. `None` or an empty list keeps all.
    pub project_ids: Option<Vec<String>>,
    pub workload_profile: WorkloadProfile,
    /// Substituted for missing creation/start dates.
    pub reference_time: DateTime<Utc>,
}

impl NormalizeOptions {
    pub fn new(reference_time: DateTime<Utc>) -> Self {
        Self {
            project_ids: None,
            workload_profile: WorkloadProfile::default(),
            reference_time,
        }
    }

    pub fn with_project_ids(mut self, project_ids: Option<Vec<String>>) -> Self {
        self.project_ids = project_ids;
        self
    }

    pub fn with_workload_profile(mut self, profile: WorkloadProfile) -> Self {
        self.workload_profile = profile;
        self
    }

    fn selects(&self, project_id: &str) -> bool {
        match self.project_ids.as_deref() {
            Some(ids) if !ids.is_empty() => ids.iter().any(|id| id == project_id),
            _ => true,
        }
    }
}

#[derive(Default)]
struct MemberTally {
    assigned: u32,
    completed: u32,
    active: u32,
    hours: f64,
}

/// Projects raw workspace records onto the canonical metric DTOs.
///
/// Never fails: malformed numbers become 0, missing dates fall back to
/// `options.reference_time`, unknown enum values take their documented
/// defaults.
pub fn normalize(raw: &RawWorkspace, options: &NormalizeOptions) -> AnalyticsDataset {
    let selected: Vec<(String, &RawProject)> = raw
        .projects
        .iter()
        .enumerate()
        .map(|(index, project)| (project_id(project, index), project))
        .filter(|(id, _)| options.selects(id))
        .collect();

    let mut projects = Vec::with_capacity(selected.len());
    let mut tasks = Vec::new();
    let mut tallies: HashMap<String, MemberTally> = HashMap::new();

    for (project_id, project) in &selected {
        let mut project_tasks = Vec::with_capacity(project.tasks.len());
        for (index, raw_task) in project.tasks.iter().enumerate() {
            let task = normalize_task(project_id, index, raw_task, options.reference_time);
            tally_task(&mut tallies, raw_task, &task);
            project_tasks.push(task);
        }

        projects.push(normalize_project(
            project_id,
            project,
            &project_tasks,
            options.reference_time,
        ));
        tasks.extend(project_tasks);
    }

    let team = collect_team(&selected, &tallies, options.workload_profile);

    debug!(
        target: "app::normalizer",
        projects = projects.len(),
        tasks = tasks.len(),
        team = team.len(),
        profile = options.workload_profile.as_str(),
        "normalized workspace"
    );

    AnalyticsDataset {
        projects,
        tasks,
        team,
    }
}

fn project_id(project: &RawProject, index: usize) -> String {
    project
        .id
        .clone()
        .unwrap_or_else(|| format!("project-{index}"))
}

fn normalize_project(
    id: &str,
    raw: &RawProject,
    tasks: &[TaskMetric],
    reference_time: DateTime<Utc>,
) -> ProjectMetric {
    let total_tasks = tasks.len() as u32;
    let tasks_completed = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Done)
        .count() as u32;

    let progress = match raw.progress {
        Some(stored) => clamp_percent(stored),
        None => project_progress(tasks_completed, total_tasks),
    };

    let status = ProjectStatus::from_raw(raw.status.as_deref());
    let completed_at = if status == ProjectStatus::Completed {
        raw.completed_at
    } else {
        None
    };

    ProjectMetric {
        id: id.to_string(),
        name: raw
            .name
            .clone()
            .unwrap_or_else(|| UNNAMED_PROJECT.to_string()),
        status,
        progress,
        budget: non_negative(raw.budget),
        spent: non_negative(raw.spent),
        deadline: raw.deadline,
        tasks_completed,
        total_tasks,
        team_size: distinct_member_count(raw),
        start_date: raw.start_date.unwrap_or(reference_time),
        completed_at,
    }
}

/// `round(completed / total * 100)`, 0 for a project without tasks.
pub fn project_progress(completed: u32, total: u32) -> f64 {
    clamp_percent((safe_ratio(completed as f64, total as f64) * 100.0).round())
}

fn distinct_member_count(raw: &RawProject) -> u32 {
    let mut seen = HashSet::new();
    raw.members
        .iter()
        .filter_map(|membership| membership.user.id.as_deref())
        .filter(|id| seen.insert(*id))
        .count() as u32
}

fn normalize_task(
    project_id: &str,
    index: usize,
    raw: &RawTask,
    reference_time: DateTime<Utc>,
) -> TaskMetric {
    let actual_hours = raw
        .time_entries
        .iter()
        .map(|entry| non_negative(entry.hours))
        .sum();

    TaskMetric {
        id: raw
            .id
            .clone()
            .unwrap_or_else(|| format!("{project_id}-task-{index}")),
        title: raw.title.clone().unwrap_or_else(|| UNTITLED_TASK.to_string()),
        status: TaskStatus::from_raw(raw.status.as_deref()),
        priority: TaskPriority::from_raw(raw.priority.as_deref()),
        estimated_hours: non_negative(raw.estimated_hours),
        actual_hours,
        assigned_to: raw
            .assignee
            .as_ref()
            .and_then(|user| user.name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string()),
        created_at: raw.created_at.unwrap_or(reference_time),
        completed_at: raw.completed_at,
    }
}

fn tally_task(tallies: &mut HashMap<String, MemberTally>, raw: &RawTask, task: &TaskMetric) {
    let assignee_id = raw.assignee.as_ref().and_then(|user| user.id.as_deref());

    if let Some(id) = assignee_id {
        let tally = tallies.entry(id.to_string()).or_default();
        tally.assigned += 1;
        if task.status == TaskStatus::Done {
            tally.completed += 1;
        }
        if task.status.is_active() {
            tally.active += 1;
        }
    }

    for entry in &raw.time_entries {
        let owner = entry.user_id.as_deref().or(assignee_id);
        if let Some(id) = owner {
            tallies.entry(id.to_string()).or_default().hours += non_negative(entry.hours);
        }
    }
}

/// Members from memberships first, then task assignees, deduplicated by id
/// with the first occurrence winning.
fn collect_team(
    selected: &[(String, &RawProject)],
    tallies: &HashMap<String, MemberTally>,
    profile: WorkloadProfile,
) -> Vec<TeamMemberMetric> {
    let memberships = selected
        .iter()
        .flat_map(|(_, project)| project.members.iter().map(|membership| &membership.user));
    let assignees = selected.iter().flat_map(|(_, project)| {
        project
            .tasks
            .iter()
            .filter_map(|task| task.assignee.as_ref())
    });

    let mut seen: HashSet<&str> = HashSet::new();
    let mut team = Vec::new();
    for user in memberships.chain(assignees) {
        let Some(id) = user.id.as_deref() else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        team.push(member_metric(id, user, tallies.get(id), profile));
    }
    team
}

fn member_metric(
    id: &str,
    user: &RawUser,
    tally: Option<&MemberTally>,
    profile: WorkloadProfile,
) -> TeamMemberMetric {
    let empty = MemberTally::default();
    let tally = tally.unwrap_or(&empty);

    TeamMemberMetric {
        id: id.to_string(),
        name: user
            .name
            .clone()
            .unwrap_or_else(|| UNKNOWN_MEMBER.to_string()),
        role: user.role.clone().unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        tasks_completed: tally.completed,
        hours_logged: tally.hours,
        efficiency: member_efficiency(tally.completed, tally.assigned),
        workload: member_workload(tally.active, profile),
    }
}

pub fn member_efficiency(completed: u32, assigned: u32) -> f64 {
    if assigned == 0 {
        return 0.0;
    }
    (completed as f64 / assigned as f64 * 100.0).min(100.0)
}

pub fn member_workload(active_tasks: u32, profile: WorkloadProfile) -> f64 {
    (active_tasks as f64 * profile.unit()).min(100.0)
}
