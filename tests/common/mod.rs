#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pulse_insights_lib::models::raw::RawWorkspace;
use serde_json::json;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

/// Two projects, three tasks and three people, with the loose typing the
/// persistence layer hands over (numbers as strings, a date-only value).
pub fn sample_workspace() -> RawWorkspace {
    serde_json::from_value(json!({
        "projects": [
            {
                "id": "p1",
                "name": "Website relaunch",
                "status": "active",
                "budget": "1000",
                "spent": 950,
                "startDate": "2024-05-01",
                "members": [
                    { "user": { "id": "u1", "name": "Ana", "role": "lead" } },
                    { "user": { "id": "u2", "name": "Ben" } }
                ],
                "tasks": [
                    {
                        "id": "t1",
                        "title": "Design review",
                        "status": "done",
                        "priority": "high",
                        "estimatedHours": 5,
                        "createdAt": "2024-06-10T09:00:00Z",
                        "completedAt": "2024-06-20T09:00:00Z",
                        "assignee": { "id": "u1", "name": "Ana" },
                        "timeEntries": [
                            { "hours": 4, "userId": "u1" },
                            { "hours": "2" }
                        ]
                    },
                    {
                        "id": "t2",
                        "title": "Content migration",
                        "status": "in-progress",
                        "priority": "urgent",
                        "createdAt": "2024-06-01T09:00:00Z",
                        "assignee": { "id": "u2", "name": "Ben" }
                    },
                    {
                        "id": "t3",
                        "status": "todo",
                        "priority": "nonsense",
                        "createdAt": "2024-06-28T09:00:00Z",
                        "assignee": { "id": "u3", "name": "Cy" }
                    }
                ]
            },
            {
                "id": "p2",
                "name": "Data migration",
                "status": "completed",
                "budget": 500,
                "spent": 100,
                "startDate": "2024-06-01T00:00:00Z",
                "completedAt": "2024-06-21T00:00:00Z",
                "tasks": []
            }
        ]
    }))
    .expect("fixture deserializes")
}

pub fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 48, "total_tokens": 168 }
    })
}

pub const VALID_INSIGHTS: &str = r#"{"insights":[{"type":"warning","title":"Budget pressure","description":"Website relaunch is at 95% of budget","confidence":0.82,"actionItems":["Freeze new scope"],"impact":"high"}]}"#;

pub const VALID_RECOMMENDATIONS: &str = r#"{"recommendations":[
    {"category":"budget","title":"Cap spend","description":"Stop discretionary spend","priority":"high","estimatedImpact":"Keeps project within budget","implementation":["Review invoices"]},
    {"category":"team","title":"Pair on migration","description":"Share the migration load","priority":"medium","estimatedImpact":"Faster delivery"},
    {"category":"budget","title":"Monthly review","description":"Track burn","priority":"low","estimatedImpact":"Earlier warnings"}
]}"#;
