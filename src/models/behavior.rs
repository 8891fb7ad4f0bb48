use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Behavioral event ingested by the signal recorder. Request-scoped; the
/// core derives preference deltas from it but never persists the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub kind: BehaviorKind,
    pub user_id: Uuid,
    pub target_id: Option<Uuid>,
    pub search: Option<SearchPayload>,
}

impl BehaviorEvent {
    pub fn interaction(kind: BehaviorKind, user_id: Uuid, target_id: Uuid) -> Self {
        Self {
            kind,
            user_id,
            target_id: Some(target_id),
            search: None,
        }
    }

    pub fn search(user_id: Uuid, query: impl Into<String>, result_count: u32) -> Self {
        Self {
            kind: BehaviorKind::Search,
            user_id,
            target_id: None,
            search: Some(SearchPayload {
                query: query.into(),
                result_count,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    View,
    Like,
    PlanAdd,
    Search,
}

impl BehaviorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorKind::View => "view",
            BehaviorKind::Like => "like",
            BehaviorKind::PlanAdd => "plan_add",
            BehaviorKind::Search => "search",
        }
    }
}

/// Raw search query recorded as audit data. Deliberately inert for scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPayload {
    pub query: String,
    pub result_count: u32,
}
