use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBoard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial board update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub board_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
}

/// Partial post update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResult {
    pub id: i64,
    pub report_id: i64,
    pub team: String,
    pub result: String,
}

/// One player's line on the score sheet. Stat cells left blank on the sheet
/// are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub backnumber: i64,
    pub player: String,
    pub offense_rebound: Option<i64>,
    pub defense_rebound: Option<i64>,
    pub total_rebound: Option<i64>,
    pub assist: Option<i64>,
    pub steal: Option<i64>,
    pub block: Option<i64>,
    pub score_1q: Option<i64>,
    pub score_2q: Option<i64>,
    pub score_3q: Option<i64>,
    pub score_4q: Option<i64>,
    pub score_ot: Option<i64>,
    pub score_total: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub id: i64,
    pub team_result_id: i64,
    #[serde(flatten)]
    pub line: PlayerLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamResultDetail {
    #[serde(flatten)]
    pub team_result: TeamResult,
    pub player_stats: Vec<PlayerStat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub team_results: Vec<TeamResultDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "succeeded" => Some(JobStatus::Succeeded),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportJob {
    pub id: String,
    pub filename: Option<String>,
    pub status: JobStatus,
    pub report_id: Option<i64>,
    pub player_stats: Option<i64>,
    pub skipped_rows: Option<i64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
