use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::user::IdentitySummary;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Outcome an HR manager or admin can give a pending request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn status(self) -> LeaveStatus {
        match self {
            Verdict::Approve => LeaveStatus::Approved,
            Verdict::Reject => LeaveStatus::Rejected,
        }
    }
}

/// Who decided and when. Approval and rejection stamps are always set as a pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Decision {
    pub by: u64,
    pub at: DateTime<Utc>,
}

/// Lifecycle position; terminal states carry their decision stamp.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LeaveState {
    Pending,
    Approved(Decision),
    Rejected(Decision),
}

impl LeaveState {
    pub fn status(&self) -> LeaveStatus {
        match self {
            LeaveState::Pending => LeaveStatus::Pending,
            LeaveState::Approved(_) => LeaveStatus::Approved,
            LeaveState::Rejected(_) => LeaveStatus::Rejected,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LeaveState::Pending)
    }

    pub fn approval(&self) -> Option<Decision> {
        match self {
            LeaveState::Approved(d) => Some(*d),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<Decision> {
        match self {
            LeaveState::Rejected(d) => Some(*d),
            _ => None,
        }
    }
}

/// Content of a request as it was before its single edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OriginalData {
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2024-06-05", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "vacation")]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditStamp {
    pub edited_at: DateTime<Utc>,
    pub original: OriginalData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub submitted_by: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
    pub state: LeaveState,
    /// `Some` once the owner used their single edit.
    pub edit: Option<EditStamp>,
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn status(&self) -> LeaveStatus {
        self.state.status()
    }

    pub fn is_edited(&self) -> bool {
        self.edit.is_some()
    }

    pub fn original_data(&self) -> OriginalData {
        OriginalData {
            from_date: self.from_date,
            to_date: self.to_date,
            reason: self.reason.clone(),
        }
    }
}

/// Validated content of a request about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub submitted_by: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
}

/// Partial update the store applies to a single pending record.
#[derive(Debug, Clone, PartialEq)]
pub enum LeavePatch {
    Decide {
        verdict: Verdict,
        decision: Decision,
    },
    Edit {
        from_date: NaiveDate,
        to_date: NaiveDate,
        reason: String,
        stamp: EditStamp,
    },
}

impl LeavePatch {
    /// Condition the record must still satisfy when the write lands.
    /// The MySQL store expresses the same guard in its `WHERE` clause.
    #[cfg(test)]
    pub fn guard_holds(&self, record: &LeaveRequest) -> bool {
        match self {
            LeavePatch::Decide { .. } => record.state.is_pending(),
            LeavePatch::Edit { .. } => record.state.is_pending() && !record.is_edited(),
        }
    }

    #[cfg(test)]
    pub fn apply(self, record: &mut LeaveRequest) {
        match self {
            LeavePatch::Decide { verdict, decision } => {
                record.state = match verdict {
                    Verdict::Approve => LeaveState::Approved(decision),
                    Verdict::Reject => LeaveState::Rejected(decision),
                };
            }
            LeavePatch::Edit {
                from_date,
                to_date,
                reason,
                stamp,
            } => {
                record.from_date = from_date;
                record.to_date = to_date;
                record.reason = reason;
                record.edit = Some(stamp);
            }
        }
    }
}

/// Flat `leave_requests` row.
#[derive(Debug, sqlx::FromRow)]
pub struct LeaveRequestSql {
    pub id: u64,
    pub employee_id: u64,
    pub submitted_by: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
    pub status: String,
    pub approved_by: Option<u64>,
    pub approved_date: Option<DateTime<Utc>>,
    pub rejected_by: Option<u64>,
    pub rejected_date: Option<DateTime<Utc>>,
    pub is_edited: bool,
    pub edited_date: Option<DateTime<Utc>>,
    pub original_from_date: Option<NaiveDate>,
    pub original_to_date: Option<NaiveDate>,
    pub original_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LeaveRequestSql> for LeaveRequest {
    type Error = String;

    fn try_from(row: LeaveRequestSql) -> Result<Self, Self::Error> {
        let status: LeaveStatus = row
            .status
            .parse()
            .map_err(|_| format!("unknown status '{}'", row.status))?;

        let state = match (status, row.approved_by.zip(row.approved_date), row.rejected_by.zip(row.rejected_date)) {
            (LeaveStatus::Pending, None, None) => LeaveState::Pending,
            (LeaveStatus::Approved, Some((by, at)), None) => LeaveState::Approved(Decision { by, at }),
            (LeaveStatus::Rejected, None, Some((by, at))) => LeaveState::Rejected(Decision { by, at }),
            _ => return Err(format!("decision stamps do not match status '{}'", status)),
        };

        let edit = match (row.is_edited, row.edited_date) {
            (false, _) => None,
            (true, Some(edited_at)) => {
                let (Some(from_date), Some(to_date), Some(reason)) =
                    (row.original_from_date, row.original_to_date, row.original_reason)
                else {
                    return Err("edited request without original data".to_string());
                };
                Some(EditStamp {
                    edited_at,
                    original: OriginalData {
                        from_date,
                        to_date,
                        reason,
                    },
                })
            }
            (true, None) => return Err("edited request without edit date".to_string()),
        };

        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            submitted_by: row.submitted_by,
            from_date: row.from_date,
            to_date: row.to_date,
            reason: row.reason,
            state,
            edit,
            created_at: row.created_at,
        })
    }
}

/// Leave request as returned to callers, with identities resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee": {"id": 7, "name": "Jane Doe", "role": "employee", "email": "jane.doe@company.com", "profile_photo": null},
    "submitted_by": {"id": 7, "name": "Jane Doe", "role": "employee", "email": "jane.doe@company.com", "profile_photo": null},
    "from_date": "2024-06-01",
    "to_date": "2024-06-05",
    "reason": "family trip",
    "status": "pending",
    "approved_by": null,
    "approved_date": null,
    "rejected_by": null,
    "rejected_date": null,
    "is_edited": true,
    "edited_date": "2024-05-20T09:30:00Z",
    "original_data": {"from_date": "2024-06-01", "to_date": "2024-06-05", "reason": "vacation"},
    "created_at": "2024-05-19T08:00:00Z"
}))]
pub struct LeaveRequestView {
    pub id: u64,
    pub employee: Option<IdentitySummary>,
    pub submitted_by: Option<IdentitySummary>,
    #[schema(format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub to_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub approved_by: Option<IdentitySummary>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub approved_date: Option<DateTime<Utc>>,
    pub rejected_by: Option<IdentitySummary>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub rejected_date: Option<DateTime<Utc>>,
    pub is_edited: bool,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub edited_date: Option<DateTime<Utc>>,
    pub original_data: Option<OriginalData>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}
