//! Lifecycle and authorization rules for leave requests.
//!
//! Everything here is pure: the functions look at the caller, the stored
//! record and the requested change, and either refuse or produce the
//! [`LeavePatch`] the store must apply. I/O lives in [`super::leave_request`].
//!
//! ```text
//!          submit                 approve (hr/admin)
//!  (none) -------> pending ---------------------------> approved
//!                    |  \
//!                    |   \ reject (hr/admin)
//!                    |    -----------------------------> rejected
//!                    | edit (owner, once, while pending)
//!                    v
//!                  pending (edited)
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::LeaveError,
    model::{
        leave_request::{Decision, EditStamp, LeavePatch, LeaveRequest, LeaveStatus, NewLeaveRequest, Verdict},
        role::Role,
    },
    store::LeaveScope,
};

pub const MAX_REASON_LEN: usize = 1000;

pub const DENY_DECIDE: &str = "Only HR managers and admins can approve/reject leave requests";
pub const DENY_EDIT: &str = "You can only edit your own leave requests";
pub const DENY_DELETE: &str = "You can only delete your own leave requests";
pub const ALREADY_DECIDED: &str = "Leave request has already been processed";
pub const EDIT_PROCESSED: &str = "Cannot edit a leave request that has already been processed";
pub const EDIT_TWICE: &str = "Leave request can only be edited once";
pub const DELETE_PROCESSED: &str = "Cannot delete a leave request that has already been processed";

/// Authenticated identity an operation runs as.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Caller {
    pub id: u64,
    pub role: Role,
}

impl Caller {
    pub fn owns(&self, record: &LeaveRequest) -> bool {
        record.submitted_by == self.id
    }
}

/// Content fields an owner asked to change; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentEdit {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// The two disjoint things an update request can mean.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCommand {
    Decide(Verdict),
    Edit(ContentEdit),
}

impl UpdateCommand {
    /// A present status other than `pending` selects a decision; anything
    /// else is a content edit. Empty strings count as absent.
    pub fn classify(
        status: Option<&str>,
        from_date: Option<&str>,
        to_date: Option<&str>,
        reason: Option<&str>,
    ) -> Result<Self, LeaveError> {
        let status = status.filter(|s| !s.is_empty());
        let verdict = match status.map(|s| (s, s.parse::<LeaveStatus>())) {
            None | Some((_, Ok(LeaveStatus::Pending))) => None,
            Some((_, Ok(LeaveStatus::Approved))) => Some(Verdict::Approve),
            Some((_, Ok(LeaveStatus::Rejected))) => Some(Verdict::Reject),
            Some((s, Err(_))) => {
                return Err(LeaveError::Validation(format!(
                    "Invalid status '{}'. Allowed: approved, rejected",
                    s
                )));
            }
        };

        match verdict {
            Some(verdict) => Ok(UpdateCommand::Decide(verdict)),
            _ => Ok(UpdateCommand::Edit(ContentEdit {
                from_date: parse_date("from_date", from_date)?,
                to_date: parse_date("to_date", to_date)?,
                reason: optional_reason(reason)?,
            })),
        }
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping its UTC date.
pub fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, LeaveError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map(Some)
        .map_err(|_| LeaveError::Validation(format!("{} must be a date (YYYY-MM-DD), got '{}'", field, raw)))
}

/// Only the empty string counts as absent; whitespace is a reason like any other.
fn optional_reason(value: Option<&str>) -> Result<Option<String>, LeaveError> {
    match value.filter(|r| !r.is_empty()) {
        Some(r) if r.chars().count() > MAX_REASON_LEN => Err(LeaveError::Validation(format!(
            "reason must be at most {} characters",
            MAX_REASON_LEN
        ))),
        other => Ok(other.map(str::to_string)),
    }
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, LeaveError> {
    value.ok_or_else(|| LeaveError::Validation(format!("{} is required", field)))
}

/// HR managers and admins list everything, everyone else only what they submitted.
pub fn list_scope(caller: &Caller) -> LeaveScope {
    if caller.role.is_hr_or_admin() {
        LeaveScope::All
    } else {
        LeaveScope::SubmittedBy(caller.id)
    }
}

pub fn new_request(
    caller: &Caller,
    employee_id: Option<u64>,
    from_date: Option<&str>,
    to_date: Option<&str>,
    reason: Option<&str>,
) -> Result<NewLeaveRequest, LeaveError> {
    Ok(NewLeaveRequest {
        employee_id: required("employee_id", employee_id)?,
        submitted_by: caller.id,
        from_date: required("from_date", parse_date("from_date", from_date)?)?,
        to_date: required("to_date", parse_date("to_date", to_date)?)?,
        reason: required("reason", optional_reason(reason)?)?,
    })
}

pub fn decide(
    caller: &Caller,
    record: &LeaveRequest,
    verdict: Verdict,
    now: DateTime<Utc>,
) -> Result<LeavePatch, LeaveError> {
    if !caller.role.is_hr_or_admin() {
        return Err(LeaveError::Authorization(DENY_DECIDE));
    }
    if !record.state.is_pending() {
        return Err(LeaveError::InvalidState(ALREADY_DECIDED));
    }

    Ok(LeavePatch::Decide {
        verdict,
        decision: Decision {
            by: caller.id,
            at: now,
        },
    })
}

pub fn edit(
    caller: &Caller,
    record: &LeaveRequest,
    change: ContentEdit,
    now: DateTime<Utc>,
) -> Result<LeavePatch, LeaveError> {
    if !caller.owns(record) {
        return Err(LeaveError::Authorization(DENY_EDIT));
    }
    if !record.state.is_pending() {
        return Err(LeaveError::InvalidState(EDIT_PROCESSED));
    }
    if record.is_edited() {
        return Err(LeaveError::InvalidState(EDIT_TWICE));
    }

    Ok(LeavePatch::Edit {
        from_date: change.from_date.unwrap_or(record.from_date),
        to_date: change.to_date.unwrap_or(record.to_date),
        reason: change.reason.unwrap_or_else(|| record.reason.clone()),
        stamp: EditStamp {
            edited_at: now,
            original: record.original_data(),
        },
    })
}

/// Owners may withdraw their own pending requests; admins may remove anyone's.
pub fn authorize_delete(caller: &Caller, record: &LeaveRequest) -> Result<(), LeaveError> {
    if !caller.owns(record) && !caller.role.is_admin() {
        return Err(LeaveError::Authorization(DENY_DELETE));
    }
    if !record.state.is_pending() {
        return Err(LeaveError::InvalidState(DELETE_PROCESSED));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveState;
    use chrono::TimeZone;

    const OWNER: u64 = 10;
    const OTHER: u64 = 11;
    const HR: u64 = 20;
    const ADMIN: u64 = 30;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn caller(id: u64, role: Role) -> Caller {
        Caller { id, role }
    }

    fn everyone() -> Vec<Caller> {
        vec![
            caller(OWNER, Role::Employee),
            caller(OTHER, Role::Employee),
            caller(HR, Role::Hr),
            caller(ADMIN, Role::Admin),
        ]
    }

    fn record(state: LeaveState, edited: bool) -> LeaveRequest {
        let mut r = LeaveRequest {
            id: 1,
            employee_id: OWNER,
            submitted_by: OWNER,
            from_date: date("2024-06-01"),
            to_date: date("2024-06-05"),
            reason: "vacation".into(),
            state,
            edit: None,
            created_at: now(),
        };
        if edited {
            r.edit = Some(EditStamp {
                edited_at: now(),
                original: r.original_data(),
            });
        }
        r
    }

    fn states() -> Vec<LeaveState> {
        let d = Decision { by: HR, at: now() };
        vec![LeaveState::Pending, LeaveState::Approved(d), LeaveState::Rejected(d)]
    }

    #[test]
    fn list_scope_follows_role() {
        assert_eq!(list_scope(&caller(OWNER, Role::Employee)), LeaveScope::SubmittedBy(OWNER));
        assert_eq!(list_scope(&caller(HR, Role::Hr)), LeaveScope::All);
        assert_eq!(list_scope(&caller(ADMIN, Role::Admin)), LeaveScope::All);
    }

    #[test]
    fn classify_routes_on_status() {
        assert_eq!(
            UpdateCommand::classify(Some("approved"), None, None, None).unwrap(),
            UpdateCommand::Decide(Verdict::Approve)
        );
        assert_eq!(
            UpdateCommand::classify(Some("rejected"), Some("2024-06-02"), None, Some("x")).unwrap(),
            UpdateCommand::Decide(Verdict::Reject)
        );
        for status in [None, Some(""), Some("pending")] {
            assert_eq!(
                UpdateCommand::classify(status, None, None, Some("family trip")).unwrap(),
                UpdateCommand::Edit(ContentEdit {
                    reason: Some("family trip".into()),
                    ..ContentEdit::default()
                })
            );
        }
        assert!(matches!(
            UpdateCommand::classify(Some("cancelled"), None, None, None),
            Err(LeaveError::Validation(_))
        ));
    }

    #[test]
    fn classify_treats_empty_fields_as_absent_and_rejects_bad_dates() {
        assert_eq!(
            UpdateCommand::classify(None, Some(""), Some("2024-06-09T00:00:00Z"), Some("")).unwrap(),
            UpdateCommand::Edit(ContentEdit {
                from_date: None,
                to_date: Some(date("2024-06-09")),
                reason: None,
            })
        );
        assert!(matches!(
            UpdateCommand::classify(None, Some("06/01/2024"), None, None),
            Err(LeaveError::Validation(_))
        ));
    }

    #[test]
    fn whitespace_reason_is_kept() {
        assert_eq!(
            UpdateCommand::classify(None, None, None, Some("   ")).unwrap(),
            UpdateCommand::Edit(ContentEdit {
                reason: Some("   ".into()),
                ..ContentEdit::default()
            })
        );
        let me = caller(OWNER, Role::Employee);
        let r = new_request(&me, Some(OWNER), Some("2024-06-01"), Some("2024-06-05"), Some(" ")).unwrap();
        assert_eq!(r.reason, " ");
    }

    #[test]
    fn timestamps_keep_their_utc_date() {
        assert_eq!(
            parse_date("from_date", Some("2024-06-01T23:00:00-05:00")).unwrap(),
            Some(date("2024-06-02"))
        );
        assert_eq!(
            parse_date("from_date", Some("2024-06-02T01:30:00+03:00")).unwrap(),
            Some(date("2024-06-01"))
        );
        assert_eq!(parse_date("from_date", Some("2024-06-01")).unwrap(), Some(date("2024-06-01")));
    }

    #[test]
    fn new_request_requires_every_field() {
        let me = caller(OWNER, Role::Employee);
        let long = "x".repeat(MAX_REASON_LEN + 1);
        let ok = new_request(&me, Some(OWNER), Some("2024-06-01"), Some("2024-06-05"), Some("vacation")).unwrap();
        assert_eq!(ok.submitted_by, OWNER);
        assert_eq!(ok.from_date, date("2024-06-01"));

        let cases = [
            new_request(&me, None, Some("2024-06-01"), Some("2024-06-05"), Some("vacation")),
            new_request(&me, Some(OWNER), None, Some("2024-06-05"), Some("vacation")),
            new_request(&me, Some(OWNER), Some("2024-06-01"), Some(""), Some("vacation")),
            new_request(&me, Some(OWNER), Some("2024-06-01"), Some("2024-06-05"), Some("")),
            new_request(&me, Some(OWNER), Some("yesterday"), Some("2024-06-05"), Some("vacation")),
            new_request(&me, Some(OWNER), Some("2024-06-01"), Some("2024-06-05"), Some(long.as_str())),
        ];
        for case in cases {
            assert!(matches!(case, Err(LeaveError::Validation(_))));
        }
    }

    #[test]
    fn new_request_does_not_check_the_range() {
        let me = caller(OWNER, Role::Employee);
        let r = new_request(&me, Some(OTHER), Some("2024-06-05"), Some("2024-06-01"), Some("x")).unwrap();
        assert_eq!(r.employee_id, OTHER);
        assert!(r.from_date > r.to_date);
    }

    #[test]
    fn decide_matrix() {
        for who in everyone() {
            for state in states() {
                for edited in [false, true] {
                    let r = record(state, edited);
                    let result = decide(&who, &r, Verdict::Approve, now());
                    match (who.role.is_hr_or_admin(), state.is_pending()) {
                        (false, _) => assert!(matches!(result, Err(LeaveError::Authorization(DENY_DECIDE)))),
                        (true, false) => assert!(matches!(result, Err(LeaveError::InvalidState(ALREADY_DECIDED)))),
                        (true, true) => {
                            let patch = result.unwrap();
                            let mut applied = r.clone();
                            patch.apply(&mut applied);
                            assert_eq!(applied.state, LeaveState::Approved(Decision { by: who.id, at: now() }));
                            assert_eq!(applied.original_data(), r.original_data());
                            assert_eq!(applied.edit, r.edit);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn edit_matrix() {
        for who in everyone() {
            for state in states() {
                for edited in [false, true] {
                    let r = record(state, edited);
                    let result = edit(&who, &r, ContentEdit::default(), now());
                    if who.id != OWNER {
                        assert!(matches!(result, Err(LeaveError::Authorization(DENY_EDIT))));
                    } else if !state.is_pending() {
                        assert!(matches!(result, Err(LeaveError::InvalidState(EDIT_PROCESSED))));
                    } else if edited {
                        assert!(matches!(result, Err(LeaveError::InvalidState(EDIT_TWICE))));
                    } else {
                        assert!(result.is_ok());
                    }
                }
            }
        }
    }

    #[test]
    fn edit_merges_and_snapshots() {
        let me = caller(OWNER, Role::Employee);
        let r = record(LeaveState::Pending, false);
        let change = ContentEdit {
            to_date: Some(date("2024-06-07")),
            reason: Some("family trip".into()),
            ..ContentEdit::default()
        };

        let mut applied = r.clone();
        edit(&me, &r, change, now()).unwrap().apply(&mut applied);

        assert_eq!(applied.from_date, date("2024-06-01"));
        assert_eq!(applied.to_date, date("2024-06-07"));
        assert_eq!(applied.reason, "family trip");
        let stamp = applied.edit.unwrap();
        assert_eq!(stamp.edited_at, now());
        assert_eq!(stamp.original, r.original_data());
        assert_eq!(applied.state, LeaveState::Pending);
    }

    #[test]
    fn hr_cannot_edit_someone_elses_request() {
        let r = record(LeaveState::Pending, false);
        assert!(matches!(
            edit(&caller(HR, Role::Hr), &r, ContentEdit::default(), now()),
            Err(LeaveError::Authorization(_))
        ));
    }

    #[test]
    fn delete_matrix() {
        for who in everyone() {
            for state in states() {
                for edited in [false, true] {
                    let r = record(state, edited);
                    let result = authorize_delete(&who, &r);
                    let may_touch = who.id == OWNER || who.role == Role::Admin;
                    match (may_touch, state.is_pending()) {
                        (false, _) => assert!(matches!(result, Err(LeaveError::Authorization(DENY_DELETE)))),
                        (true, false) => assert!(matches!(result, Err(LeaveError::InvalidState(DELETE_PROCESSED)))),
                        (true, true) => assert!(result.is_ok()),
                    }
                }
            }
        }
    }
}
