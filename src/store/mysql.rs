use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::{debug, error};

use crate::{
    error::StoreError,
    model::{
        leave_request::{LeavePatch, LeaveRequest, LeaveRequestSql, NewLeaveRequest, Verdict},
        user::{IdentitySummary, UserSummarySql},
    },
    store::{Directory, LeaveScope, LeaveStore},
};

const SELECT_LEAVE: &str = r#"
    SELECT
        id, employee_id, submitted_by, from_date, to_date, reason, status,
        approved_by, approved_date, rejected_by, rejected_date,
        is_edited, edited_date, original_from_date, original_to_date, original_reason,
        created_at
    FROM leave_requests
"#;

fn to_record(row: LeaveRequestSql) -> Result<LeaveRequest, StoreError> {
    let id = row.id;
    LeaveRequest::try_from(row).map_err(|reason| {
        error!(leave_id = id, %reason, "Inconsistent leave request row");
        StoreError::Corrupt(id, reason)
    })
}

#[derive(Clone)]
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Tells apart a missing record from one whose guard did not hold.
    async fn guard_miss(&self, id: u64) -> StoreError {
        match self.find_by_id(id).await {
            Ok(Some(_)) => StoreError::GuardFailed(id),
            Ok(None) => StoreError::NotFound(id),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("{SELECT_LEAVE} WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRequestSql>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(to_record).transpose()
    }

    async fn find_all(&self, scope: LeaveScope) -> Result<Vec<LeaveRequest>, StoreError> {
        let (where_sql, arg) = match scope {
            LeaveScope::All => ("", None),
            LeaveScope::SubmittedBy(id) => (" WHERE submitted_by = ?", Some(id)),
            LeaveScope::Employee(id) => (" WHERE employee_id = ?", Some(id)),
        };
        let sql = format!("{SELECT_LEAVE}{where_sql} ORDER BY created_at DESC, id DESC");
        debug!(sql = %sql, ?scope, "Listing leave requests");

        let mut query = sqlx::query_as::<_, LeaveRequestSql>(&sql);
        if let Some(id) = arg {
            query = query.bind(id);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(to_record)
            .collect()
    }

    async fn insert(&self, new: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, submitted_by, from_date, to_date, reason, status)
            VALUES (?, ?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(new.employee_id)
        .bind(new.submitted_by)
        .bind(new.from_date)
        .bind(new.to_date)
        .bind(&new.reason)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_by_id(id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: u64, patch: LeavePatch) -> Result<LeaveRequest, StoreError> {
        let result = match patch {
            LeavePatch::Decide { verdict, decision } => {
                let sql = match verdict {
                    Verdict::Approve => {
                        r#"
                        UPDATE leave_requests
                        SET status = 'approved', approved_by = ?, approved_date = ?
                        WHERE id = ?
                        AND status = 'pending'
                        "#
                    }
                    Verdict::Reject => {
                        r#"
                        UPDATE leave_requests
                        SET status = 'rejected', rejected_by = ?, rejected_date = ?
                        WHERE id = ?
                        AND status = 'pending'
                        "#
                    }
                };
                sqlx::query(sql)
                    .bind(decision.by)
                    .bind(decision.at)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            LeavePatch::Edit {
                from_date,
                to_date,
                reason,
                stamp,
            } => {
                sqlx::query(
                    r#"
                    UPDATE leave_requests
                    SET from_date = ?, to_date = ?, reason = ?,
                        is_edited = TRUE, edited_date = ?,
                        original_from_date = ?, original_to_date = ?, original_reason = ?
                    WHERE id = ?
                    AND status = 'pending'
                    AND is_edited = FALSE
                    "#,
                )
                .bind(from_date)
                .bind(to_date)
                .bind(reason)
                .bind(stamp.edited_at)
                .bind(stamp.original.from_date)
                .bind(stamp.original.to_date)
                .bind(stamp.original.reason)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(self.guard_miss(id).await);
        }

        self.find_by_id(id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn delete_pending(&self, id: u64) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM leave_requests WHERE id = ? AND status = 'pending'"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.guard_miss(id).await);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MySqlDirectory {
    pool: MySqlPool,
}

impl MySqlDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for MySqlDirectory {
    async fn summaries(&self, ids: &[u64]) -> Result<HashMap<u64, IdentitySummary>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, email, role_id, profile_photo FROM users WHERE id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_as::<_, UserSummarySql>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(UserSummarySql::into_summary)
            .map(|s| (s.id, s))
            .collect())
    }
}
