use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::{
    error::LeaveError,
    model::{
        leave_request::{LeaveRequest, LeaveRequestView},
        user::IdentitySummary,
    },
    service::lifecycle::{self, Caller, UpdateCommand},
    store::{Directory, LeaveScope, LeaveStore},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 7)]
    pub employee_id: Option<u64>,
    #[schema(example = "2024-06-01", format = "date")]
    pub from_date: Option<String>,
    #[schema(example = "2024-06-05", format = "date")]
    pub to_date: Option<String>,
    #[schema(example = "vacation")]
    pub reason: Option<String>,
}

/// Either a decision (`status` set to `approved`/`rejected`) or a content edit.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLeave {
    #[schema(example = "approved")]
    pub status: Option<String>,
    #[schema(example = "2024-06-02", format = "date")]
    pub from_date: Option<String>,
    #[schema(example = "2024-06-06", format = "date")]
    pub to_date: Option<String>,
    #[schema(example = "family trip")]
    pub reason: Option<String>,
}

/// The leave request lifecycle engine.
#[derive(Clone)]
pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    directory: Arc<dyn Directory>,
}

impl LeaveService {
    pub fn new(store: Arc<dyn LeaveStore>, directory: Arc<dyn Directory>) -> Self {
        Self { store, directory }
    }

    #[instrument(name = "leave_list", skip(self, caller), fields(caller_id = caller.id))]
    pub async fn list(&self, caller: &Caller) -> Result<Vec<LeaveRequestView>, LeaveError> {
        let scope = lifecycle::list_scope(caller);
        debug!(?scope, "Listing leave requests");
        let records = self.store.find_all(scope).await?;
        self.resolve_all(records).await
    }

    /// No role filtering: anyone authenticated may read an employee's history.
    #[instrument(name = "leave_list_by_employee", skip(self, caller), fields(caller_id = caller.id))]
    pub async fn list_by_employee(
        &self,
        caller: &Caller,
        employee_id: u64,
    ) -> Result<Vec<LeaveRequestView>, LeaveError> {
        let records = self.store.find_all(LeaveScope::Employee(employee_id)).await?;
        self.resolve_all(records).await
    }

    #[instrument(name = "leave_create", skip(self, caller, payload), fields(caller_id = caller.id))]
    pub async fn create(
        &self,
        caller: &Caller,
        payload: CreateLeave,
    ) -> Result<LeaveRequestView, LeaveError> {
        let new = lifecycle::new_request(
            caller,
            payload.employee_id,
            payload.from_date.as_deref(),
            payload.to_date.as_deref(),
            payload.reason.as_deref(),
        )
        .inspect_err(|e| debug!(error = %e, "Rejected leave request payload"))?;

        let record = self.store.insert(new).await?;
        info!(leave_id = record.id, employee_id = record.employee_id, "Leave request submitted");
        self.resolve(record).await
    }

    #[instrument(name = "leave_update", skip(self, caller, payload), fields(caller_id = caller.id))]
    pub async fn update(
        &self,
        caller: &Caller,
        id: u64,
        payload: UpdateLeave,
    ) -> Result<LeaveRequestView, LeaveError> {
        let record = self.fetch(id).await?;

        let command = UpdateCommand::classify(
            payload.status.as_deref(),
            payload.from_date.as_deref(),
            payload.to_date.as_deref(),
            payload.reason.as_deref(),
        )?;

        let updated = match command {
            UpdateCommand::Decide(verdict) => {
                let patch = lifecycle::decide(caller, &record, verdict, Utc::now())
                    .inspect_err(|e| info!(leave_id = id, reason = %e, "Decision refused"))?;
                let updated = self.store.update(id, patch).await?;
                info!(leave_id = id, status = %verdict.status(), "Leave request decided");
                updated
            }
            UpdateCommand::Edit(change) => {
                let patch = lifecycle::edit(caller, &record, change, Utc::now())
                    .inspect_err(|e| info!(leave_id = id, reason = %e, "Edit refused"))?;
                let updated = self.store.update(id, patch).await?;
                info!(leave_id = id, "Leave request edited");
                updated
            }
        };

        self.resolve(updated).await
    }

    #[instrument(name = "leave_delete", skip(self, caller), fields(caller_id = caller.id))]
    pub async fn delete(&self, caller: &Caller, id: u64) -> Result<(), LeaveError> {
        let record = self.fetch(id).await?;
        lifecycle::authorize_delete(caller, &record)
            .inspect_err(|e| info!(leave_id = id, reason = %e, "Delete refused"))?;

        self.store.delete_pending(id).await?;
        info!(leave_id = id, "Leave request deleted");
        Ok(())
    }

    async fn fetch(&self, id: u64) -> Result<LeaveRequest, LeaveError> {
        self.store.find_by_id(id).await?.ok_or(LeaveError::NotFound)
    }

    async fn resolve(&self, record: LeaveRequest) -> Result<LeaveRequestView, LeaveError> {
        let mut views = self.resolve_all(vec![record]).await?;
        views.pop().ok_or(LeaveError::NotFound)
    }

    /// Joins identity summaries into the records with a single directory lookup.
    async fn resolve_all(&self, records: Vec<LeaveRequest>) -> Result<Vec<LeaveRequestView>, LeaveError> {
        let mut ids: Vec<u64> = records
            .iter()
            .flat_map(|r| {
                [
                    Some(r.employee_id),
                    Some(r.submitted_by),
                    r.state.approval().map(|d| d.by),
                    r.state.rejection().map(|d| d.by),
                ]
            })
            .flatten()
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let people = self.directory.summaries(&ids).await?;
        Ok(records.into_iter().map(|r| view(r, &people)).collect())
    }
}

fn view(record: LeaveRequest, people: &HashMap<u64, IdentitySummary>) -> LeaveRequestView {
    let person = |id: u64| people.get(&id).cloned();
    let approval = record.state.approval();
    let rejection = record.state.rejection();

    LeaveRequestView {
        id: record.id,
        employee: person(record.employee_id),
        submitted_by: person(record.submitted_by),
        from_date: record.from_date,
        to_date: record.to_date,
        status: record.status(),
        approved_by: approval.and_then(|d| person(d.by)),
        approved_date: approval.map(|d| d.at),
        rejected_by: rejection.and_then(|d| person(d.by)),
        rejected_date: rejection.map(|d| d.at),
        is_edited: record.is_edited(),
        edited_date: record.edit.as_ref().map(|e| e.edited_at),
        original_data: record.edit.map(|e| e.original),
        reason: record.reason,
        created_at: record.created_at,
    }
}
