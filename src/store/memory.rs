use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    error::StoreError,
    model::{
        leave_request::{LeavePatch, LeaveRequest, LeaveState, NewLeaveRequest},
        user::IdentitySummary,
    },
    store::{Directory, LeaveScope, LeaveStore},
};

/// In-memory store with the same contract as the MySQL one.
/// Every insert is stamped one minute after the previous one.
#[derive(Default)]
pub struct MemoryLeaveStore {
    records: Mutex<Vec<LeaveRequest>>,
}

impl MemoryLeaveStore {
    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    pub fn snapshot(&self, id: u64) -> Option<LeaveRequest> {
        self.records.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }
}

fn in_scope(scope: LeaveScope, record: &LeaveRequest) -> bool {
    match scope {
        LeaveScope::All => true,
        LeaveScope::SubmittedBy(id) => record.submitted_by == id,
        LeaveScope::Employee(id) => record.employee_id == id,
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.snapshot(id))
    }

    async fn find_all(&self, scope: LeaveScope) -> Result<Vec<LeaveRequest>, StoreError> {
        let mut found: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| in_scope(scope, r))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn insert(&self, new: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let mut records = self.records.lock().unwrap();
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let record = LeaveRequest {
            id,
            employee_id: new.employee_id,
            submitted_by: new.submitted_by,
            from_date: new.from_date,
            to_date: new.to_date,
            reason: new.reason,
            state: LeaveState::Pending,
            edit: None,
            created_at: Self::epoch() + Duration::minutes(id as i64),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: u64, patch: LeavePatch) -> Result<LeaveRequest, StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if !patch.guard_holds(record) {
            return Err(StoreError::GuardFailed(id));
        }
        patch.apply(record);
        Ok(record.clone())
    }

    async fn delete_pending(&self, id: u64) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if !records[index].state.is_pending() {
            return Err(StoreError::GuardFailed(id));
        }
        records.remove(index);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDirectory {
    people: HashMap<u64, IdentitySummary>,
}

impl MemoryDirectory {
    pub fn with(mut self, person: IdentitySummary) -> Self {
        self.people.insert(person.id, person);
        self
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn summaries(&self, ids: &[u64]) -> Result<HashMap<u64, IdentitySummary>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.people.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}
