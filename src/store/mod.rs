use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    error::StoreError,
    model::{
        leave_request::{LeavePatch, LeaveRequest, NewLeaveRequest},
        user::IdentitySummary,
    },
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// Which records a listing returns.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LeaveScope {
    All,
    SubmittedBy(u64),
    Employee(u64),
}

/// Persistence of leave requests.
///
/// Listings are ordered newest first (`created_at` descending, then id
/// descending). `update` and `delete` only land while the record still
/// satisfies the write guard, and report `GuardFailed` otherwise.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    async fn find_all(&self, scope: LeaveScope) -> Result<Vec<LeaveRequest>, StoreError>;

    async fn insert(&self, new: NewLeaveRequest) -> Result<LeaveRequest, StoreError>;

    async fn update(&self, id: u64, patch: LeavePatch) -> Result<LeaveRequest, StoreError>;

    /// Removes a record that is still pending.
    async fn delete_pending(&self, id: u64) -> Result<(), StoreError>;
}

/// Read side of the identity directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Unknown ids are simply absent from the result.
    async fn summaries(&self, ids: &[u64]) -> Result<HashMap<u64, IdentitySummary>, StoreError>;
}
