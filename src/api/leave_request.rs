use crate::auth::auth::AuthUser;
use crate::service::leave_request::{CreateLeave, LeaveService, UpdateLeave};
use actix_web::{HttpResponse, Responder, web};

/* =========================
List leave requests
========================= */
/// HR managers and admins get every request, everyone else only their own submissions.
#[utoipa::path(
    get,
    path = "/api/leave",
    responses(
        (status = 200, description = "Leave requests, newest first", body = [crate::model::leave_request::LeaveRequestView]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<LeaveService>,
) -> actix_web::Result<impl Responder> {
    let leaves = service.list(&auth.caller()).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
List leave requests of one employee
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose leave history is listed")
    ),
    responses(
        (status = 200, description = "Leave requests of the employee, newest first", body = [crate::model::leave_request::LeaveRequestView]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn employee_leave_list(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let leaves = service.list_by_employee(&auth.caller(), employee_id).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = crate::model::leave_request::LeaveRequestView),
        (status = 400, description = "Missing or malformed fields", body = Object, example = json!({
            "message": "reason is required"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let leave = service.create(&auth.caller(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Edit (owner) or approve/reject (HR/Admin)
========================= */
/// A `status` of `approved` or `rejected` decides the request; any other
/// payload is the owner's single edit of `from_date`, `to_date` and `reason`.
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request")
    ),
    request_body(
        content = UpdateLeave,
        description = "Decision or content edit",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Updated leave request", body = crate::model::leave_request::LeaveRequestView),
        (status = 400, description = "Request already processed or already edited", body = Object, example = json!({
            "message": "Leave request can only be edited once"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner, or not HR/Admin", body = Object, example = json!({
            "message": "Only HR managers and admins can approve/reject leave requests"
        })),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let leave = service
        .update(&auth.caller(), leave_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Delete pending leave request
========================= */
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request")
    ),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request deleted successfully"
        })),
        (status = 400, description = "Request already processed", body = Object, example = json!({
            "message": "Cannot delete a leave request that has already been processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the owner nor an admin"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    service.delete(&auth.caller(), leave_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request deleted successfully"
    })))
}
