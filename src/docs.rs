use crate::model::leave_request::{LeaveRequestView, LeaveStatus, OriginalData};
use crate::model::role::Role;
use crate::model::user::IdentitySummary;
use crate::service::leave_request::{CreateLeave, UpdateLeave};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Leave request service

Employees submit leave requests, may edit a pending request **once**, and may
withdraw it while it is still pending. HR managers and admins approve or reject
pending requests; a decision is final.

### 🔐 Security
Every endpoint requires a **JWT Bearer** access token.
- `employee`: sees and edits own submissions
- `hr`: sees all requests, approves/rejects
- `admin`: everything HR can do, and may delete anyone's pending request

### 📦 Response Format
Leave requests are returned with the employee, submitter and deciding
manager resolved to name, role, email and photo. Errors carry a `message`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::employee_leave_list,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
    ),
    components(
        schemas(
            CreateLeave,
            UpdateLeave,
            LeaveRequestView,
            LeaveStatus,
            OriginalData,
            IdentitySummary,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
