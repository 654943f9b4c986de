use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson, ApiPath, ApiResult};
use crate::AppState;
use api_shared::auth::issue_token;
use api_shared::{
    BloodRequestRes, CreateBloodRequestReq, CreateBloodRequestRes, CreateDonorReq, DashboardRes,
    DonorRes, ErrorRes, HealthRes, HealthService, ListBloodRequestsRes, ListDonorsRes, LoginReq,
    LoginRes, MessageRes, RegisterReq, SmsStatus,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use raktmap_core::{
    BloodRequest, CoreError, DispatchSummary, Donor, NewBloodRequest, NewDonor, NewUser,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created", body = MessageRes),
        (status = 400, description = "Missing or invalid field", body = ErrorRes),
        (status = 409, description = "Email already registered", body = ErrorRes)
    )
)]
/// Register a hospital or admin account.
#[axum::debug_handler]
pub(crate) async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterReq>,
) -> ApiResult<(StatusCode, Json<MessageRes>)> {
    state.accounts.register(NewUser {
        email: req.email,
        password: req.password,
        role: req.role,
        name: req.name,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageRes {
            message: "User registered successfully".into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Signed bearer token", body = LoginRes),
        (status = 401, description = "Invalid credentials", body = ErrorRes)
    )
)]
/// Exchange email and password for a bearer token.
///
/// # Errors
/// Returns `401 Unauthorized` for an unknown email or a wrong password, and
/// `500 Internal Server Error` if the token cannot be signed.
#[axum::debug_handler]
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginReq>,
) -> ApiResult<Json<LoginRes>> {
    let user = state.accounts.authenticate(&req.email, &req.password)?;

    let token = issue_token(
        &state.auth,
        user.id,
        &user.email,
        user.role.as_str(),
        &user.name,
    )
    .map_err(|e| {
        tracing::error!("failed to issue token for {}: {}", user.email, e);
        ApiError::Internal("Server error")
    })?;

    tracing::info!("{} signed in as {}", user.email, user.role);
    Ok(Json(LoginRes {
        token,
        role: user.role.as_str().to_string(),
        name: user.name,
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Greeting for the signed-in account", body = DashboardRes),
        (status = 401, description = "No token provided", body = ErrorRes),
        (status = 403, description = "Invalid token", body = ErrorRes)
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler(state = AppState)]
pub(crate) async fn dashboard(user: AuthUser) -> Json<DashboardRes> {
    Json(DashboardRes {
        message: format!("Welcome, {}!", user.email),
        role: user.role.as_str().to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/blood-requests",
    request_body = CreateBloodRequestReq,
    responses(
        (status = 201, description = "Request stored and matching donors notified", body = CreateBloodRequestRes),
        (status = 400, description = "Validation failed; nothing stored or sent", body = ErrorRes),
        (status = 401, description = "No token provided", body = ErrorRes),
        (status = 403, description = "Invalid token", body = ErrorRes),
        (status = 500, description = "Donor lookup or storage failed", body = ErrorRes)
    ),
    security(("bearer_auth" = []))
)]
/// Submit a blood request and text every matching donor.
///
/// The request is owned by the signed-in account. An unrecognised blood group is accepted and
/// reported with `totalDonors: 0`.
///
/// # Errors
/// Returns `400 Bad Request` if validation fails, and `500 Internal Server Error` if the donor
/// directory cannot be read or the request cannot be stored.
#[axum::debug_handler]
pub(crate) async fn create_blood_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateBloodRequestReq>,
) -> ApiResult<(StatusCode, Json<CreateBloodRequestRes>)> {
    let new = NewBloodRequest {
        blood_group: req.blood_group,
        quantity: req.quantity,
        urgency: req.urgency,
        required_by: req.required_by,
        description: req.description,
        patient_age: req.patient_age,
        patient_condition: req.patient_condition,
    };

    let submission = state
        .requests
        .submit(&user.requester(), new)
        .await
        .map_err(|e| match e {
            CoreError::InvalidInput(_) | CoreError::Text(_) => ApiError::Core(e),
            e => {
                tracing::error!("blood request from {} failed: {:?}", user.email, e);
                ApiError::Internal("Error processing blood request")
            }
        })?;

    let message = format!(
        "Blood request created and {} compatible donors notified",
        submission.request.notified_donors.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(CreateBloodRequestRes {
            success: true,
            message,
            sms_status: sms_status(submission.summary),
            blood_request: blood_request_res(submission.request),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/blood-requests",
    responses(
        (status = 200, description = "Requests visible to the caller, newest first", body = ListBloodRequestsRes),
        (status = 401, description = "No token provided", body = ErrorRes),
        (status = 403, description = "Invalid token", body = ErrorRes)
    ),
    security(("bearer_auth" = []))
)]
/// List blood requests. Admins see every request; hospitals see their own.
#[axum::debug_handler]
pub(crate) async fn list_blood_requests(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListBloodRequestsRes>> {
    let scope = (!user.is_admin()).then_some(user.id);
    let blood_requests = state
        .requests
        .list(scope)?
        .into_iter()
        .map(blood_request_res)
        .collect();

    Ok(Json(ListBloodRequestsRes { blood_requests }))
}

#[utoipa::path(
    get,
    path = "/blood-requests/{id}",
    params(("id" = Uuid, Path, description = "Blood request id")),
    responses(
        (status = 200, description = "The blood request", body = BloodRequestRes),
        (status = 403, description = "Request belongs to another hospital", body = ErrorRes),
        (status = 404, description = "No such request", body = ErrorRes)
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub(crate) async fn get_blood_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<BloodRequestRes>> {
    let request = state.requests.get(id)?;
    if !user.is_admin() && request.hospital_id != user.id {
        return Err(ApiError::Forbidden("Access denied"));
    }

    Ok(Json(blood_request_res(request)))
}

#[utoipa::path(
    get,
    path = "/donors",
    responses(
        (status = 200, description = "Every donor in the directory", body = ListDonorsRes),
        (status = 403, description = "Caller is not an admin", body = ErrorRes)
    ),
    security(("bearer_auth" = []))
)]
/// List the donor directory. Admin only.
#[axum::debug_handler]
pub(crate) async fn list_donors(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListDonorsRes>> {
    user.require_admin()?;

    let donors = state.donors.list()?.into_iter().map(donor_res).collect();
    Ok(Json(ListDonorsRes { donors }))
}

#[utoipa::path(
    post,
    path = "/donors",
    request_body = CreateDonorReq,
    responses(
        (status = 201, description = "Donor registered", body = DonorRes),
        (status = 400, description = "Missing or invalid field", body = ErrorRes),
        (status = 403, description = "Caller is not an admin", body = ErrorRes),
        (status = 409, description = "Email already registered", body = ErrorRes)
    ),
    security(("bearer_auth" = []))
)]
/// Register a single donor. Admin only.
#[axum::debug_handler]
pub(crate) async fn create_donor(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateDonorReq>,
) -> ApiResult<(StatusCode, Json<DonorRes>)> {
    user.require_admin()?;

    let donor = state.donors.register(
        NewDonor {
            name: req.name,
            email: req.email,
            roll_no: req.roll_no,
            blood_group: req.blood_group,
            phone: req.phone,
        },
        &req.password,
    )?;

    Ok((StatusCode::CREATED, Json(donor_res(donor))))
}

fn sms_status(summary: DispatchSummary) -> SmsStatus {
    SmsStatus {
        total_donors: summary.total_donors,
        sms_delivered: summary.sms_delivered,
        blood_group: summary.blood_group,
    }
}

fn blood_request_res(request: BloodRequest) -> BloodRequestRes {
    BloodRequestRes {
        id: request.id,
        hospital_id: request.hospital_id,
        hospital_name: request.hospital_name,
        blood_group: request.blood_group,
        quantity: request.quantity,
        urgency: request.urgency.as_str().to_string(),
        required_by: request.required_by,
        description: request.description,
        patient_age: request.patient_age,
        patient_condition: request.patient_condition,
        status: request.status.as_str().to_string(),
        created_at: request.created_at,
        notified_donors: request.notified_donors,
    }
}

fn donor_res(donor: Donor) -> DonorRes {
    DonorRes {
        id: donor.id,
        name: donor.name,
        email: donor.email,
        roll_no: donor.roll_no,
        blood_group: donor.blood_group,
        phone: donor.phone,
    }
}
