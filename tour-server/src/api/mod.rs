//! HTTP API: routing, role policy and multipart helpers

mod auth;
mod dashboard;
mod enquiries;
mod extract;
mod members;
mod sms;
mod tour_members;
mod tour_packages;
mod users;

use axum::extract::multipart::Multipart;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use shared::error::{AppError, ErrorCode};
use shared::models::role::UserRole;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, require_roles};
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::storage::{UploadedFile, MAX_FILES, MAX_FILE_SIZE};

const ADMIN_MANAGER: &[UserRole] = &[UserRole::Admin, UserRole::Manager];
const STAFF_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Manager, UserRole::Staff];

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    let users = Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/export", get(users::export_csv))
        .route(
            "/{id}",
            get(users::get_one).put(users::update).delete(users::remove),
        )
        .route("/{id}/reset-password", post(users::reset_password))
        .route_layer(middleware::from_fn(user_management_roles));

    let members = Router::new()
        .route("/", get(members::list).post(members::create))
        .route(
            "/{id}",
            get(members::get_one)
                .put(members::update)
                .delete(members::remove),
        )
        .route("/{id}/documents/{filename}", get(members::download_document));

    let tour_packages = Router::new()
        .route("/", get(tour_packages::list).post(tour_packages::create))
        .route("/stats", get(tour_packages::stats))
        .route(
            "/{id}",
            get(tour_packages::get_one)
                .put(tour_packages::update)
                .delete(tour_packages::remove),
        )
        .route("/{id}/cover-photo", get(tour_packages::download_cover_photo));

    let tour_members = Router::new()
        .route("/", get(tour_members::list).post(tour_members::create))
        .route("/stats", get(tour_members::stats))
        .route(
            "/payment-reminders",
            get(tour_members::list_payment_reminders),
        )
        .route(
            "/{id}",
            get(tour_members::get_one)
                .put(tour_members::update)
                .delete(tour_members::remove),
        )
        .route("/{id}/reminder", patch(tour_members::record_reminder))
        .route("/{id}/payments", post(tour_members::add_payment))
        .route(
            "/{id}/payments/{payment_id}",
            put(tour_members::update_payment).delete(tour_members::delete_payment),
        );

    let sms = Router::new()
        .route("/bulk", post(sms::send_bulk))
        .route("/individual", post(sms::send_individual));

    let enquiries = Router::new()
        .route("/", get(enquiries::list).post(enquiries::create))
        .route("/stats", get(enquiries::stats))
        .route(
            "/{id}",
            get(enquiries::get_one)
                .put(enquiries::update)
                .delete(enquiries::remove),
        )
        .route("/{id}/status", patch(enquiries::update_status));

    let dashboard = Router::new()
        .route("/overview", get(dashboard::overview))
        .route("/recent-bookings", get(dashboard::recent_bookings))
        .route("/revenue-trends", get(dashboard::revenue_trends))
        .route("/popular-packages", get(dashboard::popular_packages));

    let protected = Router::new()
        .nest("/users", users)
        .nest("/members", members)
        .nest("/tour-packages", tour_packages)
        .nest("/tour-members", tour_members)
        .nest("/sms", sms)
        .nest("/enquiries", enquiries)
        .nest("/dashboard", dashboard)
        .route_layer(middleware::from_fn(staff_roles))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest(
            "/api",
            Router::new()
                .route("/register", post(auth::register))
                .route("/login", post(auth::login))
                .merge(protected),
        )
        .layer(DefaultBodyLimit::max((MAX_FILES * MAX_FILE_SIZE) + 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Every protected route requires a back-office role; MEMBER tokens are
/// rejected outright.
async fn staff_roles(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, AppError> {
    require_roles(STAFF_ROLES, request, next).await
}

/// User management is Admin/Manager only; deletes tighten to Admin inside
/// the handler.
async fn user_management_roles(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, AppError> {
    require_roles(ADMIN_MANAGER, request, next).await
}

/// Pull the `data` JSON field and every file out of a multipart request,
/// enforcing the per-request file count and per-file size limits.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
) -> ServiceResult<(Option<String>, Vec<UploadedFile>)> {
    let mut data: Option<String> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("malformed multipart body: {e}")))?
    {
        if field.file_name().is_none() && field.name() == Some("data") {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::invalid_request(format!("unreadable data field: {e}")))?;
            data = Some(text);
            continue;
        }

        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if files.len() >= MAX_FILES {
            return Err(AppError::new(ErrorCode::TooManyFiles).into());
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid_request(format!("unreadable file field: {e}")))?;
        if bytes.len() > MAX_FILE_SIZE {
            return Err(AppError::new(ErrorCode::FileTooLarge).into());
        }
        files.push(UploadedFile {
            original_name,
            bytes: bytes.to_vec(),
        });
    }

    Ok((data, files))
}

/// Parse the multipart `data` field as a JSON payload.
pub(crate) fn parse_data<T: serde::de::DeserializeOwned>(data: Option<String>) -> ServiceResult<T> {
    let data = data.ok_or_else(|| AppError::invalid_request("missing data field"))?;
    serde_json::from_str(&data)
        .map_err(|e| AppError::invalid_request(format!("invalid data field: {e}")).into())
}
