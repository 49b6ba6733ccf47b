//! Tour package handlers (multipart cover-photo upload)

use axum::extract::multipart::Multipart;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Extension;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::tour_package::{
    TourPackage, TourPackageCreate, TourPackageFilter, TourPackageStats, TourPackageUpdate,
};
use shared::pagination::{PageQuery, Paginated};
use validator::Validate;

use crate::api::extract::Query;
use crate::auth::AuthUser;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<TourPackageFilter>,
) -> ServiceResult<ApiResponse<Paginated<TourPackage>>> {
    page.validate()?;
    let packages = db::tour_packages::list(&state.pool, &filter, page).await?;
    Ok(ApiResponse::ok("Tour packages fetched successfully", packages))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<TourPackage>> {
    let package = db::tour_packages::get(&state.pool, id).await?;
    Ok(ApiResponse::ok("Tour package fetched successfully", package))
}

pub async fn stats(
    State(state): State<AppState>,
) -> ServiceResult<ApiResponse<TourPackageStats>> {
    let stats = db::tour_packages::stats(&state.pool).await?;
    Ok(ApiResponse::ok("Tour package stats fetched successfully", stats))
}

/// Multipart create: `data` JSON field plus an optional cover-photo file.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ServiceResult<ApiResponse<TourPackage>> {
    let (data, files) = super::read_multipart(multipart).await?;
    let payload: TourPackageCreate = super::parse_data(data)?;
    payload.validate()?;

    let id = db::snowflake_id();
    let cover = match files.first() {
        Some(file) => Some(state.storage.save("tour-package", id, file)?),
        None => None,
    };

    match db::tour_packages::create(
        &state.pool,
        id,
        &payload,
        cover.as_ref().map(|c| c.path.as_str()),
        auth.id,
    )
    .await
    {
        Ok(package) => {
            tracing::info!(package_id = id, "tour package created");
            Ok(ApiResponse::created(
                "Tour package created successfully",
                package,
            ))
        }
        Err(err) => {
            if let Some(cover) = &cover {
                state.storage.remove(&cover.path);
            }
            Err(err)
        }
    }
}

/// Multipart update; a new cover photo replaces the stored one.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ServiceResult<ApiResponse<TourPackage>> {
    let (data, files) = super::read_multipart(multipart).await?;
    let payload: TourPackageUpdate = super::parse_data(data.or_else(|| Some("{}".to_string())))?;
    payload.validate()?;

    let existing = db::tour_packages::get(&state.pool, id).await?;
    let new_cover = match files.first() {
        Some(file) => Some(state.storage.save("tour-package", id, file)?),
        None => None,
    };

    match db::tour_packages::update(
        &state.pool,
        id,
        &payload,
        new_cover.as_ref().map(|c| c.path.as_str()),
    )
    .await
    {
        Ok(package) => {
            if new_cover.is_some() {
                if let Some(old) = &existing.cover_photo {
                    state.storage.remove(old);
                }
            }
            Ok(ApiResponse::ok("Tour package updated successfully", package))
        }
        Err(err) => {
            if let Some(cover) = &new_cover {
                state.storage.remove(&cover.path);
            }
            Err(err)
        }
    }
}

/// Delete the package row and its stored cover photo.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<()>> {
    let package = db::tour_packages::delete(&state.pool, id).await?;
    if let Some(cover) = &package.cover_photo {
        state.storage.remove(cover);
    }
    tracing::info!(package_id = id, "tour package deleted");
    Ok(ApiResponse::message("Tour package deleted successfully"))
}

pub async fn download_cover_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<impl IntoResponse> {
    let package = db::tour_packages::get(&state.pool, id).await?;
    let path = package
        .cover_photo
        .as_deref()
        .ok_or_else(|| AppError::new(ErrorCode::CoverPhotoNotFound))?;

    let bytes = state.storage.read(path)?;
    let mimetype = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    Ok(([(header::CONTENT_TYPE, mimetype)], bytes))
}
