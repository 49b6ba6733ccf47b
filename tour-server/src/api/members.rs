//! Member management handlers (multipart document uploads)

use axum::extract::multipart::Multipart;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::member::{Member, MemberCreate, MemberUpdate};
use shared::pagination::{PageQuery, Paginated};
use validator::Validate;

use crate::api::extract::Query;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListQuery {
    /// Name substring
    pub name: Option<String>,
    /// Mobile number substring
    pub mobile_no: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<MemberListQuery>,
) -> ServiceResult<ApiResponse<Paginated<Member>>> {
    page.validate()?;
    let members = db::members::list(
        &state.pool,
        filter.name.as_deref(),
        filter.mobile_no.as_deref(),
        page,
    )
    .await?;
    Ok(ApiResponse::ok("Members fetched successfully", members))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<Member>> {
    let member = db::members::get(&state.pool, id).await?;
    Ok(ApiResponse::ok("Member fetched successfully", member))
}

/// Multipart create: `data` JSON field plus zero or more document files.
/// Stored files are removed again if the insert fails.
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ServiceResult<ApiResponse<Member>> {
    let (data, files) = super::read_multipart(multipart).await?;
    let payload: MemberCreate = super::parse_data(data)?;
    payload.validate()?;

    let id = db::snowflake_id();
    let documents = state.storage.save_all("member", id, &files)?;

    match db::members::create(&state.pool, id, &payload, &documents).await {
        Ok(member) => {
            tracing::info!(member_id = id, documents = documents.len(), "member created");
            Ok(ApiResponse::created("Member created successfully", member))
        }
        Err(err) => {
            for doc in &documents {
                state.storage.remove(&doc.path);
            }
            Err(err)
        }
    }
}

/// Multipart update. New files append to the stored documents unless the
/// payload sets `replaceDocuments`, in which case the old files are deleted
/// after the row is written.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ServiceResult<ApiResponse<Member>> {
    let (data, files) = super::read_multipart(multipart).await?;
    let payload: MemberUpdate = super::parse_data(data.or_else(|| Some("{}".to_string())))?;
    payload.validate()?;

    let existing = db::members::get(&state.pool, id).await?;
    let new_docs = state.storage.save_all("member", id, &files)?;

    let (documents, to_remove) = if payload.replace_documents {
        (new_docs.clone(), existing.documents)
    } else {
        let mut all = existing.documents;
        all.extend(new_docs.clone());
        (all, Vec::new())
    };

    match db::members::update(
        &state.pool,
        id,
        payload.name.as_deref(),
        payload.mobile_no.as_deref(),
        payload.address.as_deref(),
        &documents,
    )
    .await
    {
        Ok(member) => {
            for doc in &to_remove {
                state.storage.remove(&doc.path);
            }
            Ok(ApiResponse::ok("Member updated successfully", member))
        }
        Err(err) => {
            for doc in &new_docs {
                state.storage.remove(&doc.path);
            }
            Err(err)
        }
    }
}

/// Delete the member row and its stored documents.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<()>> {
    let member = db::members::delete(&state.pool, id).await?;
    for doc in &member.documents {
        state.storage.remove(&doc.path);
    }
    tracing::info!(member_id = id, "member deleted");
    Ok(ApiResponse::message("Member deleted successfully"))
}

pub async fn download_document(
    State(state): State<AppState>,
    Path((id, filename)): Path<(i64, String)>,
) -> ServiceResult<impl IntoResponse> {
    let member = db::members::get(&state.pool, id).await?;
    let doc = member
        .documents
        .iter()
        .find(|d| d.filename == filename)
        .ok_or_else(|| AppError::new(ErrorCode::DocumentNotFound))?;

    let bytes = state.storage.read(&doc.path)?;
    Ok((
        [
            (header::CONTENT_TYPE, doc.mimetype.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", doc.original_name),
            ),
        ],
        bytes,
    ))
}
