//! Humanized text history endpoints

use axum::extract::{Path, Query, State};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::middleware::RequireIdentity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{HumanizedText, Page, PageRequest};

/// Raw query values; anything unparsable falls back to the defaults
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl HistoryQueryParams {
    pub fn to_page_request(&self) -> PageRequest {
        PageRequest::new(parse_number(&self.page), parse_number(&self.limit))
    }
}

fn parse_number(raw: &Option<String>) -> Option<u32> {
    let value = raw.as_deref()?.trim().parse::<i64>().ok()?;
    Some(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryTextResponse {
    pub id: String,
    pub original_text: String,
    pub humanized_text: String,
    pub word_count: u32,
    pub created_at: String,
}

impl From<&HumanizedText> for HistoryTextResponse {
    fn from(text: &HumanizedText) -> Self {
        Self {
            id: text.id().to_string(),
            original_text: text.original_text().to_string(),
            humanized_text: text.humanized_text().to_string(),
            word_count: text.word_count(),
            created_at: text.created_at().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub texts: Vec<HistoryTextResponse>,
    pub pagination: PaginationResponse,
}

impl From<Page<HumanizedText>> for HistoryResponse {
    fn from(page: Page<HumanizedText>) -> Self {
        Self {
            success: true,
            texts: page.items.iter().map(HistoryTextResponse::from).collect(),
            pagination: PaginationResponse {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteTextResponse {
    pub success: bool,
    pub message: String,
}

/// GET /v1/history?page=&limit=
pub async fn list_history(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let page = state
        .account_service
        .history(&identity, params.to_page_request())
        .await?;

    Ok(Json(HistoryResponse::from(page)))
}

/// DELETE /v1/history/{id}
pub async fn delete_text(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(text_id): Path<String>,
) -> Result<Json<DeleteTextResponse>, ApiError> {
    // No text can carry an id that is not a UUID
    let text_id =
        Uuid::parse_str(&text_id).map_err(|_| ApiError::not_found("Text not found"))?;

    state
        .account_service
        .delete_text(&identity, text_id)
        .await?;

    Ok(Json(DeleteTextResponse {
        success: true,
        message: "Text deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountId;

    fn params(page: Option<&str>, limit: Option<&str>) -> HistoryQueryParams {
        HistoryQueryParams {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_page_request_defaults_and_clamps() {
        assert_eq!(params(None, None).to_page_request(), PageRequest::new(Some(1), Some(10)));
        assert_eq!(
            params(Some("3"), Some("500")).to_page_request(),
            PageRequest::new(Some(3), Some(50))
        );
        assert_eq!(
            params(Some("-4"), Some("0")).to_page_request(),
            PageRequest::new(Some(1), Some(1))
        );
        assert_eq!(
            params(Some("abc"), Some("")).to_page_request(),
            PageRequest::default()
        );
    }

    #[test]
    fn test_history_response_shape() {
        let owner = AccountId::new("user-1").unwrap();
        let page = Page {
            items: vec![HumanizedText::new(owner, "in", "out", 1)],
            page: 1,
            limit: 10,
            total: 11,
        };

        let json = serde_json::to_value(HistoryResponse::from(page)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["texts"][0]["originalText"], "in");
        assert_eq!(json["texts"][0]["humanizedText"], "out");
        assert_eq!(json["texts"][0]["wordCount"], 1);
        assert!(json["texts"][0]["createdAt"].is_string());
        assert_eq!(
            json["pagination"],
            serde_json::json!({"page": 1, "limit": 10, "total": 11, "totalPages": 2})
        );
    }
}
