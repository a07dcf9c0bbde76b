//! Article fetch API routes

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the articles router
pub fn router() -> Router<AppState> {
    Router::new().route("/fetch", post(fetch_article))
}

#[derive(Debug, Deserialize)]
pub struct FetchArticleRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchArticleResponse {
    pub success: bool,
    #[serde(flatten)]
    pub article: Article,
}

/// Download an article and extract its chapter content
async fn fetch_article(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FetchArticleRequest>, JsonRejection>,
) -> Result<Json<FetchArticleResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("URL is required".to_string()))?;

    let article = state.fetcher().fetch(&url).await?;

    Ok(Json(FetchArticleResponse {
        success: true,
        article,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{post_json, test_app};

    const PAGE: &str = "<html><head><title>Will AI Replace Humans?</title></head><body>\
        <p>Every few years a new technology is supposed to make people obsolete.</p>\
        <p>So far each wave has changed the work rather than removing the worker.</p>\
        <img src=\"img/robot.png\" alt=\"robot\"></body></html>";

    #[tokio::test]
    async fn test_fetch_article() {
        let app = test_app(vec![("https://blog.example.com/brain/ai", PAGE)]);
        let body = json!({"url": "https://blog.example.com/brain/ai"});

        let (status, json) = post_json(app, "/api/v1/articles/fetch", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["title"], "Will AI Replace Humans?");
        assert_eq!(json["media"][0]["type"], "image");
        assert_eq!(json["media"][0]["url"], "https://blog.example.com/brain/img/robot.png");
        assert_eq!(json["media"][0]["alt"], "robot");
        assert!(json["content"].as_str().unwrap().starts_with("<p>Every few years"));
    }

    #[tokio::test]
    async fn test_fetch_article_reports_exhausted_retries() {
        let app = test_app(vec![]);
        let body = json!({"url": "https://blog.example.com/missing"});

        let (status, json) = post_json(app, "/api/v1/articles/fetch", body).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"],
            "Failed to fetch article after 4 attempts: Upstream returned status 404"
        );
    }

    #[tokio::test]
    async fn test_fetch_article_requires_url() {
        let (status, json) = post_json(test_app(vec![]), "/api/v1/articles/fetch", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "URL is required");

        let body = json!({"url": "not a url"});
        let (status, _) = post_json(test_app(vec![]), "/api/v1/articles/fetch", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
