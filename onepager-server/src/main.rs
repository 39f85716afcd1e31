//! Web front-end for the one-pager generator, built on axum.
//!
//! Three routes: a form page, a generation endpoint that returns the PDF as
//! a download, and a health check. Each request drives one synchronous pass
//! through the pipeline; if the client disconnects mid-request, the handler
//! future is dropped and any in-flight upstream call is abandoned.

use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use onepager_core::error::PipelineError;
use onepager_core::pipeline::Pipeline;
use onepager_core::types::ResearchQuery;
use serde::Deserialize;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Shared read-only state for all requests.
struct AppState {
    pipeline: Pipeline,
    brand_name: String,
}

/// Form input from the front page.
#[derive(Debug, Deserialize)]
struct GenerateInput {
    company: String,
    #[serde(default)]
    domain: String,
}

/// Build the axum router with `/`, `/generate`, and `/health` routes.
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/generate", post(generate_handler))
        .route("/health", get(health_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(index_page(&state.brand_name))
}

async fn health_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Form(input): Form<GenerateInput>,
) -> Response {
    let query = ResearchQuery::new(&input.company).with_domain(&input.domain);
    if !query.is_valid() {
        return (
            StatusCode::BAD_REQUEST,
            Html(error_page(
                &state.brand_name,
                "Please provide a company name.",
            )),
        )
            .into_response();
    }

    match state.pipeline.run(&query).await {
        Ok(one_pager) => {
            let filename = format!(
                "{}_Strategy_{}.pdf",
                state.brand_name.replace(' ', "_"),
                one_pager.company.replace(' ', "_")
            );
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                one_pager.pdf_bytes,
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(stage = err.stage(), error = %err, "Generation failed");
            let status = match &err {
                PipelineError::Search(_) | PipelineError::Synthesis(_) => StatusCode::BAD_GATEWAY,
                PipelineError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Html(error_page(&state.brand_name, &err.to_string())),
            )
                .into_response()
        }
    }
}

fn index_page(brand: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{brand} Account One-Pager</title>
  <style>
    body {{ font-family: sans-serif; max-width: 540px; margin: 60px auto; color: #1f2937; }}
    h1 {{ color: #1e3a8a; }}
    label {{ display: block; margin-top: 16px; font-weight: 600; }}
    input[type=text] {{ width: 100%; padding: 8px; margin-top: 4px; }}
    button {{ margin-top: 20px; padding: 10px 24px; background: #1e3a8a; color: #fff; border: 0; cursor: pointer; }}
    .hint {{ color: #6b7280; font-size: 0.85em; }}
  </style>
</head>
<body>
  <h1>{brand} Account One-Pager</h1>
  <p class="hint">Generates a hyper-personalized BDR asset from live web research.</p>
  <form method="post" action="/generate">
    <label>Target Company
      <input type="text" name="company" placeholder="e.g. Spotify" required>
    </label>
    <label>Website
      <input type="text" name="domain" placeholder="e.g. spotify.com">
    </label>
    <button type="submit">Generate Strategy</button>
  </form>
</body>
</html>
"#
    )
}

fn error_page(brand: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{brand} - Generation failed</title></head>
<body style="font-family: sans-serif; max-width: 540px; margin: 60px auto; color: #1f2937;">
  <h1 style="color: #b91c1c;">Generation failed</h1>
  <p>{message}</p>
  <p><a href="/">Back to the form to retry</a></p>
</body>
</html>
"#
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::from_default_env().add_directive("info".parse()?));
    tracing_subscriber::registry().with(stderr_layer).init();

    let workspace = std::env::current_dir().ok();
    let config = onepager_core::load_config(workspace.as_deref(), None)?;

    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    // Both API keys must be present before the server starts serving.
    onepager_core::require_api_keys(&config)?;

    let pipeline = Pipeline::from_config(&config)?;
    let state = Arc::new(AppState {
        pipeline,
        brand_name: config.branding.brand_name.clone(),
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = addr.as_str(), "Serving one-pager front-end");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use onepager_core::config::{BrandingConfig, SearchConfig};
    use onepager_core::error::SearchError;
    use onepager_core::prompt::PromptLibrary;
    use onepager_core::providers::MockProvider;
    use onepager_core::render::PdfRenderer;
    use onepager_core::search::{Collector, MockSearchClient};
    use onepager_core::synthesis::Synthesizer;
    use tower::ServiceExt;

    const INSIGHTS_JSON: &str = r#"{
        "overview": "Acme Corp is a widget maker.",
        "pain_points": "Distributed plants.",
        "news": "Acquired Widgets-R-Us.",
        "angle": "Reach frontline workers."
    }"#;

    fn make_state(search: MockSearchClient, provider: MockProvider) -> Arc<AppState> {
        let prompts = Arc::new(PromptLibrary::new());
        let pipeline = Pipeline::new(
            Collector::new(
                Arc::new(search),
                Arc::clone(&prompts),
                SearchConfig::default(),
            ),
            Synthesizer::new(Arc::new(provider), prompts, "Workshop"),
            PdfRenderer::new(BrandingConfig::default()),
        );
        Arc::new(AppState {
            pipeline,
            brand_name: "Workshop".to_string(),
        })
    }

    fn happy_state() -> Arc<AppState> {
        make_state(
            MockSearchClient::with_hits(vec![MockSearchClient::hit("Acme news")]),
            MockProvider::with_response(INSIGHTS_JSON),
        )
    }

    fn form_request(body: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(happy_state());
        let req = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("ok"));
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let app = router(happy_state());
        let req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("name=\"company\""));
        assert!(html.contains("Workshop"));
    }

    #[tokio::test]
    async fn test_generate_blank_company_is_bad_request() {
        let app = router(happy_state());
        let resp = app
            .oneshot(form_request("company=+&domain="))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_search_failure_names_the_stage() {
        let search = MockSearchClient::new();
        search.queue(Err(SearchError::AuthFailed));
        let app = router(make_state(
            search,
            MockProvider::with_response(INSIGHTS_JSON),
        ));

        let resp = app
            .oneshot(form_request("company=Acme+Corp&domain="))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("Search unavailable"));
    }

    #[tokio::test]
    async fn test_generate_returns_pdf_attachment() {
        let app = router(happy_state());
        let resp = app
            .oneshot(form_request("company=Acme+Corp&domain=acme.com"))
            .await
            .unwrap();

        // Hosts without a system font fail in the render stage instead.
        if resp.status() == StatusCode::OK {
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert_eq!(content_type, "application/pdf");

            let disposition = resp
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert!(disposition.contains("Acme_Corp"));

            let body = axum::body::to_bytes(resp.into_body(), 10_000_000)
                .await
                .unwrap();
            assert!(body.starts_with(b"%PDF"));
        } else {
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
