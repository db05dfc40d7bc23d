mod cli;

pub use cli::App;

use crate::country::page::{ByCapitalPage, SearchOutcome};
use crate::country::service::{CountrySearch, CountryService};
use crate::country::CountryConfig;
use crate::prelude::{eprintln, *};
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Redirect,
    routing::get,
    Json, Router,
};
use countryapp_core::page::PageState;
use countryapp_core::routes::{resolve, Resolved};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    #[serde(flatten)]
    outcome: SearchOutcome,
    state: PageState,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = CountryConfig::for_global(&global)?;
    let addr = format!("{}:{}", app.host, app.port);

    if global.verbose {
        eprintln!("Countries API Base: {}", config.base_url);
        eprintln!("Serving by-capital page on http://{}/by-capital", addr);
    }

    let page = ByCapitalPage::new(Arc::new(CountryService::from_config(&config)?));

    if global.verbose {
        let mut changes = page.subscribe();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let state = changes.borrow_and_update().clone();
                eprintln!(
                    "Page state: {:?} ({} countries)",
                    state.phase(),
                    state.countries().len()
                );
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;
    log::info!("Listening on http://{addr}");

    axum::serve(listener, router(page.clone()))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    page.dispose();
    Ok(())
}

/// Build the HTTP router around a shared page instance
pub fn router<S: CountrySearch + 'static>(page: ByCapitalPage<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/by-capital", get(state_handler::<S>).post(search_handler::<S>))
        .fallback(fallback_handler)
        .layer(cors)
        .with_state(page)
}

async fn state_handler<S: CountrySearch + 'static>(
    State(page): State<ByCapitalPage<S>>,
) -> Json<PageState> {
    Json(page.state())
}

async fn search_handler<S: CountrySearch + 'static>(
    State(page): State<ByCapitalPage<S>>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<SearchResponse>) {
    let outcome = page.on_change(&request.query).await;

    let status = match outcome {
        SearchOutcome::Ignored => StatusCode::CONFLICT,
        _ => StatusCode::OK,
    };

    (
        status,
        Json(SearchResponse {
            outcome,
            state: page.state(),
        }),
    )
}

async fn fallback_handler(uri: Uri) -> Redirect {
    let target = match resolve(uri.path()) {
        Resolved::Page(route) => route.path(),
        Resolved::Redirect(target) => target,
    };
    Redirect::temporary(&format!("/{target}"))
}
