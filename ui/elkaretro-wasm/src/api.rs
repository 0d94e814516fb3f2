//! Posts endpoint client.
//!
//! Fetches one listing page with `fetch`, aborting through an
//! `AbortController` when the request's [`CancelSignal`] fires.

use async_trait::async_trait;
use er_api_types::PostsQuery;
use er_blog::{CancelSignal, FetchError, PostsPage, PostsSource, parse_total};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, DomException, Headers, Request, RequestInit, RequestMode, Response};

pub const TOTAL_HEADER: &str = "X-WP-Total";

pub struct WpSource {
    endpoint: String,
}

impl WpSource {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
        }
    }
}

fn js_error(err: JsValue) -> FetchError {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        if exception.name() == "AbortError" {
            return FetchError::Cancelled;
        }
        return FetchError::Transport(format!("{}: {}", exception.name(), exception.message()));
    }
    FetchError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

#[async_trait(?Send)]
impl PostsSource for WpSource {
    async fn fetch(&self, query: PostsQuery, signal: CancelSignal) -> Result<PostsPage, FetchError> {
        let url = query.to_url(&self.endpoint);
        let controller = AbortController::new().map_err(js_error)?;

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_signal(Some(&controller.signal()));
        let headers = Headers::new().map_err(js_error)?;
        headers.set("Accept", "application/json").map_err(js_error)?;
        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
        signal.on_cancel(move || controller.abort());
        debug!(%url, "fetching posts");

        let resp: Response = JsFuture::from(gloo_utils::window().fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| FetchError::Malformed("fetch did not resolve to a Response".into()))?;

        let text = JsFuture::from(resp.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .unwrap_or_default();

        if !resp.ok() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_owned))
                .unwrap_or_else(|| resp.status_text());
            return Err(FetchError::Http {
                status: resp.status(),
                message,
            });
        }

        let total = parse_total(resp.headers().get(TOTAL_HEADER).ok().flatten().as_deref());
        match serde_json::from_str(&text) {
            Ok(body) => Ok(PostsPage::from_body(body, total)),
            Err(err) => {
                warn!(%err, %url, "unparsable posts body, treating as empty");
                Ok(PostsPage::new(Vec::new(), total))
            }
        }
    }
}
