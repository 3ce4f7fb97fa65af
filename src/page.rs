//! Page rendering: the consumer of the request's shared props.
//!
//! # Responsibilities
//! - Build the page object `{component, props, url, version}`
//! - Merge resolved shared props under the page's own props
//! - Answer SPA requests with JSON, everything else with the HTML root
//!
//! # Design Decisions
//! - Lazy shared props are evaluated here, once per render
//! - Page props win over shared props on key collision

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::request::X_INERTIA;
use crate::shared::InertiaContext;

/// Id of the element the client mounts into.
pub const ROOT_ELEMENT_ID: &str = "app";

/// The page object exchanged with the client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page {
    pub component: String,
    pub props: Map<String, Value>,
    pub url: String,
    pub version: Option<String>,
}

impl Page {
    /// JSON for SPA requests, HTML root for first visits.
    pub fn into_response_for(self, is_inertia: bool) -> Response {
        let mut response = if is_inertia {
            let mut response = Json(self).into_response();
            response
                .headers_mut()
                .insert(X_INERTIA, HeaderValue::from_static("true"));
            response
        } else {
            match serde_json::to_string(&self) {
                Ok(json) => Html(format!(
                    r#"<div id="{}" data-page="{}"></div>"#,
                    ROOT_ELEMENT_ID,
                    escape_attribute(&json)
                ))
                .into_response(),
                Err(e) => {
                    tracing::error!(component = %self.component, error = %e, "Failed to encode page");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        };

        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static(X_INERTIA));
        response
    }
}

impl InertiaContext {
    /// Build the page object for `component`.
    ///
    /// `props` should be a JSON object; anything else is ignored.
    pub fn page(&self, component: impl Into<String>, props: Value) -> Page {
        let component = component.into();
        let mut merged = self.shared().resolve();

        match props {
            Value::Object(own) => {
                for (key, value) in own {
                    merged.insert(key, value);
                }
            }
            Value::Null => {}
            other => {
                tracing::warn!(component = %component, props = %other, "Page props must be an object");
            }
        }

        Page {
            component,
            props: merged,
            url: self.url().to_string(),
            version: self.version().map(str::to_string),
        }
    }

    /// Render `component` as the response to the current request.
    pub fn render(&self, component: impl Into<String>, props: Value) -> Response {
        self.page(component, props).into_response_for(self.is_inertia())
    }
}

fn escape_attribute(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
