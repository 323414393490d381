//! Generic HTTP tool adapter.
//!
//! Each HTTP-backed tool is described by an [`HttpTemplate`]:
//!
//! ```yaml
//! http:
//!   endpoint: https://weather-api.p.rapidapi.com/current/{city}
//!   method: GET
//!   headers:
//!     X-RapidAPI-Key: ${RAPIDAPI_KEY}
//!   outputs:
//!     temperature: /current/temp_c
//! ```
//!
//! `{param}` placeholders in the endpoint are replaced by the URL-encoded
//! parameter value. Parameters not consumed by the path go to the query
//! string for GET and to a JSON body otherwise. `${NAME}` in a header value
//! is filled from the adapter's secrets.
//!
//! The payload is an object holding every output field found in the
//! response plus the whole response under `raw`. Output pointers may also
//! contain `{param}` placeholders (`/rates/{to}/rate`), and parameters
//! listed under `echo` are copied into the payload as sent.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::ports::{AdapterError, ResolvedCall, ToolAdapter};

static PATH_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .unwrap_or_else(|e| panic!("invalid placeholder regex: {e}"))
});

static SECRET_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Z0-9_]+)\}").unwrap_or_else(|e| panic!("invalid secret regex: {e}"))
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

/// How to call one HTTP tool and where its outputs live in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTemplate {
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Output field name to JSON pointer into the response body.
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub echo: Vec<String>,
}

impl HttpTemplate {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            outputs: BTreeMap::new(),
            echo: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_output(mut self, field: impl Into<String>, pointer: impl Into<String>) -> Self {
        self.outputs.insert(field.into(), pointer.into());
        self
    }

    pub fn with_echo(mut self, parameter: impl Into<String>) -> Self {
        self.echo.push(parameter.into());
        self
    }

    /// Names of the secrets referenced by header values.
    pub fn required_secrets(&self) -> Vec<String> {
        self.headers
            .values()
            .flat_map(|v| SECRET_PLACEHOLDER.captures_iter(v))
            .map(|c| c[1].to_string())
            .collect()
    }
}

pub struct HttpToolAdapter {
    template: HttpTemplate,
    client: Client,
    secrets: Arc<HashMap<String, Secret<String>>>,
    timeout: Duration,
}

impl HttpToolAdapter {
    pub fn new(
        template: HttpTemplate,
        client: Client,
        secrets: Arc<HashMap<String, Secret<String>>>,
        timeout: Duration,
    ) -> Self {
        Self {
            template,
            client,
            secrets,
            timeout,
        }
    }

    pub fn template(&self) -> &HttpTemplate {
        &self.template
    }

    /// Fills path placeholders and returns the URL plus the unused parameters.
    fn render_url(&self, call: &ResolvedCall) -> Result<(String, Map<String, Value>), AdapterError> {
        let mut remaining = call.parameters.clone();
        let mut url = String::with_capacity(self.template.endpoint.len());
        let mut last = 0;

        for caps in PATH_PLACEHOLDER.captures_iter(&self.template.endpoint) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let name = &caps[1];
            let value = remaining.remove(name).ok_or_else(|| {
                AdapterError::invalid_parameters(format!("missing path parameter '{}'", name))
            })?;

            url.push_str(&self.template.endpoint[last..whole.start]);
            url.push_str(&urlencoding::encode(&scalar_text(&value)));
            last = whole.end;
        }
        url.push_str(&self.template.endpoint[last..]);

        Ok((url, remaining))
    }

    fn render_header(&self, value: &str) -> Result<String, AdapterError> {
        let mut missing = None;
        let rendered = SECRET_PLACEHOLDER.replace_all(value, |caps: &regex::Captures<'_>| {
            match self.secrets.get(&caps[1]) {
                Some(secret) => secret.expose_secret().clone(),
                None => {
                    missing = Some(caps[1].to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(AdapterError::NotConfigured(name)),
            None => Ok(rendered.into_owned()),
        }
    }

    fn extract_outputs(&self, raw: Value, parameters: &Map<String, Value>) -> Value {
        let mut payload = Map::new();
        for name in &self.template.echo {
            if let Some(value) = parameters.get(name) {
                payload.insert(name.clone(), value.clone());
            }
        }
        for (field, pointer) in &self.template.outputs {
            let pointer = render_pointer(pointer, parameters);
            if let Some(value) = raw.pointer(&pointer).filter(|v| !v.is_null()) {
                payload.insert(field.clone(), value.clone());
            }
        }
        payload.insert("raw".to_string(), raw);
        Value::Object(payload)
    }
}

/// Substitutes `{param}` in a JSON pointer, escaping per RFC 6901.
fn render_pointer(pointer: &str, parameters: &Map<String, Value>) -> String {
    PATH_PLACEHOLDER
        .replace_all(pointer, |caps: &regex::Captures<'_>| {
            parameters
                .get(&caps[1])
                .map(|v| scalar_text(v).replace('~', "~0").replace('/', "~1"))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Query-string and path rendering of a JSON scalar.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ToolAdapter for HttpToolAdapter {
    async fn invoke(&self, call: &ResolvedCall) -> Result<Value, AdapterError> {
        let (url, remaining) = self.render_url(call)?;
        let mut request = self
            .client
            .request(self.template.method.into(), &url)
            .timeout(self.timeout);

        for (name, value) in &self.template.headers {
            request = request.header(name.as_str(), self.render_header(value)?);
        }

        request = match self.template.method {
            HttpMethod::Get => {
                let query: Vec<(String, String)> = remaining
                    .iter()
                    .map(|(k, v)| (k.clone(), scalar_text(v)))
                    .collect();
                request.query(&query)
            }
            HttpMethod::Post => request.json(&remaining),
        };

        debug!(tool = %call.tool, url = %url, "Calling HTTP tool");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AdapterError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                AdapterError::unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| AdapterError::malformed(e.to_string()))?;

        Ok(self.extract_outputs(raw, &call.parameters))
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}
