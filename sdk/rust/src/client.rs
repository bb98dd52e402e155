use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Header the relay forwards to the backend as call metadata.
pub const CUSTOMER_HEADER: &str = "X-Customer-Header";

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub message: String,
}

/// Error envelope returned by the relay for failed calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayErrorBody {
    pub code: i32,
    pub message: String,
}

#[derive(Debug)]
pub enum RelayOutcome {
    Ok(TemplateResponse),
    Failed(StatusCode, RelayErrorBody),
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    /// Call `SendGet` through the relay.
    pub async fn send_get(&self, name: &str) -> Result<RelayOutcome, Box<dyn std::error::Error + Send + Sync>> {
        self.call("template.Greeter/SendGet", name, None).await
    }

    /// Call `SendPost` through the relay, optionally identifying the customer.
    pub async fn send_post(
        &self,
        name: &str,
        customer: Option<&str>,
    ) -> Result<RelayOutcome, Box<dyn std::error::Error + Send + Sync>> {
        self.call("template.Greeter/SendPost", name, customer).await
    }

    /// Post a `TemplateRequest` to `/relay/{service_name}`.
    pub async fn call(
        &self,
        service_name: &str,
        name: &str,
        customer: Option<&str>,
    ) -> Result<RelayOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let mut req = self
            .client
            .post(format!("{}/relay/{}", self.relay_url, service_name))
            .json(&TemplateRequest { name: name.to_string() });
        if let Some(customer) = customer {
            req = req.header(CUSTOMER_HEADER, customer);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status.is_success() {
            Ok(RelayOutcome::Ok(serde_json::from_str(&text)?))
        } else {
            Ok(RelayOutcome::Failed(status, serde_json::from_str(&text)?))
        }
    }
}
