use super::RecordQuery;
use crate::config::SalesforceConfig;
use crate::error::{EnricherError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

static SOBJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap());
static RECORD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{15}(?:[A-Za-z0-9]{3})?$").unwrap());

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<NamedRecord>,
}

#[derive(Debug, Deserialize)]
struct NamedRecord {
    #[serde(rename = "Name", default)]
    name: Option<String>,
}

/// Build the SOQL name lookup for one record
///
/// Both parts are validated first so nothing reaches the query text unchecked.
pub fn build_name_query(record_type: &str, id: &str) -> Result<String> {
    if !SOBJECT_NAME.is_match(record_type) {
        return Err(EnricherError::UpstreamQuery(format!(
            "Invalid sObject type: {:?}",
            record_type
        )));
    }
    if !RECORD_ID.is_match(id) {
        return Err(EnricherError::UpstreamQuery(format!(
            "Invalid record id: {:?}",
            id
        )));
    }

    Ok(format!(
        "SELECT Name FROM {} WHERE Id = '{}' LIMIT 1",
        record_type, id
    ))
}

/// Salesforce REST API client for record name lookups
pub struct SalesforceClient {
    http: reqwest::Client,
    query_url: String,
    access_token: String,
}

impl SalesforceClient {
    pub fn new(config: SalesforceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EnricherError::UpstreamQuery(e.to_string()))?;

        let query_url = format!(
            "{}/services/data/{}/query",
            config.instance_url.trim_end_matches('/'),
            config.api_version
        );

        Ok(Self {
            http,
            query_url,
            access_token: config.access_token,
        })
    }
}

#[async_trait]
impl RecordQuery for SalesforceClient {
    async fn query_name(&self, record_type: &str, id: &str) -> Result<Option<String>> {
        let soql = build_name_query(record_type, id)?;
        tracing::debug!(record_type = %record_type, id = %id, "Querying Salesforce");

        let response = self
            .http
            .get(&self.query_url)
            .bearer_auth(&self.access_token)
            .query(&[("q", soql.as_str())])
            .send()
            .await
            .map_err(|e| EnricherError::UpstreamQuery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnricherError::UpstreamQuery(format!(
                "{} {} returned {}: {}",
                record_type, id, status, body
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| EnricherError::UpstreamQuery(e.to_string()))?;

        Ok(result.records.into_iter().next().and_then(|r| r.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn client_for(instance_url: String) -> SalesforceClient {
        SalesforceClient::new(SalesforceConfig {
            instance_url,
            access_token: "test-token".to_string(),
            api_version: "v59.0".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_build_name_query() {
        assert_eq!(
            build_name_query("Account", "0011i00000U359dAAB").unwrap(),
            "SELECT Name FROM Account WHERE Id = '0011i00000U359dAAB' LIMIT 1"
        );
        assert!(build_name_query("Commande__c", "0011i00000U359d").is_ok());
    }

    #[test]
    fn test_build_name_query_rejects_unsafe_input() {
        assert!(matches!(
            build_name_query("Account", "x' OR Name != '"),
            Err(EnricherError::UpstreamQuery(_))
        ));
        assert!(matches!(
            build_name_query("Account WHERE", "0011i00000U359dAAB"),
            Err(EnricherError::UpstreamQuery(_))
        ));
        assert!(build_name_query("Account", "288436").is_err());
    }

    #[tokio::test]
    async fn test_trailing_slash_in_instance_url() {
        let (url, server) =
            serve_once("200 OK", r#"{"totalSize":0,"done":true,"records":[]}"#).await;
        let client = client_for(format!("{}/", url));

        client
            .query_name("Account", "0011i00000U359dAAB")
            .await
            .unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /services/data/v59.0/query?"));
    }

    #[tokio::test]
    async fn test_query_name_returns_first_record_name() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"totalSize":1,"done":true,"records":[{"attributes":{"type":"User"},"Name":"Rupert Barrow"}]}"#,
        )
        .await;
        let client = client_for(url);

        let name = client
            .query_name("User", "0051i0000015ttbAAA")
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("Rupert Barrow"));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /services/data/v59.0/query?q=SELECT"));
        assert!(request.contains("0051i0000015ttbAAA"));
        assert!(request.to_lowercase().contains("authorization: bearer test-token"));
    }

    #[tokio::test]
    async fn test_query_name_without_records_is_none() {
        let (url, server) =
            serve_once("200 OK", r#"{"totalSize":0,"done":true,"records":[]}"#).await;
        let client = client_for(url);

        let name = client
            .query_name("Account", "0011i00000U359dAAB")
            .await
            .unwrap();
        assert_eq!(name, None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_query_name_error_status() {
        let (url, server) = serve_once(
            "401 Unauthorized",
            r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#,
        )
        .await;
        let client = client_for(url);

        let err = client
            .query_name("Account", "0011i00000U359dAAB")
            .await
            .unwrap_err();
        assert!(matches!(err, EnricherError::UpstreamQuery(msg) if msg.contains("INVALID_SESSION_ID")));
        server.await.unwrap();
    }
}
