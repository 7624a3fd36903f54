//! Record source backed by an Invenio instance over HTTP
//!
//! Endpoints used:
//! - `GET {base}/search?p=<query>&of=id&rg=0` - JSON array of matching recids
//! - `GET {base}/search?cc=<collection>&of=id&rg=0` - recids of a collection
//! - `GET {base}/record/<recid>/export/xm` - MARCXML export of one record

use super::traits::RecordSource;
use crate::config::{SecretString, SourceConfig};
use crate::core::marcxml::parse_collection;
use crate::domain::{BibTaskError, Record, RecordId, RecordSourceError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

/// HTTP client for Invenio search and record export
pub struct InvenioClient {
    base_url: Url,
    client: Client,
    api_key: Option<SecretString>,
}

impl InvenioClient {
    /// Creates a client from the source configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is missing or malformed, or the HTTP
    /// client can't be built.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let raw = config.base_url.as_deref().ok_or_else(|| {
            BibTaskError::Configuration("source.base_url is required for the invenio backend".to_string())
        })?;
        // join() replaces the last path segment unless the base ends with '/'
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            BibTaskError::Configuration(format!("Invalid source.base_url '{raw}': {e}"))
        })?;

        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));
        if !config.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().map_err(|e| {
            BibTaskError::RecordSource(RecordSourceError::ConnectionFailed(format!(
                "Failed to build HTTP client: {e}"
            )))
        })?;

        Ok(Self {
            base_url,
            client,
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            BibTaskError::Configuration(format!("Invalid endpoint path '{path}': {e}"))
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => {
                let token: &str = key.expose_secret().as_ref();
                request.bearer_auth(token)
            }
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorized(request).send().await.map_err(|e| {
            BibTaskError::RecordSource(RecordSourceError::ConnectionFailed(e.to_string()))
        })
    }

    async fn fetch_ids(&self, params: &[(&str, &str)]) -> Result<Vec<RecordId>> {
        let url = self.endpoint("search")?;
        tracing::debug!(url = %url, ?params, "Searching record ids");

        let resp = self.send(self.client.get(url).query(params)).await?;
        let resp = error_for_status(resp).await?;

        let ids: Vec<u64> = resp.json().await.map_err(|e| {
            BibTaskError::RecordSource(RecordSourceError::InvalidResponse(format!(
                "Expected a JSON array of record ids: {e}"
            )))
        })?;
        Ok(ids.into_iter().map(RecordId::new).collect())
    }
}

async fn error_for_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    let err = if status.is_server_error() {
        RecordSourceError::ServerError {
            status: status.as_u16(),
            message,
        }
    } else {
        RecordSourceError::ClientError {
            status: status.as_u16(),
            message,
        }
    };
    Err(err.into())
}

#[async_trait]
impl RecordSource for InvenioClient {
    async fn search(&self, query: &str) -> Result<Vec<RecordId>> {
        self.fetch_ids(&[("p", query), ("of", "id"), ("rg", "0")])
            .await
            .map_err(|e| match e {
                BibTaskError::RecordSource(RecordSourceError::ClientError { status, message }) => {
                    RecordSourceError::SearchFailed(format!("{query}: {status} - {message}")).into()
                }
                other => other,
            })
    }

    async fn collection_members(&self, name: &str) -> Result<BTreeSet<RecordId>> {
        let ids = self
            .fetch_ids(&[("cc", name), ("of", "id"), ("rg", "0")])
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn get_record(&self, recid: RecordId) -> Result<Option<Record>> {
        let url = self.endpoint(&format!("record/{recid}/export/xm"))?;
        tracing::debug!(url = %url, %recid, "Fetching record");

        let resp = self.send(self.client.get(url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = error_for_status(resp).await?;

        let body = resp.text().await.map_err(|e| {
            BibTaskError::RecordSource(RecordSourceError::FetchFailed {
                recid: recid.get(),
                message: e.to_string(),
            })
        })?;

        let mut records = parse_collection(&body)?;
        match records.iter().position(|r| r.recid() == recid) {
            Some(index) => Ok(Some(records.swap_remove(index))),
            None if records.is_empty() => Ok(None),
            None => Err(RecordSourceError::FetchFailed {
                recid: recid.get(),
                message: "export returned a different record".to_string(),
            }
            .into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "invenio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, SourceBackend};
    use mockito::Matcher;

    fn config(base_url: &str) -> SourceConfig {
        SourceConfig {
            backend: SourceBackend::Invenio,
            marcxml_path: None,
            base_url: Some(base_url.to_string()),
            api_key: None,
            timeout_seconds: 5,
            tls_verify: true,
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = InvenioClient::new(&config("https://inspirehep.net/legacy")).unwrap();
        assert_eq!(client.base_url().as_str(), "https://inspirehep.net/legacy/");
        assert_eq!(
            client.endpoint("search").unwrap().as_str(),
            "https://inspirehep.net/legacy/search"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(InvenioClient::new(&config("not a url")).is_err());
    }

    #[tokio::test]
    async fn test_search_returns_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("p".into(), "084:pdg".into()),
                Matcher::UrlEncoded("of".into(), "id".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[3, 1, 2]")
            .create_async()
            .await;

        let client = InvenioClient::new(&config(&server.url())).unwrap();
        let ids = client.search("084:pdg").await.unwrap();

        assert_eq!(ids, vec![RecordId::new(3), RecordId::new(1), RecordId::new(2)]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_collection_members() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("cc".into(), "HEP".into()))
            .with_status(200)
            .with_body("[5, 5, 6]")
            .create_async()
            .await;

        let client = InvenioClient::new(&config(&server.url())).unwrap();
        let members = client.collection_members("HEP").await.unwrap();
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn test_api_key_sent_as_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer s3cret")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let mut cfg = config(&server.url());
        cfg.api_key = Some(secret_string("s3cret".to_string()));
        let client = InvenioClient::new(&cfg).unwrap();
        assert!(client.search("084:pdg").await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_record_parses_marcxml() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/record/42/export/xm")
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body(
                r#"<collection><record>
                    <controlfield tag="001">42</controlfield>
                    <datafield tag="084" ind1=" " ind2=" ">
                      <subfield code="2">PDG</subfield>
                      <subfield code="9">PDG</subfield>
                      <subfield code="a">S008</subfield>
                    </datafield>
                </record></collection>"#,
            )
            .create_async()
            .await;

        let client = InvenioClient::new(&config(&server.url())).unwrap();
        let record = client.get_record(RecordId::new(42)).await.unwrap().unwrap();
        assert_eq!(record.recid(), RecordId::new(42));
        assert!(record.has_field("084"));
    }

    #[tokio::test]
    async fn test_get_record_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/record/7/export/xm")
            .with_status(404)
            .create_async()
            .await;

        let client = InvenioClient::new(&config(&server.url())).unwrap();
        assert!(client.get_record(RecordId::new(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let client = InvenioClient::new(&config(&server.url())).unwrap();
        let err = client.search("084:pdg").await.unwrap_err();
        assert!(matches!(
            err,
            BibTaskError::RecordSource(RecordSourceError::ServerError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_search_query_reported_as_search_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(400)
            .create_async()
            .await;

        let client = InvenioClient::new(&config(&server.url())).unwrap();
        let err = client.search("084:(").await.unwrap_err();
        assert!(matches!(
            err,
            BibTaskError::RecordSource(RecordSourceError::SearchFailed(_))
        ));
    }
}
