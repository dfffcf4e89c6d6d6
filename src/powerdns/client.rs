use crate::powerdns::types::*;
use reqwest::Client;

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/servers/{}/{}",
            self.base_url,
            self.server_id,
            path.trim_start_matches('/')
        )
    }

    /// PowerDNS addresses zones by their canonical (dotted) name.
    fn zone_path(zone_name: &str, suffix: &str) -> String {
        format!("zones/{}.{}", zone_name.trim_end_matches('.'), suffix)
    }

    pub async fn get_zone(&self, name: &str) -> anyhow::Result<PdnsZone> {
        let url = self.url(&Self::zone_path(name, ""));
        let res = self.auth_header(self.http.get(url)).send().await?;
        if !res.status().is_success() {
            anyhow::bail!("PowerDNS get_zone failed with {}", res.status());
        }
        Ok(res.json::<PdnsZone>().await?)
    }

    pub async fn rectify_zone(&self, name: &str) -> anyhow::Result<()> {
        let url = self.url(&Self::zone_path(name, "/rectify"));
        let res = self.auth_header(self.http.put(url)).send().await?;
        if !res.status().is_success() {
            anyhow::bail!("PowerDNS rectify_zone failed with {}", res.status());
        }
        let body = res.json::<PdnsRectifyResult>().await?;
        tracing::debug!(zone = %name, result = %body.result, "zone rectified");
        Ok(())
    }

    pub async fn set_dnssec(&self, name: &str, enabled: bool) -> anyhow::Result<()> {
        let url = self.url(&Self::zone_path(name, ""));
        let res = self
            .auth_header(self.http.put(url))
            .json(&PdnsZoneDnssec { dnssec: enabled })
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!("PowerDNS set_dnssec failed with {}", res.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_urls_are_canonical() {
        let client = PowerDnsClient::new("http://127.0.0.1:8081/api/v1/", "secret", "localhost");
        assert_eq!(
            client.url(&PowerDnsClient::zone_path("example.com", "/rectify")),
            "http://127.0.0.1:8081/api/v1/servers/localhost/zones/example.com./rectify"
        );
        assert_eq!(
            client.url(&PowerDnsClient::zone_path("example.com.", "")),
            "http://127.0.0.1:8081/api/v1/servers/localhost/zones/example.com."
        );
    }
}
