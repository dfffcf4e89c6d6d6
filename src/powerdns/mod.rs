//! DNSSEC operations delegated to the PowerDNS HTTP API.

pub mod client;
pub mod types;

use async_trait::async_trait;

use client::PowerDnsClient;

/// What the record and zone services need from the signing backend.
#[async_trait]
pub trait DnssecProvider: Send + Sync {
    async fn rectify_zone(&self, zone_name: &str) -> anyhow::Result<()>;
    async fn secure_zone(&self, zone_name: &str) -> anyhow::Result<()>;
    async fn unsecure_zone(&self, zone_name: &str) -> anyhow::Result<()>;
    async fn is_zone_secured(&self, zone_name: &str) -> anyhow::Result<bool>;
}

#[async_trait]
impl DnssecProvider for PowerDnsClient {
    async fn rectify_zone(&self, zone_name: &str) -> anyhow::Result<()> {
        PowerDnsClient::rectify_zone(self, zone_name).await
    }

    async fn secure_zone(&self, zone_name: &str) -> anyhow::Result<()> {
        self.set_dnssec(zone_name, true).await?;
        PowerDnsClient::rectify_zone(self, zone_name).await
    }

    async fn unsecure_zone(&self, zone_name: &str) -> anyhow::Result<()> {
        self.set_dnssec(zone_name, false).await
    }

    async fn is_zone_secured(&self, zone_name: &str) -> anyhow::Result<bool> {
        Ok(self.get_zone(zone_name).await?.dnssec)
    }
}
