use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PdnsZone {
    pub id: String,   // "example.com."
    pub name: String, // "example.com."
    pub kind: String, // "Native", "Master", "Slave"
    #[serde(default)]
    pub serial: u32,
    #[serde(default)]
    pub dnssec: bool,
}

/// Body of `PUT zones/{zone}` when only DNSSEC is toggled.
#[derive(Debug, Serialize)]
pub struct PdnsZoneDnssec {
    pub dnssec: bool,
}

#[derive(Debug, Deserialize)]
pub struct PdnsRectifyResult {
    pub result: String,
}
