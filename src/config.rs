//! Runtime settings, filled in from the command line.
use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::validation::{RecordType, ValidationConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TTL used when a record is submitted without one.
    pub default_ttl: u32,
    /// Mailbox put in the SOA of new zones, e.g. `hostmaster@example.net`.
    pub hostmaster: String,
    /// NS records put in new zones. The first one is also the SOA primary.
    pub nameservers: Vec<String>,
    pub soa_refresh: u32,
    pub soa_retry: u32,
    pub soa_expire: u32,
    pub soa_minimum: u32,
    pub top_level_tld_check: bool,
    /// Wrap TXT content in quotes when the user left them out.
    pub txt_auto_quote: bool,
    pub reverse_records_enabled: bool,
    pub dnssec_enabled: bool,
    /// Offset from UTC used to decide what "today" is for serials.
    pub utc_offset_minutes: i32,
    /// Types offered for forward zones; `None` allows every known type.
    pub domain_record_types: Option<Vec<RecordType>>,
    /// Types offered for `.arpa` zones; `None` allows every known type.
    pub reverse_record_types: Option<Vec<RecordType>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_ttl: 86400,
            hostmaster: "hostmaster@example.net".into(),
            nameservers: vec!["ns1.example.net".into(), "ns2.example.net".into()],
            soa_refresh: 28800,
            soa_retry: 7200,
            soa_expire: 604800,
            soa_minimum: 86400,
            top_level_tld_check: false,
            txt_auto_quote: false,
            reverse_records_enabled: true,
            dnssec_enabled: false,
            utc_offset_minutes: 0,
            domain_record_types: None,
            reverse_record_types: None,
        }
    }
}

impl AppConfig {
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            top_level_tld_check: self.top_level_tld_check,
        }
    }

    /// Current date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        let offset = FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(Utc.fix());
        Utc::now().with_timezone(&offset).date_naive()
    }

    /// Whether `rtype` may be used in the zone named `zone_name`.
    pub fn allows_type(&self, zone_name: &str, rtype: RecordType) -> bool {
        let reverse = zone_name.to_ascii_lowercase().ends_with(".arpa");
        let allowed = if reverse {
            &self.reverse_record_types
        } else {
            &self.domain_record_types
        };
        allowed.as_ref().is_none_or(|types| types.contains(&rtype))
    }

    /// The hostmaster mailbox in SOA RNAME form: `first.last@example.net`
    /// becomes `first\.last.example.net`.
    pub fn hostmaster_rname(&self) -> String {
        match self.hostmaster.trim().split_once('@') {
            Some((local, domain)) => {
                format!("{}.{}", local.replace('.', "\\."), domain.trim_end_matches('.'))
            }
            None => self.hostmaster.trim().to_string(),
        }
    }

    /// SOA content for a zone created on `today`.
    pub fn default_soa_content(&self, today: NaiveDate) -> String {
        let primary = self
            .nameservers
            .first()
            .map(|ns| ns.trim_end_matches('.'))
            .unwrap_or("localhost");
        let hostmaster = self.hostmaster_rname();
        format!(
            "{primary} {hostmaster} {} {} {} {} {}",
            crate::dns::serial::first_serial_of(today),
            self.soa_refresh,
            self.soa_retry,
            self.soa_expire,
            self.soa_minimum,
        )
    }
}
