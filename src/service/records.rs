//! Adding, editing and deleting records, with the checks that need the
//! rest of the database (CNAME conflicts, duplicate SOA, ...).
use serde::{Deserialize, Deserializer, Serialize};

use crate::AppState;
use crate::db::record_repo::{self, NewRecord, Record};
use crate::db::user_repo::User;
use crate::db::zone_repo::Zone;
use crate::dns::ip_to_ptr;
use crate::error::AppError;
use crate::validation::{
    RecordData, RecordInput, RecordType, ValidationResult, normalize_record_name,
};

use super::{authorize_record_edit, authorize_zone_view, bump_serial, find_zone, rectify};

/// Record fields as submitted. Priority and TTL stay raw so that the
/// validators can tell blank from zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordRequest {
    #[serde(rename = "type")]
    pub rtype: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "raw_field")]
    pub prio: String,
    #[serde(default, deserialize_with = "raw_field")]
    pub ttl: String,
    /// Also create the matching PTR for an A or AAAA record.
    #[serde(default)]
    pub reverse: bool,
}

/// Accept `"300"`, `300` or `null` for numeric form fields.
fn raw_field<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// A record that passed both the per-type and the cross-record checks.
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    pub zone: Zone,
    pub rtype: RecordType,
    pub data: RecordData,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SavedRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub rtype: RecordType,
    #[serde(flatten)]
    pub data: RecordData,
    pub warnings: Vec<String>,
    /// Id of the PTR created alongside, if one was requested and made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptr_record_id: Option<i64>,
}

/// Validate `req` for `zone_id`. `exclude` is the record being edited, so
/// it does not conflict with itself.
pub async fn validate_record(
    state: &AppState,
    zone_id: i64,
    req: &RecordRequest,
    exclude: Option<i64>,
) -> Result<ValidatedRecord, AppError> {
    let zone = find_zone(state, zone_id).await?;
    let rtype = req
        .rtype
        .parse::<RecordType>()
        .map_err(|e| AppError::invalid(e.to_string()))?;
    if !state.config.allows_type(&zone.name, rtype) {
        return Err(AppError::invalid(format!(
            "Record type {rtype} is not allowed in this zone."
        )));
    }

    let name = normalize_record_name(&req.name, &zone.name);
    let content = if rtype == RecordType::TXT && state.config.txt_auto_quote {
        auto_quote(&req.content)
    } else {
        req.content.clone()
    };

    if rtype != RecordType::CNAME && record_repo::cname_exists(&state.db, &name, exclude).await? {
        return Err(AppError::invalid(
            "This is not a valid record. There already exists a CNAME with this name.",
        ));
    }

    let input = RecordInput {
        content: &content,
        name: &name,
        prio: &req.prio,
        ttl: &req.ttl,
        default_ttl: state.config.default_ttl,
        zone: Some(&zone.name),
    };
    let result = state.validators.validate_as(rtype, &input);
    let Some(data) = result.data else {
        return Err(AppError::Invalid(result.errors));
    };

    check_cross_record(state, &zone, rtype, &data, exclude).await?;

    Ok(ValidatedRecord {
        zone,
        rtype,
        data,
        warnings: result.warnings,
    })
}

/// Report what saving `req` would do, without writing anything.
pub async fn dry_run(
    state: &AppState,
    actor: &User,
    zone_id: i64,
    req: &RecordRequest,
) -> Result<ValidationResult, AppError> {
    let zone = find_zone(state, zone_id).await?;
    authorize_zone_view(state, actor, &zone).await?;
    match validate_record(state, zone_id, req, None).await {
        Ok(ValidatedRecord { data, warnings, .. }) => Ok(ValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings,
            data: Some(data),
        }),
        Err(AppError::Invalid(errors)) => Ok(ValidationResult {
            valid: false,
            errors,
            warnings: Vec::new(),
            data: None,
        }),
        Err(err) => Err(err),
    }
}

async fn check_cross_record(
    state: &AppState,
    zone: &Zone,
    rtype: RecordType,
    data: &RecordData,
    exclude: Option<i64>,
) -> Result<(), AppError> {
    let db = &state.db;
    match rtype {
        RecordType::CNAME => {
            if record_repo::cname_exists(db, &data.name, exclude).await? {
                return Err(AppError::invalid(
                    "Multiple CNAME records with the same name are not allowed.",
                ));
            }
            if record_repo::other_record_at(db, &data.name, exclude).await? {
                return Err(AppError::invalid(
                    "This is not a valid CNAME. There already exists a record with this name.",
                ));
            }
            if record_repo::mx_or_ns_pointing_to(db, &data.name).await? {
                return Err(AppError::invalid(
                    "This is not a valid CNAME. Did you assign an MX or NS record to the record?",
                ));
            }
        }
        RecordType::SOA => {
            if record_repo::soa_exists_in_zone(db, zone.id, exclude).await? {
                return Err(AppError::invalid("A zone can only have one SOA record."));
            }
        }
        t if t.points_to_host() => {
            if record_repo::cname_exists(db, &data.content, None).await? {
                return Err(AppError::invalid(
                    "You can not point a NS or MX record to a CNAME record. Remove or rename the CNAME record first, or take another name.",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Wrap TXT content in quotes unless it already is quoted.
fn auto_quote(content: &str) -> String {
    let content = content.trim();
    if content.starts_with('"') {
        return content.to_string();
    }
    format!("\"{}\"", content.replace('"', "\\\""))
}

pub async fn list_records(
    state: &AppState,
    actor: &User,
    zone_id: i64,
) -> Result<Vec<Record>, AppError> {
    let zone = find_zone(state, zone_id).await?;
    authorize_zone_view(state, actor, &zone).await?;
    Ok(record_repo::list_by_zone(&state.db, zone_id).await?)
}

pub async fn add_record(
    state: &AppState,
    actor: &User,
    zone_id: i64,
    req: &RecordRequest,
) -> Result<SavedRecord, AppError> {
    let zone = find_zone(state, zone_id).await?;
    if let Ok(rtype) = req.rtype.parse::<RecordType>() {
        authorize_record_edit(state, actor, &zone, &[rtype]).await?;
    }

    let ValidatedRecord {
        zone,
        rtype,
        mut data,
        mut warnings,
    } = validate_record(state, zone_id, req, None).await?;
    data.name = data.name.to_ascii_lowercase();

    if record_repo::record_exists(&state.db, zone.id, &data.name, rtype.as_str(), &data.content)
        .await?
    {
        return Err(AppError::conflict(
            "A record with this hostname, type, and content already exists.",
        ));
    }

    let mut tx = state.db.begin().await?;
    let id = record_repo::insert(&mut *tx, new_record(zone.id, rtype, &data)).await?;
    if rtype != RecordType::SOA {
        bump_serial(&mut *tx, zone.id, state.config.today()).await?;
    }
    tx.commit().await?;

    tracing::info!(
        user = %actor.username,
        zone = %zone.name,
        record = %data.name,
        rtype = %rtype,
        content = %data.content,
        ttl = data.ttl,
        prio = data.prio,
        "record added"
    );
    rectify(state, &zone.name).await;

    let mut ptr_record_id = None;
    if req.reverse && matches!(rtype, RecordType::A | RecordType::AAAA) {
        match add_matching_ptr(state, actor, &data).await {
            Ok(id) => ptr_record_id = id,
            Err(err) => warnings.push(err.to_string()),
        }
    }

    Ok(SavedRecord {
        id,
        rtype,
        data,
        warnings,
        ptr_record_id,
    })
}

/// Create the PTR for an address record. `Ok(None)` if it already exists.
async fn add_matching_ptr(
    state: &AppState,
    actor: &User,
    data: &RecordData,
) -> Result<Option<i64>, AppError> {
    if !state.config.reverse_records_enabled {
        return Err(AppError::forbidden("Reverse record creation is not allowed."));
    }
    let ptr_name = ip_to_ptr(&data.content).map_err(|e| AppError::invalid(e.to_string()))?;
    let zones = crate::db::zone_repo::reverse_zones(&state.db).await?;
    let candidates = zones.iter().map(|(id, n)| (*id, n.as_str()));
    let zone_id = crate::dns::best_matching_zone(&ptr_name, candidates).ok_or_else(|| {
        AppError::not_found(format!("No matching reverse zone found for {ptr_name}."))
    })?;
    let zone = find_zone(state, zone_id).await?;
    authorize_record_edit(state, actor, &zone, &[RecordType::PTR]).await?;

    if record_repo::record_exists(&state.db, zone.id, &ptr_name, "PTR", &data.name).await? {
        tracing::debug!(ptr = %ptr_name, "PTR already present");
        return Ok(None);
    }

    let mut tx = state.db.begin().await?;
    let id = record_repo::insert(
        &mut *tx,
        NewRecord {
            domain_id: zone.id,
            name: &ptr_name,
            rtype: "PTR",
            content: &data.name,
            ttl: data.ttl,
            prio: 0,
        },
    )
    .await?;
    bump_serial(&mut *tx, zone.id, state.config.today()).await?;
    tx.commit().await?;

    tracing::info!(zone = %zone.name, record = %ptr_name, content = %data.name, "PTR added");
    rectify(state, &zone.name).await;
    Ok(Some(id))
}

pub async fn edit_record(
    state: &AppState,
    actor: &User,
    record_id: i64,
    req: &RecordRequest,
) -> Result<SavedRecord, AppError> {
    let current = record_repo::find_by_id(&state.db, record_id)
        .await?
        .ok_or_else(|| AppError::not_found("Record not found."))?;
    let zone = find_zone(state, current.domain_id).await?;
    let mut touched: Vec<RecordType> = current.rtype.parse().into_iter().collect();
    touched.extend(req.rtype.parse::<RecordType>());
    authorize_record_edit(state, actor, &zone, &touched).await?;

    let ValidatedRecord {
        zone,
        rtype,
        mut data,
        warnings,
    } = validate_record(state, zone.id, req, Some(record_id)).await?;
    data.name = data.name.to_ascii_lowercase();

    let unchanged = current.name.eq_ignore_ascii_case(&data.name)
        && current.rtype == rtype.as_str()
        && current.content == data.content;
    if !unchanged
        && record_repo::record_exists(
            &state.db,
            zone.id,
            &data.name,
            rtype.as_str(),
            &data.content,
        )
        .await?
    {
        return Err(AppError::conflict(
            "A record with this hostname, type, and content already exists.",
        ));
    }

    let mut tx = state.db.begin().await?;
    record_repo::update(&mut *tx, record_id, new_record(zone.id, rtype, &data)).await?;
    if rtype != RecordType::SOA {
        bump_serial(&mut *tx, zone.id, state.config.today()).await?;
    }
    tx.commit().await?;

    tracing::info!(
        user = %actor.username,
        zone = %zone.name,
        record_id,
        record = %data.name,
        rtype = %rtype,
        content = %data.content,
        "record edited"
    );
    rectify(state, &zone.name).await;

    Ok(SavedRecord {
        id: record_id,
        rtype,
        data,
        warnings,
        ptr_record_id: None,
    })
}

pub async fn delete_record(state: &AppState, actor: &User, record_id: i64) -> Result<(), AppError> {
    let record = record_repo::find_by_id(&state.db, record_id)
        .await?
        .ok_or_else(|| AppError::not_found("Record not found."))?;
    let zone = find_zone(state, record.domain_id).await?;
    let rtype: Vec<RecordType> = record.rtype.parse().into_iter().collect();
    authorize_record_edit(state, actor, &zone, &rtype).await?;
    if record.rtype == RecordType::SOA.as_str() {
        return Err(AppError::forbidden("You are not allowed to delete the SOA record."));
    }

    let mut tx = state.db.begin().await?;
    record_repo::delete(&mut *tx, record_id).await?;
    bump_serial(&mut *tx, zone.id, state.config.today()).await?;
    tx.commit().await?;

    tracing::info!(
        user = %actor.username,
        zone = %zone.name,
        record_id,
        record = %record.name,
        rtype = %record.rtype,
        "record deleted"
    );
    rectify(state, &zone.name).await;
    Ok(())
}

fn new_record<'a>(domain_id: i64, rtype: RecordType, data: &'a RecordData) -> NewRecord<'a> {
    NewRecord {
        domain_id,
        name: &data.name,
        rtype: rtype.as_str(),
        content: &data.content,
        ttl: data.ttl,
        prio: data.prio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_auto_quote() {
        assert_eq!(auto_quote("v=spf1 -all"), "\"v=spf1 -all\"");
        assert_eq!(auto_quote("\"already\""), "\"already\"");
        assert_eq!(auto_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn request_accepts_numbers_or_strings() {
        let req: RecordRequest = serde_json::from_str(
            r#"{"type":"MX","name":"@","content":"mail.example.com","prio":10,"ttl":"300"}"#,
        )
        .unwrap();
        assert_eq!(req.prio, "10");
        assert_eq!(req.ttl, "300");
        assert!(!req.reverse);

        let req: RecordRequest =
            serde_json::from_str(r#"{"type":"A","content":"192.0.2.1","prio":null}"#).unwrap();
        assert_eq!(req.prio, "");
        assert_eq!(req.name, "");
    }
}
