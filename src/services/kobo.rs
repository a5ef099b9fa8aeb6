use crate::domain::constants::{attach_field_for, FIELD_MAP};
use crate::domain::errors::NominationError;
use crate::domain::models::{
    AttachField, Attachment, DetailField, KoboSection, KoboSource, NewNomination, NominationRecord,
    NomineeDetails, PullAllReport, PullReport, Status,
};
use crate::services::storage::NominationStore;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Read side of the KoBo v2 API the importer depends on.
pub trait KoboApi {
    fn get_json(&self, path_or_url: &str) -> anyhow::Result<Value>;
    /// Resolves one `_attachments` entry to `(filename, bytes)`; `None` when
    /// the server no longer has the file.
    fn download(&self, attachment: &Value) -> anyhow::Result<Option<(String, Vec<u8>)>>;
}

pub struct KoboClient {
    base_url: String,
    token: String,
    http: reqwest::blocking::Client,
}

impl KoboClient {
    pub fn new(cfg: &KoboSection, token: String) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http") {
            path_or_url.to_string()
        } else {
            format!("{}{}", self.base_url, path_or_url)
        }
    }

    fn authed_get(&self, path_or_url: &str) -> reqwest::Result<reqwest::blocking::Response> {
        self.http
            .get(self.url(path_or_url))
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
    }
}

impl KoboApi for KoboClient {
    fn get_json(&self, path_or_url: &str) -> anyhow::Result<Value> {
        let resp = self.authed_get(path_or_url)?.error_for_status()?;
        Ok(resp.json()?)
    }

    fn download(&self, attachment: &Value) -> anyhow::Result<Option<(String, Vec<u8>)>> {
        let Some(meta_url) = attachment.get("download_url").and_then(Value::as_str) else {
            return Ok(None);
        };
        let resp = self.authed_get(meta_url)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        let declared = attachment.get("filename").and_then(Value::as_str);

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);
        if !is_json {
            let name = declared.unwrap_or("file.bin").to_string();
            return Ok(Some((name, resp.bytes()?.to_vec())));
        }

        let meta: Value = resp.json()?;
        let Some(file_url) = ["download_url", "download_large_url", "download_small_url"]
            .iter()
            .find_map(|k| meta.get(*k).and_then(Value::as_str))
        else {
            return Ok(None);
        };
        let file = self.http.get(file_url).send()?.error_for_status()?;
        let name = declared
            .or_else(|| meta.get("filename").and_then(Value::as_str))
            .unwrap_or("file.bin")
            .to_string();
        Ok(Some((name, file.bytes()?.to_vec())))
    }
}

#[derive(Debug, Clone)]
pub struct PullOptions {
    pub page_size: u32,
    pub start_page: u32,
    pub with_attachments: bool,
    pub log_missing: bool,
    /// Attachments land in `<attachments_root>/<record id>/`.
    pub attachments_root: PathBuf,
}

pub fn data_path(asset_uid: &str, page_size: u32, page: Option<u32>) -> String {
    let base = format!(
        "/api/v2/assets/{}/data/?format=json&page_size={}",
        asset_uid, page_size
    );
    match page {
        Some(p) if p > 1 => format!("{}&page={}", base, p),
        _ => base,
    }
}

/// Page number carried by the payload's `next` link. A link without a
/// readable `page` parameter still means "there is more", so it falls back
/// to the following page.
pub fn next_page(next: Option<&str>, start_page: u32) -> Option<u32> {
    let next = next.filter(|n| n.contains("page="))?;
    let parsed = reqwest::Url::parse(next).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse::<u32>().ok())
    });
    Some(parsed.unwrap_or(start_page.saturating_add(1)))
}

fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Writes one mapped form answer into `details`.
///
/// Structured values never overwrite a scalar field. Select fields are
/// cleared when the answer is absent or empty and only accept allow-listed
/// values; other fields change only when the answer is non-empty.
pub fn apply_detail(
    details: &mut NomineeDetails,
    field: DetailField,
    value: Option<&Value>,
    select_options: &BTreeMap<String, Vec<String>>,
) {
    if matches!(value, Some(Value::Array(_)) | Some(Value::Object(_))) {
        return;
    }
    let value = value.and_then(scalar).filter(|s| !s.trim().is_empty());
    let slot = details.slot_mut(field);

    if field.is_select() {
        let Some(v) = value else {
            *slot = None;
            return;
        };
        if let Some(allowed) = select_options.get(field.name()) {
            if !allowed.is_empty() && !allowed.contains(&v) {
                tracing::warn!(
                    field = field.name(),
                    value = %v,
                    "skipping select value outside allow-list"
                );
                return;
            }
        }
        *slot = Some(v);
        return;
    }

    if let Some(v) = value {
        *slot = Some(v);
    }
}

fn str_field<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_submission_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|n| Utc.from_utc_datetime(&n))
}

/// Imported content may only change before a reviewer has touched the record.
fn is_open(status: Status) -> bool {
    matches!(status, Status::Draft | Status::Submitted)
}

/// Creates or refreshes the nomination for one submission row, keyed by
/// its `_uuid`. Rows without one are ignored; records already Reviewed or
/// decided are returned untouched.
pub fn upsert_row<S: NominationStore>(
    store: &mut S,
    cfg: &KoboSection,
    row: &Value,
) -> Result<Option<NominationRecord>, NominationError> {
    let Some(uid) = str_field(row, "_uuid") else {
        tracing::warn!("skipping submission without _uuid");
        return Ok(None);
    };
    let existing = store.find_by_kobo_uid(uid)?;

    let mut details = existing
        .as_ref()
        .map(|r| r.details.clone())
        .unwrap_or_default();
    for (key, field) in FIELD_MAP {
        apply_detail(&mut details, *field, row.get(*key), &cfg.select_options);
    }

    let source = KoboSource {
        kobo_uid: uid.to_string(),
        form_id: str_field(row, "_xform_id_string").map(str::to_string),
        submission_time: str_field(row, "_submission_time").map(str::to_string),
        raw: row.clone(),
    };

    if let Some(mut record) = existing {
        if !is_open(record.status) {
            tracing::debug!(
                id = %record.id,
                kobo_uid = uid,
                status = ?record.status,
                "submission already under review, not refreshed"
            );
            return Ok(Some(record));
        }
        if let Some(name) = details.full_name.clone() {
            record.nominee = name;
        }
        record.details = details;
        record.source = Some(source);
        let record = store.update(record)?;
        tracing::debug!(id = %record.id, kobo_uid = uid, "submission refreshed");
        return Ok(Some(record));
    }

    let nominator = str_field(row, "_submitted_by")
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "kobo:{}",
                source.form_id.as_deref().unwrap_or(cfg.asset_uid.as_str())
            )
        });
    let nominee = details
        .full_name
        .clone()
        .unwrap_or_else(|| format!("kobo:{}", uid));
    let justification = details.justification().unwrap_or_default();
    let submitted_at = parse_submission_time(source.submission_time.as_deref());

    let mut record = store.insert(NewNomination {
        nominator: nominator.clone(),
        nominee,
        award_cycle: cfg.award_cycle.clone(),
        justification,
        details,
        source: Some(source),
    })?;
    if !record.justification.is_empty() {
        let at = submitted_at.unwrap_or_else(Utc::now);
        record.transition(Status::Submitted, at, Some(nominator.as_str()));
        record.submitted_at = Some(at);
        record = store.update(record)?;
    }
    tracing::debug!(id = %record.id, kobo_uid = uid, status = %record.status, "submission imported");
    store.audit(
        "kobo_import",
        serde_json::json!({"id": record.id, "kobo_uid": uid}),
    );
    Ok(Some(record))
}

fn safe_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty() && n != "..")
        .unwrap_or_else(|| "file.bin".to_string())
}

/// Writes `<root>/<record id>/<field>-<filename>`; the field prefix keeps two
/// questions that upload the same filename apart.
fn save_attachment(
    root: &Path,
    record_id: &str,
    field: AttachField,
    filename: &str,
    bytes: &[u8],
) -> anyhow::Result<(String, String)> {
    let dir = root.join(record_id);
    std::fs::create_dir_all(&dir)?;
    let name = format!("{}-{}", field.name(), safe_filename(filename));
    let path = dir.join(&name);
    std::fs::write(&path, bytes)?;
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Ok((path.to_string_lossy().to_string(), hex::encode(hasher.finalize())))
}

/// Downloads the row's mapped attachments; failures are logged and skipped.
fn import_attachments<S: NominationStore>(
    api: &dyn KoboApi,
    store: &mut S,
    mut record: NominationRecord,
    row: &Value,
    root: &Path,
) -> Result<NominationRecord, NominationError> {
    if !is_open(record.status) {
        return Ok(record);
    }
    let Some(entries) = row.get("_attachments").and_then(Value::as_array) else {
        return Ok(record);
    };
    let mut changed = false;
    for att in entries {
        let question = att
            .get("question_xpath")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        let Some(field) = question.rsplit('/').next().and_then(attach_field_for) else {
            continue;
        };
        let got = match api.download(att) {
            Ok(Some(got)) => got,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(id = %record.id, question, error = %e, "attachment download failed");
                continue;
            }
        };
        let (filename, bytes) = got;
        match save_attachment(root, &record.id, field, &filename, &bytes) {
            Ok((path, sha256)) => {
                record.attachments.retain(|a| a.field != field);
                record.attachments.push(Attachment {
                    field,
                    filename: safe_filename(&filename),
                    path,
                    sha256,
                });
                changed = true;
            }
            Err(e) => {
                tracing::warn!(id = %record.id, error = %e, "attachment write failed");
            }
        }
    }
    if changed {
        record = store.update(record)?;
    }
    Ok(record)
}

fn import_rows<S: NominationStore>(
    api: &dyn KoboApi,
    store: &mut S,
    cfg: &KoboSection,
    payload: &Value,
    opts: &PullOptions,
) -> anyhow::Result<usize> {
    let mut imported = 0;
    let rows = payload
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    for row in rows {
        if opts.log_missing {
            let uid = row.get("_uuid").and_then(Value::as_str).unwrap_or("?");
            for (key, _) in FIELD_MAP {
                if row.get(*key).map(Value::is_null).unwrap_or(true) {
                    tracing::warn!(
                        kobo_uid = uid,
                        key = *key,
                        "mapped KoBo key missing in row"
                    );
                }
            }
        }
        let Some(record) = upsert_row(store, cfg, row)? else {
            continue;
        };
        imported += 1;
        if opts.with_attachments {
            import_attachments(api, store, record, row, &opts.attachments_root)?;
        }
    }
    Ok(imported)
}

/// Imports a single page of submissions.
pub fn pull_batch<S: NominationStore>(
    api: &dyn KoboApi,
    store: &mut S,
    cfg: &KoboSection,
    opts: &PullOptions,
) -> anyhow::Result<PullReport> {
    let path = data_path(&cfg.asset_uid, opts.page_size, Some(opts.start_page));
    let payload = api.get_json(&path)?;
    let imported = import_rows(api, store, cfg, &payload, opts)?;
    let next = next_page(
        payload.get("next").and_then(Value::as_str),
        opts.start_page,
    );
    tracing::info!(imported, start_page = opts.start_page, ?next, "kobo batch pulled");
    Ok(PullReport {
        ok: true,
        imported,
        start_page: opts.start_page,
        next_page: next,
    })
}

/// Follows `next` links from the first page until the asset is exhausted.
pub fn pull_all<S: NominationStore>(
    api: &dyn KoboApi,
    store: &mut S,
    cfg: &KoboSection,
    opts: &PullOptions,
) -> anyhow::Result<PullAllReport> {
    let mut path = data_path(&cfg.asset_uid, opts.page_size, None);
    let mut total = 0;
    loop {
        let payload = api.get_json(&path)?;
        total += import_rows(api, store, cfg, &payload, opts)?;
        match payload.get("next").and_then(Value::as_str) {
            Some(next) if !next.is_empty() && next != path => path = next.to_string(),
            _ => break,
        }
    }
    tracing::info!(imported = total, "kobo asset pulled");
    Ok(PullAllReport {
        ok: true,
        imported: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;
    use serde_json::json;
    use std::collections::HashMap;

    struct FakeKobo {
        pages: HashMap<String, Value>,
        files: HashMap<String, Vec<u8>>,
    }

    impl KoboApi for FakeKobo {
        fn get_json(&self, path_or_url: &str) -> anyhow::Result<Value> {
            self.pages
                .get(path_or_url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("404 {}", path_or_url))
        }

        fn download(&self, attachment: &Value) -> anyhow::Result<Option<(String, Vec<u8>)>> {
            let url = attachment["download_url"].as_str().unwrap_or_default();
            if url.contains("broken") {
                anyhow::bail!("connection reset");
            }
            Ok(self.files.get(url).map(|b| {
                (
                    attachment["filename"].as_str().unwrap_or("file.bin").to_string(),
                    b.clone(),
                )
            }))
        }
    }

    fn cfg() -> KoboSection {
        let mut cfg = KoboSection {
            asset_uid: "asset1".into(),
            award_cycle: "VA2025".into(),
            ..Default::default()
        };
        cfg.select_options.insert(
            "award_category".into(),
            vec!["youth".into(), "lifetime".into()],
        );
        cfg
    }

    fn opts(root: &Path) -> PullOptions {
        PullOptions {
            page_size: 2,
            start_page: 1,
            with_attachments: false,
            log_missing: true,
            attachments_root: root.to_path_buf(),
        }
    }

    fn row(uid: &str, name: &str, category: &str) -> Value {
        json!({
            "_uuid": uid,
            "_xform_id_string": "asset1",
            "_submission_time": "2025-03-04T10:11:12",
            "_submitted_by": "field-officer",
            "nomination_category/category": category,
            "group_nominee/nominee_full_name": name,
            "group_nominee/location_region": "Coast",
            "description/_3_In_not_more_than_omination_should_win": "Led flood response",
        })
    }

    #[test]
    fn data_path_adds_page_only_after_first() {
        assert_eq!(
            data_path("a", 10, Some(1)),
            "/api/v2/assets/a/data/?format=json&page_size=10"
        );
        assert_eq!(
            data_path("a", 10, Some(3)),
            "/api/v2/assets/a/data/?format=json&page_size=10&page=3"
        );
    }

    #[test]
    fn next_page_reads_query_or_falls_back() {
        assert_eq!(
            next_page(
                Some("https://kobo.example/api/v2/assets/a/data/?format=json&page=4&page_size=10"),
                3
            ),
            Some(4)
        );
        assert_eq!(next_page(Some("https://kobo.example/x?page=abc"), 3), Some(4));
        assert_eq!(next_page(Some("https://kobo.example/x?start=20"), 3), None);
        assert_eq!(
            next_page(Some("https://kobo.example/x?page=abc"), u32::MAX),
            Some(u32::MAX)
        );
        assert_eq!(next_page(None, 3), None);
    }

    #[test]
    fn select_rules() {
        let options = cfg().select_options;
        let mut d = NomineeDetails {
            award_category: Some("youth".into()),
            category_of_youth: Some("16-24".into()),
            region: Some("Coast".into()),
            ..Default::default()
        };

        apply_detail(&mut d, DetailField::AwardCategory, Some(&json!("bogus")), &options);
        assert_eq!(d.award_category.as_deref(), Some("youth"));

        apply_detail(&mut d, DetailField::AwardCategory, Some(&json!("lifetime")), &options);
        assert_eq!(d.award_category.as_deref(), Some("lifetime"));

        apply_detail(&mut d, DetailField::CategoryOfYouth, None, &options);
        assert_eq!(d.category_of_youth, None);

        apply_detail(&mut d, DetailField::Region, Some(&json!("")), &options);
        assert_eq!(d.region.as_deref(), Some("Coast"));

        apply_detail(&mut d, DetailField::Region, Some(&json!(["a", "b"])), &options);
        assert_eq!(d.region.as_deref(), Some("Coast"));
    }

    #[test]
    fn batch_imports_submitted_records_and_reports_next_page() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut pages = HashMap::new();
        pages.insert(
            data_path("asset1", 2, Some(1)),
            json!({
                "next": "https://kobo.example/api/v2/assets/asset1/data/?format=json&page=2&page_size=2",
                "results": [row("u1", "Jane Doe", "youth"), {"no_uuid": true}]
            }),
        );
        let api = FakeKobo {
            pages,
            files: HashMap::new(),
        };
        let mut store = MemoryStore::new();

        let report = pull_batch(&api, &mut store, &cfg(), &opts(tmp.path())).unwrap();
        assert_eq!(
            report,
            PullReport {
                ok: true,
                imported: 1,
                start_page: 1,
                next_page: Some(2)
            }
        );

        let rec = store.find_by_kobo_uid("u1").unwrap().unwrap();
        assert_eq!(rec.status, Status::Submitted);
        assert_eq!(rec.nominee, "Jane Doe");
        assert_eq!(rec.nominator, "field-officer");
        assert_eq!(rec.award_cycle, "VA2025");
        assert_eq!(rec.justification, "Led flood response");
        assert_eq!(
            rec.submitted_at.unwrap().to_rfc3339(),
            "2025-03-04T10:11:12+00:00"
        );
        assert_eq!(rec.details.award_category.as_deref(), Some("youth"));
    }

    #[test]
    fn reimport_is_idempotent_and_keeps_status() {
        let mut store = MemoryStore::new();
        let cfg = cfg();
        let first = upsert_row(&mut store, &cfg, &row("u1", "Jane Doe", "youth"))
            .unwrap()
            .unwrap();
        let again = upsert_row(&mut store, &cfg, &row("u1", "Jane A. Doe", "bogus"))
            .unwrap()
            .unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(again.nominee, "Jane A. Doe");
        assert_eq!(again.status, Status::Submitted);
        assert_eq!(again.details.award_category.as_deref(), Some("youth"));
    }

    #[test]
    fn row_without_rationale_stays_draft() {
        let mut store = MemoryStore::new();
        let r = json!({"_uuid": "u9", "group_nominee/nominee_full_name": "Sam"});
        let rec = upsert_row(&mut store, &cfg(), &r).unwrap().unwrap();
        assert_eq!(rec.status, Status::Draft);
        assert_eq!(rec.nominator, "kobo:asset1");
        assert!(rec.submitted_at.is_none());
    }

    #[test]
    fn pull_all_follows_next_links_and_saves_attachments() {
        let tmp = tempfile::TempDir::new().unwrap();
        let second = "https://kobo.example/api/v2/assets/asset1/data/?format=json&page=2&page_size=2";
        let mut with_files = row("u2", "Ann", "lifetime");
        with_files["_attachments"] = json!([
            {
                "question_xpath": "attachments/Attach_Testimonial",
                "download_url": "https://kobo.example/att/1",
                "filename": "officer/attachments/abc/testimonial.pdf"
            },
            {
                "question_xpath": "attachments/Attach_Videos_Maximum_of_1_minute",
                "download_url": "https://kobo.example/att/broken",
                "filename": "clip.mp4"
            },
            {
                "question_xpath": "attachments/unmapped_question",
                "download_url": "https://kobo.example/att/2",
                "filename": "other.txt"
            }
        ]);

        let mut pages = HashMap::new();
        pages.insert(
            data_path("asset1", 2, None),
            json!({"next": second, "results": [row("u1", "Jane", "youth")]}),
        );
        pages.insert(
            second.to_string(),
            json!({"next": null, "results": [with_files]}),
        );
        let mut files = HashMap::new();
        files.insert("https://kobo.example/att/1".to_string(), b"pdf-bytes".to_vec());
        files.insert("https://kobo.example/att/2".to_string(), b"txt".to_vec());
        let api = FakeKobo { pages, files };

        let mut o = opts(tmp.path());
        o.with_attachments = true;
        let mut store = MemoryStore::new();
        let report = pull_all(&api, &mut store, &cfg(), &o).unwrap();
        assert_eq!(report.imported, 2);

        let rec = store.find_by_kobo_uid("u2").unwrap().unwrap();
        assert_eq!(rec.attachments.len(), 1);
        let att = &rec.attachments[0];
        assert_eq!(att.field, crate::domain::models::AttachField::Testimonial);
        assert_eq!(att.filename, "testimonial.pdf");
        assert!(att.path.ends_with("testimonial-testimonial.pdf"));
        assert_eq!(std::fs::read(&att.path).unwrap(), b"pdf-bytes");
        let mut hasher = Sha256::new();
        hasher.update(b"pdf-bytes");
        assert_eq!(att.sha256, hex::encode(hasher.finalize()));
    }

    #[test]
    fn reimport_leaves_decided_records_alone() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        let cfg = cfg();
        let mut rec = upsert_row(&mut store, &cfg, &row("u1", "Jane Doe", "youth"))
            .unwrap()
            .unwrap();
        let now = Utc::now();
        rec.transition(Status::Reviewed, now, Some("rev"));
        rec.transition(Status::Accepted, now, Some("rev"));
        let decided = store.update(rec).unwrap();

        let mut changed = row("u1", "Janet Doe", "lifetime");
        changed["group_nominee/location_region"] = json!("Nairobi");
        changed["_attachments"] = json!([{
            "question_xpath": "attachments/Attach_Testimonial",
            "download_url": "https://kobo.example/att/1",
            "filename": "late.pdf"
        }]);
        let mut pages = HashMap::new();
        pages.insert(
            data_path("asset1", 2, Some(1)),
            json!({"next": null, "results": [changed]}),
        );
        let mut files = HashMap::new();
        files.insert("https://kobo.example/att/1".to_string(), b"late".to_vec());
        let api = FakeKobo { pages, files };
        let mut o = opts(tmp.path());
        o.with_attachments = true;

        let report = pull_batch(&api, &mut store, &cfg, &o).unwrap();
        assert_eq!(report.imported, 1);

        let after = store.get(&decided.id).unwrap();
        assert_eq!(after, decided);
        assert_eq!(after.status, Status::Accepted);
        assert_eq!(after.nominee, "Jane Doe");
        assert_eq!(after.details.region.as_deref(), Some("Coast"));
        assert!(after.attachments.is_empty());
        assert!(!tmp.path().join(&decided.id).exists());
    }

    #[test]
    fn batch_with_missing_keys_and_attachments() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sparse = json!({
            "_uuid": "u7",
            "group_nominee/nominee_full_name": "Kim",
            "_attachments": [
                {
                    "question_xpath": "attachments/Attach_Press_cuttings",
                    "download_url": "https://kobo.example/att/press",
                    "filename": "scan.jpg"
                },
                {
                    "question_xpath": "attachments/Attach_Testimonial",
                    "download_url": "https://kobo.example/att/gone",
                    "filename": "missing.pdf"
                }
            ]
        });
        let mut pages = HashMap::new();
        pages.insert(
            data_path("asset1", 2, Some(1)),
            json!({"next": null, "results": [sparse, row("u8", "Lee", "youth")]}),
        );
        let mut files = HashMap::new();
        files.insert("https://kobo.example/att/press".to_string(), b"jpeg".to_vec());
        let api = FakeKobo { pages, files };
        let mut o = opts(tmp.path());
        o.with_attachments = true;
        assert!(o.log_missing);

        let mut store = MemoryStore::new();
        let report = pull_batch(&api, &mut store, &cfg(), &o).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.next_page, None);

        let rec = store.find_by_kobo_uid("u7").unwrap().unwrap();
        assert_eq!(rec.status, Status::Draft);
        assert_eq!(rec.attachments.len(), 1);
        let att = &rec.attachments[0];
        assert_eq!(att.field, AttachField::PressCuttings);
        assert_eq!(std::fs::read(&att.path).unwrap(), b"jpeg");
        assert!(store
            .find_by_kobo_uid("u8")
            .unwrap()
            .unwrap()
            .attachments
            .is_empty());
    }

    #[test]
    fn same_filename_in_two_fields_keeps_both_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut with_files = row("u3", "Max", "youth");
        with_files["_attachments"] = json!([
            {
                "question_xpath": "attachments/Attach_Testimonial",
                "download_url": "https://kobo.example/att/a",
                "filename": "doc.pdf"
            },
            {
                "question_xpath": "attachments/Attach_Press_cuttings",
                "download_url": "https://kobo.example/att/b",
                "filename": "doc.pdf"
            }
        ]);
        let mut pages = HashMap::new();
        pages.insert(
            data_path("asset1", 2, Some(1)),
            json!({"next": null, "results": [with_files]}),
        );
        let mut files = HashMap::new();
        files.insert("https://kobo.example/att/a".to_string(), b"first".to_vec());
        files.insert("https://kobo.example/att/b".to_string(), b"second".to_vec());
        let api = FakeKobo { pages, files };
        let mut o = opts(tmp.path());
        o.with_attachments = true;

        let mut store = MemoryStore::new();
        pull_batch(&api, &mut store, &cfg(), &o).unwrap();
        let rec = store.find_by_kobo_uid("u3").unwrap().unwrap();
        assert_eq!(rec.attachments.len(), 2);
        assert_ne!(rec.attachments[0].path, rec.attachments[1].path);
        for att in &rec.attachments {
            assert_eq!(att.filename, "doc.pdf");
            let bytes = std::fs::read(&att.path).unwrap();
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            assert_eq!(att.sha256, hex::encode(hasher.finalize()));
        }
    }
}
