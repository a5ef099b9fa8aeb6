use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Lifecycle position of a nomination. Declaration order is the only
/// permitted direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Submitted,
    Reviewed,
    Accepted,
    Rejected,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Submitted => "submitted",
            Status::Reviewed => "reviewed",
            Status::Accepted => "accepted",
            Status::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl From<Decision> for Status {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Accepted => Status::Accepted,
            Decision::Rejected => Status::Rejected,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Transition {
    pub from: Status,
    pub to: Status,
    pub at: DateTime<Utc>,
    pub actor: Option<String>,
}

/// Nominee profile fields carried by the nomination form.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct NomineeDetails {
    pub award_category: Option<String>,
    pub category_of_youth: Option<String>,
    pub youth_in_school: Option<String>,
    pub full_name: Option<String>,
    pub region: Option<String>,
    pub county: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub volunteering_period: Option<String>,
    pub date_of_birth: Option<String>,
    pub volunteering_experience: Option<String>,
    pub achievements: Option<String>,
    pub reason_to_win: Option<String>,
    pub acknowledgement_agree: Option<String>,
    pub acknowledge_name: Option<String>,
    pub acknowledge_sign: Option<String>,
    pub acknowledge_date: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailField {
    AwardCategory,
    CategoryOfYouth,
    YouthInSchool,
    FullName,
    Region,
    County,
    Phone,
    Email,
    VolunteeringPeriod,
    DateOfBirth,
    VolunteeringExperience,
    Achievements,
    ReasonToWin,
    AcknowledgementAgree,
    AcknowledgeName,
    AcknowledgeSign,
    AcknowledgeDate,
}

impl DetailField {
    pub fn name(self) -> &'static str {
        match self {
            DetailField::AwardCategory => "award_category",
            DetailField::CategoryOfYouth => "category_of_youth",
            DetailField::YouthInSchool => "youth_in_school",
            DetailField::FullName => "full_name",
            DetailField::Region => "region",
            DetailField::County => "county",
            DetailField::Phone => "phone",
            DetailField::Email => "email",
            DetailField::VolunteeringPeriod => "volunteering_period",
            DetailField::DateOfBirth => "date_of_birth",
            DetailField::VolunteeringExperience => "volunteering_experience",
            DetailField::Achievements => "achievements",
            DetailField::ReasonToWin => "reason_to_win",
            DetailField::AcknowledgementAgree => "acknowledgement_agree",
            DetailField::AcknowledgeName => "acknowledge_name",
            DetailField::AcknowledgeSign => "acknowledge_sign",
            DetailField::AcknowledgeDate => "acknowledge_date",
        }
    }

    /// Select fields only accept values from an allow-list and are cleared
    /// when the form omits them.
    pub fn is_select(self) -> bool {
        matches!(
            self,
            DetailField::AwardCategory
                | DetailField::CategoryOfYouth
                | DetailField::YouthInSchool
                | DetailField::AcknowledgementAgree
        )
    }
}

impl NomineeDetails {
    pub fn slot_mut(&mut self, field: DetailField) -> &mut Option<String> {
        match field {
            DetailField::AwardCategory => &mut self.award_category,
            DetailField::CategoryOfYouth => &mut self.category_of_youth,
            DetailField::YouthInSchool => &mut self.youth_in_school,
            DetailField::FullName => &mut self.full_name,
            DetailField::Region => &mut self.region,
            DetailField::County => &mut self.county,
            DetailField::Phone => &mut self.phone,
            DetailField::Email => &mut self.email,
            DetailField::VolunteeringPeriod => &mut self.volunteering_period,
            DetailField::DateOfBirth => &mut self.date_of_birth,
            DetailField::VolunteeringExperience => &mut self.volunteering_experience,
            DetailField::Achievements => &mut self.achievements,
            DetailField::ReasonToWin => &mut self.reason_to_win,
            DetailField::AcknowledgementAgree => &mut self.acknowledgement_agree,
            DetailField::AcknowledgeName => &mut self.acknowledge_name,
            DetailField::AcknowledgeSign => &mut self.acknowledge_sign,
            DetailField::AcknowledgeDate => &mut self.acknowledge_date,
        }
    }

    /// Best available rationale: the "why should this nomination win" answer,
    /// then experience, then achievements.
    pub fn justification(&self) -> Option<String> {
        [
            &self.reason_to_win,
            &self.volunteering_experience,
            &self.achievements,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachField {
    CoverLetter,
    Videos,
    PressCuttings,
    Testimonial,
    SupportingDocuments,
    AcknowledgeSign,
    ApplicationForm,
}

impl AttachField {
    pub fn name(self) -> &'static str {
        match self {
            AttachField::CoverLetter => "cover_letter",
            AttachField::Videos => "videos",
            AttachField::PressCuttings => "press_cuttings",
            AttachField::Testimonial => "testimonial",
            AttachField::SupportingDocuments => "supporting_documents",
            AttachField::AcknowledgeSign => "acknowledge_sign",
            AttachField::ApplicationForm => "application_form",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Attachment {
    pub field: AttachField,
    pub filename: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct KoboSource {
    pub kobo_uid: String,
    pub form_id: Option<String>,
    pub submission_time: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NominationRecord {
    pub id: String,
    pub nominator: String,
    pub nominee: String,
    pub award_cycle: String,
    pub justification: String,
    pub status: Status,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Bumped by the store on every accepted update.
    pub version: u64,
    #[serde(default)]
    pub reviewer: Option<String>,
    #[serde(default)]
    pub votes: u32,
    #[serde(default)]
    pub history: Vec<Transition>,
    #[serde(default)]
    pub details: NomineeDetails,
    #[serde(default)]
    pub source: Option<KoboSource>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NominationRecord {
    pub fn transition(&mut self, to: Status, at: DateTime<Utc>, actor: Option<&str>) {
        self.history.push(Transition {
            from: self.status,
            to,
            at,
            actor: actor.map(str::to_string),
        });
        self.status = to;
    }
}

/// Everything the store needs to mint a record; it assigns `id`,
/// `created_at` and `version` itself.
#[derive(Debug, Clone, Default)]
pub struct NewNomination {
    pub nominator: String,
    pub nominee: String,
    pub award_cycle: String,
    pub justification: String,
    pub details: NomineeDetails,
    pub source: Option<KoboSource>,
}

#[derive(Debug, Clone, Default)]
pub struct DraftPatch {
    pub nominee: Option<String>,
    pub award_cycle: Option<String>,
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub award_cycle: Option<String>,
    pub status: Option<Status>,
}

impl ListFilter {
    pub fn matches(&self, r: &NominationRecord) -> bool {
        self.award_cycle
            .as_deref()
            .map(|c| c == r.award_cycle)
            .unwrap_or(true)
            && self.status.map(|s| s == r.status).unwrap_or(true)
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Ledger {
    pub version: u32,
    pub records: Vec<NominationRecord>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub review: ReviewRules,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub kobo: KoboSection,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ReviewRules {
    #[serde(default)]
    pub allow_self_nomination: bool,
    #[serde(default)]
    pub single_step: bool,
    /// Empty means any reviewer is accepted.
    #[serde(default)]
    pub reviewers: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct StoreSection {
    pub path: Option<String>,
}

fn default_kobo_base() -> String {
    crate::domain::constants::KOBO_BASE.to_string()
}

fn default_asset_uid() -> String {
    crate::domain::constants::ASSET_UID.to_string()
}

fn default_award_cycle() -> String {
    crate::domain::constants::DEFAULT_AWARD_CYCLE.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KoboSection {
    #[serde(default = "default_kobo_base")]
    pub base_url: String,
    #[serde(default = "default_asset_uid")]
    pub asset_uid: String,
    #[serde(default = "default_award_cycle")]
    pub award_cycle: String,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Allow-lists keyed by select field name. Missing or empty list means
    /// any value is accepted.
    #[serde(default)]
    pub select_options: BTreeMap<String, Vec<String>>,
}

impl Default for KoboSection {
    fn default() -> Self {
        Self {
            base_url: default_kobo_base(),
            asset_uid: default_asset_uid(),
            award_cycle: default_award_cycle(),
            token: None,
            timeout_secs: default_timeout_secs(),
            select_options: BTreeMap::new(),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct PullReport {
    pub ok: bool,
    pub imported: usize,
    pub start_page: u32,
    pub next_page: Option<u32>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct PullAllReport {
    pub ok: bool,
    pub imported: usize,
}
