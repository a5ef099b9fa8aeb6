use crate::domain::models::{AttachField, DetailField};

pub const KOBO_BASE: &str = "https://kobo.ifrc.org";
pub const ASSET_UID: &str = "ajZ5x7BwK7ouPLrJJRh7Ar";
pub const DEFAULT_AWARD_CYCLE: &str = "VA2025";

pub const KOBO_TOKEN_ENV: &str = "KOBO_KPI_TOKEN";
pub const LOG_JSON_ENV: &str = "VAWARDS_LOG_JSON";

/// KoBo submission key -> nominee detail field. Keys are the exact
/// `group/question` paths of the nomination form.
pub const FIELD_MAP: &[(&str, DetailField)] = &[
    ("nomination_category/category", DetailField::AwardCategory),
    ("nomination_category/category_of_youth", DetailField::CategoryOfYouth),
    ("nomination_category/youth_in_school", DetailField::YouthInSchool),
    ("group_nominee/nominee_full_name", DetailField::FullName),
    ("group_nominee/location_region", DetailField::Region),
    ("group_nominee/location_county", DetailField::County),
    ("group_nominee/nominee_phone_number", DetailField::Phone),
    ("group_nominee/nominee_email_address", DetailField::Email),
    ("group_nominee/duration", DetailField::VolunteeringPeriod),
    ("group_nominee/dob", DetailField::DateOfBirth),
    (
        "description/_1_In_not_more_than_his_her_work_involve",
        DetailField::VolunteeringExperience,
    ),
    (
        "description/_2_In_not_more_than_y_or_KRCS_as_a_whole",
        DetailField::Achievements,
    ),
    (
        "description/_3_In_not_more_than_omination_should_win",
        DetailField::ReasonToWin,
    ),
    (
        "declaration_acknowledgement/acknowledgement_agree",
        DetailField::AcknowledgementAgree,
    ),
    (
        "declaration_acknowledgement/nominee_acknowledge_name",
        DetailField::AcknowledgeName,
    ),
    (
        "declaration_acknowledgement/nominee_acknowledge_sign",
        DetailField::AcknowledgeSign,
    ),
    (
        "declaration_acknowledgement/nominee_acknowledge_date",
        DetailField::AcknowledgeDate,
    ),
];

/// Last segment of an attachment's `question_xpath` -> attachment slot.
/// `Attache_Application_form` is spelled that way on the form.
pub const ATTACH_MAP: &[(&str, AttachField)] = &[
    (
        "Attach_Cover_letter_ecommendation_letter",
        AttachField::CoverLetter,
    ),
    ("Attach_Videos_Maximum_of_1_minute", AttachField::Videos),
    ("Attach_Press_cuttings", AttachField::PressCuttings),
    ("Attach_Testimonial", AttachField::Testimonial),
    (
        "Attach_any_other_supporting_document",
        AttachField::SupportingDocuments,
    ),
    ("nominee_acknowledge_sign", AttachField::AcknowledgeSign),
    ("Attache_Application_form", AttachField::ApplicationForm),
];

pub fn attach_field_for(question: &str) -> Option<AttachField> {
    ATTACH_MAP
        .iter()
        .find(|(q, _)| *q == question)
        .map(|(_, f)| *f)
}
