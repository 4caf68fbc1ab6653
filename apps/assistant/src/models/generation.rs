//! Generation request payloads, one per assistant form.
//!
//! Every payload is a flat JSON object. Optional resume uploads travel inline
//! as base64 (`resume_pdf`) next to their original filename (`resume_filename`).

use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ValidationError;

/// Longest message the rewriter accepts, in characters.
pub const MAX_REWRITE_MESSAGE_CHARS: usize = 500;
pub const MIN_PREP_MONTHS: u32 = 1;
pub const MAX_PREP_MONTHS: u32 = 24;
pub const MIN_FORMALITY: u8 = 1;
pub const MAX_FORMALITY: u8 = 5;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

// ────────────────────────────────────────────────────────────────────────────
// Endpoints and models
// ────────────────────────────────────────────────────────────────────────────

/// Streaming endpoints exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Consultation,
    RoadmapConsultation,
    CompanyResearch,
    RewriteMessage,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Consultation => "/api/consultation",
            Endpoint::RoadmapConsultation => "/api/roadmap_consultation",
            Endpoint::CompanyResearch => "/api/company-research",
            Endpoint::RewriteMessage => "/api/rewrite-message",
        }
    }
}

/// Completion model the backend should route the request to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "grok-beta")]
    GrokBeta,
    #[serde(rename = "llama-70b")]
    Llama70b,
}

// ────────────────────────────────────────────────────────────────────────────
// Attachments
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfAttachment {
    #[serde(rename = "resume_pdf")]
    pub content_base64: String,
    #[serde(rename = "resume_filename")]
    pub filename: String,
}

impl PdfAttachment {
    /// Encodes an uploaded file. Only PDFs are accepted.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Result<Self, ValidationError> {
        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(ValidationError::NotPdf);
        }
        Ok(Self {
            content_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            filename: filename.into(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Payloads
// ────────────────────────────────────────────────────────────────────────────

/// A form submission that can be sent to a streaming endpoint.
pub trait GenerationPayload: Serialize {
    fn endpoint(&self) -> Endpoint;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumePayload {
    pub applicant_name: String,
    pub application_date: NaiveDate,
    pub role_applied_for: String,
    pub phone_number: String,
    pub additional_notes: String,
    pub model: Model,
    #[serde(flatten)]
    pub attachment: Option<PdfAttachment>,
}

impl GenerationPayload for ResumePayload {
    fn endpoint(&self) -> Endpoint {
        Endpoint::Consultation
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("applicant_name", &self.applicant_name)?;
        require("role_applied_for", &self.role_applied_for)?;
        require("phone_number", &self.phone_number)
    }
}

/// The minimal consultation shape the backend accepts on `/api/consultation`.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationPayload {
    pub applicant_name: String,
    pub application_date: NaiveDate,
    pub role_applied_for: String,
    pub additional_notes: String,
}

impl GenerationPayload for ConsultationPayload {
    fn endpoint(&self) -> Endpoint {
        Endpoint::Consultation
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("applicant_name", &self.applicant_name)?;
        require("role_applied_for", &self.role_applied_for)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapPayload {
    pub current_job_title: String,
    pub role_applied_for: String,
    pub time_to_prep_in_months: u32,
    pub additional_notes: String,
    pub model: Model,
    #[serde(flatten)]
    pub attachment: Option<PdfAttachment>,
}

impl GenerationPayload for RoadmapPayload {
    fn endpoint(&self) -> Endpoint {
        Endpoint::RoadmapConsultation
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("current_job_title", &self.current_job_title)?;
        require("role_applied_for", &self.role_applied_for)?;
        if !(MIN_PREP_MONTHS..=MAX_PREP_MONTHS).contains(&self.time_to_prep_in_months) {
            return Err(ValidationError::OutOfRange {
                field: "time_to_prep_in_months",
                min: MIN_PREP_MONTHS,
                max: MAX_PREP_MONTHS,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyResearchPayload {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_focus: Option<String>,
    pub model: Model,
}

impl CompanyResearchPayload {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            target_role: None,
            research_focus: None,
            model: Model::default(),
        }
    }

    /// Blank input leaves the field out of the request.
    pub fn with_target_role(mut self, role: &str) -> Self {
        self.target_role = non_blank(role);
        self
    }

    pub fn with_research_focus(mut self, focus: &str) -> Self {
        self.research_focus = non_blank(focus);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }
}

impl GenerationPayload for CompanyResearchPayload {
    fn endpoint(&self) -> Endpoint {
        Endpoint::CompanyResearch
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("company_name", &self.company_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Referral,
    ColdOutreach,
    FollowUp,
    ThankYou,
    Networking,
    Negotiation,
    OfferAcceptance,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    Recruiter,
    HiringManager,
    Employee,
    Peer,
}

/// Rewrites an outreach message into three variations, streamed as one text
/// separated by [`VARIATION_SEPARATOR`](crate::stream::VARIATION_SEPARATOR).
#[derive(Debug, Clone, Serialize)]
pub struct MessageRewritePayload {
    pub original_message: String,
    pub message_type: MessageType,
    pub formality_level: u8,
    pub recipient_type: RecipientType,
    pub additional_context: String,
    pub model: Model,
}

impl GenerationPayload for MessageRewritePayload {
    fn endpoint(&self) -> Endpoint {
        Endpoint::RewriteMessage
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("original_message", &self.original_message)?;
        if self.original_message.chars().count() > MAX_REWRITE_MESSAGE_CHARS {
            return Err(ValidationError::TooLong {
                field: "original_message",
                max: MAX_REWRITE_MESSAGE_CHARS,
            });
        }
        if !(MIN_FORMALITY..=MAX_FORMALITY).contains(&self.formality_level) {
            return Err(ValidationError::OutOfRange {
                field: "formality_level",
                min: MIN_FORMALITY as u32,
                max: MAX_FORMALITY as u32,
            });
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GenerationRequest
// ────────────────────────────────────────────────────────────────────────────

/// One user-initiated generation: a serialized payload bound for an endpoint.
/// Survives reconnects; every connection attempt for it sends the same body.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    id: Uuid,
    endpoint: Endpoint,
    body: Value,
}

impl GenerationRequest {
    /// Validates and serializes a form payload.
    pub fn new<P: GenerationPayload>(payload: &P) -> Result<Self, ValidationError> {
        payload.validate()?;
        let body = serde_json::to_value(payload)
            .map_err(|e| ValidationError::Unserializable(e.to_string()))?;
        Ok(Self::raw(payload.endpoint(), body))
    }

    /// Wraps an already-built JSON body without validation.
    pub fn raw(endpoint: Endpoint, body: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint,
            body,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| value.to_string())
}
