//! Template generation for new entity files

use chrono::{DateTime, Utc};
use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

use crate::core::identity::EntityId;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Errors from template rendering
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template '{0}' is not embedded")]
    Missing(String),

    #[error("template engine error: {0}")]
    Engine(String),
}

/// Context for template generation
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub id: EntityId,
    pub author: String,
    pub created: DateTime<Utc>,
    pub status: Option<String>,
    // PAT fields
    pub mrn: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    // STF fields
    pub name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    // CRED fields
    pub staff_id: Option<String>,
    pub kind: Option<String>,
    pub issuer: Option<String>,
    pub issued: Option<String>,
    pub expires: Option<String>,
    // CLM / INV fields
    pub patient_id: Option<String>,
    pub payer: Option<String>,
    pub policy_number: Option<String>,
    pub amount: Option<f64>,
    pub service_date: Option<String>,
    // NOTE fields
    pub note_type: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
}

impl TemplateContext {
    pub fn new(id: EntityId, author: String) -> Self {
        Self {
            id,
            author,
            created: Utc::now(),
            status: None,
            mrn: None,
            first_name: None,
            last_name: None,
            date_of_birth: None,
            name: None,
            role: None,
            department: None,
            email: None,
            phone: None,
            staff_id: None,
            kind: None,
            issuer: None,
            issued: None,
            expires: None,
            patient_id: None,
            payer: None,
            policy_number: None,
            amount: None,
            service_date: None,
            note_type: None,
            title: None,
            text: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_mrn(mut self, mrn: impl Into<String>) -> Self {
        self.mrn = Some(mrn.into());
        self
    }

    pub fn with_person(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: impl Into<String>,
    ) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self.date_of_birth = Some(date_of_birth.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_staff_id(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_validity(
        mut self,
        issued: impl Into<String>,
        expires: impl Into<String>,
    ) -> Self {
        self.issued = Some(issued.into());
        self.expires = Some(expires.into());
        self
    }

    pub fn with_patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    pub fn with_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = Some(payer.into());
        self
    }

    pub fn with_policy_number(mut self, policy_number: impl Into<String>) -> Self {
        self.policy_number = Some(policy_number.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_service_date(mut self, service_date: impl Into<String>) -> Self {
        self.service_date = Some(service_date.into());
        self
    }

    pub fn with_note_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = Some(note_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn to_tera(&self) -> tera::Context {
        let mut ctx = tera::Context::new();
        ctx.insert("id", &self.id.to_string());
        ctx.insert("author", &self.author);
        ctx.insert(
            "created",
            &self.created.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        );
        ctx.insert("status", self.status.as_deref().unwrap_or(""));
        ctx.insert("mrn", self.mrn.as_deref().unwrap_or(""));
        ctx.insert("first_name", self.first_name.as_deref().unwrap_or(""));
        ctx.insert("last_name", self.last_name.as_deref().unwrap_or(""));
        ctx.insert("date_of_birth", self.date_of_birth.as_deref().unwrap_or(""));
        ctx.insert("name", self.name.as_deref().unwrap_or(""));
        ctx.insert("role", self.role.as_deref().unwrap_or(""));
        ctx.insert("department", self.department.as_deref().unwrap_or(""));
        ctx.insert("email", self.email.as_deref().unwrap_or(""));
        ctx.insert("phone", self.phone.as_deref().unwrap_or(""));
        ctx.insert("staff_id", self.staff_id.as_deref().unwrap_or(""));
        ctx.insert("kind", self.kind.as_deref().unwrap_or(""));
        ctx.insert("issuer", self.issuer.as_deref().unwrap_or(""));
        ctx.insert("issued", self.issued.as_deref().unwrap_or(""));
        ctx.insert("expires", self.expires.as_deref().unwrap_or(""));
        ctx.insert("patient_id", self.patient_id.as_deref().unwrap_or(""));
        ctx.insert("payer", self.payer.as_deref().unwrap_or(""));
        ctx.insert("policy_number", self.policy_number.as_deref().unwrap_or(""));
        ctx.insert("amount", &format!("{:.2}", self.amount.unwrap_or(0.0)));
        ctx.insert("service_date", self.service_date.as_deref().unwrap_or(""));
        ctx.insert("note_type", self.note_type.as_deref().unwrap_or(""));
        ctx.insert("title", self.title.as_deref().unwrap_or(""));
        ctx.insert("text", self.text.as_deref().unwrap_or(""));
        ctx
    }
}

/// Renders commented YAML scaffolds for new entity files
pub struct TemplateGenerator {
    tera: Tera,
}

impl TemplateGenerator {
    /// Load all embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        for name in EmbeddedTemplates::iter() {
            let file = EmbeddedTemplates::get(&name)
                .ok_or_else(|| TemplateError::Missing(name.to_string()))?;
            let content = std::str::from_utf8(&file.data)
                .map_err(|e| TemplateError::Engine(e.to_string()))?;
            tera.add_raw_template(&name, content)
                .map_err(|e| TemplateError::Engine(e.to_string()))?;
        }
        Ok(Self { tera })
    }

    fn render(&self, template: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.tera
            .render(template, &ctx.to_tera())
            .map_err(|e| TemplateError::Engine(e.to_string()))
    }

    pub fn generate_patient(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.render("pat.yaml.tera", ctx)
    }

    pub fn generate_staff(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.render("stf.yaml.tera", ctx)
    }

    pub fn generate_credential(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.render("cred.yaml.tera", ctx)
    }

    pub fn generate_claim(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.render("clm.yaml.tera", ctx)
    }

    pub fn generate_invoice(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.render("inv.yaml.tera", ctx)
    }

    pub fn generate_note(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.render("note.yaml.tera", ctx)
    }
}
