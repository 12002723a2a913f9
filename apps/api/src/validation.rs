//! Form validation: runs on every create/update payload before the backend
//! is called. A payload with any failing field is rejected whole, and all
//! field errors are reported at once so each can be shown next to its input.
//!
//! Create payloads must carry every required field. Update payloads are
//! partial: only the fields present are checked.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::models::{
    ClientInteraction, Comment, Company, Contact, Deal, EmailSequence, Integration, Job,
    Preferences, Task,
};
use crate::pipeline::stages::{Registries, StageRegistry};
use crate::resources::Patch;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]{7,20}$").expect("valid phone regex"));

/// Field name -> message, ordered by field name.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Records an error; the first error reported for a field wins.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "{} invalid field(s): {}", fields.len(), fields.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    Create,
    Update,
}

/// Accumulates field errors for one payload.
pub struct FormCheck<'a> {
    patch: &'a Patch,
    kind: PatchKind,
    errors: FieldErrors,
}

impl<'a> FormCheck<'a> {
    pub fn new(patch: &'a Patch, kind: PatchKind) -> Self {
        Self {
            patch,
            kind,
            errors: FieldErrors::default(),
        }
    }

    fn value(&self, field: &str) -> Option<&'a Value> {
        let patch: &'a Patch = self.patch;
        patch.get(field).filter(|v| !v.is_null())
    }

    fn text(&mut self, field: &str) -> Option<&'a str> {
        match self.value(field)? {
            Value::String(s) => Some(s.trim()),
            _ => {
                self.errors.insert(field, "Must be text");
                None
            }
        }
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        match self.value(field)? {
            Value::Number(n) => n.as_f64(),
            _ => {
                self.errors.insert(field, "Must be a number");
                None
            }
        }
    }

    fn checks_absent(&self, field: &str) -> bool {
        self.kind == PatchKind::Create || self.patch.contains_key(field)
    }

    pub fn required(&mut self, field: &str, label: &str) -> &mut Self {
        let filled = self.text(field).is_some_and(|s| !s.is_empty());
        if !filled && self.checks_absent(field) {
            self.errors.insert(field, format!("{label} is required"));
        }
        self
    }

    /// At least one of `fields` must be filled on create; the error is
    /// reported on the first field.
    pub fn required_any(&mut self, fields: &[&str], message: &str) -> &mut Self {
        let filled = fields
            .iter()
            .any(|f| self.text(f).is_some_and(|s| !s.is_empty()));
        let touched = self.kind == PatchKind::Create
            || fields.iter().any(|f| self.patch.contains_key(*f));
        if !filled && touched {
            if let Some(first) = fields.first() {
                self.errors.insert(first, message);
            }
        }
        self
    }

    pub fn email(&mut self, field: &str) -> &mut Self {
        if let Some(email) = self.text(field).filter(|s| !s.is_empty()) {
            if !EMAIL_RE.is_match(email) {
                self.errors.insert(field, "Email address is not valid");
            }
        }
        self
    }

    pub fn phone(&mut self, field: &str) -> &mut Self {
        if let Some(phone) = self.text(field).filter(|s| !s.is_empty()) {
            if !PHONE_RE.is_match(phone) {
                self.errors.insert(field, "Phone number is not valid");
            }
        }
        self
    }

    pub fn url(&mut self, field: &str) -> &mut Self {
        if let Some(url) = self.text(field).filter(|s| !s.is_empty()) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                self.errors
                    .insert(field, "Must start with http:// or https://");
            }
        }
        self
    }

    pub fn at_least(&mut self, field: &str, min: f64, message: &str) -> &mut Self {
        if let Some(n) = self.number(field) {
            if n < min {
                self.errors.insert(field, message);
            }
        }
        self
    }

    /// Whole-number field stored as `u32`: rejects fractions, negatives
    /// and anything above `u32::MAX`.
    pub fn count(&mut self, field: &str, min: u32, message: &str) -> &mut Self {
        let Some(value) = self.value(field) else {
            return self;
        };
        match value.as_u64().map(u32::try_from) {
            Some(Ok(n)) if n >= min => {}
            Some(Ok(_)) => self.errors.insert(field, message),
            _ => self.errors.insert(field, "Must be a whole number"),
        }
        self
    }

    pub fn stage(&mut self, field: &str, registry: &StageRegistry) -> &mut Self {
        match self.text(field) {
            Some(id) if registry.contains(id) => {}
            Some(id) if !id.is_empty() => {
                self.errors.insert(field, format!("Unknown stage '{id}'"));
            }
            _ if self.checks_absent(field) => {
                self.errors.insert(field, "Stage is required");
            }
            _ => {}
        }
        self
    }

    pub fn sequence_steps(&mut self, field: &str) -> &mut Self {
        let steps = match self.value(field) {
            Some(Value::Array(steps)) => steps,
            Some(_) => {
                self.errors.insert(field, "Must be a list of steps");
                return self;
            }
            None => {
                if self.checks_absent(field) {
                    self.errors.insert(field, "At least one step is required");
                }
                return self;
            }
        };
        if steps.is_empty() {
            self.errors.insert(field, "At least one step is required");
        }
        for (i, step) in steps.iter().enumerate() {
            let subject = step.get("subject").and_then(Value::as_str).map(str::trim);
            if subject.map_or(true, str::is_empty) {
                self.errors
                    .insert(&format!("{field}[{i}].subject"), "Subject is required");
            }
            match step.get("delayDays").and_then(Value::as_u64).map(u32::try_from) {
                Some(Ok(_)) => {}
                _ => self.errors.insert(
                    &format!("{field}[{i}].delayDays"),
                    "Delay must be zero or more days",
                ),
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Per-entity form rules.
pub trait FormRules {
    fn rules(check: &mut FormCheck<'_>, registries: &Registries);
}

pub fn validate<T: FormRules>(
    patch: &Patch,
    kind: PatchKind,
    registries: &Registries,
) -> Result<(), FieldErrors> {
    let mut check = FormCheck::new(patch, kind);
    T::rules(&mut check, registries);
    check.finish()
}

impl FormRules for Contact {
    fn rules(check: &mut FormCheck<'_>, _: &Registries) {
        check
            .required_any(&["firstName", "name"], "First name or full name is required")
            .email("email")
            .phone("phone");
    }
}

impl FormRules for Company {
    fn rules(check: &mut FormCheck<'_>, _: &Registries) {
        check.required("name", "Company name").url("website");
    }
}

impl FormRules for Deal {
    fn rules(check: &mut FormCheck<'_>, registries: &Registries) {
        check
            .required("title", "Title")
            .stage("stageId", &registries.deals)
            .at_least("amount", 0.0, "Amount cannot be negative");
    }
}

impl FormRules for Job {
    fn rules(check: &mut FormCheck<'_>, registries: &Registries) {
        check
            .required("title", "Job title")
            .stage("stageId", &registries.jobs)
            .count("openings", 1, "At least one opening is required")
            .at_least("salaryMin", 0.0, "Salary cannot be negative")
            .at_least("salaryMax", 0.0, "Salary cannot be negative");
    }
}

impl FormRules for Task {
    fn rules(check: &mut FormCheck<'_>, _: &Registries) {
        check.required("title", "Task title");
    }
}

impl FormRules for Comment {
    fn rules(check: &mut FormCheck<'_>, _: &Registries) {
        check.required("body", "Comment");
    }
}

impl FormRules for ClientInteraction {
    fn rules(check: &mut FormCheck<'_>, _: &Registries) {
        check.required("kind", "Interaction type");
    }
}

impl FormRules for EmailSequence {
    fn rules(check: &mut FormCheck<'_>, _: &Registries) {
        check.required("name", "Sequence name").sequence_steps("steps");
    }
}

impl FormRules for Integration {
    fn rules(check: &mut FormCheck<'_>, _: &Registries) {
        check.required("provider", "Provider").required("kind", "Integration type");
    }
}

impl FormRules for Preferences {
    fn rules(_: &mut FormCheck<'_>, _: &Registries) {}
}
