use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::campaign::Campaign;
use crate::candidate::Candidate;
use crate::recipient::Recipient;

/// Flat placeholder-name to value mapping fed to [`render`].
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new() -> RenderContext {
        RenderContext::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Substitutes `{{name}}` tokens whose name is a context key, verbatim and
/// unescaped. Unknown tokens are left untouched so a partially-filled
/// pattern survives a second pass unchanged; an unterminated `{{` is plain
/// text. Pure: same inputs, same output.
pub fn render(pattern: &str, context: &RenderContext) -> String {
    let mut output = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match context.get(name) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push_str("{{");
                        output.push_str(name);
                        output.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                output.push_str(&rest[start..]);
                return output;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Builds the substitution context for one campaign/candidate pairing,
/// optionally specialized for a single recipient. The camelCase names are
/// canonical; the dotted names and `position` are compatibility aliases fed
/// the same values. Derived fields are computed here, not stored: the age
/// comes from the birth date against `today`, and the job title is the
/// first line of the job description.
pub fn campaign_context(
    campaign: &Campaign,
    candidate: &Candidate,
    recipient: Option<&Recipient>,
    today: NaiveDate,
) -> RenderContext {
    let mut context = RenderContext::new();

    context.set("candidateName", candidate.name.clone());
    context.set("candidate.name", candidate.name.clone());
    context.set("candidateEmail", candidate.email.clone());
    context.set("candidate.email", candidate.email.clone());
    if let Some(birth_date) = candidate.birth_date {
        context.set("candidateAge", age_on(birth_date, today).to_string());
    }
    if let Some(language_level) = &candidate.language_level {
        context.set("languageLevel", language_level.clone());
    }
    if let Some(location) = &candidate.location {
        context.set("candidateLocation", location.clone());
    }
    if let Some(education_level) = &candidate.education_level {
        context.set("educationLevel", education_level.clone());
    }

    if let Some(job_description) = &campaign.job_description {
        let job_title = job_description.lines().next().unwrap_or("");
        context.set("jobTitle", job_title);
        context.set("job.title", job_title);
        context.set("position", job_title);
        context.set("jobDescription", job_description.clone());
        context.set("job.description", job_description.clone());
    }
    if let Some(company) = &campaign.company {
        context.set("company", company.clone());
    }

    if let Some(display_name) = recipient.and_then(|r| r.display_name.as_deref()) {
        if !display_name.is_empty() {
            context.set("recipientName", display_name);
        }
    }

    context
}

/// Whole years between `birth_date` and `today`, corrected for whether the
/// birthday has passed this year.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}
