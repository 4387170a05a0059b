//! Shared sample entities for manager tests.

use chrono::{NaiveDate, Utc};

use crate::campaign::{Campaign, CampaignId, CampaignStatus};
use crate::candidate::{Candidate, CandidateId};
use crate::email_list::{EmailList, EmailListId};
use crate::recipient::Recipient;
use crate::template::{EmailTemplate, TemplateId};

pub fn sample_candidate() -> Candidate {
    let now = Utc::now();
    Candidate {
        id: CandidateId::new(),
        name: "Amara Diallo".to_string(),
        email: "amara@example.com".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1995, 3, 1),
        language_level: Some("C1".to_string()),
        location: Some("Lyon, France".to_string()),
        education_level: Some("Master".to_string()),
        created_at: now,
        modified_at: now,
    }
}

pub fn sample_template() -> EmailTemplate {
    let now = Utc::now();
    EmailTemplate {
        id: TemplateId::new(),
        name: "Standard application".to_string(),
        subject: "Application from {{candidateName}} for {{jobTitle}}".to_string(),
        content: "Dear {{recipientName}},\n\n\
                  I am writing on behalf of {{candidateName}} ({{candidateAge}}) \
                  regarding the {{jobTitle}} position.\n\n\
                  Best regards"
            .to_string(),
        created_at: now,
        modified_at: now,
    }
}

pub fn sample_email_list(addresses: &[&str]) -> EmailList {
    let now = Utc::now();
    EmailList {
        id: EmailListId::new(),
        name: "Tech companies".to_string(),
        emails: addresses.iter().map(|a| a.to_string()).collect(),
        created_at: now,
        modified_at: now,
    }
}

pub fn sample_campaign(
    candidate: &Candidate,
    template: &EmailTemplate,
    email_list_id: EmailListId,
) -> Campaign {
    let now = Utc::now();
    Campaign {
        id: CampaignId::new(),
        name: "Q2 outreach".to_string(),
        candidate_id: candidate.id,
        template_id: template.id,
        email_list_id,
        job_description: Some("Backend Engineer\nRust and MongoDB".to_string()),
        company: None,
        status: CampaignStatus::Draft,
        created_at: now,
        modified_at: now,
    }
}

pub fn sample_recipient(campaign: &Campaign, address: &str) -> Recipient {
    Recipient::new(campaign.id, address.to_string(), Utc::now())
}
