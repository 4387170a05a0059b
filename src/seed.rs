use chrono::{NaiveDate, Utc};

use crate::campaign::{Campaign, CampaignStatus};
use crate::candidate::Candidate;
use crate::database::Database;
use crate::email_list::EmailList;
use crate::error::Error;
use crate::template::EmailTemplate;

/// Drops the database and loads a deterministic sample: one candidate, one
/// template, one email list, and a draft campaign tying them together.
pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    db.drop().await?;

    let campaign_id = "CPN-16E77539-8873-4C8A-BCA3-2036010474AD".parse().unwrap();
    let candidate_id = "CND-33957EB6-0EE7-487F-A087-E55C335BD63C".parse().unwrap();
    let template_id = "TPL-5EA81D0A-9788-4B8A-82D9-1A0D636B53CE".parse().unwrap();
    let email_list_id = "LST-DE3168FD-2730-47A2-BFE0-E53C79DD57A0".parse().unwrap();

    let now = Utc::now();

    let candidate = Candidate {
        id: candidate_id,
        name: "Amara Diallo".to_string(),
        email: "amara.diallo@example.com".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1995, 3, 1),
        language_level: Some("C1".to_string()),
        location: Some("Lyon, France".to_string()),
        education_level: Some("Master".to_string()),
        created_at: now,
        modified_at: now,
    };

    let template = EmailTemplate {
        id: template_id,
        name: "Standard application".to_string(),
        subject: "Application from {{candidateName}} for {{jobTitle}}".to_string(),
        content: "Dear {{recipientName}},\n\n\
                  I am writing on behalf of {{candidateName}}, {{candidateAge}} years old, \
                  based in {{candidateLocation}}, regarding the {{jobTitle}} position at \
                  {{company}}.\n\n\
                  {{jobDescription}}\n\n\
                  Best regards,\n\
                  {{candidateName}}"
            .to_string(),
        created_at: now,
        modified_at: now,
    };

    let email_list = EmailList {
        id: email_list_id,
        name: "Lyon tech recruiters".to_string(),
        emails: vec![
            "recruiting@acme.example.com".to_string(),
            "jobs@initech.example.com".to_string(),
            "talent@globex.example.com".to_string(),
        ],
        created_at: now,
        modified_at: now,
    };

    let campaign = Campaign {
        id: campaign_id,
        name: "Backend engineer outreach".to_string(),
        candidate_id,
        template_id,
        email_list_id,
        job_description: Some(
            "Backend Engineer\nDesign and operate Rust services backed by MongoDB.".to_string(),
        ),
        company: Some("Acme".to_string()),
        status: CampaignStatus::Draft,
        created_at: now,
        modified_at: now,
    };

    db.candidates().insert_candidate(&candidate).await?;
    db.templates().insert_template(&template).await?;
    db.email_lists().insert_email_list(&email_list).await?;
    db.campaigns().insert_campaign(&campaign).await?;

    Ok(())
}
