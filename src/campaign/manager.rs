use chrono::Utc;

use crate::candidate::CandidateId;
use crate::database::Database;
use crate::email_list::EmailListId;
use crate::error::Error;
use crate::template::render::{campaign_context, render};
use crate::template::TemplateId;

use super::{Campaign, CampaignId, CampaignStatus};

#[derive(Clone, Debug)]
pub struct CreateCampaign {
    pub name: String,
    pub candidate_id: CandidateId,
    pub template_id: TemplateId,
    pub email_list_id: EmailListId,
    pub job_description: Option<String>,
    pub company: Option<String>,
}

#[tracing::instrument(skip(db))]
pub async fn create_campaign(db: &dyn Database, create: CreateCampaign) -> Result<Campaign, Error> {
    db.candidates()
        .fetch_candidate_by_id(create.candidate_id)
        .await?
        .ok_or(Error::CandidateDoesNotExist {
            candidate_id: create.candidate_id,
        })?;
    db.templates()
        .fetch_template_by_id(create.template_id)
        .await?
        .ok_or(Error::TemplateDoesNotExist {
            template_id: create.template_id,
        })?;
    db.email_lists()
        .fetch_email_list_by_id(create.email_list_id)
        .await?
        .ok_or(Error::EmailListDoesNotExist {
            email_list_id: create.email_list_id,
        })?;

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        name: create.name,
        candidate_id: create.candidate_id,
        template_id: create.template_id,
        email_list_id: create.email_list_id,
        job_description: create.job_description,
        company: create.company,
        status: CampaignStatus::Draft,
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    Ok(campaign)
}

/// Removes the campaign and its recipient records. The records go first so
/// an interrupted delete never orphans them behind a missing campaign.
#[tracing::instrument(skip(db))]
pub async fn delete_campaign(db: &dyn Database, campaign_id: CampaignId) -> Result<(), Error> {
    get_campaign_by_id(db, campaign_id).await?;

    db.recipients()
        .delete_recipients_by_campaign(campaign_id)
        .await?;
    db.campaigns().delete_campaign(campaign_id).await?;

    Ok(())
}

#[derive(Clone, Debug)]
pub struct CampaignPreview {
    pub subject: String,
    pub body: String,
}

/// Renders the campaign's template against its candidate without touching
/// any recipient record, for the operator-facing preview.
#[tracing::instrument(skip(db))]
pub async fn preview_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<CampaignPreview, Error> {
    let campaign = get_campaign_by_id(db, campaign_id).await?;
    let candidate = db
        .candidates()
        .fetch_candidate_by_id(campaign.candidate_id)
        .await?
        .ok_or(Error::CandidateDoesNotExist {
            candidate_id: campaign.candidate_id,
        })?;
    let template = db
        .templates()
        .fetch_template_by_id(campaign.template_id)
        .await?
        .ok_or(Error::TemplateDoesNotExist {
            template_id: campaign.template_id,
        })?;

    let context = campaign_context(&campaign, &candidate, None, Utc::now().date_naive());

    Ok(CampaignPreview {
        subject: render(&template.subject, &context),
        body: render(&template.content, &context),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::database::test::MockDatabase;
    use crate::testutil::{sample_candidate, sample_email_list, sample_template};

    use super::*;

    #[tokio::test]
    async fn create_campaign_starts_in_draft() {
        let candidate = sample_candidate();
        let template = sample_template();
        let email_list = sample_email_list(&["a@example.com"]);

        let mut db = MockDatabase::new();
        let candidate_clone = candidate.clone();
        db.candidates.on_fetch_candidate_by_id =
            Box::new(move |_| Ok(Some(candidate_clone.clone())));
        let template_clone = template.clone();
        db.templates.on_fetch_template_by_id = Box::new(move |_| Ok(Some(template_clone.clone())));
        let email_list_clone = email_list.clone();
        db.email_lists.on_fetch_email_list_by_id =
            Box::new(move |_| Ok(Some(email_list_clone.clone())));

        let inserted = Arc::new(Mutex::new(false));
        let inserted_clone = Arc::clone(&inserted);
        db.campaigns.on_insert_campaign = Box::new(move |campaign| {
            *inserted_clone.lock().unwrap() = true;
            assert_eq!(campaign.status, CampaignStatus::Draft);
            assert_eq!(campaign.created_at, campaign.modified_at);
            Ok(())
        });

        let campaign = create_campaign(
            &db,
            CreateCampaign {
                name: "Q2 outreach".to_string(),
                candidate_id: candidate.id,
                template_id: template.id,
                email_list_id: email_list.id,
                job_description: None,
                company: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(campaign.name, "Q2 outreach".to_string());
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert!(*inserted.lock().unwrap(), "db.insert_campaign was not called");
    }

    #[tokio::test]
    async fn create_campaign_rejects_missing_template() {
        let candidate = sample_candidate();
        let template_id = TemplateId::new();

        let mut db = MockDatabase::new();
        let candidate_clone = candidate.clone();
        db.candidates.on_fetch_candidate_by_id =
            Box::new(move |_| Ok(Some(candidate_clone.clone())));
        db.templates.on_fetch_template_by_id = Box::new(|_| Ok(None));

        let result = create_campaign(
            &db,
            CreateCampaign {
                name: "Q2 outreach".to_string(),
                candidate_id: candidate.id,
                template_id,
                email_list_id: EmailListId::new(),
                job_description: None,
                company: None,
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::TemplateDoesNotExist { template_id });
    }

    #[tokio::test]
    async fn delete_campaign_removes_recipients_first() {
        let candidate = sample_candidate();
        let template = sample_template();
        let campaign = crate::testutil::sample_campaign(&candidate, &template, EmailListId::new());
        let campaign_id = campaign.id;

        let mut db = MockDatabase::new();
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |_| Ok(Some(campaign.clone())));

        let order = Arc::new(Mutex::new(Vec::new()));
        let order_clone = Arc::clone(&order);
        db.recipients.on_delete_recipients_by_campaign = Box::new(move |id| {
            assert_eq!(id, campaign_id);
            order_clone.lock().unwrap().push("recipients");
            Ok(())
        });
        let order_clone = Arc::clone(&order);
        db.campaigns.on_delete_campaign = Box::new(move |id| {
            assert_eq!(id, campaign_id);
            order_clone.lock().unwrap().push("campaign");
            Ok(())
        });

        delete_campaign(&db, campaign_id).await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["recipients", "campaign"]);
    }
}
