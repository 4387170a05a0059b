use std::collections::HashSet;

use chrono::Utc;

use crate::campaign::{Campaign, CampaignId};
use crate::database::Database;
use crate::email_list::EmailList;
use crate::error::Error;

use super::{Recipient, RecipientId};

/// Ensures one ledger entry exists per distinct address in the campaign's
/// email list, creating `pending` records with fresh tracking tokens for
/// addresses seen for the first time. Records that already exist keep their
/// state and token, which is what makes repeat dispatches idempotent.
#[tracing::instrument(skip(db, campaign, email_list), fields(campaign_id = %campaign.id))]
pub async fn materialize_recipients(
    db: &dyn Database,
    campaign: &Campaign,
    email_list: &EmailList,
) -> Result<Vec<Recipient>, Error> {
    let mut recipients = db
        .recipients()
        .fetch_recipients_by_campaign(campaign.id)
        .await?;

    let mut known: HashSet<String> = recipients.iter().map(|r| r.address.clone()).collect();

    let now = Utc::now();
    for address in &email_list.emails {
        if !known.insert(address.clone()) {
            continue;
        }

        let recipient = Recipient::new(campaign.id, address.clone(), now);
        db.recipients().insert_recipient(&recipient).await?;
        recipients.push(recipient);
    }

    Ok(recipients)
}

#[tracing::instrument(skip(db))]
pub async fn get_recipients(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Vec<Recipient>, Error> {
    let recipients = db
        .recipients()
        .fetch_recipients_by_campaign(campaign_id)
        .await?;

    Ok(recipients)
}

#[tracing::instrument(skip(db))]
pub async fn get_recipient_in_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    recipient_id: RecipientId,
) -> Result<Recipient, Error> {
    let recipient = db
        .recipients()
        .fetch_recipient_by_id(recipient_id)
        .await?
        .filter(|r| r.campaign_id == campaign_id)
        .ok_or(Error::RecipientDoesNotExistInCampaign {
            campaign_id,
            recipient_id,
        })?;

    Ok(recipient)
}

/// Operator override of a single recipient's display name and message
/// content, ahead of or after rendering.
#[tracing::instrument(skip(db, subject, body))]
pub async fn update_recipient_content(
    db: &dyn Database,
    campaign_id: CampaignId,
    recipient_id: RecipientId,
    display_name: Option<String>,
    subject: String,
    body: String,
) -> Result<Recipient, Error> {
    let recipient = get_recipient_in_campaign(db, campaign_id, recipient_id).await?;

    let recipient = db
        .recipients()
        .update_recipient_content(recipient, display_name, subject, body)
        .await?;

    Ok(recipient)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::database::test::MockDatabase;
    use crate::email_list::EmailListId;
    use crate::testutil::{sample_campaign, sample_candidate, sample_email_list, sample_recipient, sample_template};

    use super::*;

    #[tokio::test]
    async fn materialize_creates_one_record_per_distinct_address() {
        let candidate = sample_candidate();
        let template = sample_template();
        let email_list = sample_email_list(&["a@example.com", "b@example.com", "a@example.com"]);
        let campaign = sample_campaign(&candidate, &template, email_list.id);

        let mut db = MockDatabase::new();
        db.recipients.on_fetch_recipients_by_campaign = Box::new(|_| Ok(vec![]));
        let inserted = Arc::new(Mutex::new(Vec::new()));
        let inserted_clone = Arc::clone(&inserted);
        db.recipients.on_insert_recipient = Box::new(move |recipient| {
            inserted_clone.lock().unwrap().push(recipient);
            Ok(())
        });

        let recipients = materialize_recipients(&db, &campaign, &email_list)
            .await
            .unwrap();

        let inserted = inserted.lock().unwrap();
        assert_eq!(inserted.len(), 2);
        assert_eq!(recipients.len(), 2);
        assert_eq!(inserted[0].address, "a@example.com".to_string());
        assert_eq!(inserted[1].address, "b@example.com".to_string());
        // tokens are unique across records
        assert_ne!(inserted[0].token, inserted[1].token);
    }

    #[tokio::test]
    async fn materialize_skips_existing_records() {
        let candidate = sample_candidate();
        let template = sample_template();
        let email_list = sample_email_list(&["a@example.com", "b@example.com"]);
        let campaign = sample_campaign(&candidate, &template, email_list.id);
        let existing = sample_recipient(&campaign, "a@example.com");
        let existing_token = existing.token;

        let mut db = MockDatabase::new();
        db.recipients.on_fetch_recipients_by_campaign =
            Box::new(move |_| Ok(vec![existing.clone()]));
        let inserted = Arc::new(Mutex::new(Vec::new()));
        let inserted_clone = Arc::clone(&inserted);
        db.recipients.on_insert_recipient = Box::new(move |recipient| {
            inserted_clone.lock().unwrap().push(recipient);
            Ok(())
        });

        let recipients = materialize_recipients(&db, &campaign, &email_list)
            .await
            .unwrap();

        assert_eq!(inserted.lock().unwrap().len(), 1);
        assert_eq!(recipients.len(), 2);
        // the existing record keeps its token
        assert_eq!(recipients[0].token, existing_token);
    }

    #[tokio::test]
    async fn update_rejects_recipient_from_another_campaign() {
        let candidate = sample_candidate();
        let template = sample_template();
        let campaign = sample_campaign(&candidate, &template, EmailListId::new());
        let other_campaign = sample_campaign(&candidate, &template, EmailListId::new());
        let recipient = sample_recipient(&other_campaign, "a@example.com");
        let recipient_id = recipient.id;

        let mut db = MockDatabase::new();
        db.recipients.on_fetch_recipient_by_id = Box::new(move |_| Ok(Some(recipient.clone())));

        let result = update_recipient_content(
            &db,
            campaign.id,
            recipient_id,
            None,
            "subject".to_string(),
            "body".to_string(),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::RecipientDoesNotExistInCampaign {
                campaign_id: campaign.id,
                recipient_id,
            }
        );
    }
}
