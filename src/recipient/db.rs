use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Collection, Database};

use crate::campaign::CampaignId;
use crate::database::RecipientStore;
use crate::error::Error;

use super::{DeliveryState, Recipient, RecipientId, TrackingToken};

const RECIPIENTS: &str = "recipients";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": RECIPIENTS,
            "indexes": [
                {
                    "key": { "campaign_id": 1, "address": 1 },
                    "name": "by_campaign_id_and_address",
                    "unique": true,
                },
                { "key": { "token": 1 }, "name": "by_token", "unique": true },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[derive(Clone)]
pub struct MongoRecipientStore {
    collection: Collection<Recipient>,
}

impl MongoRecipientStore {
    pub fn new(db: &Database) -> MongoRecipientStore {
        MongoRecipientStore {
            collection: db.collection(RECIPIENTS),
        }
    }

    /// Applies `changes` to the record, guarded on `modified_at` so two
    /// writers cannot race past each other; bumps `modified_at` as part of
    /// the same write.
    async fn guarded_update(
        &self,
        recipient: &mut Recipient,
        mut changes: bson::Document,
    ) -> Result<(), Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(recipient.modified_at);
        changes.insert("modified_at", bson::DateTime::from_chrono(now));

        let result = self
            .collection
            .update_one(
                bson::doc! { "_id": recipient.id, "modified_at": old_modified_at },
                bson::doc! { "$set": changes },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        recipient.modified_at = now;

        Ok(())
    }
}

#[async_trait]
impl RecipientStore for MongoRecipientStore {
    async fn insert_recipient(&self, recipient: &Recipient) -> Result<(), Error> {
        self.collection.insert_one(recipient, None).await?;

        Ok(())
    }

    async fn fetch_recipients_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Recipient>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": 1 })
            .build();

        let recipients: Vec<Recipient> = self
            .collection
            .find(bson::doc! { "campaign_id": campaign_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(recipients)
    }

    async fn fetch_recipients_by_campaign_and_states(
        &self,
        campaign_id: CampaignId,
        states: &[DeliveryState],
    ) -> Result<Vec<Recipient>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": 1 })
            .build();
        let states = bson::to_bson(states)?;

        let recipients: Vec<Recipient> = self
            .collection
            .find(
                bson::doc! { "campaign_id": campaign_id, "state": { "$in": states } },
                options,
            )
            .await?
            .try_collect()
            .await?;

        Ok(recipients)
    }

    async fn fetch_recipient_by_id(
        &self,
        recipient_id: RecipientId,
    ) -> Result<Option<Recipient>, Error> {
        let recipient: Option<Recipient> = self
            .collection
            .find_one(bson::doc! { "_id": recipient_id }, None)
            .await?;

        Ok(recipient)
    }

    async fn fetch_recipient_by_token(
        &self,
        token: TrackingToken,
    ) -> Result<Option<Recipient>, Error> {
        let recipient: Option<Recipient> = self
            .collection
            .find_one(bson::doc! { "token": token }, None)
            .await?;

        Ok(recipient)
    }

    async fn update_recipient_state(
        &self,
        mut recipient: Recipient,
        state: DeliveryState,
    ) -> Result<Recipient, Error> {
        let now = Utc::now();
        let mut changes = bson::doc! { "state": bson::to_bson(&state)? };
        if state == DeliveryState::Received {
            changes.insert("received_at", bson::DateTime::from_chrono(now));
        }

        self.guarded_update(&mut recipient, changes).await?;

        recipient.state = state;
        if state == DeliveryState::Received {
            recipient.received_at = Some(now);
        }

        Ok(recipient)
    }

    async fn update_recipient_sent(
        &self,
        mut recipient: Recipient,
        message_id: Option<String>,
    ) -> Result<Recipient, Error> {
        let now = Utc::now();
        let changes = bson::doc! {
            "state": bson::to_bson(&DeliveryState::Sent)?,
            "sent_at": bson::DateTime::from_chrono(now),
            "message_id": bson::to_bson(&message_id)?,
            "last_error": bson::Bson::Null,
        };

        self.guarded_update(&mut recipient, changes).await?;

        recipient.state = DeliveryState::Sent;
        recipient.sent_at = Some(now);
        recipient.message_id = message_id;
        recipient.last_error = None;

        Ok(recipient)
    }

    async fn update_recipient_failed(
        &self,
        mut recipient: Recipient,
        reason: String,
    ) -> Result<Recipient, Error> {
        let changes = bson::doc! {
            "state": bson::to_bson(&DeliveryState::Failed)?,
            "last_error": reason.clone(),
        };

        self.guarded_update(&mut recipient, changes).await?;

        recipient.state = DeliveryState::Failed;
        recipient.last_error = Some(reason);

        Ok(recipient)
    }

    async fn update_recipient_content(
        &self,
        mut recipient: Recipient,
        display_name: Option<String>,
        subject: String,
        body: String,
    ) -> Result<Recipient, Error> {
        let changes = bson::doc! {
            "display_name": bson::to_bson(&display_name)?,
            "subject": subject.clone(),
            "body": body.clone(),
        };

        self.guarded_update(&mut recipient, changes).await?;

        recipient.display_name = display_name;
        recipient.subject = Some(subject);
        recipient.body = Some(body);

        Ok(recipient)
    }

    async fn delete_recipients_by_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.collection
            .delete_many(bson::doc! { "campaign_id": campaign_id }, None)
            .await?;

        Ok(())
    }
}
