use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson, Collection, Database};

use crate::database::CampaignStore;
use crate::error::Error;

use super::{Campaign, CampaignId, CampaignStatus};

const CAMPAIGNS: &str = "campaigns";

pub async fn initialize(_db: &Database) -> Result<(), Error> {
    Ok(())
}

#[derive(Clone)]
pub struct MongoCampaignStore {
    collection: Collection<Campaign>,
}

impl MongoCampaignStore {
    pub fn new(db: &Database) -> MongoCampaignStore {
        MongoCampaignStore {
            collection: db.collection(CAMPAIGNS),
        }
    }
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.collection.insert_one(campaign, None).await?;

        Ok(())
    }

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let campaigns: Vec<Campaign> = self
            .collection
            .find(bson::doc! {}, None)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .collection
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    async fn update_campaign_status(
        &self,
        mut campaign: Campaign,
        status: CampaignStatus,
    ) -> Result<Campaign, Error> {
        let now = Utc::now();
        let new_status = bson::to_bson(&status)?;
        let old_modified_at = bson::DateTime::from_chrono(campaign.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);

        let result = self
            .collection
            .update_one(
                bson::doc! { "_id": campaign.id, "modified_at": old_modified_at },
                bson::doc! { "$set": { "status": new_status, "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        campaign.modified_at = now;
        campaign.status = status;

        Ok(campaign)
    }

    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.collection
            .delete_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(())
    }
}
