use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson, Collection, Database};

use crate::database::TemplateStore;
use crate::error::Error;

use super::{EmailTemplate, TemplateId};

const TEMPLATES: &str = "templates";

pub async fn initialize(_db: &Database) -> Result<(), Error> {
    Ok(())
}

#[derive(Clone)]
pub struct MongoTemplateStore {
    collection: Collection<EmailTemplate>,
}

impl MongoTemplateStore {
    pub fn new(db: &Database) -> MongoTemplateStore {
        MongoTemplateStore {
            collection: db.collection(TEMPLATES),
        }
    }
}

#[async_trait]
impl TemplateStore for MongoTemplateStore {
    async fn insert_template(&self, template: &EmailTemplate) -> Result<(), Error> {
        self.collection.insert_one(template, None).await?;

        Ok(())
    }

    async fn fetch_templates(&self) -> Result<Vec<EmailTemplate>, Error> {
        let templates: Vec<EmailTemplate> = self
            .collection
            .find(bson::doc! {}, None)
            .await?
            .try_collect()
            .await?;

        Ok(templates)
    }

    async fn fetch_template_by_id(
        &self,
        template_id: TemplateId,
    ) -> Result<Option<EmailTemplate>, Error> {
        let template: Option<EmailTemplate> = self
            .collection
            .find_one(bson::doc! { "_id": template_id }, None)
            .await?;

        Ok(template)
    }
}
