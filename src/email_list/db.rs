use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson, Collection, Database};

use crate::database::EmailListStore;
use crate::error::Error;

use super::{EmailList, EmailListId};

const EMAIL_LISTS: &str = "email_lists";

pub async fn initialize(_db: &Database) -> Result<(), Error> {
    Ok(())
}

#[derive(Clone)]
pub struct MongoEmailListStore {
    collection: Collection<EmailList>,
}

impl MongoEmailListStore {
    pub fn new(db: &Database) -> MongoEmailListStore {
        MongoEmailListStore {
            collection: db.collection(EMAIL_LISTS),
        }
    }
}

#[async_trait]
impl EmailListStore for MongoEmailListStore {
    async fn insert_email_list(&self, email_list: &EmailList) -> Result<(), Error> {
        self.collection.insert_one(email_list, None).await?;

        Ok(())
    }

    async fn fetch_email_lists(&self) -> Result<Vec<EmailList>, Error> {
        let email_lists: Vec<EmailList> = self
            .collection
            .find(bson::doc! {}, None)
            .await?
            .try_collect()
            .await?;

        Ok(email_lists)
    }

    async fn fetch_email_list_by_id(
        &self,
        email_list_id: EmailListId,
    ) -> Result<Option<EmailList>, Error> {
        let email_list: Option<EmailList> = self
            .collection
            .find_one(bson::doc! { "_id": email_list_id }, None)
            .await?;

        Ok(email_list)
    }
}
