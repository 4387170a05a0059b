use std::collections::HashSet;

use chrono::Utc;

use crate::database::Database;
use crate::error::Error;

use super::{is_valid_address, EmailList, EmailListId};

#[tracing::instrument(skip(db))]
pub async fn create_email_list(
    db: &dyn Database,
    name: String,
    emails: Vec<String>,
) -> Result<EmailList, Error> {
    let mut seen = HashSet::new();
    for address in &emails {
        if !is_valid_address(address) {
            return Err(Error::InvalidRecipientAddress {
                address: address.clone(),
            });
        }
        if !seen.insert(address.as_str()) {
            return Err(Error::DuplicateAddressInList {
                address: address.clone(),
            });
        }
    }

    let now = Utc::now();
    let email_list = EmailList {
        id: EmailListId::new(),
        name,
        emails,
        created_at: now,
        modified_at: now,
    };

    db.email_lists().insert_email_list(&email_list).await?;

    Ok(email_list)
}

#[tracing::instrument(skip(db))]
pub async fn get_email_lists(db: &dyn Database) -> Result<Vec<EmailList>, Error> {
    let email_lists = db.email_lists().fetch_email_lists().await?;

    Ok(email_lists)
}

#[tracing::instrument(skip(db))]
pub async fn get_email_list_by_id(
    db: &dyn Database,
    email_list_id: EmailListId,
) -> Result<EmailList, Error> {
    let email_list = db
        .email_lists()
        .fetch_email_list_by_id(email_list_id)
        .await?
        .ok_or(Error::EmailListDoesNotExist { email_list_id })?;

    Ok(email_list)
}
