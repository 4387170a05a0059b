use chrono::Utc;

use crate::database::Database;
use crate::error::Error;

use super::{EmailTemplate, TemplateId};

#[tracing::instrument(skip(db))]
pub async fn create_template(
    db: &dyn Database,
    name: String,
    subject: String,
    content: String,
) -> Result<EmailTemplate, Error> {
    let now = Utc::now();
    let template = EmailTemplate {
        id: TemplateId::new(),
        name,
        subject,
        content,
        created_at: now,
        modified_at: now,
    };

    db.templates().insert_template(&template).await?;

    Ok(template)
}

#[tracing::instrument(skip(db))]
pub async fn get_templates(db: &dyn Database) -> Result<Vec<EmailTemplate>, Error> {
    let templates = db.templates().fetch_templates().await?;

    Ok(templates)
}

#[tracing::instrument(skip(db))]
pub async fn get_template_by_id(
    db: &dyn Database,
    template_id: TemplateId,
) -> Result<EmailTemplate, Error> {
    let template = db
        .templates()
        .fetch_template_by_id(template_id)
        .await?
        .ok_or(Error::TemplateDoesNotExist { template_id })?;

    Ok(template)
}
