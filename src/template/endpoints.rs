use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::{manager, EmailTemplate, TemplateId};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateTemplateBody {
    pub name: String,
    pub subject: String,
    pub content: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TemplateBody {
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TemplateBody {
    pub fn render(template: EmailTemplate) -> TemplateBody {
        TemplateBody {
            id: template.id,
            name: template.name,
            subject: template.subject,
            content: template.content,
            created_at: template.created_at,
            modified_at: template.modified_at,
        }
    }
}

#[post("/templates")]
#[tracing::instrument(skip(db))]
async fn create_template(
    db: Data<Box<dyn Database>>,
    body: Json<CreateTemplateBody>,
) -> Result<Json<TemplateBody>, Error> {
    let body = body.into_inner();

    let template = manager::create_template(&***db, body.name, body.subject, body.content).await?;

    Ok(Json(TemplateBody::render(template)))
}

#[get("/templates")]
#[tracing::instrument(skip(db))]
async fn get_templates(db: Data<Box<dyn Database>>) -> Result<Json<Vec<TemplateBody>>, Error> {
    let templates = manager::get_templates(&***db).await?;

    Ok(Json(templates.into_iter().map(TemplateBody::render).collect()))
}

#[get("/templates/{template_id}")]
#[tracing::instrument(skip(db))]
async fn get_template_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<TemplateId>,
) -> Result<Json<TemplateBody>, Error> {
    let template_id = params.into_inner();

    let template = manager::get_template_by_id(&***db, template_id).await?;

    Ok(Json(TemplateBody::render(template)))
}
