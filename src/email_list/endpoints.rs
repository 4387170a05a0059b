use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::{manager, EmailList, EmailListId};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateEmailListBody {
    pub name: String,
    pub emails: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EmailListBody {
    pub id: EmailListId,
    pub name: String,
    pub emails: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl EmailListBody {
    pub fn render(email_list: EmailList) -> EmailListBody {
        EmailListBody {
            id: email_list.id,
            name: email_list.name,
            emails: email_list.emails,
            created_at: email_list.created_at,
            modified_at: email_list.modified_at,
        }
    }
}

#[post("/email-lists")]
#[tracing::instrument(skip(db))]
async fn create_email_list(
    db: Data<Box<dyn Database>>,
    body: Json<CreateEmailListBody>,
) -> Result<Json<EmailListBody>, Error> {
    let body = body.into_inner();

    let email_list = manager::create_email_list(&***db, body.name, body.emails).await?;

    Ok(Json(EmailListBody::render(email_list)))
}

#[get("/email-lists")]
#[tracing::instrument(skip(db))]
async fn get_email_lists(db: Data<Box<dyn Database>>) -> Result<Json<Vec<EmailListBody>>, Error> {
    let email_lists = manager::get_email_lists(&***db).await?;

    Ok(Json(email_lists.into_iter().map(EmailListBody::render).collect()))
}

#[get("/email-lists/{email_list_id}")]
#[tracing::instrument(skip(db))]
async fn get_email_list_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<EmailListId>,
) -> Result<Json<EmailListBody>, Error> {
    let email_list_id = params.into_inner();

    let email_list = manager::get_email_list_by_id(&***db, email_list_id).await?;

    Ok(Json(EmailListBody::render(email_list)))
}
