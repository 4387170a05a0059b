use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::CandidateId;
use crate::database::Database;
use crate::email_list::EmailListId;
use crate::error::Error;
use crate::template::TemplateId;
use crate::utils::SuccessBody;

use super::{manager, Campaign, CampaignId, CampaignStatus};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCampaignBody {
    pub name: String,
    pub candidate_id: CandidateId,
    pub template_id: TemplateId,
    pub email_list_id: EmailListId,
    pub job_description: Option<String>,
    pub company: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub name: String,
    pub candidate_id: CandidateId,
    pub template_id: TemplateId,
    pub email_list_id: EmailListId,
    pub job_description: Option<String>,
    pub company: Option<String>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            name: campaign.name,
            candidate_id: campaign.candidate_id,
            template_id: campaign.template_id,
            email_list_id: campaign.email_list_id,
            job_description: campaign.job_description,
            company: campaign.company,
            status: campaign.status,
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CampaignPreviewBody {
    pub subject: String,
    pub body: String,
}

#[post("/campaigns")]
#[tracing::instrument(skip(db))]
async fn create_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<CreateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let body = body.into_inner();

    let campaign = manager::create_campaign(
        &***db,
        manager::CreateCampaign {
            name: body.name,
            candidate_id: body.candidate_id,
            template_id: body.template_id,
            email_list_id: body.email_list_id,
            job_description: body.job_description,
            company: body.company,
        },
    )
    .await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_campaigns(db: Data<Box<dyn Database>>) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(&***db).await?;

    Ok(Json(campaigns.into_iter().map(CampaignBody::render).collect()))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::get_campaign_by_id(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[delete("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn delete_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<SuccessBody>, Error> {
    let campaign_id = params.into_inner();

    manager::delete_campaign(&***db, campaign_id).await?;

    Ok(Json(SuccessBody {}))
}

#[get("/campaigns/{campaign_id}/preview")]
#[tracing::instrument(skip(db))]
async fn preview_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignPreviewBody>, Error> {
    let campaign_id = params.into_inner();

    let preview = manager::preview_campaign(&***db, campaign_id).await?;

    Ok(Json(CampaignPreviewBody {
        subject: preview.subject,
        body: preview.body,
    }))
}
