use actix_web::web::{Data, Json, Path};
use actix_web::{get, put};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::{self, CampaignId};
use crate::database::Database;
use crate::error::Error;

use super::{manager, DeliveryState, Recipient, RecipientId, TrackingToken};

#[derive(Clone, Debug, Serialize)]
pub struct RecipientBody {
    pub id: RecipientId,
    pub campaign_id: CampaignId,
    pub address: String,
    pub display_name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub state: DeliveryState,
    pub token: TrackingToken,
    pub message_id: Option<String>,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl RecipientBody {
    pub fn render(recipient: Recipient) -> RecipientBody {
        RecipientBody {
            id: recipient.id,
            campaign_id: recipient.campaign_id,
            address: recipient.address,
            display_name: recipient.display_name,
            subject: recipient.subject,
            body: recipient.body,
            state: recipient.state,
            token: recipient.token,
            message_id: recipient.message_id,
            last_error: recipient.last_error,
            sent_at: recipient.sent_at,
            received_at: recipient.received_at,
            created_at: recipient.created_at,
            modified_at: recipient.modified_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateRecipientContentBody {
    pub display_name: Option<String>,
    pub subject: String,
    pub body: String,
}

#[get("/campaigns/{campaign_id}/recipients")]
#[tracing::instrument(skip(db))]
async fn get_recipients_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<Vec<RecipientBody>>, Error> {
    let campaign_id = params.into_inner();
    campaign::manager::get_campaign_by_id(&***db, campaign_id).await?;

    let recipients = manager::get_recipients(&***db, campaign_id).await?;

    Ok(Json(recipients.into_iter().map(RecipientBody::render).collect()))
}

#[get("/campaigns/{campaign_id}/recipients/{recipient_id}")]
#[tracing::instrument(skip(db))]
async fn get_recipient_in_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<(CampaignId, RecipientId)>,
) -> Result<Json<RecipientBody>, Error> {
    let (campaign_id, recipient_id) = params.into_inner();

    let recipient = manager::get_recipient_in_campaign(&***db, campaign_id, recipient_id).await?;

    Ok(Json(RecipientBody::render(recipient)))
}

#[put("/campaigns/{campaign_id}/recipients/{recipient_id}")]
#[tracing::instrument(skip(db, body))]
async fn update_recipient_content_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<(CampaignId, RecipientId)>,
    body: Json<UpdateRecipientContentBody>,
) -> Result<Json<RecipientBody>, Error> {
    let (campaign_id, recipient_id) = params.into_inner();
    let body = body.into_inner();

    let recipient = manager::update_recipient_content(
        &***db,
        campaign_id,
        recipient_id,
        body.display_name,
        body.subject,
        body.body,
    )
    .await?;

    Ok(Json(RecipientBody::render(recipient)))
}
