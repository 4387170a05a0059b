use actix_web::web::{Data, Json, Path};
use actix_web::post;
use serde::Serialize;

use crate::campaign::{CampaignId, CampaignStatus};
use crate::database::Database;
use crate::error::Error;
use crate::mailer::Mailer;
use crate::utils::SuccessBody;

use super::DEFAULT_SEND_TIMEOUT;
use super::{manager, CancelRegistry, DispatchFailure, DispatchMode, DispatchSummary};

#[derive(Clone, Debug, Serialize)]
pub struct DispatchSummaryBody {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub canceled: usize,
    pub failures: Vec<DispatchFailure>,
    pub campaign_status: CampaignStatus,
}

impl DispatchSummaryBody {
    pub fn render(summary: DispatchSummary) -> DispatchSummaryBody {
        DispatchSummaryBody {
            attempted: summary.attempted,
            sent: summary.sent,
            failed: summary.failed,
            skipped: summary.skipped,
            canceled: summary.canceled,
            failures: summary.failures,
            campaign_status: summary.campaign_status,
        }
    }
}

async fn run_batch(
    db: &dyn Database,
    mailer: &dyn Mailer,
    registry: &CancelRegistry,
    campaign_id: CampaignId,
    mode: DispatchMode,
) -> Result<DispatchSummary, Error> {
    // registered so a concurrent cancel request can reach the flag;
    // deregistered whether the batch succeeds or not
    let cancel = registry.begin(campaign_id);
    let result =
        manager::dispatch_campaign(db, mailer, campaign_id, mode, &cancel, DEFAULT_SEND_TIMEOUT)
            .await;
    registry.finish(campaign_id);

    result
}

#[post("/campaigns/{campaign_id}/dispatch")]
#[tracing::instrument(skip(db, mailer, registry))]
async fn dispatch_campaign(
    db: Data<Box<dyn Database>>,
    mailer: Data<Box<dyn Mailer>>,
    registry: Data<CancelRegistry>,
    params: Path<CampaignId>,
) -> Result<Json<DispatchSummaryBody>, Error> {
    let campaign_id = params.into_inner();

    let summary = run_batch(&***db, &***mailer, &registry, campaign_id, DispatchMode::Initial)
        .await?;

    Ok(Json(DispatchSummaryBody::render(summary)))
}

#[post("/campaigns/{campaign_id}/dispatch/retry")]
#[tracing::instrument(skip(db, mailer, registry))]
async fn retry_campaign(
    db: Data<Box<dyn Database>>,
    mailer: Data<Box<dyn Mailer>>,
    registry: Data<CancelRegistry>,
    params: Path<CampaignId>,
) -> Result<Json<DispatchSummaryBody>, Error> {
    let campaign_id = params.into_inner();

    let summary =
        run_batch(&***db, &***mailer, &registry, campaign_id, DispatchMode::Retry).await?;

    Ok(Json(DispatchSummaryBody::render(summary)))
}

#[post("/campaigns/{campaign_id}/dispatch/cancel")]
#[tracing::instrument(skip(registry))]
async fn cancel_dispatch(
    registry: Data<CancelRegistry>,
    params: Path<CampaignId>,
) -> Result<Json<SuccessBody>, Error> {
    let campaign_id = params.into_inner();

    if !registry.cancel(campaign_id) {
        return Err(Error::NoDispatchInProgress { campaign_id });
    }

    Ok(Json(SuccessBody {}))
}
