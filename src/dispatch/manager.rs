use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::campaign::{CampaignId, CampaignStatus};
use crate::database::Database;
use crate::error::Error;
use crate::mailer::{Mailer, MailerError, OutboundEmail};
use crate::recipient::{self, DeliveryState, Recipient};
use crate::template::render::{campaign_context, render};

use super::{CancelFlag, DispatchFailure, DispatchMode, DispatchSummary};

/// Drives one batch over a campaign's recipient ledger. Each recipient is
/// handled independently: rendered on demand, claimed via the
/// pending→sending transition, sent with a per-send timeout, and written
/// back durably before the loop moves on. One bad recipient never aborts
/// the batch.
#[tracing::instrument(skip(db, mailer, cancel))]
pub async fn dispatch_campaign(
    db: &dyn Database,
    mailer: &dyn Mailer,
    campaign_id: CampaignId,
    mode: DispatchMode,
    cancel: &CancelFlag,
    send_timeout: Duration,
) -> Result<DispatchSummary, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;
    let candidate = db
        .candidates()
        .fetch_candidate_by_id(campaign.candidate_id)
        .await?
        .ok_or(Error::CandidateDoesNotExist {
            candidate_id: campaign.candidate_id,
        })?;
    let template = db
        .templates()
        .fetch_template_by_id(campaign.template_id)
        .await?
        .ok_or(Error::TemplateDoesNotExist {
            template_id: campaign.template_id,
        })?;
    let email_list = db
        .email_lists()
        .fetch_email_list_by_id(campaign.email_list_id)
        .await?
        .ok_or(Error::EmailListDoesNotExist {
            email_list_id: campaign.email_list_id,
        })?;

    let all = recipient::manager::materialize_recipients(db, &campaign, &email_list).await?;

    let eligible = db
        .recipients()
        .fetch_recipients_by_campaign_and_states(campaign.id, mode.eligible_states())
        .await?;

    if eligible.is_empty() {
        if !all.iter().any(|r| r.state.is_terminal_success()) {
            return Err(Error::NoEligibleRecipients { campaign_id });
        }
        // nothing left to do for a campaign that already went out
        return Ok(DispatchSummary {
            attempted: 0,
            sent: 0,
            failed: 0,
            skipped: 0,
            canceled: 0,
            failures: vec![],
            campaign_status: campaign.status,
        });
    }

    let mut campaign = db
        .campaigns()
        .update_campaign_status(campaign, CampaignStatus::Sending)
        .await?;

    let today = Utc::now().date_naive();
    let total = eligible.len();
    let mut attempted = 0;
    let mut sent = 0;
    let mut failed = 0;
    let mut skipped = 0;
    let mut canceled = 0;
    let mut failures = Vec::new();

    for (index, recipient) in eligible.into_iter().enumerate() {
        if cancel.is_canceled() {
            canceled = total - index;
            warn!(
                "dispatch of campaign {} canceled with {} recipients remaining",
                campaign.id, canceled
            );
            break;
        }

        // render on demand; operator-edited content is left alone
        let recipient = if recipient.body.is_none() {
            let context = campaign_context(&campaign, &candidate, Some(&recipient), today);
            let subject = render(&template.subject, &context);
            let body = render(&template.content, &context);
            let display_name = recipient.display_name.clone();
            let recipient_id = recipient.id;
            let address = recipient.address.clone();
            match db
                .recipients()
                .update_recipient_content(recipient, display_name, subject, body)
                .await
            {
                Ok(recipient) => recipient,
                Err(error) => {
                    error!("failed to persist rendered content: {}", error);
                    failures.push(DispatchFailure {
                        recipient_id,
                        address,
                        reason: format!("failed to persist rendered content: {}", error),
                    });
                    skipped += 1;
                    continue;
                }
            }
        } else {
            recipient
        };

        // the pending/failed -> sending transition doubles as the claim; a
        // record another run got to first is skipped, not re-sent
        let recipient = match db
            .recipients()
            .update_recipient_state(recipient, DeliveryState::Sending)
            .await
        {
            Ok(recipient) => recipient,
            Err(Error::ConcurrentModificationDetected) => {
                warn!("recipient already claimed by a concurrent dispatch");
                skipped += 1;
                continue;
            }
            Err(error) => {
                error!("failed to claim recipient: {}", error);
                skipped += 1;
                continue;
            }
        };

        attempted += 1;
        let recipient_id = recipient.id;
        let address = recipient.address.clone();

        let email = OutboundEmail {
            to: recipient.address.clone(),
            to_name: recipient.display_name.clone(),
            subject: recipient.subject.clone().unwrap_or_default(),
            body: recipient.body.clone().unwrap_or_default(),
        };

        let outcome = match tokio::time::timeout(send_timeout, mailer.send(&email)).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(error)) => Err(error),
            Err(_) => Err(MailerError::TimedOut { after: send_timeout }),
        };

        match outcome {
            Ok(receipt) => {
                match db
                    .recipients()
                    .update_recipient_sent(recipient, receipt.message_id)
                    .await
                {
                    Ok(_) => sent += 1,
                    Err(error) => {
                        // the message went out but the ledger does not know;
                        // surfaced rather than swallowed
                        error!("failed to persist send outcome: {}", error);
                        failures.push(DispatchFailure {
                            recipient_id,
                            address,
                            reason: format!("sent but failed to persist outcome: {}", error),
                        });
                    }
                }
            }
            Err(mail_error) => {
                let reason = mail_error.to_string();
                info!("send to {} failed: {}", address, reason);
                if let Err(error) = db
                    .recipients()
                    .update_recipient_failed(recipient, reason.clone())
                    .await
                {
                    error!("failed to persist failure outcome: {}", error);
                }
                failed += 1;
                failures.push(DispatchFailure {
                    recipient_id,
                    address,
                    reason,
                });
            }
        }
    }

    let all = db
        .recipients()
        .fetch_recipients_by_campaign(campaign.id)
        .await?;
    let status = aggregate_status(&all);
    campaign = db.campaigns().update_campaign_status(campaign, status).await?;

    Ok(DispatchSummary {
        attempted,
        sent,
        failed,
        skipped,
        canceled,
        failures,
        campaign_status: campaign.status,
    })
}

/// Pure recompute over the full recipient set; never patched incrementally,
/// so concurrent partial updates cannot leave a stale aggregate behind.
pub fn aggregate_status(recipients: &[Recipient]) -> CampaignStatus {
    let any_open = recipients
        .iter()
        .any(|r| matches!(r.state, DeliveryState::Pending | DeliveryState::Sending));
    if any_open || recipients.is_empty() {
        return CampaignStatus::Sending;
    }

    let any_success = recipients.iter().any(|r| r.state.is_terminal_success());
    let any_failure = recipients.iter().any(|r| r.state == DeliveryState::Failed);
    match (any_success, any_failure) {
        (true, false) => CampaignStatus::Sent,
        (true, true) => CampaignStatus::PartiallySent,
        _ => CampaignStatus::Failed,
    }
}
