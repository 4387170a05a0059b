use tracing::info;

use crate::database::Database;
use crate::error::Error;
use crate::recipient::{DeliveryState, Recipient, TrackingToken};

/// Correlates an inbound reply back to the message it answers via the
/// tracking token. Replaying the same token is a no-op; a reply for a
/// record that was never dispatched is rejected rather than recorded.
#[tracing::instrument(skip(db))]
pub async fn record_reply(db: &dyn Database, token: TrackingToken) -> Result<Recipient, Error> {
    let recipient = db
        .recipients()
        .fetch_recipient_by_token(token)
        .await?
        .ok_or(Error::TrackingTokenDoesNotExist { token })?;

    match recipient.state {
        DeliveryState::Received => Ok(recipient),
        DeliveryState::Sent => {
            let recipient = db
                .recipients()
                .update_recipient_state(recipient, DeliveryState::Received)
                .await?;
            info!("recorded reply from {}", recipient.address);
            Ok(recipient)
        }
        state => Err(Error::ReplyForUndispatchedRecipient {
            recipient_id: recipient.id,
            state,
        }),
    }
}
