use actix_web::web::{Data, Json, Path};
use actix_web::post;

use crate::database::Database;
use crate::error::Error;
use crate::recipient::{RecipientBody, TrackingToken};

use super::manager;

#[post("/replies/{token}")]
#[tracing::instrument(skip(db))]
async fn record_reply(
    db: Data<Box<dyn Database>>,
    params: Path<TrackingToken>,
) -> Result<Json<RecipientBody>, Error> {
    let token = params.into_inner();

    let recipient = manager::record_reply(&***db, token).await?;

    Ok(Json(RecipientBody::render(recipient)))
}
