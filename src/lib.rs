use std::env;

use actix_web::web::{self, Data, FormConfig, JsonConfig, PathConfig, QueryConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod candidate;
pub mod database;
pub mod dispatch;
pub mod email_list;
pub mod error;
pub mod mailer;
pub mod recipient;
pub mod reply;
pub mod seed;
pub mod template;
#[cfg(test)]
mod testutil;
pub mod typedid;
pub mod utils;

pub use error::Error;

use crate::database::{Database, MongoDatabase};
use crate::mailer::{Mailer, SmtpMailer};

/// Connects to MongoDB and SMTP from the environment and serves the HTTP
/// API. `seed_data` drops the database and loads the deterministic sample
/// set first.
pub async fn run(seed_data: bool) -> Result<(), Error> {
    let uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    info!("connecting to db: {}", uri);
    let db = Client::with_uri_str(&uri).await?.database("outreach");
    let db = MongoDatabase::initialize(db).await?;

    if seed_data {
        seed::seed(&db).await?;
    }

    let mailer = SmtpMailer::from_env()?;

    // one registry across all workers, or cancel requests handled by
    // another worker would miss the in-flight batch
    let registry = Data::new(dispatch::CancelRegistry::new());

    HttpServer::new(move || {
        App::new()
            .app_data(JsonConfig::default().error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(FormConfig::default().error_handler(|err, _req| {
                // format form errors with custom format
                Error::InvalidForm(err).into()
            }))
            .app_data(QueryConfig::default().error_handler(|err, _req| {
                // format query errors with custom format
                Error::InvalidQuery(err).into()
            }))
            .app_data(Data::new(Box::new(db.clone()) as Box<dyn Database>))
            .app_data(Data::new(Box::new(mailer.clone()) as Box<dyn Mailer>))
            .app_data(registry.clone())
            .wrap(TracingLogger::default())
            .service(campaign::endpoints::create_campaign)
            .service(campaign::endpoints::get_campaigns)
            .service(campaign::endpoints::get_campaign_by_id)
            .service(campaign::endpoints::delete_campaign)
            .service(campaign::endpoints::preview_campaign)
            .service(candidate::endpoints::create_candidate)
            .service(candidate::endpoints::get_candidates)
            .service(candidate::endpoints::get_candidate_by_id)
            .service(template::endpoints::create_template)
            .service(template::endpoints::get_templates)
            .service(template::endpoints::get_template_by_id)
            .service(email_list::endpoints::create_email_list)
            .service(email_list::endpoints::get_email_lists)
            .service(email_list::endpoints::get_email_list_by_id)
            .service(recipient::endpoints::get_recipients_in_campaign)
            .service(recipient::endpoints::get_recipient_in_campaign_by_id)
            .service(recipient::endpoints::update_recipient_content_in_campaign)
            .service(dispatch::endpoints::dispatch_campaign)
            .service(dispatch::endpoints::retry_campaign)
            .service(dispatch::endpoints::cancel_dispatch)
            .service(reply::endpoints::record_reply)
            .default_service(web::to(|| async { Error::PathDoesNotExist.error_response() }))
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await?;

    Ok(())
}
