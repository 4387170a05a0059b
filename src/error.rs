use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::campaign::CampaignId;
use crate::candidate::CandidateId;
use crate::email_list::EmailListId;
use crate::mailer::MailerError;
use crate::recipient::{DeliveryState, RecipientId, TrackingToken};
use crate::template::TemplateId;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidForm(#[derivative(PartialEq = "ignore")] UrlencodedError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    InvalidRecipientAddress {
        address: String,
    },
    DuplicateAddressInList {
        address: String,
    },

    // 404
    PathDoesNotExist,
    CampaignDoesNotExist {
        campaign_id: CampaignId,
    },
    CandidateDoesNotExist {
        candidate_id: CandidateId,
    },
    TemplateDoesNotExist {
        template_id: TemplateId,
    },
    EmailListDoesNotExist {
        email_list_id: EmailListId,
    },
    RecipientDoesNotExistInCampaign {
        campaign_id: CampaignId,
        recipient_id: RecipientId,
    },
    TrackingTokenDoesNotExist {
        token: TrackingToken,
    },
    NoDispatchInProgress {
        campaign_id: CampaignId,
    },

    // 409
    ConcurrentModificationDetected,
    NoEligibleRecipients {
        campaign_id: CampaignId,
    },
    ReplyForUndispatchedRecipient {
        recipient_id: RecipientId,
        state: DeliveryState,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    BadMailerConfiguration(#[derivative(PartialEq = "ignore")] MailerError),
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidForm(_) => "E4001002",
            Error::InvalidQuery(_) => "E4001003",
            Error::InvalidRecipientAddress { .. } => "E4001004",
            Error::DuplicateAddressInList { .. } => "E4001005",
            Error::PathDoesNotExist => "E4041000",
            Error::CampaignDoesNotExist { .. } => "E4041001",
            Error::CandidateDoesNotExist { .. } => "E4041002",
            Error::TemplateDoesNotExist { .. } => "E4041003",
            Error::EmailListDoesNotExist { .. } => "E4041004",
            Error::RecipientDoesNotExistInCampaign { .. } => "E4041005",
            Error::TrackingTokenDoesNotExist { .. } => "E4041006",
            Error::NoDispatchInProgress { .. } => "E4041007",
            Error::ConcurrentModificationDetected => "E4091000",
            Error::NoEligibleRecipients { .. } => "E4091001",
            Error::ReplyForUndispatchedRecipient { .. } => "E4091002",
            Error::ExistentialState(_) => "E5001000",
            Error::BadMailerConfiguration(_) => "E5001001",
            Error::FailedDatabaseCall(_) => "E5001002",
            Error::FailedToSerializeToBson(_) => "E5001003",
            Error::IoError(_) => "E5001004",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidForm(_) => "The given form could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::InvalidRecipientAddress { .. } => {
                "The given recipient address is not a valid email address"
            }
            Error::DuplicateAddressInList { .. } => {
                "The given email list contains the same address more than once"
            }
            Error::PathDoesNotExist => "The requested path was not found",
            Error::CampaignDoesNotExist { .. } => "The requested campaign was not found",
            Error::CandidateDoesNotExist { .. } => "The requested candidate was not found",
            Error::TemplateDoesNotExist { .. } => "The requested template was not found",
            Error::EmailListDoesNotExist { .. } => "The requested email list was not found",
            Error::RecipientDoesNotExistInCampaign { .. } => {
                "The requested recipient was not found in the campaign"
            }
            Error::TrackingTokenDoesNotExist { .. } => {
                "The given tracking token does not match any recipient"
            }
            Error::NoDispatchInProgress { .. } => {
                "The requested campaign has no dispatch in progress"
            }
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::NoEligibleRecipients { .. } => {
                "The requested campaign has no recipients eligible for dispatch"
            }
            Error::ReplyForUndispatchedRecipient { .. } => {
                "The given tracking token belongs to a message that has not been sent"
            }
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::BadMailerConfiguration(_) => "The mail transport configuration is invalid",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRecipientAddress { .. } => StatusCode::BAD_REQUEST,
            Error::DuplicateAddressInList { .. } => StatusCode::BAD_REQUEST,
            Error::PathDoesNotExist => StatusCode::NOT_FOUND,
            Error::CampaignDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::CandidateDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::TemplateDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::EmailListDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::RecipientDoesNotExistInCampaign { .. } => StatusCode::NOT_FOUND,
            Error::TrackingTokenDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::NoDispatchInProgress { .. } => StatusCode::NOT_FOUND,
            Error::ConcurrentModificationDetected => StatusCode::CONFLICT,
            Error::NoEligibleRecipients { .. } => StatusCode::CONFLICT,
            Error::ReplyForUndispatchedRecipient { .. } => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::BadMailerConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl From<MailerError> for Error {
    fn from(error: MailerError) -> Error {
        Error::BadMailerConfiguration(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidForm(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::BadMailerConfiguration(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::CampaignId;

    #[test]
    fn error_meta_serializes_as_bare_fields() {
        let campaign_id = CampaignId::new();
        let error = Error::CampaignDoesNotExist { campaign_id };

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "campaign_id": campaign_id.to_string() })
        );
        assert_eq!(error.error_code(), "E4041001");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
