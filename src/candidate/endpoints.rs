use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::{manager, Candidate, CandidateId};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCandidateBody {
    pub name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub language_level: Option<String>,
    pub location: Option<String>,
    pub education_level: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CandidateBody {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub language_level: Option<String>,
    pub location: Option<String>,
    pub education_level: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CandidateBody {
    pub fn render(candidate: Candidate) -> CandidateBody {
        CandidateBody {
            id: candidate.id,
            name: candidate.name,
            email: candidate.email,
            birth_date: candidate.birth_date,
            language_level: candidate.language_level,
            location: candidate.location,
            education_level: candidate.education_level,
            created_at: candidate.created_at,
            modified_at: candidate.modified_at,
        }
    }
}

#[post("/candidates")]
#[tracing::instrument(skip(db))]
async fn create_candidate(
    db: Data<Box<dyn Database>>,
    body: Json<CreateCandidateBody>,
) -> Result<Json<CandidateBody>, Error> {
    let body = body.into_inner();

    let candidate = manager::create_candidate(
        &***db,
        manager::CreateCandidate {
            name: body.name,
            email: body.email,
            birth_date: body.birth_date,
            language_level: body.language_level,
            location: body.location,
            education_level: body.education_level,
        },
    )
    .await?;

    Ok(Json(CandidateBody::render(candidate)))
}

#[get("/candidates")]
#[tracing::instrument(skip(db))]
async fn get_candidates(db: Data<Box<dyn Database>>) -> Result<Json<Vec<CandidateBody>>, Error> {
    let candidates = manager::get_candidates(&***db).await?;

    Ok(Json(candidates.into_iter().map(CandidateBody::render).collect()))
}

#[get("/candidates/{candidate_id}")]
#[tracing::instrument(skip(db))]
async fn get_candidate_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CandidateId>,
) -> Result<Json<CandidateBody>, Error> {
    let candidate_id = params.into_inner();

    let candidate = manager::get_candidate_by_id(&***db, candidate_id).await?;

    Ok(Json(CandidateBody::render(candidate)))
}
