use chrono::{NaiveDate, Utc};

use crate::database::Database;
use crate::email_list::is_valid_address;
use crate::error::Error;

use super::{Candidate, CandidateId};

#[derive(Clone, Debug)]
pub struct CreateCandidate {
    pub name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub language_level: Option<String>,
    pub location: Option<String>,
    pub education_level: Option<String>,
}

#[tracing::instrument(skip(db))]
pub async fn create_candidate(
    db: &dyn Database,
    create: CreateCandidate,
) -> Result<Candidate, Error> {
    if !is_valid_address(&create.email) {
        return Err(Error::InvalidRecipientAddress {
            address: create.email,
        });
    }

    let now = Utc::now();
    let candidate = Candidate {
        id: CandidateId::new(),
        name: create.name,
        email: create.email,
        birth_date: create.birth_date,
        language_level: create.language_level,
        location: create.location,
        education_level: create.education_level,
        created_at: now,
        modified_at: now,
    };

    db.candidates().insert_candidate(&candidate).await?;

    Ok(candidate)
}

#[tracing::instrument(skip(db))]
pub async fn get_candidates(db: &dyn Database) -> Result<Vec<Candidate>, Error> {
    let candidates = db.candidates().fetch_candidates().await?;

    Ok(candidates)
}

#[tracing::instrument(skip(db))]
pub async fn get_candidate_by_id(
    db: &dyn Database,
    candidate_id: CandidateId,
) -> Result<Candidate, Error> {
    let candidate = db
        .candidates()
        .fetch_candidate_by_id(candidate_id)
        .await?
        .ok_or(Error::CandidateDoesNotExist { candidate_id })?;

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::database::test::MockDatabase;

    use super::*;

    #[tokio::test]
    async fn create_candidate_rejects_bad_email() {
        let db = MockDatabase::new();

        let result = create_candidate(
            &db,
            CreateCandidate {
                name: "Amara".to_string(),
                email: "not-an-email".to_string(),
                birth_date: None,
                language_level: None,
                location: None,
                education_level: None,
            },
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidRecipientAddress {
                address: "not-an-email".to_string()
            }
        );
    }

    #[tokio::test]
    async fn create_candidate_inserts_record() {
        let mut db = MockDatabase::new();
        let inserted = Arc::new(Mutex::new(false));
        let inserted_clone = Arc::clone(&inserted);
        db.candidates.on_insert_candidate = Box::new(move |candidate| {
            *inserted_clone.lock().unwrap() = true;
            assert_eq!(candidate.name, "Amara".to_string());
            Ok(())
        });

        let candidate = create_candidate(
            &db,
            CreateCandidate {
                name: "Amara".to_string(),
                email: "amara@example.com".to_string(),
                birth_date: None,
                language_level: None,
                location: None,
                education_level: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(candidate.email, "amara@example.com".to_string());
        assert!(*inserted.lock().unwrap(), "db.insert_candidate was not called");
    }
}
