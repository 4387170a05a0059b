use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson, Collection, Database};

use crate::database::CandidateStore;
use crate::error::Error;

use super::{Candidate, CandidateId};

const CANDIDATES: &str = "candidates";

pub async fn initialize(_db: &Database) -> Result<(), Error> {
    Ok(())
}

#[derive(Clone)]
pub struct MongoCandidateStore {
    collection: Collection<Candidate>,
}

impl MongoCandidateStore {
    pub fn new(db: &Database) -> MongoCandidateStore {
        MongoCandidateStore {
            collection: db.collection(CANDIDATES),
        }
    }
}

#[async_trait]
impl CandidateStore for MongoCandidateStore {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), Error> {
        self.collection.insert_one(candidate, None).await?;

        Ok(())
    }

    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, Error> {
        let candidates: Vec<Candidate> = self
            .collection
            .find(bson::doc! {}, None)
            .await?
            .try_collect()
            .await?;

        Ok(candidates)
    }

    async fn fetch_candidate_by_id(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Option<Candidate>, Error> {
        let candidate: Option<Candidate> = self
            .collection
            .find_one(bson::doc! { "_id": candidate_id }, None)
            .await?;

        Ok(candidate)
    }
}
