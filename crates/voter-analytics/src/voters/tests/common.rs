use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::voters::domain::{VoterId, VoterRecord};
use crate::voters::filter::FilterCriteria;
use crate::voters::store::{GroupField, InMemoryVoterStore, StoreError, VoterStore};
use crate::voters::{voter_router, VoterAnalyticsService, VoterRouterSettings};

pub(super) const VOTERS_CSV: &str = "Voter ID Number,Last Name,First Name,Residential Address - Street Number,Residential Address - Street Name,Residential Address - Apartment Number,Residential Address - Zip Code,Date of Birth,Date of Registration,Party Affiliation,Precinct Number,v20state,v21town,v21primary,v22general,v23town,voter_score
1,Walsh,Maura,14,Cabot St,,02458,03/02/1955,01/10/1980,D,1,TRUE,TRUE,FALSE,TRUE,TRUE,4
2,Adams,Eli,3,Lowell Ave,2,02460,1988-07-19,2010-05-05,R,2,TRUE,FALSE,FALSE,TRUE,FALSE,2
3,Adams,Beth,3,Lowell Ave,2,02460,not-a-date,2010-05-05,U,2,FALSE,FALSE,FALSE,FALSE,FALSE,0
4,Chen,Li,77,Walnut St,,02459,11/23/1955,2001-09-01,d,3,TRUE,FALSE,TRUE,TRUE,FALSE,3
";

pub(super) fn loaded_service() -> Arc<VoterAnalyticsService<InMemoryVoterStore>> {
    let service = VoterAnalyticsService::new(Arc::new(InMemoryVoterStore::default()));
    let summary = service
        .load_reader(VOTERS_CSV.as_bytes())
        .expect("fixture loads");
    assert_eq!(summary.loaded, 4);
    Arc::new(service)
}

pub(super) fn settings(page_size: usize) -> VoterRouterSettings {
    VoterRouterSettings {
        page_size,
        default_csv: PathBuf::from("./does-not-exist.csv"),
    }
}

pub(super) fn router(page_size: usize) -> Router {
    voter_router(loaded_service(), settings(page_size))
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn expect_status(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    json_body(response).await
}

/// Store whose every operation fails.
pub(super) struct UnavailableStore;

impl VoterStore for UnavailableStore {
    fn delete_all(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn insert(&self, _record: VoterRecord) -> Result<VoterRecord, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: VoterId) -> Result<Option<VoterRecord>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn filter(&self, _criteria: &FilterCriteria) -> Result<Vec<VoterRecord>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn group_by(
        &self,
        _criteria: &FilterCriteria,
        _field: GroupField,
    ) -> Result<BTreeMap<String, usize>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}
