use tracing::{error, info};

use super::error::FeatureError;
use super::{decode_list, decode_one};
use crate::client::{ApiClient, RequestOptions};
use crate::models::{Workout, WorkoutDraft};

pub const WORKOUTS_PATH: &str = "/api/workouts";

const FETCH_FAILED: &str = "Failed to fetch workouts. Try again later.";
const ADD_FAILED: &str = "Failed to add workout. Try again later.";
const DELETE_FAILED: &str = "Failed to delete workout. Try again later.";

#[derive(Clone)]
pub struct WorkoutsService {
    api: ApiClient,
}

impl WorkoutsService {
    pub fn new(api: ApiClient) -> Self {
        WorkoutsService { api }
    }

    pub async fn list(&self) -> Result<Vec<Workout>, FeatureError> {
        let workouts = async {
            let body = self.api.get(WORKOUTS_PATH, RequestOptions::new()).await?;
            decode_list::<Workout>(&self.api, WORKOUTS_PATH, body)
        }
        .await
        .map_err(|e| {
            error!("Error fetching workouts: {}", e);
            FeatureError::Api {
                message: FETCH_FAILED,
                source: e,
            }
        })?;
        Ok(workouts)
    }

    pub async fn create(&self, draft: &WorkoutDraft) -> Result<Workout, FeatureError> {
        let workout = draft.validate().map_err(FeatureError::Validation)?;
        let created = async {
            let body = self
                .api
                .post(WORKOUTS_PATH, &workout, RequestOptions::new())
                .await?;
            decode_one::<Workout>(&self.api, WORKOUTS_PATH, body)
        }
        .await
        .map_err(|e| {
            error!("Error adding workout: {}", e);
            FeatureError::Api {
                message: ADD_FAILED,
                source: e,
            }
        })?;
        info!(
            "Logged workout {} ({}, {} min)",
            created.id, created.exercise_type, created.duration_minutes
        );
        Ok(created)
    }

    pub async fn delete(&self, id: i64) -> Result<(), FeatureError> {
        let path = format!("{}/{}", WORKOUTS_PATH, id);
        self.api
            .delete(&path, RequestOptions::new())
            .await
            .map_err(|e| {
                error!("Error deleting workout {}: {}", id, e);
                FeatureError::Api {
                    message: DELETE_FAILED,
                    source: e,
                }
            })?;
        info!("Deleted workout {}", id);
        Ok(())
    }
}
