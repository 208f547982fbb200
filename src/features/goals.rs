use tracing::{error, info};

use super::error::FeatureError;
use super::{decode_list, decode_one};
use crate::client::{ApiClient, RequestOptions};
use crate::models::{Goal, GoalDraft, GoalStatus, GoalStatusUpdate};

pub const GOALS_PATH: &str = "/api/goals";

const FETCH_FAILED: &str = "Failed to fetch goals. Try again later.";
const ADD_FAILED: &str = "Failed to add goal. Try again later.";
const UPDATE_FAILED: &str = "Failed to update goal. Try again later.";
const DELETE_FAILED: &str = "Failed to delete goal. Try again later.";

#[derive(Clone)]
pub struct GoalsService {
    api: ApiClient,
}

impl GoalsService {
    pub fn new(api: ApiClient) -> Self {
        GoalsService { api }
    }

    pub async fn list(&self) -> Result<Vec<Goal>, FeatureError> {
        let goals = async {
            let body = self.api.get(GOALS_PATH, RequestOptions::new()).await?;
            decode_list::<Goal>(&self.api, GOALS_PATH, body)
        }
        .await
        .map_err(|e| {
            error!("Error fetching goals: {}", e);
            FeatureError::Api {
                message: FETCH_FAILED,
                source: e,
            }
        })?;
        Ok(goals)
    }

    pub async fn create(&self, draft: &GoalDraft) -> Result<Goal, FeatureError> {
        let goal = draft.validate().map_err(FeatureError::Validation)?;
        let created = async {
            let body = self.api.post(GOALS_PATH, &goal, RequestOptions::new()).await?;
            decode_one::<Goal>(&self.api, GOALS_PATH, body)
        }
        .await
        .map_err(|e| {
            error!("Error adding goal: {}", e);
            FeatureError::Api {
                message: ADD_FAILED,
                source: e,
            }
        })?;
        info!("Added goal {} ({})", created.id, created.goal_type);
        Ok(created)
    }

    pub async fn update_status(&self, id: i64, status: GoalStatus) -> Result<Goal, FeatureError> {
        let path = format!("{}/{}", GOALS_PATH, id);
        let update = GoalStatusUpdate { status };
        let updated = async {
            let body = self.api.put(&path, &update, RequestOptions::new()).await?;
            decode_one::<Goal>(&self.api, &path, body)
        }
        .await
        .map_err(|e| {
            error!("Error updating goal {}: {}", id, e);
            FeatureError::Api {
                message: UPDATE_FAILED,
                source: e,
            }
        })?;
        info!("Goal {} is now {}", id, status);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), FeatureError> {
        let path = format!("{}/{}", GOALS_PATH, id);
        self.api
            .delete(&path, RequestOptions::new())
            .await
            .map_err(|e| {
                error!("Error deleting goal {}: {}", id, e);
                FeatureError::Api {
                    message: DELETE_FAILED,
                    source: e,
                }
            })?;
        info!("Deleted goal {}", id);
        Ok(())
    }
}
