use serde_json::json;

use crate::error::ApiResult;
use crate::models::Goal;
use crate::services::GoalsService;
use crate::transport::RequestDescriptor;

impl GoalsService {
    /// Set the saved amount of a goal. Repeating it is harmless, so it is retried.
    pub async fn set_current_amount(&self, id: &str, amount: f64) -> ApiResult<Goal> {
        let descriptor = RequestDescriptor::patch(self.item_path(id)).idempotent(true);
        self.client()
            .send_json(&descriptor, &json!({ "currentAmount": amount }))
            .await
    }
}
