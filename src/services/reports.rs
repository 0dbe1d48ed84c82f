use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::models::Report;
use crate::transport::RequestDescriptor;

/// Dashboard and periodic reports.
#[derive(Clone)]
pub struct ReportsService {
    client: ApiClient,
}

impl ReportsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self) -> ApiResult<Report> {
        self.client.get("/dashboard").await
    }

    /// `month` is 1-based.
    pub async fn monthly(&self, year: i32, month: u32) -> ApiResult<Report> {
        let descriptor = RequestDescriptor::get("/reports/monthly")
            .query("year", year)
            .query("month", month);
        self.client.fetch(&descriptor).await
    }

    pub async fn yearly(&self, year: i32) -> ApiResult<Report> {
        let descriptor = RequestDescriptor::get("/reports/yearly").query("year", year);
        self.client.fetch(&descriptor).await
    }
}
