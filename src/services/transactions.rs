use crate::error::ApiResult;
use crate::models::{Paginated, Pagination, Transaction, TransactionFilters, TransactionSummary};
use crate::services::TransactionsService;
use crate::transport::RequestDescriptor;

impl TransactionsService {
    /// One page of transactions matching `filters`.
    pub async fn list_filtered(
        &self,
        filters: &TransactionFilters,
        pagination: Pagination,
    ) -> ApiResult<Paginated<Transaction>> {
        let descriptor = RequestDescriptor::get(self.base())
            .query_pairs(filters.query_pairs())
            .query_pairs(pagination.query_pairs());
        self.client().fetch(&descriptor).await
    }

    /// Income, expense and balance totals for `filters`.
    pub async fn summary(&self, filters: &TransactionFilters) -> ApiResult<TransactionSummary> {
        let descriptor = RequestDescriptor::get(format!("{}/summary", self.base()))
            .query_pairs(filters.query_pairs());
        self.client().fetch(&descriptor).await
    }
}
