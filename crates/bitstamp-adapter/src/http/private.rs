/*
[INPUT]:  Order ids, currency pairs and API credentials
[OUTPUT]: Account data (balances, order status)
[POS]:    HTTP layer - private account endpoints (require signed X-Auth headers)
[UPDATE]: When adding new user endpoints or changing request bodies
*/

// ### Private Endpoints

use crate::http::client::ApiRequest;
use crate::http::public::validate_pair;
use crate::http::{BitstampClient, BitstampError, Result};
use crate::types::{AccountBalance, OrderStatus};

impl BitstampClient {
    /// Balances for all currencies
    ///
    /// POST /api/v2/balance/
    pub async fn account_balance(&self) -> Result<AccountBalance> {
        self.dispatch(ApiRequest::post("/api/v2/balance/").authorized())
            .await
    }

    /// Balances and fee for one currency pair
    ///
    /// POST /api/v2/balance/{pair}/
    pub async fn pair_balance(&self, pair: &str) -> Result<AccountBalance> {
        validate_pair(pair)?;
        self.dispatch(ApiRequest::post(format!("/api/v2/balance/{pair}/")).authorized())
            .await
    }

    /// Status and fills of one order
    ///
    /// POST /api/v2/order_status/ with form body `id={order_id}`
    pub async fn order_status(&self, order_id: &str) -> Result<OrderStatus> {
        if order_id.trim().is_empty() {
            return Err(BitstampError::validation("order id must not be empty"));
        }
        let request = ApiRequest::post("/api/v2/order_status/")
            .form("id", order_id)
            .authorized();
        self.dispatch(request).await
    }
}
