mod hr;

use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use platform_api::ApiResult;
use products_hr::HrModule;
use serde::Serialize;
use tracing::instrument;

pub use hr::HrQuery;

pub type SchemaType = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(hr: HrModule) -> SchemaType {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(hr)
        .finish()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> ApiResult<HealthPayload> {
        Ok(HealthPayload { ok: true })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> ApiResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    async fn hr(&self) -> HrQuery {
        HrQuery
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Request, Value};
    use products_hr::HrConfig;
    use serde_json::json;

    fn schema() -> SchemaType {
        build_schema(HrModule::new(HrConfig {
            simulate_latency: false,
            ..HrConfig::default()
        }))
    }

    #[tokio::test]
    async fn health_query_returns_ok() {
        let response = schema().execute(Request::new("{ health { ok } }")).await;
        assert!(response.errors.is_empty());
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"health": {"ok": true}}));
    }

    #[tokio::test]
    async fn departments_are_paged() {
        let query = r#"{ hr { departments(page: 2, pageSize: 5) { total totalPages items { id code } } } }"#;
        let response = schema().execute(Request::new(query)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        let page = &body["hr"]["departments"];
        assert_eq!(page["total"], json!(8));
        assert_eq!(page["totalPages"], json!(2));
        assert_eq!(page["items"].as_array().unwrap().len(), 3);
        assert_eq!(page["items"][2]["code"], json!("CS"));
    }

    #[tokio::test]
    async fn employee_search_and_lookup() {
        let query = r#"{
            hr {
                employees(search: "garcia") { total items { name status } }
                employee(id: "404") { id }
            }
        }"#;
        let response = schema().execute(Request::new(query)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(body["hr"]["employees"]["total"], json!(1));
        assert_eq!(
            body["hr"]["employees"]["items"][0],
            json!({"name": "Thomas Garcia", "status": "inactive"})
        );
        assert_eq!(body["hr"]["employee"], json!(null));
    }

    #[tokio::test]
    async fn invalid_page_reports_error_code() {
        let query = r#"{ hr { positions(page: 0) { total } } }"#;
        let response = schema().execute(Request::new(query)).await;
        let err = response.errors.first().expect("page 0 must fail");
        let code = err
            .extensions
            .as_ref()
            .and_then(|map| map.get("code"))
            .cloned();
        assert_eq!(code, Some(Value::from("INVALID_INPUT")));
    }
}
