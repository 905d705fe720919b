use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{Entity, Page, PagedQuery};
use crate::models::{FindFilter, ListDomain, ObjectFilter};
use crate::services::error::FetchError;

/// 每个领域对应的查询操作
struct Operation {
    name: &'static str,
    field: &'static str,
    filter_variable: Option<(&'static str, &'static str)>,
    items_key: &'static str,
    selection: &'static str,
}

fn operation(domain: ListDomain) -> Operation {
    match domain {
        ListDomain::Scenes => Operation {
            name: "FindScenes",
            field: "findScenes",
            filter_variable: Some(("scene_filter", "SceneFilterType")),
            items_key: "scenes",
            selection: "id title path date rating",
        },
        ListDomain::Performers => Operation {
            name: "FindPerformers",
            field: "findPerformers",
            filter_variable: Some(("performer_filter", "PerformerFilterType")),
            items_key: "performers",
            selection: "id name birthdate country favorite",
        },
        ListDomain::Studios => Operation {
            name: "FindStudios",
            field: "findStudios",
            filter_variable: None,
            items_key: "studios",
            selection: "id name url scene_count",
        },
        ListDomain::Movies => Operation {
            name: "FindMovies",
            field: "findMovies",
            filter_variable: Some(("movie_filter", "MovieFilterType")),
            items_key: "movies",
            selection: "id name date",
        },
        ListDomain::Galleries => Operation {
            name: "FindGalleries",
            field: "findGalleries",
            filter_variable: None,
            items_key: "galleries",
            selection: "id path title",
        },
        ListDomain::SceneMarkers => Operation {
            name: "FindSceneMarkers",
            field: "findSceneMarkers",
            filter_variable: Some(("scene_marker_filter", "SceneMarkerFilterType")),
            items_key: "scene_markers",
            selection: "id title seconds scene { id title }",
        },
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct FindResult {
    count: u64,
}

/// GraphQL 列表查询客户端
#[derive(Clone)]
pub struct GraphqlClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// 带请求超时的客户端
    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 构造请求体：`operationName`、`query`、`variables`
    pub fn build_request(domain: ListDomain, find_filter: &FindFilter, object_filter: &ObjectFilter) -> Value {
        let op = operation(domain);

        let (declarations, arguments) = match op.filter_variable {
            Some((variable, type_name)) => (
                format!("$filter: FindFilterType, ${}: {}", variable, type_name),
                format!("filter: $filter, {}: ${}", variable, variable),
            ),
            None => ("$filter: FindFilterType".to_string(), "filter: $filter".to_string()),
        };
        let query = format!(
            "query {}({}) {{ {}({}) {{ count {} {{ {} }} }} }}",
            op.name, declarations, op.field, arguments, op.items_key, op.selection
        );

        let mut variables = json!({ "filter": find_filter });
        if let Some((variable, _)) = op.filter_variable {
            variables[variable] = json!(object_filter);
        }

        json!({
            "operationName": op.name,
            "query": query,
            "variables": variables,
        })
    }

    /// 解析响应体
    ///
    /// `errors` 非空时视为失败，即使同时带有 `data`。
    pub fn parse_response(domain: ListDomain, body: Value) -> Result<Page<Entity>, FetchError> {
        let op = operation(domain);
        let response: GraphqlResponse = serde_json::from_value(body)?;

        if !response.errors.is_empty() {
            let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(FetchError::Graphql(messages.join("; ")));
        }

        let mut result = response
            .data
            .and_then(|mut data| data.get_mut(op.field).map(Value::take))
            .ok_or_else(|| FetchError::Decode(format!("响应缺少 {} 字段", op.field)))?;

        let items = match result.get_mut(op.items_key).map(Value::take) {
            Some(items) => serde_json::from_value::<Vec<Entity>>(items)?,
            None => return Err(FetchError::Decode(format!("响应缺少 {} 字段", op.items_key))),
        };
        let FindResult { count } = serde_json::from_value(result)?;

        Ok(Page {
            items,
            total_count: count,
        })
    }
}

#[async_trait]
impl PagedQuery for GraphqlClient {
    type Item = Entity;

    async fn find(
        &self,
        domain: ListDomain,
        find_filter: &FindFilter,
        object_filter: &ObjectFilter,
    ) -> Result<Page<Entity>, FetchError> {
        let body = Self::build_request(domain, find_filter, object_filter);
        tracing::debug!("Querying {} page {} from {}", domain, find_filter.page, self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref api_key) = self.api_key {
            request = request.header("ApiKey", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("GraphQL endpoint returned {}", status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        Self::parse_response(domain, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{make_criterion, CriterionValue, ListFilter};

    #[test]
    fn test_build_scene_request() {
        let mut filter = ListFilter::new(ListDomain::Scenes);
        filter
            .add_criterion(make_criterion("rating").with_value(CriterionValue::Number(4)).unwrap(), None)
            .unwrap();
        filter.set_search_term(Some("beach".to_string()));

        let body = GraphqlClient::build_request(
            ListDomain::Scenes,
            &filter.make_find_filter(),
            &filter.object_filter(),
        );

        assert_eq!(body["operationName"], "FindScenes");
        let query = body["query"].as_str().unwrap();
        assert!(query.contains("$scene_filter: SceneFilterType"));
        assert!(query.contains("findScenes(filter: $filter, scene_filter: $scene_filter)"));
        assert_eq!(body["variables"]["filter"]["q"], "beach");
        assert_eq!(body["variables"]["filter"]["per_page"], 40);
        assert_eq!(body["variables"]["filter"]["direction"], "ASC");
        assert_eq!(
            body["variables"]["scene_filter"]["rating"],
            json!({ "value": 4, "modifier": "EQUALS" })
        );
    }

    #[test]
    fn test_build_request_without_object_filter_variable() {
        let filter = ListFilter::new(ListDomain::Studios);
        let body = GraphqlClient::build_request(
            ListDomain::Studios,
            &filter.make_find_filter(),
            &filter.object_filter(),
        );
        let variables = body["variables"].as_object().unwrap();
        assert_eq!(variables.len(), 1);
        assert!(body["query"].as_str().unwrap().contains("findStudios(filter: $filter)"));
    }

    #[test]
    fn test_client_with_timeout() {
        let client = GraphqlClient::with_timeout(
            "http://localhost:9999/graphql",
            Some("key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/graphql");
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "data": {
                "findSceneMarkers": {
                    "count": 31,
                    "scene_markers": [
                        { "id": "7", "title": "intro", "seconds": 12.5 },
                        { "id": "9", "title": "outro", "seconds": 600.0 }
                    ]
                }
            }
        });

        let page = GraphqlClient::parse_response(ListDomain::SceneMarkers, body).unwrap();
        assert_eq!(page.total_count, 31);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "7");
        assert_eq!(page.items[1].fields["title"], "outro");
    }

    #[test]
    fn test_parse_graphql_errors() {
        let body = json!({
            "data": null,
            "errors": [{ "message": "boom" }, { "message": "again" }]
        });
        let err = GraphqlClient::parse_response(ListDomain::Scenes, body).unwrap_err();
        assert_eq!(err, FetchError::Graphql("boom; again".to_string()));
    }

    #[test]
    fn test_parse_missing_field() {
        let body = json!({ "data": { "findScenes": { "count": 3 } } });
        let err = GraphqlClient::parse_response(ListDomain::Scenes, body).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        let body = json!({ "data": {} });
        let err = GraphqlClient::parse_response(ListDomain::Movies, body).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
