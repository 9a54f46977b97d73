//! Tests for api module
//!
//! These tests verify the data-fetch layer including:
//! - Cache key normalization and invalidation
//! - Request shapes against a mock server
//! - Error body mapping to user-facing messages

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::cache::normalize_params;
    use crate::common::ClientError;
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            &server.uri(),
            token.map(str::to_string),
        )
    }

    fn employee_service(server: &MockServer) -> EmployeeService {
        EmployeeService::new(client(server, None), QueryCache::new(Duration::from_secs(300)))
    }

    fn employee_json(id: &str, name: &str) -> serde_json::Value {
        json!({ "id": id, "name": name, "photos": [] })
    }

    #[test]
    fn test_query_key_strips_empty_params_and_sorts() {
        let a = QueryKey::new(
            "employees",
            &[
                ("search", Some("".to_string())),
                ("page", Some("2".to_string())),
                ("establishment_id", Some("7".to_string())),
                ("status", None),
            ],
        );
        let b = QueryKey::new(
            "employees",
            &[
                ("establishment_id", Some(" 7 ".to_string())),
                ("page", Some("2".to_string())),
            ],
        );
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "employees?establishment_id=7&page=2");
        assert_eq!(QueryKey::new("employees", &[("q", None)]).as_str(), "employees");
    }

    #[test]
    fn test_query_key_prefix_matching() {
        let key = QueryKey::new("employees/search", &[("q", Some("ana".to_string()))]);
        assert!(key.has_prefix("employees"));
        assert!(key.has_prefix("employees/search"));
        assert!(!key.has_prefix("employee"));
        assert!(!QueryKey::scope("employees-archive").has_prefix("employees"));
    }

    #[test]
    fn test_normalize_params() {
        let pairs = normalize_params(&[("b", Some("2".into())), ("a", Some("  ".into()))]);
        assert_eq!(pairs, vec![("b".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_exists_ratio_with_large_vote_counts() {
        let stats = ValidationStats {
            total_votes: 4_000_000_000,
            exists_votes: 3_000_000_000,
            ..ValidationStats::default()
        };
        assert_eq!(stats.exists_ratio(), 75);
        assert_eq!(ValidationStats::default().exists_ratio(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_entries_go_stale() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::scope("establishments/categories");
        cache.insert(key.clone(), &vec![1, 2, 3]).await;

        assert_eq!(cache.get::<Vec<i32>>(&key).await, Some(vec![1, 2, 3]));
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get::<Vec<i32>>(&key).await, None);
    }

    #[tokio::test]
    async fn test_cache_invalidate_prefix() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(QueryKey::scope("employees"), &1).await;
        cache
            .insert(QueryKey::new("employees/search", &[("q", Some("x".into()))]), &2)
            .await;
        cache.insert(QueryKey::scope("establishments"), &3).await;

        assert_eq!(cache.invalidate_prefix("employees").await, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_cached_under_normalized_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees"))
            .and(query_param("page", "1"))
            .and(query_param_is_missing("search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "employees": [employee_json("e1", "Mai")],
                "pagination": { "page": 1, "limit": 20, "total": 1, "total_pages": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = employee_service(&server);
        let first = service
            .list(&EmployeeListParams {
                page: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = service
            .list(&EmployeeListParams {
                page: Some(1),
                search: Some("   ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.employees[0].name, "Mai");
        assert_eq!(first.pagination.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_search_without_criteria_makes_no_request() {
        let server = MockServer::start().await;
        let service = employee_service(&server);

        let results = service.search("  ", None).await.unwrap();
        assert!(results.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_passes_query_and_establishment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees/search"))
            .and(query_param("q", "lin"))
            .and(query_param("establishment_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "employees": [employee_json("e9", "Lin")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = employee_service(&server)
            .search("lin", Some("42"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "e9");
    }

    #[tokio::test]
    async fn test_name_suggestions_require_two_characters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees/suggestions/names"))
            .and(query_param("q", "ma"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "suggestions": ["Mai", "Malee"] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = employee_service(&server);
        assert!(service.name_suggestions("m").await.unwrap().is_empty());
        assert_eq!(
            service.name_suggestions("ma").await.unwrap(),
            vec!["Mai".to_string(), "Malee".to_string()]
        );
    }

    #[tokio::test]
    async fn test_vote_invalidates_validation_stats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees/e1/validation-stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalVotes": 4, "existsVotes": 3, "notExistsVotes": 1, "userVote": null
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/employees/e1/validation-vote"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({ "voteType": "exists" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let service = EmployeeService::new(
            client(&server, Some("tok")),
            QueryCache::new(Duration::from_secs(300)),
        );

        let stats = service.validation_stats("e1").await.unwrap();
        assert_eq!(stats.exists_ratio(), 75);
        // Served from cache
        service.validation_stats("e1").await.unwrap();

        service.vote("e1", VoteType::Exists).await.unwrap();
        service.validation_stats("e1").await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/employees/e1/claim"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "error": "This profile is already claimed" })),
            )
            .mount(&server)
            .await;

        let err = employee_service(&server)
            .claim("e1", "This is really my profile, I work there.")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 409, .. }));
        assert_eq!(err.user_message(), "This profile is already claimed");
    }

    #[tokio::test]
    async fn test_unstructured_error_gets_fallback_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/establishments/categories"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let service = EstablishmentService::new(
            client(&server, None),
            QueryCache::new(Duration::from_secs(300)),
        );
        let err = service.categories().await.unwrap_err();
        assert_eq!(err.user_message(), "Request failed (HTTP 503)");
    }

    #[tokio::test]
    async fn test_short_claim_message_is_rejected_locally() {
        let server = MockServer::start().await;
        let err = employee_service(&server)
            .claim("e1", "mine")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removal_request_invalidates_employee_queries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/employees/e1/request-removal"))
            .and(body_json(json!({ "reason": "I no longer work in nightlife" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let service = employee_service(&server);
        service
            .cache()
            .insert(QueryKey::scope("employees"), &json!({ "employees": [] }))
            .await;

        service
            .request_removal("e1", "  I no longer work in nightlife ")
            .await
            .unwrap();
        assert!(service.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_deletion_request_uploads_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/employees/e1/deletion-request"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "message": "received" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut document = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        document
            .write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0])
            .unwrap();

        let response = employee_service(&server)
            .deletion_request(
                "e1",
                &DeletionRequest {
                    reason: "Please delete my profile and photos".to_string(),
                    contact_email: Some("me@example.com".to_string()),
                    document: document.path().to_path_buf(),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("received"));

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn test_deletion_request_rejects_unknown_document_type() {
        let server = MockServer::start().await;
        let mut document = tempfile::NamedTempFile::new().unwrap();
        document.write_all(b"just some text").unwrap();

        let err = employee_service(&server)
            .deletion_request(
                "e1",
                &DeletionRequest {
                    reason: "Please delete my profile and photos".to_string(),
                    contact_email: None,
                    document: document.path().to_path_buf(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Documents must be an image or a PDF");
    }

    #[tokio::test]
    async fn test_establishment_list_and_claim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/establishments"))
            .and(query_param("category_id", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "establishments": [{ "id": "b1", "name": "Neon Bar", "category_id": 3 }]
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/establishments/b1/claim"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let service = EstablishmentService::new(
            client(&server, None),
            QueryCache::new(Duration::from_secs(300)),
        );
        let params = EstablishmentListParams {
            category_id: Some(3),
            ..Default::default()
        };

        let list = service.list(&params).await.unwrap();
        assert_eq!(list.establishments[0].name, "Neon Bar");

        service
            .claim("b1", "I am the owner of Neon Bar since 2019")
            .await
            .unwrap();
        // Claim invalidated the list, so this goes back to the server
        service.list(&params).await.unwrap();
    }
}
