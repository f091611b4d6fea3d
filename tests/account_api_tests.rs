mod utils;

use axum::http::StatusCode;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

use simplebank::{db::InMemoryStore, Account, MockStore, StoreError};
use utils::{assert_body_matches_account, assert_error_body, random_account, TestServerBuilder};

const CONNECTION_FAILURE: &str = "connection refused: db-primary:5432";

#[derive(Debug, Clone, Copy)]
enum StoreBehavior {
    Returns,
    NotFound,
    ConnectionFailure,
}

#[derive(Debug, Clone, Copy)]
enum Auth {
    Valid,
    Missing,
    Expired,
    Garbage,
}

fn mock_store(account: &Account, behavior: StoreBehavior) -> Arc<MockStore> {
    let account = account.clone();
    Arc::new(MockStore::new().expect_get_account(move |_| match behavior {
        StoreBehavior::Returns => Ok(account.clone()),
        StoreBehavior::NotFound => Err(StoreError::NotFound),
        StoreBehavior::ConnectionFailure => {
            Err(StoreError::Connection(CONNECTION_FAILURE.to_string()))
        }
    }))
}

#[rstest]
#[case::ok(StoreBehavior::Returns, Auth::Valid, StatusCode::OK, 1)]
#[case::not_found(StoreBehavior::NotFound, Auth::Valid, StatusCode::NOT_FOUND, 1)]
#[case::internal_error(
    StoreBehavior::ConnectionFailure,
    Auth::Valid,
    StatusCode::INTERNAL_SERVER_ERROR,
    1
)]
#[case::no_authorization(StoreBehavior::Returns, Auth::Missing, StatusCode::UNAUTHORIZED, 0)]
#[case::expired_token(StoreBehavior::Returns, Auth::Expired, StatusCode::UNAUTHORIZED, 0)]
#[case::invalid_token(StoreBehavior::Returns, Auth::Garbage, StatusCode::UNAUTHORIZED, 0)]
#[tokio::test]
async fn get_account_api(
    #[case] behavior: StoreBehavior,
    #[case] auth: Auth,
    #[case] expected_status: StatusCode,
    #[case] expected_calls: usize,
) {
    let account = random_account();
    let store = mock_store(&account, behavior);
    let server = TestServerBuilder::new(store.clone()).build();

    let header = match auth {
        Auth::Valid => Some(server.bearer(&account.owner)),
        Auth::Missing => None,
        Auth::Expired => Some(server.expired_bearer(&account.owner)),
        Auth::Garbage => Some("Bearer v1.local.AAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string()),
    };

    let (status, body) = server
        .get(&format!("/accounts/{}", account.id), header.as_deref())
        .await;

    assert_eq!(status, expected_status);
    assert_eq!(store.get_account_calls().len(), expected_calls);
    if expected_calls == 1 {
        assert_eq!(store.get_account_calls(), vec![account.id]);
    }

    match status {
        StatusCode::OK => assert_body_matches_account(&body, &account),
        _ => assert_error_body(&body, Some(CONNECTION_FAILURE)),
    }
}

#[rstest]
#[case::zero("0")]
#[case::negative("-42")]
#[case::non_numeric("abc")]
#[case::fractional("4.2")]
#[case::overflow("9223372036854775808")]
#[tokio::test]
async fn get_account_invalid_id_never_reaches_store(#[case] raw_id: &str) {
    let account = random_account();
    let store = mock_store(&account, StoreBehavior::Returns);
    let server = TestServerBuilder::new(store.clone()).build();

    let header = server.bearer(&account.owner);
    let (status, body) = server
        .get(&format!("/accounts/{}", raw_id), Some(header.as_str()))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, None);
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn invalid_id_is_rejected_before_credentials() {
    let store = Arc::new(MockStore::new());
    let server = TestServerBuilder::new(store.clone()).build();

    let (status, _) = server.get("/accounts/0", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.total_calls(), 0);
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(i64::MAX)]
#[tokio::test]
async fn not_found_regardless_of_id(#[case] id: i64) {
    let store = Arc::new(MockStore::new().expect_get_account(|_| Err(StoreError::NotFound)));
    let server = TestServerBuilder::new(store.clone()).build();

    let header = server.bearer("alice");
    let (status, _) = server
        .get(&format!("/accounts/{}", id), Some(header.as_str()))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.get_account_calls(), vec![id]);
}

#[tokio::test]
async fn database_errors_never_leak() {
    let detail = "relation \"accounts\" does not exist";
    let store = Arc::new(
        MockStore::new().expect_get_account(move |_| Err(StoreError::Database(detail.to_string()))),
    );
    let server = TestServerBuilder::new(store).build();

    let header = server.bearer("alice");
    let (status, body) = server.get("/accounts/5", Some(header.as_str())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_body(&body, Some("relation"));
}

struct SlowStore;

#[async_trait::async_trait]
impl simplebank::Store for SlowStore {
    async fn get_account(&self, _id: i64) -> Result<Account, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(StoreError::NotFound)
    }
    async fn create_account(
        &self,
        _params: simplebank::db::CreateAccountParams,
    ) -> Result<Account, StoreError> {
        unimplemented!()
    }
    async fn list_accounts(
        &self,
        _params: simplebank::db::ListAccountsParams,
    ) -> Result<Vec<Account>, StoreError> {
        unimplemented!()
    }
    async fn create_user(
        &self,
        _params: simplebank::db::CreateUserParams,
    ) -> Result<simplebank::db::User, StoreError> {
        unimplemented!()
    }
    async fn get_user(&self, _username: &str) -> Result<simplebank::db::User, StoreError> {
        unimplemented!()
    }
}

#[tokio::test]
async fn slow_store_is_abandoned() {
    let server = TestServerBuilder::new(Arc::new(SlowStore))
        .with_store_timeout(Duration::from_millis(50))
        .build();

    let header = server.bearer("alice");
    let (status, _) = server.get("/accounts/5", Some(header.as_str())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn request_deadline_before_store_deadline_is_internal_error() {
    let server = TestServerBuilder::new(Arc::new(SlowStore))
        .with_store_timeout(Duration::from_secs(10))
        .with_request_timeout(Duration::from_millis(50))
        .build();

    let header = server.bearer("alice");
    let (status, body) = server.get("/accounts/5", Some(header.as_str())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_body(&body, None);
}

#[rstest]
#[case::page_id_max("/accounts?page_id=9223372036854775807&page_size=10")]
#[case::offset_just_past_range("/accounts?page_id=1844674407370955163&page_size=5")]
#[case::page_id_not_a_number("/accounts?page_id=99999999999999999999&page_size=5")]
#[tokio::test]
async fn list_accounts_out_of_range_page_is_bad_request(#[case] uri: &str) {
    let store = Arc::new(MockStore::new());
    let server = TestServerBuilder::new(store.clone()).build();

    let header = server.bearer("alice");
    let (status, body) = server.get(uri, Some(header.as_str())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, None);
    assert_eq!(store.total_calls(), 0);
}

/// Account 42 owned by alice, end to end over the in-memory store
#[tokio::test]
async fn concrete_scenario() {
    let alice = Account {
        id: 42,
        owner: "alice".to_string(),
        balance: 1000,
        currency: "USD".to_string(),
    };

    let server = TestServerBuilder::new(Arc::new(InMemoryStore::with_accounts(vec![alice.clone()])))
        .build();
    let header = server.bearer("alice");

    let (status, body) = server.get("/accounts/42", Some(header.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_body_matches_account(&body, &alice);

    let (status, _) = server.get("/accounts/0", Some(header.as_str())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.get("/accounts/43", Some(header.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let failing = Arc::new(MockStore::new().expect_get_account(|_| {
        Err(StoreError::Connection("broken pipe".to_string()))
    }));
    let server = TestServerBuilder::new(failing).build();
    let header = server.bearer("alice");
    let (status, _) = server.get("/accounts/42", Some(header.as_str())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn register_login_and_open_account() {
    let server = TestServerBuilder::new(Arc::new(InMemoryStore::new())).build();

    let (status, _) = server
        .post_json(
            "/users",
            None,
            serde_json::json!({
                "username": "alice",
                "password": "secret123",
                "full_name": "Alice Liddell",
                "email": "alice@email.com"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .post_json(
            "/users/login",
            None,
            serde_json::json!({"username": "alice", "password": "secret123"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let login: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let header = format!("Bearer {}", login["access_token"].as_str().unwrap());

    let (status, body) = server
        .post_json("/accounts", Some(header.as_str()), serde_json::json!({"currency": "USD"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let account: Account = serde_json::from_slice(&body).unwrap();
    assert_eq!(account.owner, "alice");

    let (status, body) = server
        .get(&format!("/accounts/{}", account.id), Some(header.as_str()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_body_matches_account(&body, &account);

    let (status, body) = server
        .get("/accounts?page_id=1&page_size=5", Some(header.as_str()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let accounts: Vec<Account> = serde_json::from_slice(&body).unwrap();
    assert_eq!(accounts, vec![account]);
}
