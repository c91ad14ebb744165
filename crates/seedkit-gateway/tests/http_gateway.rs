use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use seedkit_core::{AccountKind, OperationKind};
use seedkit_gateway::{Gateway, GatewayOptions, HttpGateway, TransportError};

async fn create_user(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"].as_str().is_none() || body["phoneNumber"].as_str().is_none() {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "bad user" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "user": {
                "id": "user-1",
                "email": body["email"],
                "lastName": body["lastName"],
                "firstName": body["firstName"],
                "middleName": body["middleName"],
                "phoneNumber": body["phoneNumber"]
            }
        })),
    )
}

async fn open_credit_card_account(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "account": {
            "id": format!("account-of-{}", body["userId"].as_str().unwrap_or("?")),
            "type": "CREDIT_CARD",
            "cards": [{ "id": "card-1" }, { "id": "card-2" }]
        }
    }))
}

async fn make_purchase(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["category"].as_str().is_none() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "category" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "operation": {
                "id": "operation-1",
                "type": "PURCHASE",
                "status": body["status"],
                "amount": body["amount"],
                "cardId": body["cardId"],
                "accountId": body["accountId"]
            }
        })),
    )
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/v1/users", post(create_user))
        .route(
            "/api/v1/accounts/open-credit-card-account",
            post(open_credit_card_account),
        )
        .route(
            "/api/v1/accounts/open-deposit-account",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/api/v1/operations/make-purchase-operation", post(make_purchase))
        .route(
            "/api/v1/operations/make-fee-operation",
            post(|| async { "not json" }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind backend");
    let addr = listener.local_addr().expect("backend addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve backend");
    });
    format!("http://{addr}")
}

async fn gateway() -> HttpGateway {
    let options = GatewayOptions {
        base_url: spawn_backend().await,
        timeout_secs: 5,
        ..GatewayOptions::default()
    };
    HttpGateway::new(options).expect("build gateway")
}

#[tokio::test]
async fn creates_user_then_account_then_operation() {
    let gateway = gateway().await;

    let user = gateway.create_user().await.expect("create user");
    assert_eq!(user.id, "user-1");
    assert!(user.email.ends_with("@example.com"));

    let account = gateway
        .open_account(&user.id, AccountKind::CreditCard)
        .await
        .expect("open account");
    assert_eq!(account.id, "account-of-user-1");
    assert_eq!(account.card_ids, vec!["card-1", "card-2"]);
    assert_eq!(account.owner_user_id, "user-1");

    let operation = gateway
        .record_operation(&account.id, Some("card-1"), OperationKind::Purchase, 77.99)
        .await
        .expect("record purchase");
    assert_eq!(operation.id, "operation-1");
    assert_eq!(operation.status, "COMPLETED");
    assert_eq!(operation.card_id.as_deref(), Some("card-1"));
    assert!((operation.amount - 77.99).abs() < f64::EPSILON);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let gateway = gateway().await;
    let err = gateway
        .open_account("user-1", AccountKind::Deposit)
        .await
        .expect_err("deposit endpoint fails");
    match err {
        TransportError::Status {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, "/api/v1/accounts/open-deposit-account");
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let gateway = gateway().await;
    let err = gateway
        .record_operation("account-1", None, OperationKind::Fee, 1.0)
        .await
        .expect_err("fee endpoint returns text");
    assert!(matches!(err, TransportError::Decode { .. }));
}

#[tokio::test]
async fn missing_route_is_a_status_error() {
    let gateway = gateway().await;
    let err = gateway
        .record_operation("account-1", None, OperationKind::Cashback, 1.0)
        .await
        .expect_err("cashback route not served");
    assert!(matches!(err, TransportError::Status { status: 404, .. }));
}
