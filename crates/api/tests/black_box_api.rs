use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use storefront_api::app::{AppServices, routes::router_with};
use storefront_catalog::Product;
use storefront_core::ProductId;

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve the production router on an ephemeral port, with a seeded
    /// catalog.
    async fn spawn() -> Self {
        let services = AppServices::build();
        services.catalog.seed(Product {
            id: ProductId::new("p1").unwrap(),
            name: "Headphones".to_string(),
            price: 15,
            offer_price: 10,
            category: "audio".to_string(),
            image_url: String::new(),
        });
        services.catalog.seed(Product {
            id: ProductId::new("p2").unwrap(),
            name: "Keyboard".to_string(),
            price: 30,
            offer_price: 25,
            category: "accessories".to_string(),
            image_url: String::new(),
        });

        let app = router_with(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.services.shutdown();
        self.handle.abort();
    }
}

async fn poll_until<F, Fut>(deadline_ms: u64, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(deadline_ms);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    check().await
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn caller_scoped_routes_require_the_identity_header() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/cart", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identity_webhook_creates_the_user_then_cart_round_trips() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/events", server.base_url))
        .json(&json!({
            "kind": "created",
            "id": "user_1",
            "email": "ada@example.com",
            "name": "Ada",
            "imageUrl": ""
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The webhook is asynchronous: the user becomes visible once the
    // dispatcher has applied the event.
    let base = server.base_url.clone();
    let c = client.clone();
    assert!(
        poll_until(3000, move || {
            let base = base.clone();
            let c = c.clone();
            async move {
                c.get(format!("{base}/api/cart"))
                    .header("x-user-id", "user_1")
                    .send()
                    .await
                    .map(|r| r.status() == StatusCode::OK)
                    .unwrap_or(false)
            }
        })
        .await
    );

    let res = client
        .post(format!("{}/api/cart/update", server.base_url))
        .header("x-user-id", "user_1")
        .json(&json!({ "cart": { "p1": 2, "p2": 0 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = client
        .get(format!("{}/api/cart", server.base_url))
        .header("x-user-id", "user_1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // Zero-quantity entries are normalized away.
    assert_eq!(body["cart"], json!({ "p1": 2 }));
}

#[tokio::test]
async fn negative_cart_quantities_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/cart/update", server.base_url))
        .header("x-user-id", "user_1")
        .json(&json!({ "cart": { "p1": -1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_cart");
}

#[tokio::test]
async fn unsupported_event_kinds_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/events", server.base_url))
        .json(&json!({ "kind": "payment/settled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unsupported_event_kind");
}

#[tokio::test]
async fn checkout_flows_through_the_batcher_into_order_history() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Address first; checkout without one is rejected.
    let res = client
        .post(format!("{}/api/order/create", server.base_url))
        .header("x-user-id", "user_1")
        .json(&json!({ "items": [{ "product": "p1", "quantity": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = client
        .post(format!("{}/api/user/add-address", server.base_url))
        .header("x-user-id", "user_1")
        .json(&json!({
            "fullName": "Ada Lovelace",
            "phoneNumber": "555-0100",
            "pincode": "00001",
            "area": "North",
            "city": "London",
            "state": "LDN"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let address_id = body["address"]["id"].as_str().unwrap().to_string();

    let body: serde_json::Value = client
        .post(format!("{}/api/order/create", server.base_url))
        .header("x-user-id", "user_1")
        .json(&json!({
            "address": address_id,
            "items": [
                { "product": "p1", "quantity": 2 },
                { "product": "p2", "quantity": 1 }
            ]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Order Placed");
    // 2*10 + 1*25 = 45, 2% tax floors to 0.
    assert_eq!(body["amount"], 45);

    // A lone order is persisted once its batch window times out.
    let base = server.base_url.clone();
    let c = client.clone();
    assert!(
        poll_until(8000, move || {
            let base = base.clone();
            let c = c.clone();
            async move {
                let Ok(res) = c
                    .get(format!("{base}/api/order/list"))
                    .header("x-user-id", "user_1")
                    .send()
                    .await
                else {
                    return false;
                };
                let Ok(body) = res.json::<serde_json::Value>().await else {
                    return false;
                };
                body["orders"].as_array().map(|a| a.len()) == Some(1)
            }
        })
        .await
    );

    let body: serde_json::Value = client
        .get(format!("{}/api/order/list", server.base_url))
        .header("x-user-id", "user_1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order = &body["orders"][0];
    assert_eq!(order["amount"], 45);
    assert_eq!(order["status"], "Order Placed");
    assert_eq!(order["address"]["fullName"], "Ada Lovelace");

    // Checkout cleared the stored cart for a known user; user_1 was never
    // created here, so there is no stored cart to check — the product join
    // on the listed order is the meaningful assertion.
    let products: Vec<&str> = order["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["product"]["id"].as_str().unwrap())
        .collect();
    assert!(products.contains(&"p1") && products.contains(&"p2"));
}

#[tokio::test]
async fn product_list_returns_the_seeded_catalog() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(format!("{}/api/product/list", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
}
