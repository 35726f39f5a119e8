//! End-to-end tests driving the router with `oneshot`.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use bazaar_storefront::StorefrontConfig;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "bazaar-test-boundary";

/// One browser: a router plus the session cookie it was issued.
struct Client {
    router: Router,
    cookie: Option<String>,
    uploads: TempDir,
}

impl Client {
    async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = StorefrontConfig::for_tests(uploads.path());
        let router = bazaar_storefront::app(&config).await.unwrap();
        Self {
            router,
            cookie: None,
            uploads,
        }
    }

    /// A second browser against the same shop.
    fn fresh_session(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
            uploads: tempfile::tempdir().unwrap(),
        }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response<Body> {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post_form(&mut self, uri: &str, form: &str) -> Response<Body> {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(form.to_string())).await
    }

    async fn add_product(&mut self, name: &str, price: i64, stock: i64, image: &str) -> Response<Body> {
        let body = multipart_body(
            &[
                ("name", name.to_string()),
                ("price", price.to_string()),
                ("stock", stock.to_string()),
                ("description", format!("{name} from the bazaar")),
            ],
            Some((image, b"\x89PNG fake image".as_slice())),
        );
        let builder = Request::builder()
            .method("POST")
            .uri("/admin/add")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        self.send(builder, Body::from(body)).await
    }

    async fn get_json(&mut self, uri: &str) -> Value {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        json(response).await
    }
}

fn multipart_body(fields: &[(&str, String)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

const CHECKOUT_FORM: &str = "first_name=Aziz&last_name=Karimov&phone_number=%2B998901234567\
    &email=aziz%40example.uz&address=Amir+Temur+1&city=Toshkent&region=Toshkent\
    &country=UZ&payment_type=PayByCheck";

/// Shop with A (500, stock 10) as product 1 and B (1000, stock 5) as product 2.
async fn seeded() -> Client {
    let mut client = Client::new().await;
    assert_eq!(
        client.add_product("A", 500, 10, "a.png").await.status(),
        StatusCode::SEE_OTHER
    );
    assert_eq!(
        client.add_product("B", 1000, 5, "b.jpg").await.status(),
        StatusCode::SEE_OTHER
    );
    client
}

#[tokio::test]
async fn test_first_visit_issues_session_cookie() {
    let mut client = Client::new().await;
    let response = client.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("bazaar_session=sess_"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(json(response).await, serde_json::json!([]));

    let again = client.get("/").await;
    assert!(again.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut client = Client::new().await;
    let response = client
        .send(
            Request::builder().uri("/").header("x-request-id", "abc-123"),
            Body::empty(),
        )
        .await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
}

#[tokio::test]
async fn test_admin_add_product_and_serve_image() {
    let mut client = Client::new().await;
    let response = client.add_product("Choynak", 45_000, 3, "tea pot.png").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let products = client.get_json("/").await;
    assert_eq!(products[0]["name"], "Choynak");
    assert_eq!(products[0]["price"], 45_000);
    assert_eq!(products[0]["image"], "/images/tea_pot.png");

    let product = client.get_json("/product/1").await;
    assert_eq!(product["description"], "Choynak from the bazaar");

    let image = client.get("/images/tea_pot.png").await;
    assert_eq!(image.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(image.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"\x89PNG fake image");
    assert!(client.uploads.path().join("tea_pot.png").exists());
}

#[tokio::test]
async fn test_admin_add_duplicate_name_conflicts() {
    let mut client = seeded().await;
    let response = client.add_product("A", 700, 1, "a.png").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json(response).await["error"]["code"], "CONFLICT");

    // The image saved for the rejected product is cleaned up.
    assert!(client.uploads.path().join("a.png").exists());
    assert!(!client.uploads.path().join("a_1.png").exists());
    assert_eq!(client.get_json("/").await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_add_invalid_form() {
    let mut client = Client::new().await;
    let body = multipart_body(
        &[
            ("name", String::new()),
            ("price", "cheap".to_string()),
            ("stock", "2".to_string()),
        ],
        Some(("notes.txt", b"hello".as_slice())),
    );
    let builder = Request::builder()
        .method("POST")
        .uri("/admin/add")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    let response = client.send(builder, Body::from(body)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    let fields = &body["error"]["fields"];
    assert!(fields["name"].is_array());
    assert!(fields["price"].is_array());
    assert!(fields["image"].is_array());
    assert!(fields.get("stock").is_none());
}

#[tokio::test]
async fn test_admin_add_form_metadata() {
    let mut client = Client::new().await;
    let form = client.get_json("/admin/add").await;
    assert_eq!(form["fields"][0]["name"], "name");
    assert_eq!(form["fields"][0]["max_length"], 50);
    assert!(form["image_extensions"]
        .as_array()
        .unwrap()
        .contains(&Value::from("jpe")));
}

#[tokio::test]
async fn test_cart_totals() {
    let mut client = seeded().await;

    let response = client.post_form("/add-to-cart", "id=1&quantity=2").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = client.get("/quick-add/2").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cart = client.get_json("/cart").await;
    assert_eq!(cart["grand_total"]["amount"], 2000);
    assert_eq!(cart["grand_total_plus_shipping"]["amount"], 3000);
    assert_eq!(cart["quantity_total"], 3);
    assert_eq!(cart["lines"][0]["name"], "A");
    assert_eq!(cart["lines"][0]["total"]["amount"], 1000);
    assert_eq!(cart["lines"][1]["index"], 1);
}

#[tokio::test]
async fn test_invalid_add_to_cart_is_ignored() {
    let mut client = seeded().await;
    let response = client.post_form("/add-to-cart", "id=1&quantity=lots").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cart = client.get_json("/cart").await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_remove_from_cart() {
    let mut client = seeded().await;
    client.post_form("/add-to-cart", "id=1&quantity=2").await;
    client.get("/quick-add/2").await;

    let response = client.get("/remove-from-cart/1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    let cart = client.get_json("/cart").await;
    let lines = cart["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["name"], "A");
    assert_eq!(lines[0]["quantity"], 2);

    for path in ["/remove-from-cart/5", "/remove-from-cart/abc", "/remove-from-cart/-1"] {
        let response = client.get(path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        assert_eq!(json(response).await["error"]["code"], "NOT_FOUND", "{path}");
    }

    let cart = client.get_json("/cart").await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let mut alice = seeded().await;
    let mut bob = alice.fresh_session();

    alice.get("/quick-add/1").await;
    bob.get("/quick-add/2").await;
    bob.get("/quick-add/2").await;

    let alice_cart = alice.get_json("/cart").await;
    let bob_cart = bob.get_json("/cart").await;
    assert_eq!(alice_cart["quantity_total"], 1);
    assert_eq!(bob_cart["quantity_total"], 2);
    assert_ne!(alice.cookie, bob.cookie);
}

#[tokio::test]
async fn test_checkout_draft_lists_choices() {
    let mut client = seeded().await;
    client.get("/quick-add/1").await;

    let draft = client.get_json("/checkout").await;
    assert_eq!(draft["state"], "draft");
    assert_eq!(draft["summary"]["grand_total_plus_shipping"]["amount"], 1500);
    assert_eq!(draft["choices"]["regions"].as_array().unwrap().len(), 13);
    assert_eq!(draft["choices"]["countries"][0]["value"], "UZ");
}

#[tokio::test]
async fn test_checkout_rejects_invalid_form() {
    let mut client = seeded().await;
    client.get("/quick-add/1").await;

    let response = client
        .post_form("/checkout", "first_name=Aziz&email=nope&region=Paris")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json(response).await;
    assert_eq!(body["state"], "draft");
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["region"].is_array());
    assert!(body["errors"]["last_name"].is_array());
    assert!(body["errors"].get("first_name").is_none());

    let cart = client.get_json("/cart").await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    let dashboard = client.get_json("/admin").await;
    assert_eq!(dashboard["orders"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_checkout_places_order() {
    let mut client = seeded().await;
    client.post_form("/add-to-cart", "id=1&quantity=2").await;
    client.post_form("/add-to-cart", "id=2&quantity=6").await;

    let response = client.post_form("/checkout", CHECKOUT_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let cart = client.get_json("/cart").await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 0);

    // Stock has no floor.
    assert_eq!(client.get_json("/product/1").await["stock"], 8);
    assert_eq!(client.get_json("/product/2").await["stock"], -1);

    let dashboard = client.get_json("/admin").await;
    assert_eq!(dashboard["products_in_stock"], 1);
    let orders = dashboard["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[0]["order_total"]["amount"], 1000 + 6000 + 1000);
    assert_eq!(orders[0]["quantity_total"], 8);

    let reference = orders[0]["reference"].as_str().unwrap();
    assert_eq!(reference.len(), 5);
    assert!(reference.bytes().all(|b| b.is_ascii_uppercase()));

    let id = orders[0]["id"].as_i64().unwrap();
    let detail = client.get_json(&format!("/admin/order/{id}")).await;
    assert_eq!(detail["order"]["first_name"], "Aziz");
    assert_eq!(detail["order"]["phone_number"], "+998901234567");
    assert_eq!(detail["order"]["payment_type"], "PayByCheck");
    assert_eq!(detail["lines"].as_array().unwrap().len(), 2);
    assert_eq!(detail["lines"][1]["product_name"], "B");
    assert_eq!(detail["lines"][1]["total"]["amount"], 6000);
    assert_eq!(detail["order_total"]["amount"], 8000);
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let mut client = seeded().await;

    let response = client.post_form("/checkout", CHECKOUT_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let dashboard = client.get_json("/admin").await;
    let orders = dashboard["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_total"]["amount"], 1000);
    assert_eq!(orders[0]["quantity_total"], 0);
}

#[tokio::test]
async fn test_not_found_routes() {
    let mut client = seeded().await;

    for uri in ["/product/99", "/product/abc", "/admin/order/1", "/admin/order/x"] {
        let response = client.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        assert_eq!(json(response).await["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_cart_with_unknown_product_is_not_found() {
    let mut client = seeded().await;
    client.get("/quick-add/42").await;

    let response = client.get("/cart").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
