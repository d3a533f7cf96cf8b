use mobilemart_admin::prelude::*;
use mobilemart_admin::view::EMPTY_MESSAGE;
use mobilemart_admin::ProductsClient;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate, Times};

const PRODUCT_PATH: &str = r"^/products/\d+$";

fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

fn product_a() -> Value {
    json!({
        "id": 1,
        "name": "Product A",
        "price": 100,
        "old_price": 120,
        "rating": 4,
        "reviews": 10,
        "discount": "20%"
    })
}

/// In-memory catalog behind the mock server, so reads observe earlier writes.
#[derive(Clone)]
struct Catalog {
    products: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicU64>,
    write_delay: Duration,
}

impl Catalog {
    fn new(products: Vec<Value>) -> Self {
        Self {
            products: Arc::new(Mutex::new(products)),
            next_id: Arc::new(AtomicU64::new(2)),
            write_delay: Duration::ZERO,
        }
    }

    fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    fn id_from(request: &Request) -> u64 {
        request
            .url
            .path()
            .rsplit('/')
            .next()
            .and_then(|id| id.parse().ok())
            .expect("numeric product id in path")
    }

    async fn mount_list(&self, server: &MockServer, times: impl Into<Times>) {
        let catalog = self.clone();
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(move |_: &Request| {
                let products = catalog.products.lock().unwrap().clone();
                ResponseTemplate::new(200).set_body_json(products)
            })
            .expect(times)
            .mount(server)
            .await;
    }

    async fn mount_create(&self, server: &MockServer, times: impl Into<Times>) {
        let catalog = self.clone();
        Mock::given(method("POST"))
            .and(path("/products"))
            .respond_with(move |request: &Request| {
                let mut product: Value = serde_json::from_slice(&request.body).unwrap();
                product["id"] = json!(catalog.next_id.fetch_add(1, Ordering::SeqCst));
                catalog.products.lock().unwrap().push(product.clone());
                ResponseTemplate::new(201)
                    .set_body_json(product)
                    .set_delay(catalog.write_delay)
            })
            .expect(times)
            .mount(server)
            .await;
    }

    async fn mount_update(&self, server: &MockServer, times: impl Into<Times>) {
        let catalog = self.clone();
        Mock::given(method("PUT"))
            .and(path_regex(PRODUCT_PATH))
            .respond_with(move |request: &Request| {
                let id = Catalog::id_from(request);
                let mut product: Value = serde_json::from_slice(&request.body).unwrap();
                product["id"] = json!(id);
                let mut products = catalog.products.lock().unwrap();
                for existing in products.iter_mut().filter(|p| p["id"] == json!(id)) {
                    *existing = product.clone();
                }
                ResponseTemplate::new(200).set_body_json(product)
            })
            .expect(times)
            .mount(server)
            .await;
    }

    async fn mount_delete(&self, server: &MockServer, times: impl Into<Times>) {
        let catalog = self.clone();
        Mock::given(method("DELETE"))
            .and(path_regex(PRODUCT_PATH))
            .respond_with(move |request: &Request| {
                let id = Catalog::id_from(request);
                catalog
                    .products
                    .lock()
                    .unwrap()
                    .retain(|p| p["id"] != json!(id));
                ResponseTemplate::new(200)
            })
            .expect(times)
            .mount(server)
            .await;
    }
}

fn admin_for(server: &MockServer) -> MobileMart {
    MobileMart::new(&server.uri()).expect("mock server uri is a valid base url")
}

fn titles(view: &ListView) -> Vec<String> {
    match view {
        ListView::Products(cards) => cards.iter().map(|card| card.title.clone()).collect(),
        _ => Vec::new(),
    }
}

fn fill_valid(page: &mut ProductsPage, name: &str) {
    let form = page.form_mut().expect("form is open");
    form.set(FormField::Name, name);
    form.set(FormField::Image, "https://example.com/b.jpg");
    form.set(FormField::Price, "200");
    form.set(FormField::OldPrice, "250");
}

#[tokio::test]
async fn test_renders_product_list_and_filters_by_name() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 1).await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    assert_eq!(page.list_view(), ListView::Loading);

    page.settled().await;
    assert_eq!(titles(&page.list_view()), vec!["Product A"]);
    assert_eq!(admin.store().products().len(), 1);

    page.set_search("a");
    assert_eq!(titles(&page.list_view()), vec!["Product A"]);

    page.set_search("zzz");
    assert_eq!(page.list_view(), ListView::Empty(EMPTY_MESSAGE));
    assert!(page.visible_products().is_empty());
}

#[tokio::test]
async fn test_empty_catalog_shows_empty_state() {
    init_logging();
    let server = MockServer::start().await;
    Catalog::new(Vec::new()).mount_list(&server, 1).await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    let state = page.settled().await;

    assert_eq!(state.data, Some(Vec::new()));
    assert_eq!(page.list_view(), ListView::Empty(EMPTY_MESSAGE));
}

#[tokio::test]
async fn test_invalid_form_never_reaches_the_network() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 1).await;
    catalog.mount_create(&server, 0).await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    page.settled().await;

    page.open_add();
    let err = assert_err!(page.submit_form().await);
    match err {
        Error::Validation(errors) => {
            let message = errors.get(FormField::Name).unwrap().to_lowercase();
            assert!(message.contains("name is required"));
        }
        other => panic!("Expected Error::Validation, got {:?}", other),
    }

    let form = page.form().expect("form stays open");
    assert!(form.errors().get(FormField::Price).is_some());
}

#[tokio::test]
async fn test_add_product_issues_one_create_and_shows_it() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 2).await;
    catalog.mount_create(&server, 1).await;
    catalog.mount_update(&server, 0).await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    page.settled().await;

    page.open_add();
    fill_valid(&mut page, "Product B");
    let created = assert_ok!(page.submit_form().await);
    assert_eq!(created.id, 2);
    assert!(page.form().is_none());

    page.settled().await;
    assert_eq!(titles(&page.list_view()), vec!["Product A", "Product B"]);
    assert!(admin.store().products().iter().any(|p| p.name() == "Product B"));
}

#[tokio::test]
async fn test_edit_product_issues_one_update_for_its_id() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 2).await;
    catalog.mount_create(&server, 0).await;
    catalog.mount_update(&server, 1).await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    page.settled().await;

    let product = page.visible_products().remove(0);
    page.open_edit(&product);
    assert_eq!(admin.store().selected().map(|p| p.id), Some(1));

    let form = page.form_mut().unwrap();
    form.set(FormField::Name, "Product A Updated");
    form.set(FormField::Image, "https://example.com/a.jpg");
    let updated = assert_ok!(page.submit_form().await);
    assert_eq!(updated.id, 1);

    let requests = server.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.to_string() == "PUT").unwrap();
    assert_eq!(put.url.path(), "/products/1");

    page.settled().await;
    assert_eq!(titles(&page.list_view()), vec!["Product A Updated"]);
    assert!(admin.store().selected().is_none());
}

#[tokio::test]
async fn test_confirmed_delete_removes_product() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 2).await;
    catalog.mount_delete(&server, 1).await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    page.settled().await;

    let product = page.visible_products().remove(0);
    page.request_delete(&product);
    assert_eq!(page.pending_delete().unwrap().product.id, 1);

    assert_ok!(page.confirm_delete().await);
    assert!(page.pending_delete().is_none());

    let requests = server.received_requests().await.unwrap();
    let delete = requests.iter().find(|r| r.method.to_string() == "DELETE").unwrap();
    assert_eq!(delete.url.path(), "/products/1");

    page.settled().await;
    assert_eq!(page.list_view(), ListView::Empty(EMPTY_MESSAGE));
    assert!(admin.store().products().is_empty());
}

#[tokio::test]
async fn test_cancelled_delete_issues_no_request() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 1).await;
    catalog.mount_delete(&server, 0).await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    page.settled().await;

    let product = page.visible_products().remove(0);
    page.request_delete(&product);
    page.cancel_delete();

    assert!(page.pending_delete().is_none());
    assert!(matches!(
        page.confirm_delete().await,
        Err(Error::NoPendingAction(_))
    ));
    assert_eq!(titles(&page.list_view()), vec!["Product A"]);
}

#[tokio::test]
async fn test_concurrent_list_queries_share_one_request() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([product_a()]))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = admin_for(&server);
    let mut first = admin.products_page();
    let mut second = admin.products_page();

    let ((), (), direct) =
        tokio::join!(first.load(), second.load(), admin.products().get_products());
    assert_eq!(assert_ok!(direct).len(), 1);

    first.settled().await;
    second.settled().await;
    assert_eq!(titles(&first.list_view()), titles(&second.list_view()));
}

#[tokio::test]
async fn test_failed_create_keeps_form_open_and_skips_invalidation() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database offline" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    page.settled().await;

    page.open_add();
    fill_valid(&mut page, "Product B");
    let err = assert_err!(page.submit_form().await);

    let transport = err.transport().expect("transport error");
    assert_eq!(transport.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(transport.to_string().contains("database offline"));

    assert!(page.form().is_some());
    assert!(page.query_state().is_success());
    assert_eq!(admin.store().products().len(), 1);
}

#[tokio::test]
async fn test_failed_initial_load_shows_error() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let admin = admin_for(&server);
    let mut page = admin.products_page();
    let state = page.settled().await;

    assert!(state.is_error());
    assert!(state.data.is_none());
    match page.list_view() {
        ListView::Error(message) => assert!(message.contains("maintenance")),
        other => panic!("Expected ListView::Error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_abandoned_submit_still_reaches_store_and_cache() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]).with_write_delay(Duration::from_millis(200));
    catalog.mount_list(&server, 2).await;
    catalog.mount_create(&server, 1).await;

    let admin = admin_for(&server);
    assert_eq!(assert_ok!(admin.products().get_products().await).len(), 1);

    let mut page = admin.products_page();
    page.open_add();
    fill_valid(&mut page, "Product B");
    let submit = tokio::time::timeout(Duration::from_millis(50), page.submit_form()).await;
    assert!(submit.is_err());
    drop(page);

    tokio::time::sleep(Duration::from_millis(500)).await;
    let names: Vec<String> = admin
        .store()
        .products()
        .iter()
        .map(|product| product.name().to_string())
        .collect();
    assert_eq!(names, vec!["Product A", "Product B"]);

    // The write invalidated the list, so this read goes back to the server.
    let products = assert_ok!(admin.products().get_products().await);
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn test_abandoned_list_query_still_fills_store_and_cache() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([product_a()]))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = admin_for(&server);
    let load = tokio::time::timeout(Duration::from_millis(50), admin.products().get_products()).await;
    assert!(load.is_err());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(admin.store().products().len(), 1);
    assert_eq!(assert_ok!(admin.products().get_products().await).len(), 1);
}

#[tokio::test]
async fn test_custom_backend_carries_no_http_options() {
    init_logging();
    let server = MockServer::start().await;
    let catalog = Catalog::new(vec![product_a()]);
    catalog.mount_list(&server, 1).await;

    let backend = assert_ok!(ProductsClient::new(&server.uri(), reqwest::Client::new()));
    let admin = MobileMart::with_backend(Arc::new(backend), Theme::Dark);
    assert!(admin.options.is_none());
    assert_eq!(admin.theme(), Theme::Dark);

    let mut page = admin.products_page();
    page.settled().await;
    assert_eq!(titles(&page.list_view()), vec!["Product A"]);

    let configured = admin_for(&server);
    assert_eq!(configured.options.map(|options| options.base_url), Some(server.uri()));
}
