//! TCP round-trip against a running server.

mod common;

use std::time::Duration;

use tokio::net::TcpListener;

use common::{server, TemplateTree};
use mvc_core::controller::{Controller, ControllerType};
use mvc_core::{Router, Shutdown};

#[tokio::test]
async fn test_serve_and_shutdown() {
    let tree = TemplateTree::new()
        .view("greet/hello.html", "Hello, {{ name }}!")
        .layout("greet/hello.html", "<body>{{ content | safe }}</body>");
    let config = tree.config();

    let greet = ControllerType::builder("Greet")
        .action("hello", |c: &mut Controller, name: String| {
            c.assign("name", &name);
        })
        .build();
    let mut router = Router::new(&config);
    router.map("/greet", &greet);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server(config, router).run(listener, shutdown.clone()));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/greet/hello/world"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );
    assert_eq!(response.text().await.unwrap(), "<body>Hello, world!</body>");

    let missing = client
        .get(format!("http://{addr}/nowhere"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
    assert_eq!(missing.text().await.unwrap(), "404 Not found");

    drop(client);
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server stopped")
        .unwrap()
        .unwrap();
}
