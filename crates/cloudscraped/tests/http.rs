//! HTTP surface tests.
//!
//! Drives the router with `oneshot` requests against an exporter whose
//! client factory hands out a scripted in-memory CloudWatch.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use cloudscrape_aws::ClientSettings;
use cloudscrape_core::{Dimension, DimensionSet, Statistic};
use cloudscrape_engine::testing::MockCloudWatch;
use cloudscrape_engine::{CloudWatchApi, Datapoint};
use cloudscraped::{ClientFactory, ClientFuture, Exporter, build_router};
use tower::ServiceExt;

const CONFIG: &str = r#"
region = "us-east-1"

[[metrics]]
aws_namespace = "AWS/ELB"
aws_metric_name = "RequestCount"
aws_dimensions = ["LoadBalancerName"]
aws_statistics = ["Sum"]
"#;

fn mock() -> Arc<MockCloudWatch> {
    let lb = DimensionSet::from(vec![Dimension::new("LoadBalancerName", "myLB")]);
    Arc::new(
        MockCloudWatch::new()
            .with_list_pages("AWS/ELB", "RequestCount", vec![vec![lb.clone()]])
            .with_datapoints(
                "AWS/ELB",
                "RequestCount",
                lb,
                vec![Datapoint::new(Utc::now()).with_value(Statistic::Sum, 42.0)],
            ),
    )
}

fn factory(client: Arc<MockCloudWatch>) -> ClientFactory {
    Arc::new(move |_: ClientSettings| -> ClientFuture {
        let client = client.clone() as Arc<dyn CloudWatchApi>;
        Box::pin(async move { anyhow::Ok(client) })
    })
}

async fn setup(content: &str) -> (tempfile::NamedTempFile, Arc<Exporter>) {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), content).unwrap();
    let exporter = Arc::new(Exporter::load(file.path(), factory(mock())).await.unwrap());
    (file, exporter)
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn home_page_links_metrics() {
    let (_file, exporter) = setup(CONFIG).await;
    let resp = build_router(exporter).oneshot(get("/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("href=\"/metrics\""));
}

#[tokio::test]
async fn metrics_exposes_scrape_and_meta_metrics() {
    let (_file, exporter) = setup(CONFIG).await;
    let resp = build_router(exporter).oneshot(get("/metrics")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/plain; version=0.0.4"));

    let body = body_string(resp).await;
    assert!(body.contains("# TYPE aws_elb_request_count_sum gauge\n"));
    assert!(body.contains(
        "aws_elb_request_count_sum{job=\"aws_elb\",instance=\"\",load_balancer_name=\"myLB\"} 42\n"
    ));
    assert!(body.contains("cloudwatch_exporter_scrape_error 0\n"));
    assert!(body.contains("# TYPE cloudwatch_exporter_scrape_duration_seconds gauge\n"));
    // One ListMetrics plus one GetMetricStatistics.
    assert!(body.contains("cloudwatch_requests_total 2\n"));
}

#[tokio::test]
async fn reload_requires_post() {
    let (_file, exporter) = setup(CONFIG).await;
    let resp = build_router(exporter).oneshot(get("/-/reload")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_string(resp).await, "Only POST requests allowed");
}

#[tokio::test]
async fn reload_picks_up_new_rules() {
    let (file, exporter) = setup(CONFIG).await;
    let router = build_router(exporter.clone());

    std::fs::write(
        file.path(),
        r#"
region = "us-east-1"

[[metrics]]
aws_namespace = "AWS/SQS"
aws_metric_name = "NumberOfMessagesSent"
"#,
    )
    .unwrap();

    let resp = router.clone().oneshot(post("/-/reload")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "OK");
    assert_eq!(exporter.collector().active().rules[0].namespace, "AWS/SQS");

    let body = body_string(router.oneshot(get("/metrics")).await.unwrap()).await;
    assert!(!body.contains("aws_elb_request_count_sum"));
}

#[tokio::test]
async fn failed_reload_returns_500_and_keeps_serving() {
    let (file, exporter) = setup(CONFIG).await;
    let router = build_router(exporter);

    std::fs::write(file.path(), "region = \"us-east-1\"\n").unwrap();

    let resp = router.clone().oneshot(post("/-/reload")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(resp).await.contains("metrics"));

    let body = body_string(router.oneshot(get("/metrics")).await.unwrap()).await;
    assert!(body.contains("aws_elb_request_count_sum"));
}
