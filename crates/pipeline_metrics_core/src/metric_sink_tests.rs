//! Tests for observation delivery.

use super::*;
use crate::errors::MetricsError;
use crate::metric_deriver::{MetricName, MetricUnit};
use crate::test_support::{at, MockMetricsClient};
use pipeline_client::models::Dimension;

fn observation(name: MetricName, value: f64) -> MetricObservation {
    MetricObservation {
        name,
        unit: name.unit(),
        value,
        timestamp: at(1_492_831_007_000),
        dimensions: vec![Dimension::new("PipelineName", "my-pipeline")],
    }
}

#[tokio::test]
async fn test_publish_sends_one_batch() {
    let client = MockMetricsClient::new();
    let observations = vec![
        observation(MetricName::SuccessCount, 1.0),
        observation(MetricName::SuccessLeadTime, 100.0),
    ];

    publish_observations(&client, DEFAULT_NAMESPACE, &observations)
        .await
        .unwrap();

    let calls = client.put_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Pipeline");
    assert_eq!(calls[0].1.len(), 2);
    assert_eq!(calls[0].1[0].metric_name, "SuccessCount");
    assert_eq!(calls[0].1[0].unit, MetricUnit::Count.as_str());
    assert_eq!(calls[0].1[1].metric_name, "SuccessLeadTime");
    assert_eq!(calls[0].1[1].value, 100.0);
}

#[tokio::test]
async fn test_publish_with_no_observations_sends_nothing() {
    let client = MockMetricsClient::new();

    publish_observations(&client, DEFAULT_NAMESPACE, &[])
        .await
        .unwrap();

    assert!(client.put_calls().is_empty());
}

#[tokio::test]
async fn test_publish_uses_given_namespace() {
    let client = MockMetricsClient::new();

    publish_observations(
        &client,
        "Delivery",
        &[observation(MetricName::FailureCount, 1.0)],
    )
    .await
    .unwrap();

    assert_eq!(client.put_calls()[0].0, "Delivery");
}

#[tokio::test]
async fn test_publish_propagates_client_failure() {
    let client = MockMetricsClient::failing_writes();

    let result = publish_observations(
        &client,
        DEFAULT_NAMESPACE,
        &[observation(MetricName::SuccessCount, 1.0)],
    )
    .await;

    assert!(matches!(
        result,
        Err(MetricsError::Client(pipeline_client::Error::RateLimitExceeded))
    ));
    assert_eq!(client.put_calls().len(), 1);
}
