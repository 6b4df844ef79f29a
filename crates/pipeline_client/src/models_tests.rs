use super::*;
use serde_json::json;

#[test]
fn test_execution_page_deserializes_service_payload() {
    let payload = json!({
        "pipelineExecutionSummaries": [
            {
                "pipelineExecutionId": "xxx",
                "status": "Succeeded",
                "startTime": "2017-04-22T03:15:07Z",
                "lastUpdateTime": "2017-04-22T03:16:47Z"
            },
            {
                "pipelineExecutionId": "yyy",
                "status": "InProgress"
            }
        ],
        "nextToken": "page-2"
    });

    let page: ListPipelineExecutionsResponse = serde_json::from_value(payload).unwrap();

    assert_eq!(page.pipeline_execution_summaries.len(), 2);
    assert_eq!(page.next_token.as_deref(), Some("page-2"));

    let first = &page.pipeline_execution_summaries[0];
    assert_eq!(first.pipeline_execution_id, "xxx");
    assert_eq!(first.status.as_deref(), Some("Succeeded"));
    assert_eq!(first.start_time.unwrap().timestamp(), 1492830907);
    assert_eq!(first.last_update_time.unwrap().timestamp(), 1492831007);

    let second = &page.pipeline_execution_summaries[1];
    assert!(second.start_time.is_none());
    assert!(second.last_update_time.is_none());
}

#[test]
fn test_execution_page_without_token_is_last_page() {
    let page: ListPipelineExecutionsResponse =
        serde_json::from_value(json!({ "pipelineExecutionSummaries": [] })).unwrap();

    assert!(page.pipeline_execution_summaries.is_empty());
    assert!(page.next_token.is_none());
}

#[test]
fn test_summary_without_status_is_accepted() {
    let summary: PipelineExecutionSummary =
        serde_json::from_value(json!({ "pipelineExecutionId": "abc" })).unwrap();

    assert!(summary.status.is_none());
}

#[test]
fn test_put_metric_data_request_uses_camel_case() {
    let request = PutMetricDataRequest {
        namespace: "Pipeline".to_string(),
        metric_data: vec![MetricDatum {
            metric_name: "SuccessCount".to_string(),
            unit: "Count".to_string(),
            value: 1.0,
            timestamp: "2017-04-22T03:16:47Z".parse().unwrap(),
            dimensions: vec![Dimension::new("PipelineName", "my-pipeline")],
        }],
    };

    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["namespace"], "Pipeline");
    assert_eq!(value["metricData"][0]["metricName"], "SuccessCount");
    assert_eq!(value["metricData"][0]["unit"], "Count");
    assert_eq!(value["metricData"][0]["value"], 1.0);
    assert_eq!(
        value["metricData"][0]["dimensions"][0],
        json!({ "name": "PipelineName", "value": "my-pipeline" })
    );
}

#[test]
fn test_metric_descriptor_dimension_value() {
    let descriptor = MetricDescriptor {
        namespace: Some("Pipeline".to_string()),
        metric_name: "SuccessCount".to_string(),
        dimensions: vec![
            Dimension::new("PipelineName", "my-pipeline"),
            Dimension::new("StageName", "build"),
        ],
    };

    assert_eq!(descriptor.dimension_value("PipelineName"), Some("my-pipeline"));
    assert_eq!(descriptor.dimension_value("StageName"), Some("build"));
    assert_eq!(descriptor.dimension_value("ActionName"), None);
}
