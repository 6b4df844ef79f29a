//! Dashboard documents built from the metrics already recorded.
//!
//! Two dashboards are supported:
//!
//! - the summary dashboard (`Pipelines-{region}`), one single-value row of
//!   30-day totals per pipeline plus a legend;
//! - the trend dashboard (`PipelineTrends-{region}`), a row of explanatory
//!   text followed by four time-series widgets per pipeline covering
//!   deployment frequency, lead time, MTBF and MTTR.
//!
//! Pipelines are discovered by listing the metrics in the namespace and
//! collecting their `PipelineName` dimension values.

use pipeline_client::MetricsClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

use crate::errors::MetricsResult;
use crate::event::PIPELINE_NAME_DIMENSION;
use crate::metric_deriver::MetricName;

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;

const SUMMARY_DASHBOARD_PREFIX: &str = "Pipelines-";
const TREND_DASHBOARD_PREFIX: &str = "PipelineTrends-";

const ONE_DAY: u32 = 60 * 60 * 24;
const THIRTY_DAYS: u32 = ONE_DAY * 30;

const SUMMARY_ROW_HEIGHT: u32 = 3;
const SUMMARY_ROW_WIDTH: u32 = 18;

const TEXT_HEIGHT: u32 = 4;
const TEXT_WIDTH: u32 = 4;
const WIDGET_HEIGHT: u32 = 6;
const WIDGET_WIDTH: u32 = 12;

const ANNOTATION_ELITE_COLOUR: &str = "#98df8a";
const ANNOTATION_HIGH_COLOUR: &str = "#dbdb8d";
const MEAN_COLOUR: &str = "#2ca02c";
const TREND_COLOUR: &str = "#ff7f0e";
const RANGE_COLOUR: &str = "#1f77b4";

const SUMMARY_LEGEND: &str = "\nAll metrics are calculated over the past 30 days\n\n\
* **SuccessCount** - count of all successful pipeline executions\n\
* **FailureCount** - count of all failed pipeline executions\n\
* **CycleTime** - average pipeline time for successful executions\n\
* **RedTime** - sum of all time spent with a red pipeline\n\
* **GreenTime** - sum of all time spent with a green pipeline\n";

/// Which dashboard to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Summary,
    Trend,
}

impl DashboardKind {
    pub fn dashboard_name(&self, region: &str) -> String {
        match self {
            DashboardKind::Summary => format!("{SUMMARY_DASHBOARD_PREFIX}{region}"),
            DashboardKind::Trend => format!("{TREND_DASHBOARD_PREFIX}{region}"),
        }
    }
}

/// Size limits of the dashboard service, used to cap the trend dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    pub max_metrics_per_dashboard: usize,
    pub metrics_per_widget: usize,
    pub widgets_per_pipeline: usize,
}

impl DashboardLimits {
    pub fn new(max_metrics_per_dashboard: usize) -> Self {
        Self {
            max_metrics_per_dashboard,
            ..Self::default()
        }
    }

    /// How many pipelines fit on one trend dashboard.
    pub fn max_pipelines(&self) -> usize {
        let per_pipeline = self.metrics_per_widget * self.widgets_per_pipeline;
        if per_pipeline == 0 {
            return 0;
        }
        self.max_metrics_per_dashboard / per_pipeline
    }
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self {
            max_metrics_per_dashboard: 500,
            metrics_per_widget: 4,
            widgets_per_pipeline: 4,
        }
    }
}

/// A complete dashboard body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Metric,
    Text,
}

/// One positioned widget on the dashboard grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub properties: Value,
}

impl Widget {
    fn text(x: u32, y: u32, width: u32, height: u32, markdown: &str) -> Self {
        Self {
            widget_type: WidgetType::Text,
            x,
            y,
            width,
            height,
            properties: json!({ "markdown": markdown }),
        }
    }
}

/// Lists every pipeline that has metrics in `namespace`.
///
/// Follows continuation tokens until the listing is exhausted. The result is
/// deduplicated and sorted.
///
/// # Errors
///
/// Returns the metrics client failure unchanged.
#[instrument(skip(client))]
pub async fn collect_pipeline_names(
    client: &dyn MetricsClient,
    namespace: &str,
) -> MetricsResult<Vec<String>> {
    let mut names = BTreeSet::new();
    let mut next_token: Option<String> = None;

    loop {
        let response = client.list_metrics(namespace, next_token.as_deref()).await?;
        for metric in &response.metrics {
            for dimension in &metric.dimensions {
                if dimension.name == PIPELINE_NAME_DIMENSION {
                    names.insert(dimension.value.clone());
                }
            }
        }

        next_token = response.next_token.filter(|token| !token.is_empty());
        if next_token.is_none() {
            break;
        }
    }

    debug!(count = names.len(), "Collected pipeline names");
    Ok(names.into_iter().collect())
}

/// Builds the summary dashboard: one row of 30-day totals per pipeline.
pub fn render_summary_dashboard(
    pipeline_names: &[String],
    region: &str,
    namespace: &str,
) -> DashboardDocument {
    let mut widgets: Vec<Widget> = pipeline_names
        .iter()
        .enumerate()
        .map(|(index, pipeline_name)| Widget {
            widget_type: WidgetType::Metric,
            x: 0,
            y: (index as u32 + 1) * SUMMARY_ROW_HEIGHT,
            width: SUMMARY_ROW_WIDTH,
            height: SUMMARY_ROW_HEIGHT,
            properties: json!({
                "view": "singleValue",
                "metrics": [
                    [namespace, MetricName::SuccessCount.as_str(), PIPELINE_NAME_DIMENSION, pipeline_name,
                        { "stat": "Sum", "period": THIRTY_DAYS }],
                    [".", MetricName::FailureCount.as_str(), ".", ".",
                        { "stat": "Sum", "period": THIRTY_DAYS }],
                    [".", MetricName::SuccessCycleTime.as_str(), ".", ".",
                        { "period": THIRTY_DAYS, "color": "#9467bd", "label": "CycleTime" }],
                    [".", MetricName::RedTime.as_str(), ".", ".",
                        { "stat": "Sum", "period": THIRTY_DAYS, "yAxis": "left", "color": "#d62728" }],
                    [".", MetricName::GreenTime.as_str(), ".", ".",
                        { "period": THIRTY_DAYS, "stat": "Sum", "color": MEAN_COLOUR }]
                ],
                "region": region,
                "title": pipeline_name,
                "period": 300
            }),
        })
        .collect();

    widgets.push(Widget::text(18, 0, 6, 6, SUMMARY_LEGEND));

    DashboardDocument {
        start: None,
        widgets,
    }
}

struct TextPanel {
    title: &'static str,
    description: &'static str,
    width: u32,
}

const TREND_TEXT_PANELS: [TextPanel; 5] = [
    TextPanel {
        title: "Deployment Frequency",
        description: "How often code is deployed **to production**.  **Higher = better**.\n\n\
Deploying changes more frequently, in smaller increments, correlates with success.\n\n\
Elite performers deploy multiple times per day.",
        width: TEXT_WIDTH,
    },
    TextPanel {
        title: "Lead Time",
        description: "Time from code commit to running in production, including rework.  **Lower = better**.\n\n\
Reducing lead times reduces cost to value, and improves agility.\n\n\
Elite performers have lead times less than 1 day.",
        width: TEXT_WIDTH,
    },
    TextPanel {
        title: "MTBF",
        description: "Mean time between pipeline failures.  **Higher = better**\n\n\
A stable pipeline improves *Lead Time* and *Deployment Frequency*.\n\n\
An unstable pipeline suggests systemic quality issues that need to be addressed.",
        width: TEXT_WIDTH,
    },
    TextPanel {
        title: "MTTR",
        description: "Mean time to fix a failing pipeline.  **Lower = better**\n\n\
High MTTR negatively affects *Lead Time* and *Deployment Frequency*.\n\n\
When the pipeline fails, the team should \"stop the line\" and swarm to fix it.",
        width: TEXT_WIDTH,
    },
    TextPanel {
        title: "Interpreting the Graphs",
        description: "Each metric is graphed on a daily basis.  There may be gaps in the data if the pipeline did not run.\n\n\
Charts show the 30-day trend, with p10,p50 and p90 trends. \
A wide range between p10 + p90 indicates a large variation and outliers. \
This indicates the metric is uncontrolled.  Work to narrow the variance for improved consistency.\n\n\
Graphs with annotations show performance in relation to the DORA State of DevOps report.  \
The green area indicates elite performers; yellow high performers",
        width: 2 * TEXT_WIDTH,
    },
];

/// Seconds-to-display conversion for a trend widget.
#[derive(Debug, Clone, Copy)]
struct DisplayUnit {
    seconds: u32,
    label: &'static str,
}

const MINUTES: DisplayUnit = DisplayUnit {
    seconds: 60,
    label: "minutes",
};
const HOURS: DisplayUnit = DisplayUnit {
    seconds: 60 * 60,
    label: "hours",
};
const DAYS: DisplayUnit = DisplayUnit {
    seconds: ONE_DAY,
    label: "days",
};

struct TrendMapping {
    x: u32,
    y_offset: u32,
    label: &'static str,
    metric: MetricName,
    unit: DisplayUnit,
    with_annotations: bool,
}

const TREND_MAPPINGS: [TrendMapping; 3] = [
    TrendMapping {
        x: WIDGET_WIDTH,
        y_offset: 0,
        label: "Lead Time",
        metric: MetricName::DeliveryLeadTime,
        unit: MINUTES,
        with_annotations: true,
    },
    TrendMapping {
        x: 0,
        y_offset: WIDGET_HEIGHT,
        label: "MTBF",
        metric: MetricName::GreenTime,
        unit: DAYS,
        with_annotations: false,
    },
    TrendMapping {
        x: WIDGET_WIDTH,
        y_offset: WIDGET_HEIGHT,
        label: "MTTR",
        metric: MetricName::RedTime,
        unit: HOURS,
        with_annotations: false,
    },
];

fn deployment_frequency_widget(pipeline_name: &str, y: u32, region: &str, namespace: &str) -> Widget {
    Widget {
        widget_type: WidgetType::Metric,
        x: 0,
        y,
        width: WIDGET_WIDTH,
        height: WIDGET_HEIGHT,
        properties: json!({
            "metrics": [
                [{ "expression": "FILL(m2,0)", "id": "e2", "period": ONE_DAY, "region": region,
                   "yAxis": "left", "color": TREND_COLOUR, "label": "Deployment Frequency" }],
                [{ "expression": format!("m6/PERIOD(m6) * {ONE_DAY}"), "label": "Average (30d)",
                   "id": "e1", "color": MEAN_COLOUR }],
                [namespace, MetricName::SuccessCount.as_str(), PIPELINE_NAME_DIMENSION, pipeline_name,
                   { "period": ONE_DAY, "stat": "Sum", "id": "m2", "visible": false, "label": "Deployments" }],
                ["...", { "period": THIRTY_DAYS, "stat": "Sum", "id": "m6",
                   "label": "Deployment Freq (30d)", "visible": false }]
            ],
            "view": "timeSeries",
            "region": region,
            "title": format!("{pipeline_name} Frequency"),
            "period": THIRTY_DAYS,
            "stacked": false,
            "yAxis": {
                "left": { "label": "deployments / day", "showUnits": false, "min": 0 },
                "right": { "showUnits": true }
            },
            "annotations": {
                "horizontal": [
                    { "color": ANNOTATION_ELITE_COLOUR, "label": "daily", "value": 1, "fill": "above" },
                    [
                        { "color": ANNOTATION_HIGH_COLOUR, "label": "multiple per week", "value": 0.25 },
                        { "value": 1, "label": "daily" }
                    ]
                ]
            }
        }),
    }
}

fn lead_time_annotations() -> Value {
    json!({
        "horizontal": [
            { "color": ANNOTATION_ELITE_COLOUR, "label": "< 1 hour", "value": 60, "fill": "below" },
            [
                { "color": ANNOTATION_HIGH_COLOUR, "value": 60, "label": "1 hour" },
                { "label": "< 0.5 day", "value": 60 * 12 }
            ]
        ]
    })
}

fn trend_widget(
    mapping: &TrendMapping,
    pipeline_name: &str,
    y: u32,
    region: &str,
    namespace: &str,
) -> Widget {
    let label = mapping.label;
    let divisor = mapping.unit.seconds;

    let mut properties = json!({
        "metrics": [
            [{ "expression": format!("m1/{divisor}"), "label": label, "id": "e2", "period": ONE_DAY,
               "region": region, "yAxis": "left", "color": TREND_COLOUR }],
            [{ "expression": format!("FILL(m4,AVG(m4))/{divisor}"), "label": format!("{label} (30d - p90)"),
               "id": "e3", "region": region, "yAxis": "left", "color": RANGE_COLOUR }],
            [{ "expression": format!("FILL(m5,AVG(m5))/{divisor}"), "label": format!("{label} (30d - p10)"),
               "id": "e4", "region": region, "yAxis": "left", "color": RANGE_COLOUR }],
            [{ "expression": format!("FILL(m3,AVG(m3))/{divisor}"), "label": format!("{label} (30d - p50)"),
               "id": "e5", "region": region, "color": MEAN_COLOUR }],
            [namespace, mapping.metric.as_str(), PIPELINE_NAME_DIMENSION, pipeline_name,
               { "label": label, "stat": "Average", "color": RANGE_COLOUR, "period": ONE_DAY, "id": "m1", "visible": false }],
            ["...", { "stat": "Average", "period": THIRTY_DAYS, "id": "m3", "label": format!("{label} (30d)"), "visible": false }],
            ["...", { "stat": "p90", "period": THIRTY_DAYS, "id": "m4", "visible": false, "label": format!("{label} (p90)") }],
            ["...", { "stat": "p10", "period": THIRTY_DAYS, "id": "m5", "visible": false, "label": format!("{label} (p10)") }]
        ],
        "view": "timeSeries",
        "region": region,
        "title": format!("{pipeline_name} {label}"),
        "period": THIRTY_DAYS,
        "stacked": false,
        "yAxis": {
            "left": { "min": 0, "label": mapping.unit.label, "showUnits": false },
            "right": { "showUnits": true }
        }
    });

    if mapping.with_annotations {
        properties["annotations"] = lead_time_annotations();
    }

    Widget {
        widget_type: WidgetType::Metric,
        x: mapping.x,
        y: y + mapping.y_offset,
        width: WIDGET_WIDTH,
        height: WIDGET_HEIGHT,
        properties,
    }
}

/// Builds the trend dashboard.
///
/// Only the first [`DashboardLimits::max_pipelines`] pipelines are rendered;
/// the rest are dropped with a warning.
pub fn render_trend_dashboard(
    pipeline_names: &[String],
    region: &str,
    namespace: &str,
    limits: &DashboardLimits,
) -> DashboardDocument {
    let max_pipelines = limits.max_pipelines();
    if pipeline_names.len() > max_pipelines {
        warn!(
            pipelines = pipeline_names.len(),
            "Maximum of {max_pipelines} allowed in a single dashboard.  Some pipelines will not be reported."
        );
    }
    let pipeline_names = &pipeline_names[..pipeline_names.len().min(max_pipelines)];

    let mut widgets = Vec::with_capacity(TREND_TEXT_PANELS.len() + pipeline_names.len() * 4);

    let mut x = 0;
    for panel in &TREND_TEXT_PANELS {
        let markdown = format!("### {}\n{}", panel.title, panel.description);
        widgets.push(Widget::text(x, 0, panel.width, TEXT_HEIGHT, &markdown));
        x += TEXT_WIDTH;
    }

    let mut y = TEXT_HEIGHT;
    for pipeline_name in pipeline_names {
        widgets.push(deployment_frequency_widget(pipeline_name, y, region, namespace));
        for mapping in &TREND_MAPPINGS {
            widgets.push(trend_widget(mapping, pipeline_name, y, region, namespace));
        }
        y += 2 * WIDGET_HEIGHT;
    }

    DashboardDocument {
        start: Some("-P42D".to_string()),
        widgets,
    }
}

/// Discovers pipelines, renders the requested dashboard and stores it.
///
/// Returns the document that was written.
///
/// # Errors
///
/// Returns metrics client failures unchanged, or a serialization error if
/// the document cannot be encoded.
#[instrument(skip(client, limits))]
pub async fn publish_dashboard(
    client: &dyn MetricsClient,
    kind: DashboardKind,
    region: &str,
    namespace: &str,
    limits: &DashboardLimits,
) -> MetricsResult<DashboardDocument> {
    let pipeline_names = collect_pipeline_names(client, namespace).await?;

    let document = match kind {
        DashboardKind::Summary => render_summary_dashboard(&pipeline_names, region, namespace),
        DashboardKind::Trend => render_trend_dashboard(&pipeline_names, region, namespace, limits),
    };

    let dashboard_name = kind.dashboard_name(region);
    let body = serde_json::to_string(&document)?;
    client.put_dashboard(&dashboard_name, &body).await?;

    info!(
        dashboard = %dashboard_name,
        pipelines = pipeline_names.len(),
        widgets = document.widgets.len(),
        "Published dashboard"
    );

    Ok(document)
}
