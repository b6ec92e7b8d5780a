use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::monitor::model::{MonitorConfig, QueryFilters, FILTER_ALL};

/// Body of a `get_incidents` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPayload {
    pub request_data: RequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestData {
    pub search_from: u64,
    pub search_to: u64,
    pub sort: SortSpec,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterClause {
    pub field: &'static str,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    In,
    Gte,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integers(Vec<i64>),
    Strings(Vec<String>),
    Timestamp(i64),
}

/// Incident status codes accepted by the status filter
pub fn status_name(code: &str) -> Option<&'static str> {
    match code {
        "1" => Some("new"),
        "2" => Some("under_investigation"),
        "3" => Some("resolved_threat_handled"),
        "4" => Some("resolved_known_issue"),
        "5" => Some("resolved_duplicate"),
        "6" => Some("resolved_false_positive"),
        "7" => Some("resolved_other"),
        _ => None,
    }
}

/// Look-back window in hours for a time filter code
pub fn time_window_hours(code: &str) -> Option<i64> {
    match code {
        "1" => Some(1),
        "2" => Some(24),
        "3" => Some(24 * 7),
        "4" => Some(24 * 30),
        _ => None,
    }
}

pub fn build_payload(config: &MonitorConfig) -> QueryPayload {
    build_payload_at(&config.filters, Utc::now())
}

/// Render the filter set against a fixed clock.
///
/// Clauses are appended in a stable order: severity, status, time, host, description.
pub fn build_payload_at(filters: &QueryFilters, now: DateTime<Utc>) -> QueryPayload {
    let mut clauses = Vec::new();

    if let Some(raw) = active(&filters.severity_filter) {
        // Tokens beyond i64 range are dropped like any other unparsable token
        let severities: Vec<i64> = split_tokens(raw)
            .filter(|s| s.chars().all(|c| c.is_ascii_digit()))
            .filter_map(|s| s.parse().ok())
            .collect();
        if !severities.is_empty() {
            clauses.push(FilterClause {
                field: "severity",
                operator: FilterOperator::In,
                value: FilterValue::Integers(severities),
            });
        }
    }

    if let Some(raw) = active(&filters.status_filter) {
        let statuses: Vec<String> = split_tokens(raw)
            .filter_map(status_name)
            .map(str::to_string)
            .collect();
        if !statuses.is_empty() {
            clauses.push(FilterClause {
                field: "status",
                operator: FilterOperator::In,
                value: FilterValue::Strings(statuses),
            });
        }
    }

    if let Some(hours) = active(&filters.time_filter).and_then(|code| time_window_hours(code.trim())) {
        let cutoff = now.timestamp_millis() - hours * 3_600_000;
        clauses.push(FilterClause {
            field: "creation_time",
            operator: FilterOperator::Gte,
            value: FilterValue::Timestamp(cutoff),
        });
    }

    if let Some(raw) = active(&filters.host_filter) {
        let hosts: Vec<String> = split_tokens(raw).map(str::to_string).collect();
        if !hosts.is_empty() {
            clauses.push(FilterClause {
                field: "hosts",
                operator: FilterOperator::In,
                value: FilterValue::Strings(hosts),
            });
        }
    }

    if let Some(description) = active(&filters.description_filter) {
        clauses.push(FilterClause {
            field: "description",
            operator: FilterOperator::Contains,
            value: FilterValue::Strings(vec![description.to_string()]),
        });
    }

    QueryPayload {
        request_data: RequestData {
            search_from: filters.search_from,
            search_to: filters.search_to,
            sort: SortSpec {
                field: filters.sort_field.clone(),
                keyword: filters.sort_order.clone(),
            },
            filters: clauses,
        },
    }
}

/// Minimal payload used to probe credentials
pub fn probe_payload() -> serde_json::Value {
    serde_json::json!({
        "request_data": {
            "search_from": 0,
            "search_to": 1
        }
    })
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && *v != FILTER_ALL)
}

fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}
