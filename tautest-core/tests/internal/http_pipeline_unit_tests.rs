use std::collections::VecDeque;
use std::sync::Mutex;

use super::*;
use crate::{ExpectationError, Expected};
use serde_json::json;

struct Scripted {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Scripted {
    fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl HttpTransport for Arc<Scripted> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().expect("requests").push(request.clone());
        self.responses
            .lock()
            .expect("responses")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("script exhausted")))
    }
}

fn client(responses: Vec<Result<HttpResponse, TransportError>>) -> (Http, Arc<Scripted>) {
    let transport = Arc::new(Scripted::new(responses));
    let http = Http::new(Arc::clone(&transport))
        .with_settings(HttpSettings::default().with_base_url("http://api.test"));
    (http, transport)
}

fn redirect(location: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(302).with_header("Location", location))
}

#[test]
fn passing_get_returns_the_extracted_value() {
    let (http, transport) = client(vec![Ok(HttpResponse::json(200, &json!({"id": 7})))]);

    let id = http
        .get("/items/7", |_header, body| -> ValidationOutcome<DataNode> {
            body.get("id").should(equal(7))?;
            Ok(body.get("id"))
        })
        .expect("passes");

    assert_eq!(id, Value::from(7));
    let sent = transport.requests.lock().expect("requests");
    assert_eq!(sent[0].full_url, "http://api.test/items/7");
    assert!(sent[0].header.contains("User-Agent"));

    let result = http.last_validation_result().expect("result");
    assert_eq!(result.stage, ValidationStage::Passed);
    assert!(result.mismatches.is_empty());
}

#[test]
fn unexpected_status_produces_one_default_policy_mismatch() {
    let (http, _) = client(vec![Ok(HttpResponse::new(404))]);

    let error = http
        .get("/missing", |_, _| ValidationOutcome::Ok(()))
        .expect_err("404 is not 200");

    let HttpError::Assertion { mismatches } = &error else {
        panic!("expected assertion, got {error:?}");
    };
    assert_eq!(mismatches.len(), 1);
    assert!(mismatches[0].starts_with("header.statusCode:"));
    assert!(mismatches[0].contains("expected: 200 <number>"));
}

#[test]
fn explicit_status_assertion_suppresses_the_default_policy() {
    let (http, _) = client(vec![Ok(HttpResponse::new(404))]);

    http.get("/missing", |header, _| -> ValidationOutcome {
        header.get("statusCode").should(equal(404))?;
        Ok(())
    })
    .expect("404 asserted explicitly");
}

#[test]
fn block_mismatches_precede_the_status_mismatch() {
    let (http, _) = client(vec![Ok(HttpResponse::json(500, &json!({"a": 1, "b": 2})))]);

    let error = http
        .get("/x", |_, body| -> ValidationOutcome {
            body.get("a").should(equal(2))?;
            body.get("b").should(equal(3))?;
            Ok(())
        })
        .expect_err("mismatches");

    let HttpError::Assertion { mismatches } = error else {
        panic!("expected assertion");
    };
    assert_eq!(mismatches.len(), 3);
    assert!(mismatches[0].starts_with("body.a:"));
    assert!(mismatches[1].starts_with("body.b:"));
    assert!(mismatches[2].starts_with("header.statusCode:"));
}

#[test]
fn redirects_are_followed_before_validation() {
    let (http, transport) = client(vec![
        redirect("/step-2"),
        redirect("http://other.test/final"),
        Ok(HttpResponse::text(200, "done")),
    ]);

    let calls = std::cell::Cell::new(0);
    http.get("/start", |_, body| -> ValidationOutcome {
        calls.set(calls.get() + 1);
        body.should(equal("done"))?;
        Ok(())
    })
    .expect("passes");

    assert_eq!(calls.get(), 1);
    let urls: Vec<String> = transport
        .requests
        .lock()
        .expect("requests")
        .iter()
        .map(|request| request.full_url.clone())
        .collect();
    assert_eq!(
        urls,
        vec![
            "http://api.test/start",
            "http://api.test/step-2",
            "http://other.test/final"
        ]
    );
    assert_eq!(http.last_validation_result().expect("result").redirect_hops, 2);
}

#[test]
fn redirect_loop_stops_at_the_configured_maximum() {
    let responses = (0..10).map(|index| redirect(&format!("/hop-{index}"))).collect();
    let (http, transport) = client(responses);
    let http = http.with_settings(
        HttpSettings::default()
            .with_base_url("http://api.test")
            .with_max_redirects(3),
    );

    let error = http
        .get("/loop", |_, _| ValidationOutcome::Ok(()))
        .expect_err("302 is not 200");

    assert!(error.is_assertion());
    assert_eq!(transport.requests.lock().expect("requests").len(), 4);
    let result = http.last_validation_result().expect("result");
    assert_eq!(result.redirect_hops, 3);
    assert_eq!(result.status_code(), Some(302));
}

#[test]
fn redirects_are_not_followed_when_disabled() {
    let (http, transport) = client(vec![redirect("/next")]);
    let http = http.with_settings(
        HttpSettings::default()
            .with_base_url("http://api.test")
            .with_follow_redirects(false),
    );

    http.get("/start", |header, _| -> ValidationOutcome {
        header.get("statusCode").should(equal(302))?;
        Ok(())
    })
    .expect("explicit 302");

    assert_eq!(transport.requests.lock().expect("requests").len(), 1);
}

#[test]
fn transport_failure_is_terminal() {
    let (http, _) = client(vec![Err(TransportError::new("connection refused"))]);

    let error = http
        .get("/x", |_, _| -> ValidationOutcome {
            panic!("block must not run");
        })
        .expect_err("transport failure");

    assert_eq!(
        error.to_string(),
        "error during http.get(http://api.test/x): connection refused"
    );
    let result = http.last_validation_result().expect("result");
    assert_eq!(result.stage, ValidationStage::Failed);
    assert!(result.mismatches.is_empty());
    assert_eq!(result.error_message.as_deref(), Some(error.to_string().as_str()));
}

#[test]
fn block_fault_keeps_its_message_and_appends_the_status_mismatch() {
    let (http, _) = client(vec![Ok(HttpResponse::new(503))]);

    let error = http
        .get("/x", |_, _| -> ValidationOutcome {
            Err("lookup failed".into())
        })
        .expect_err("fault");

    let HttpError::Validation {
        message,
        status_mismatch,
        ..
    } = &error
    else {
        panic!("expected validation fault, got {error:?}");
    };
    assert_eq!(message, "lookup failed");
    assert!(status_mismatch
        .as_deref()
        .is_some_and(|status| status.starts_with("header.statusCode:")));
    let rendered = error.to_string();
    assert!(rendered.find("lookup failed") < rendered.find("header.statusCode"));
}

#[test]
fn block_fault_on_success_status_has_no_status_mismatch() {
    let (http, _) = client(vec![Ok(HttpResponse::new(202))]);

    let error = http
        .post("/x", RequestBody::Empty, |_, _| -> ValidationOutcome {
            Err("boom".into())
        })
        .expect_err("fault");

    assert!(matches!(
        error,
        HttpError::Validation {
            status_mismatch: None,
            ..
        }
    ));
}

#[test]
fn mismatch_returned_by_the_block_is_recorded() {
    let (http, _) = client(vec![Ok(HttpResponse::json(200, &json!({"a": 1})))]);

    let error = http
        .get("/x", |_, _| -> Result<(), ExpectationError> {
            Err(ExpectationError::Mismatch(
                crate::expectation::AssertionError::new("body.a: custom"),
            ))
        })
        .expect_err("mismatch");

    assert_eq!(
        error,
        HttpError::Assertion {
            mismatches: vec!["body.a: custom".to_string()]
        }
    );
}

#[test]
fn malformed_json_is_reported_with_raw_text() {
    let (http, _) = client(vec![Ok(
        HttpResponse::new(200).with_body("application/json", "{not json")
    )]);

    let error = http
        .get("/x", |_, _| ValidationOutcome::Ok(()))
        .expect_err("malformed");

    assert!(matches!(&error, HttpError::MalformedBody { raw, .. } if raw == "{not json"));
}

#[test]
fn relative_url_without_base_clears_the_last_result() {
    let transport = Arc::new(Scripted::new(vec![
        Ok(HttpResponse::new(200)),
        Ok(HttpResponse::new(200)),
    ]));
    let http = Http::new(Arc::clone(&transport));

    http.get("http://api.test/ok", |_, _| ValidationOutcome::Ok(()))
        .expect("passes");
    assert!(http.last_validation_result().is_some());

    let error = http
        .get("/relative", |_, _| ValidationOutcome::Ok(()))
        .expect_err("no base url");
    assert!(matches!(error, HttpError::Configuration { .. }));
    assert!(http.last_validation_result().is_none());
    assert_eq!(transport.requests.lock().expect("requests").len(), 1);
}

#[test]
fn default_status_for_delete_depends_on_content() {
    let (http, _) = client(vec![
        Ok(HttpResponse::new(204)),
        Ok(HttpResponse::new(204)),
        Ok(HttpResponse::text(200, "gone")),
    ]);

    http.delete("/a", |_, _| ValidationOutcome::Ok(())).expect("204 without content");
    http.put("/a", RequestBody::json(1), |_, _| ValidationOutcome::Ok(()))
        .expect("204 without content");
    http.delete("/a", |_, _| ValidationOutcome::Ok(())).expect("200 with content");
}

#[test]
fn validation_handlers_run_after_the_status_check() {
    let (http, _) = client(vec![Ok(HttpResponse::json(200, &json!({"id": "x"})))]);
    let http = http.with_validation_handler(|result: &HttpValidationResult| -> ValidationOutcome {
        if let Some(body) = &result.body_node {
            body.get("id").should(equal(Expected::pattern("\\d+")?))?;
        }
        Ok(())
    });

    let error = http
        .get("/x", |_, _| ValidationOutcome::Ok(()))
        .expect_err("handler mismatch");

    let HttpError::Assertion { mismatches } = error else {
        panic!("expected assertion");
    };
    assert_eq!(mismatches.len(), 1);
    assert!(mismatches[0].starts_with("body.id:"));
}

struct Collecting(Arc<Mutex<Vec<RenderedResponse>>>);

impl ReportSink for Collecting {
    fn render_response(&self, response: &RenderedResponse) {
        self.0.lock().expect("rendered").push(response.clone());
    }
}

struct Depth(u32);

impl StepReporter for Depth {
    fn nesting_depth(&self) -> u32 {
        self.0
    }
}

#[test]
fn responses_render_only_above_the_verbosity_threshold() {
    let rendered = Arc::new(Mutex::new(Vec::new()));
    let (http, _) = client(vec![
        Ok(HttpResponse::json(200, &json!({"a": 1}))),
        Ok(HttpResponse::text(200, "")),
        Ok(HttpResponse::binary(200, "image/png", vec![1])),
        Ok(HttpResponse::text(200, "hidden")),
    ]);
    let http = http
        .with_settings(
            HttpSettings::default()
                .with_base_url("http://api.test")
                .with_verbosity(3),
        )
        .with_report_sink(Collecting(Arc::clone(&rendered)))
        .with_step_reporter(Depth(1));

    for _ in 0..3 {
        http.get("/x", |_, _| ValidationOutcome::Ok(())).expect("passes");
    }
    let http = http.with_step_reporter(Depth(2));
    http.get("/x", |_, _| ValidationOutcome::Ok(())).expect("passes");

    let rendered = rendered.lock().expect("rendered");
    assert_eq!(
        *rendered,
        vec![
            RenderedResponse::Body("{\n  \"a\": 1\n}".to_string()),
            RenderedResponse::NoContent,
            RenderedResponse::BinaryContent,
        ]
    );
}

#[test]
fn status_node_is_marked_after_the_default_check() {
    let (http, _) = client(vec![Ok(HttpResponse::new(200))]);
    http.get("/x", |_, _| ValidationOutcome::Ok(())).expect("passes");

    let result = http.last_validation_result().expect("result");
    let header = result.header_node.expect("header");
    assert_eq!(
        header.get("statusCode").check_level(),
        Some(CheckLevel::ExplicitAssert)
    );
}
