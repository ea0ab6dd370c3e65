//! Result and error record behaviour across the op boundary.

use std::sync::Arc;

use mado_engine::EngineHost;
use mado_engine::testing::StaticExecutor;
use mado_extension::{Error, ErrorKind, Host, Result, ResultExt, catch_and_return};

fn engine() -> (Arc<EngineHost>, Arc<dyn Host>) {
    let engine = Arc::new(EngineHost::new(Arc::new(StaticExecutor::new())));
    let host: Arc<dyn Host> = engine.clone();
    (engine, host)
}

#[test]
fn test_ok_result_passes_payload_through() {
    let ok: Result<u32> = Ok(5);

    assert!(ok.is_ok());
    assert!(!ok.is_error());
    assert!(ok.ok_or_null().is_some());
    assert_eq!(ok.as_ref().map(|v| v * 2).ok(), Some(10));
    assert_eq!(ok.throw().unwrap(), 5);

    let ok: Result<u32> = Ok(5);
    assert_eq!(ok.throw_debug().unwrap(), 5);
}

#[test]
fn test_error_result_is_terminal() {
    let (_engine, host) = engine();
    let err: Result<u32> = Err(Error::invalid_url(&host, "https://google.com"));

    assert!(!err.is_ok());
    assert!(err.is_error());
    assert!(err.ok_or_null().is_none());

    let mut called = false;
    let mapped = err.map(|v| {
        called = true;
        v + 1
    });
    assert!(!called, "map must not run on an error");
    assert_eq!(mapped.as_ref().unwrap_err().kind(), ErrorKind::InvalidUrl);

    let err: Result<u32> = Err(Error::invalid_url(&host, "https://google.com"));
    assert_eq!(err.unwrap_or(3), 3);

    let err: Result<u32> = Err(Error::invalid_url(&host, "https://google.com"));
    assert_eq!(err.unwrap_or_else(|_| 4), 4);
}

#[test]
fn test_throw_raises_the_same_record() {
    let (_engine, host) = engine();
    let error = Error::request_error(&host, "https://example.com", "boom");
    let rid = error.rid();
    assert!(rid.is_some());

    let report = Err::<(), _>(error).throw().unwrap_err();
    let error = report.downcast::<Error>().unwrap();

    assert_eq!(error.rid(), rid);
    assert_eq!(error.kind(), ErrorKind::RequestError);
    assert_eq!(error.to_string(), "Request error from https://example.com: boom");
}

#[test]
fn test_formatting_is_repeatable_and_side_effect_free() {
    let (engine, host) = engine();
    let error = Error::invalid_url(&host, "https://google.com");
    let count = engine.resource_count();

    for _ in 0..3 {
        assert_eq!(error.into_string(), "https://google.com is invalid");
        assert_eq!(error.into_debug(), r#"InvalidUrl { url: "https://google.com" }"#);
    }
    assert_eq!(engine.resource_count(), count);

    error.close().unwrap();
    assert_eq!(engine.resource_count(), count - 1);
}

#[test]
fn test_double_close_reports_resource_error() {
    let (_engine, host) = engine();
    let error = Error::unexpected_error(&host, "https://example.com", "no title");
    let rid = error.rid().unwrap();

    error.close().unwrap();
    let second = error.close().unwrap_err();

    assert_eq!(second.kind(), ErrorKind::ResourceError);
    assert_eq!(second.to_string(), format!("Bad resource ID (error not found): {rid}"));
}

#[test]
fn test_throw_debug_releases_the_record() {
    let (engine, host) = engine();
    let before = engine.resource_count();
    let err: Result<()> = Err(Error::invalid_url(&host, "https://google.com"));
    assert_eq!(engine.resource_count(), before + 1);

    let report = err.throw_debug().unwrap_err();

    assert!(
        report
            .to_string()
            .starts_with(r#"InvalidUrl { url: "https://google.com" }"#)
    );
    assert_eq!(engine.resource_count(), before);
}

#[test]
fn test_throw_debug_on_released_record_leaves_nothing_behind() {
    let (engine, host) = engine();
    let before = engine.resource_count();
    let err: Result<()> = Err(Error::invalid_url(&host, "https://google.com"));
    err.as_ref().unwrap_err().close().unwrap();

    assert!(err.throw_debug().is_err());
    assert_eq!(engine.resource_count(), before);
}

#[test]
fn test_custom_errors_render_verbatim() {
    let (_engine, host) = engine();
    let error = Error::message(&host, "something odd");

    assert_eq!(error.kind(), ErrorKind::Custom);
    assert_eq!(error.rid(), None);
    assert_eq!(error.into_string(), "something odd");
    assert_eq!(error.into_debug(), "something odd");
    assert!(error.close().is_ok());
}

#[tokio::test]
async fn test_catch_and_return_normalizes_failures() {
    let (_engine, host) = engine();

    let ok = catch_and_return(&host, async { Ok::<_, eyre::Report>(1) }).await;
    assert_eq!(ok.unwrap(), 1);

    let bare = catch_and_return(&host, async { Err::<(), _>(eyre::eyre!("plain failure")) }).await;
    let bare = bare.unwrap_err();
    assert_eq!(bare.kind(), ErrorKind::Custom);
    assert_eq!(bare.to_string(), "plain failure");

    let wrapped_host = host.clone();
    let wrapped = catch_and_return(&host, async move {
        Err::<(), _>(Error::invalid_url(&wrapped_host, "https://google.com")).throw()
    })
    .await;
    assert_eq!(wrapped.unwrap_err().kind(), ErrorKind::InvalidUrl);

    let panicked = catch_and_return(&host, async {
        if true {
            panic!("boom");
        }
        Ok::<(), eyre::Report>(())
    })
    .await;
    let panicked = panicked.unwrap_err();
    assert_eq!(panicked.kind(), ErrorKind::Custom);
    assert_eq!(panicked.to_string(), "module panicked: boom");
}
