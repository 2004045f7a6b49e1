//! Client/server loopback integration tests
//!
//! A client proxy calls a router directly, and through a text transport that
//! runs every exchange through the JSON codec.

use relink_client::ServiceProxy;
use relink_core::{
    transport, Argument, MethodDecl, ParamDecl, Response, ServiceDecl, TransportError, TypeDecl,
};
use relink_server::{from_fn, from_typed_fn, Router, RouterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Note {
    title: String,
    body: String,
}

#[derive(Deserialize)]
struct SaveParams {
    title: String,
    body: String,
}

fn notes_decl() -> ServiceDecl {
    ServiceDecl::new("Notes")
        .target("notes")
        .method(
            MethodDecl::new("save")
                .operation("save")
                .param(ParamDecl::new(TypeDecl::named("String")).named("title"))
                .param(ParamDecl::new(TypeDecl::named("String")).named("body")),
        )
        .method(
            MethodDecl::new("subscribe")
                .operation("subscribe")
                .param(ParamDecl::new(TypeDecl::named("String")).named("topic"))
                .param(ParamDecl::new(TypeDecl::named("NoteListener")).callback()),
        )
        .method(MethodDecl::new("purge").operation("purge"))
}

fn notes_router(store: Arc<Mutex<Vec<Note>>>) -> Router {
    let saved = Arc::clone(&store);
    RouterBuilder::new()
        .handler(
            "notes",
            "save",
            from_typed_fn(move |p: SaveParams| {
                let mut notes = saved.lock().unwrap();
                notes.push(Note {
                    title: p.title,
                    body: p.body,
                });
                Ok(notes.len())
            }),
        )
        .handler(
            "notes",
            "subscribe",
            from_fn(|args| {
                let callback = args.iter().find(|a| a.is_callback()).map(Argument::value);
                Ok(callback.cloned())
            }),
        )
        .build()
}

#[test]
fn test_proxy_calls_router_in_process() {
    let store = Arc::new(Mutex::new(Vec::new()));
    let proxy = ServiceProxy::new(&notes_decl(), notes_router(Arc::clone(&store))).unwrap();

    let count: usize = proxy
        .request("save", vec![json!("todo"), json!("write tests")])
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(
        store.lock().unwrap()[0],
        Note {
            title: "todo".into(),
            body: "write tests".into()
        }
    );
}

#[test]
fn test_callback_reference_reaches_handler() {
    let proxy = ServiceProxy::new(&notes_decl(), notes_router(Arc::default())).unwrap();
    let echoed: String = proxy
        .request("subscribe", vec![json!("daily"), json!("listener-7")])
        .unwrap();
    assert_eq!(echoed, "listener-7");
}

#[test]
fn test_unregistered_operation_is_404_not_error() {
    let proxy = ServiceProxy::new(&notes_decl(), notes_router(Arc::default())).unwrap();

    let response = proxy
        .binding("purge")
        .unwrap()
        .execute(proxy.transport(), vec![])
        .unwrap();
    assert_eq!(response.status_code, Response::NOT_FOUND);

    assert_eq!(proxy.call("purge", vec![]).unwrap(), None);
}

#[test]
fn test_text_transport_round_trip() {
    let router = notes_router(Arc::default());
    let wire = transport::from_text_fn(move |text| {
        router
            .handle_text(&text)
            .map_err(|e| TransportError::Other(e.to_string()))
    });

    let proxy = ServiceProxy::new(&notes_decl(), wire).unwrap();
    let count: usize = proxy
        .request("save", vec![json!("a"), json!("b")])
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_handler_rejection_is_400() {
    let proxy = ServiceProxy::new(&notes_decl(), notes_router(Arc::default())).unwrap();

    let response = proxy
        .binding("save")
        .unwrap()
        .execute(proxy.transport(), vec![json!(1), json!("body")])
        .unwrap();
    assert_eq!(response.status_code, Response::BAD_REQUEST);
    assert!(response.status_message.starts_with("Invalid params"));
}
