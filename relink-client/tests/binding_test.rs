//! Method binding integration tests
//!
//! Construction checks, argument tagging and transport interaction for
//! single bindings.

mod common;

use common::RecordingTransport;
use relink_client::{MethodBinding, ParameterHandler};
use relink_core::{
    Argument, Error, MethodDecl, ParamAttr, ParamDecl, Response, ServiceDecl, TransportError,
    TypeDecl,
};
use serde_json::json;

fn user_service() -> ServiceDecl {
    ServiceDecl::new("UserService").target("users")
}

fn register_method() -> MethodDecl {
    MethodDecl::new("register")
        .operation("register")
        .param(ParamDecl::new(TypeDecl::named("String")).named("name"))
        .param(ParamDecl::new(TypeDecl::generic("Vec", vec![TypeDecl::named("u8")])).named("avatar"))
        .param(ParamDecl::new(TypeDecl::named("Listener")).callback())
}

#[test]
fn test_one_handler_per_parameter_in_order() {
    let binding = MethodBinding::builder(&user_service(), &register_method())
        .build()
        .unwrap();

    assert_eq!(
        binding.parameter_handlers(),
        &[
            ParameterHandler::Named {
                label: "name".into(),
                raw_type: "String".into()
            },
            ParameterHandler::Named {
                label: "avatar".into(),
                raw_type: "Vec".into()
            },
            ParameterHandler::Callback {
                raw_type: "Listener".into()
            },
        ]
    );
}

#[test]
fn test_failure_names_parameter_and_method() {
    let method = MethodDecl::new("register")
        .param(ParamDecl::new(TypeDecl::named("String")).named("name"))
        .param(ParamDecl::new(TypeDecl::array(TypeDecl::variable("T"))).named("items"));

    let error = MethodBinding::builder(&user_service(), &method)
        .build()
        .unwrap_err();

    let text = error.to_string();
    assert!(text.contains("(parameter #2)"), "{}", text);
    assert!(text.contains("for method UserService.register"), "{}", text);
}

#[test]
fn test_other_attributes_alone_are_not_enough() {
    let method = MethodDecl::new("register").param(
        ParamDecl::new(TypeDecl::named("String"))
            .attr(ParamAttr::Other("deprecated".into()))
            .attr(ParamAttr::Other("doc".into())),
    );

    let error = MethodBinding::builder(&user_service(), &method)
        .build()
        .unwrap_err();
    assert!(error.message.starts_with("No supported annotation found."));
}

#[test]
fn test_wrong_count_never_reaches_transport() {
    let binding = MethodBinding::builder(&user_service(), &register_method())
        .build()
        .unwrap();
    let transport = RecordingTransport::returning(json!(true));

    let result = binding.invoke(&transport, vec![json!("ada")]);

    assert!(matches!(
        result,
        Err(Error::ArgumentCount {
            expected: 3,
            actual: 1
        })
    ));
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_request_carries_tagged_arguments() {
    let binding = MethodBinding::builder(&user_service(), &register_method())
        .build()
        .unwrap();
    let transport = RecordingTransport::returning(json!(7));

    binding
        .invoke(&transport, vec![json!("ada"), json!([1, 2]), json!("cb-1")])
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target_name, "users");
    assert_eq!(requests[0].operation_name, "register");
    assert_eq!(
        requests[0].arguments,
        vec![
            Argument::named("name", "String", json!("ada")),
            Argument::named("avatar", "Vec", json!([1, 2])),
            Argument::callback("Listener", json!("cb-1")),
        ]
    );
}

#[test]
fn test_invoke_returns_result_regardless_of_status_code() {
    let service = ServiceDecl::new("Answer");
    let method = MethodDecl::new("get");
    let binding = MethodBinding::builder(&service, &method).build().unwrap();

    let transport = RecordingTransport::replying(Response::new(0, "OK", Some(json!(42))));
    assert_eq!(binding.invoke(&transport, vec![]).unwrap(), Some(json!(42)));
}

#[test]
fn test_execute_exposes_status() {
    let binding = MethodBinding::builder(&user_service(), &MethodDecl::new("ping"))
        .build()
        .unwrap();
    let transport =
        RecordingTransport::replying(Response::error(Response::INVOCATION_FAILED, "boom"));

    let response = binding.execute(&transport, vec![]).unwrap();
    assert_eq!(response.status_code, 500);
    assert_eq!(response.status_message, "boom");
    assert_eq!(response.result, None);
}

#[test]
fn test_transport_failure_is_distinguishable() {
    let binding = MethodBinding::builder(&user_service(), &MethodDecl::new("ping"))
        .build()
        .unwrap();
    let transport = RecordingTransport::failing(TransportError::Timeout);

    match binding.invoke(&transport, vec![]) {
        Err(Error::Transport(TransportError::Timeout)) => {}
        other => panic!("Expected transport timeout, got {:?}", other),
    }
    assert_eq!(transport.call_count(), 1);
}

#[test]
fn test_missing_names_are_empty() {
    let binding = MethodBinding::builder(&ServiceDecl::new("Plain"), &MethodDecl::new("ping"))
        .build()
        .unwrap();
    let transport = RecordingTransport::replying(Response::success(None));

    binding.invoke(&transport, vec![]).unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.target_name, "");
    assert_eq!(request.operation_name, "");
    assert!(request.arguments.is_empty());
}
