//! Route tables built from configuration.

use dial_core::{DialError, DialedNumber, Dispatcher, Pattern, RouteAction};
use rstest::rstest;

const ROUTES: &str = r#"
[[routes]]
exact = "8675309"
action = "jenny"
command = ["echo", "jenny"]

[[routes]]
prefix = "0"
action = "operator"

[[routes]]
prefix = "86"
action = "eight-six"
"#;

fn dispatcher() -> Dispatcher<RouteAction> {
    let cfg = dial_config::load_toml(ROUTES).expect("parse");
    Dispatcher::<RouteAction>::try_from(cfg.routes.as_slice()).expect("routes")
}

#[rstest]
#[case("8675309", Some("jenny"))]
#[case("867", Some("eight-six"))]
#[case("86753090", Some("eight-six"))]
#[case("0", Some("operator"))]
#[case("0123", Some("operator"))]
#[case("911", None)]
fn resolves_in_declaration_order(#[case] dialed: &str, #[case] expect: Option<&str>) {
    let d = dispatcher();
    let n: DialedNumber = dialed.parse().unwrap();
    assert_eq!(d.resolve(&n).map(|a| a.name.as_str()), expect);
}

#[test]
fn command_is_carried_through() {
    let d = dispatcher();
    assert_eq!(d.len(), 3);
    let a = d.resolve(&"8675309".parse().unwrap()).unwrap();
    assert_eq!(a.command, vec!["echo".to_string(), "jenny".to_string()]);
    let op = d.resolve(&"0".parse().unwrap()).unwrap();
    assert!(op.command.is_empty());
}

#[test]
fn empty_table_matches_nothing() {
    let routes: &[dial_config::RouteCfg] = &[];
    let d = Dispatcher::<RouteAction>::try_from(routes).expect("empty");
    assert!(d.is_empty());
    assert!(d.resolve(&"5".parse().unwrap()).is_none());
}

#[rstest]
#[case(r#"[[routes]]
action = "none"
"#)]
#[case(r#"[[routes]]
exact = "1"
prefix = "1"
action = "both"
"#)]
fn ambiguous_routes_are_rejected(#[case] doc: &str) {
    let cfg = dial_config::load_toml(doc).expect("parse");
    let err = Dispatcher::<RouteAction>::try_from(cfg.routes.as_slice()).unwrap_err();
    assert!(matches!(err, DialError::Config(_)), "{err:?}");
}

#[test]
fn non_digit_pattern_is_rejected() {
    let cfg = dial_config::load_toml(
        r#"[[routes]]
exact = "12a"
action = "bad"
"#,
    )
    .expect("parse");
    let err = Dispatcher::<RouteAction>::try_from(cfg.routes.as_slice()).unwrap_err();
    assert!(matches!(err, DialError::InvalidNumber(_)), "{err:?}");
}

#[test]
fn hand_built_table_accepts_any_action_type() {
    let d = Dispatcher::new()
        .route(Pattern::Prefix("1".parse().unwrap()), 1u8)
        .route(Pattern::Exact("2".parse().unwrap()), 2u8);
    assert_eq!(d.resolve(&"19".parse().unwrap()), Some(&1));
    assert_eq!(d.resolve(&"2".parse().unwrap()), Some(&2));
}
