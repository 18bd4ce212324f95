use simtarget::TargetError;
use simtarget::mcp::accessibility::{AxElement, Frame, Point};
use simtarget::mcp::ui_query::{find_all, find_best, is_interactive, score_match};

fn button(label: &str, frame: Option<Frame>) -> AxElement {
    AxElement {
        kind: Some("Button".to_string()),
        ax_label: Some(label.to_string()),
        frame,
        ..Default::default()
    }
}

fn frame(x: f64, y: f64, width: f64, height: f64) -> Frame {
    Frame {
        x,
        y,
        width,
        height,
    }
}

#[test]
fn test_find_best_exact_label() {
    let snapshot = vec![
        button("Cancel", Some(frame(0.0, 0.0, 80.0, 40.0))),
        button("Log in", Some(frame(20.0, 100.0, 120.0, 44.0))),
        AxElement {
            kind: Some("StaticText".to_string()),
            ax_label: Some("Log in".to_string()),
            frame: Some(frame(0.0, 200.0, 100.0, 20.0)),
            ..Default::default()
        },
    ];

    let best = find_best("Log in", &snapshot).unwrap();
    assert_eq!(best.score, 100);
    assert_eq!(best.label, "Log in");
    assert_eq!(best.centre, Some(Point { x: 80.0, y: 122.0 }));
}

#[test]
fn test_find_best_rejects_low_confidence() {
    let snapshot = vec![button("Log in", Some(frame(0.0, 0.0, 100.0, 40.0)))];
    match find_best("xyz-no-such-label", &snapshot) {
        Err(TargetError::NoConfidentMatch { best_score }) => assert_eq!(best_score, 0),
        other => panic!("expected NoConfidentMatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_frameless_element_is_skipped_by_find_best() {
    let snapshot = vec![
        button("Log in", None),
        button("Log in later", Some(frame(0.0, 0.0, 100.0, 40.0))),
    ];

    // The exact match has no usable frame; the next-best scorable element
    // wins instead.
    let best = find_best("Log in", &snapshot).unwrap();
    assert_eq!(best.label, "Log in later");
    assert_eq!(best.score, 90);

    // find_all still lists the frameless element, and first.
    let all = find_all("Log in", &snapshot, None);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].score, 100);
    assert_eq!(all[0].centre, None);
}

#[test]
fn test_frameless_unique_match_fails_rather_than_guesses() {
    let snapshot = vec![button("Log in", None)];
    assert!(matches!(
        find_best("Log in", &snapshot),
        Err(TargetError::NoConfidentMatch { best_score: 0 })
    ));
}

#[test]
fn test_disabled_elements_are_not_interactive() {
    let mut disabled = button("Log in", Some(frame(0.0, 0.0, 100.0, 40.0)));
    disabled.enabled = Some(false);
    assert!(!is_interactive(&disabled));

    let snapshot = vec![disabled];
    assert!(find_best("Log in", &snapshot).is_err());
    assert!(find_all("Log in", &snapshot, None).is_empty());
}

#[test]
fn test_non_interactive_roles_are_filtered() {
    let text = AxElement {
        kind: Some("StaticText".to_string()),
        ax_label: Some("Log in".to_string()),
        frame: Some(frame(0.0, 0.0, 100.0, 40.0)),
        ..Default::default()
    };
    assert!(!is_interactive(&text));

    // Role description qualifies even when the type string does not.
    let styled = AxElement {
        kind: Some("Other".to_string()),
        role_description: Some("text field".to_string()),
        ax_label: Some("Email".to_string()),
        frame: Some(frame(0.0, 0.0, 100.0, 40.0)),
        ..Default::default()
    };
    assert!(is_interactive(&styled));
}

#[test]
fn test_find_all_ranks_and_truncates() {
    let snapshot = vec![
        button("Sign in with Apple", Some(frame(0.0, 0.0, 200.0, 44.0))),
        button("Sign in", Some(frame(0.0, 50.0, 200.0, 44.0))),
        button("Cancel", Some(frame(0.0, 100.0, 200.0, 44.0))),
    ];

    let all = find_all("Sign in", &snapshot, None);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].label, "Sign in");
    assert_eq!(all[0].score, 100);
    assert_eq!(all[1].label, "Sign in with Apple");
    assert_eq!(all[1].score, 90);

    let limited = find_all("Sign in", &snapshot, Some(1));
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].label, "Sign in");

    // Limit of zero is clamped to the floor of one.
    let clamped = find_all("Sign in", &snapshot, Some(0));
    assert_eq!(clamped.len(), 1);
}

#[test]
fn test_token_overlap_scoring() {
    let snapshot = vec![button(
        "Create new account",
        Some(frame(0.0, 0.0, 200.0, 44.0)),
    )];

    // Two of three query tokens overlap: round(50 * 2 / 3) = 33, below the
    // confidence floor.
    let all = find_all("create account now", &snapshot, None);
    assert_eq!(all[0].score, 33);

    match find_best("create account now", &snapshot) {
        Err(TargetError::NoConfidentMatch { best_score }) => assert_eq!(best_score, 33),
        other => panic!("expected NoConfidentMatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_scoring_ignores_case_and_whitespace() {
    assert_eq!(score_match("LOG IN", "log   in"), 100);
    assert_eq!(
        score_match("LOG IN", "log   in"),
        score_match("log in", "log in")
    );
}

#[test]
fn test_value_field_scores_independently() {
    // Max-over-fields: a text field whose value matches exactly must score
    // 100 even though its label does not.
    let field = AxElement {
        kind: Some("TextField".to_string()),
        ax_label: Some("Email address".to_string()),
        value: Some("user@example.com".to_string()),
        frame: Some(frame(0.0, 0.0, 200.0, 44.0)),
        ..Default::default()
    };
    let best = find_best("user@example.com", &[field]).unwrap();
    assert_eq!(best.score, 100);
    assert_eq!(best.label, "Email address");
}
