mod utils;

use crossterm::event::KeyCode;
use test_log::test;
use userio::validation::required;
use userio::widget::TextInput;
use userio::{InputSourceSwitch, Scalar};
use utils::*;

fn name_switch(default: &str) -> InputSourceSwitch<String, String> {
    InputSourceSwitch::new(Scalar(default.to_string()), required)
        .with_prompt(|| Ok(TextInput::new("Name?")))
        .with_err_message("invalid name")
}

#[test]
fn test_flag_value_skips_the_prompt() {
    let (_tx, ctx, capture) = scripted_context();
    let switch = name_switch("  svc  ");

    assert_eq!(switch.get_value(&ctx).unwrap(), "svc");
    assert!(!capture.transcript().contains("Name?"));
}

#[test]
fn test_prompt_is_hosted_by_the_active_session() {
    let (tx, ctx, capture) = scripted_context();
    let switch = name_switch("");
    let mut handler = ctx.start_session("Configuring", "Configured");

    let typist = {
        let capture = capture.clone();
        std::thread::spawn(move || {
            assert!(capture.wait_for("📝 Configuring", WAIT));
            type_text(&tx, "api");
            press(&tx, KeyCode::Enter);
        })
    };
    assert_eq!(switch.get_value(&ctx).unwrap(), "api");
    typist.join().unwrap();
    // memoized, no second prompt
    assert_eq!(switch.get_value(&ctx).unwrap(), "api");
    handler.done().unwrap();

    assert!(capture.screen().ends_with("Name?\n> api\n✓ Configured\n"));
}

#[test]
fn test_non_interactive_without_flag_fails_fast() {
    let (ctx, capture) = non_interactive_context();
    let switch = name_switch("");

    let err = switch.validate(&ctx).unwrap_err();
    assert!(err.is_not_set());
    assert_eq!(err.to_string(), "invalid name: value is not set");
    assert!(capture.text().is_empty());
}
