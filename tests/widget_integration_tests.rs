mod utils;

use crossterm::event::KeyCode;
use test_log::test;
use userio::validation::{at_least_one, file_validator, FileValidatorOptions};
use userio::widget::{Confirmation, FilePicker, MultiSelect, SingleSelect, TextInput};
use userio::InputPrompt;
use utils::*;

fn items(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn test_standalone_text_input() {
    let (tx, ctx, capture) = scripted_context();
    type_text(&tx, "my-app");
    press(&tx, KeyCode::Enter);

    let name = TextInput::new("Application name").get_input(&ctx).unwrap();
    assert_eq!(name, "my-app");
    assert!(capture.screen().contains("Application name\n> my-app"));
}

#[test]
fn test_text_input_stays_open_until_valid() {
    let (tx, ctx, capture) = scripted_context();
    press(&tx, KeyCode::Enter);
    type_text(&tx, "42");
    press(&tx, KeyCode::Enter);

    let port = TextInput::new("Port")
        .with_validate_and_map(|text: String| -> userio::Result<u16> {
            text.trim().parse::<u16>().map_err(|e| userio::Error::invalid(e.to_string()))
        })
        .get_input(&ctx)
        .unwrap();
    assert_eq!(port, 42);
    assert!(capture.transcript().contains("Error: cannot parse integer from empty string"));
}

#[test]
fn test_closed_input_interrupts_standalone_widget() {
    let (tx, ctx, _capture) = scripted_context();
    type_text(&tx, "half");
    drop(tx);

    let err = TextInput::new("Name").get_input(&ctx).unwrap_err();
    assert!(err.is_interrupted());
}

#[test]
fn test_single_select_filter_and_submit() {
    let (tx, ctx, _capture) = scripted_context();
    press(&tx, KeyCode::Char('/'));
    type_text(&tx, "pred");
    press(&tx, KeyCode::Enter);
    press(&tx, KeyCode::Enter);

    let env = SingleSelect::new("Environment", items(&["dev", "predev", "staging", "prod"]))
        .get_input(&ctx)
        .unwrap();
    assert_eq!(env, "predev");
}

#[test]
fn test_single_select_returns_value_not_label() {
    let (tx, ctx, capture) = scripted_context();
    press(&tx, KeyCode::Down);
    press(&tx, KeyCode::Enter);

    let tier = SingleSelect::new("Tier", items(&["bronze", "silver"]))
        .with_displayed_items(items(&["Bronze tier", "Silver tier"]))
        .get_input(&ctx)
        .unwrap();
    assert_eq!(tier, "silver");
    assert!(capture.screen().contains("Silver tier"));
}

#[test]
fn test_multi_select_requires_a_selection() {
    let (tx, ctx, capture) = scripted_context();
    press(&tx, KeyCode::Enter);
    press(&tx, KeyCode::Char(' '));
    press(&tx, KeyCode::Down);
    press(&tx, KeyCode::Down);
    press(&tx, KeyCode::Char(' '));
    press(&tx, KeyCode::Enter);

    let validate = at_least_one("at least one environment must be selected");
    let envs = MultiSelect::new("Environments", items(&["dev", "predev", "prod"]))
        .with_validate_and_map(move |selected| validate(selected))
        .get_input(&ctx)
        .unwrap();
    assert_eq!(envs, vec!["dev", "prod"]);
    assert!(capture.transcript().contains("at least one environment must be selected"));
}

#[test]
fn test_confirmation_default_and_escape() {
    let (tx, ctx, _capture) = scripted_context();
    press(&tx, KeyCode::Enter);
    assert!(Confirmation::new("Continue?", true).get_input(&ctx).unwrap());

    press(&tx, KeyCode::Char('n'));
    assert!(!Confirmation::new("Continue?", true).get_input(&ctx).unwrap());

    press(&tx, KeyCode::Esc);
    let err = Confirmation::new("Continue?", true).get_input(&ctx).unwrap_err();
    assert!(err.is_interrupted());
}

#[test]
fn test_file_picker_completes_and_expands() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("services")).unwrap();
    std::fs::write(dir.path().join("readme.md"), "").unwrap();

    let (tx, ctx, _capture) = scripted_context();
    // "./" + "se", then accept the completion
    type_text(&tx, "se");
    press(&tx, KeyCode::Tab);
    press(&tx, KeyCode::Enter);

    let validate = file_validator(FileValidatorOptions { dirs_only: true, ..Default::default() });
    let picked = FilePicker::new("Directory", dir.path())
        .with_validate_and_map(move |path| validate(path))
        .get_input(&ctx)
        .unwrap();

    let expected = format!("{}{}", dir.path().join("services").display(), std::path::MAIN_SEPARATOR);
    assert_eq!(picked, expected);
}

#[test]
#[should_panic(expected = "cannot take input in non-interactive mode")]
fn test_widget_on_non_interactive_context_panics() {
    let (ctx, _capture) = non_interactive_context();
    let _ = TextInput::new("Name").get_input(&ctx);
}
