use crate::{
    cli::{Cli, Commands, InitArgs},
    config::ConsoleConfig,
    constants::demo::{ENVIRONMENTS, MANIFEST_FILENAME, NAME_PATTERN, STEP_DELAY_MS, TIERS},
    error::{Error, FieldError, Result},
    session::{Handler, TaskStatus},
    stream::StreamContext,
    switch::{InputSourceSwitch, Scalar, Sequence},
    validation::{at_least_one, file_validator, matches_pattern, FileValidatorOptions},
    widget::{Confirmation, FilePicker, MultiSelect, SingleSelect, TextInput},
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application described by a successful `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub name: String,
    pub environments: Vec<String>,
    pub tier: String,
    pub directory: PathBuf,
}

/// Main CLI runner: loads the console configuration, builds the stream
/// context and dispatches the subcommand.
pub struct Runner {
    cli: Cli,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let ctx = StreamContext::stdio(!self.cli.non_interactive, config);
        match &self.cli.command {
            Commands::Init(args) => {
                let app = run_init(&ctx, args)?;
                log::info!("Application '{}' created in {}", app.name, app.directory.display());
            }
        }
        Ok(())
    }

    fn load_config(&self) -> Result<ConsoleConfig> {
        match &self.cli.config {
            Some(path) => ConsoleConfig::load(path),
            None => ConsoleConfig::load_from_dir(std::env::current_dir()?),
        }
    }
}

/// Value switches for every `init` input.
struct InitInputs {
    name: InputSourceSwitch<String, String>,
    environments: InputSourceSwitch<Vec<String>, Vec<String>>,
    tier: InputSourceSwitch<String, String>,
    directory: InputSourceSwitch<String, String>,
    confirmed: InputSourceSwitch<bool, bool>,
}

impl InitInputs {
    fn new(args: &InitArgs, working_dir: PathBuf) -> Result<Self> {
        let validate_name = matches_pattern(
            NAME_PATTERN,
            "must start with a lowercase letter and contain only lowercase letters, digits and '-'",
        )?;
        let prompt_name = validate_name.clone();
        let name = InputSourceSwitch::with_validator(
            Scalar(args.name.clone().unwrap_or_default()),
            validate_name,
        )
        .with_prompt(move || {
            let validate = prompt_name.clone();
            Ok(TextInput::new("Application name")
                .with_placeholder("my-app")
                .with_validate_and_map(move |text| validate(text)))
        })
        .with_err_message("invalid application name");

        let validate_environments = at_least_one("at least one environment must be selected");
        let prompt_environments = validate_environments.clone();
        let environments = InputSourceSwitch::with_validator(
            Sequence(args.environments.clone()),
            validate_environments,
        )
        .with_prompt(move || {
            let validate = prompt_environments.clone();
            let items: Vec<String> = ENVIRONMENTS.iter().map(|env| env.to_string()).collect();
            Ok(MultiSelect::new("Environments", items)
                .with_validate_and_map(move |selected| validate(selected)))
        })
        .with_err_message("invalid environments");

        let tier = InputSourceSwitch::new(
            Scalar(args.tier.clone().unwrap_or_default()),
            known_tier,
        )
        .with_prompt(|| {
            let (values, labels): (Vec<String>, Vec<String>) = TIERS
                .iter()
                .map(|(value, label)| (value.to_string(), label.to_string()))
                .unzip();
            Ok(SingleSelect::new("Support tier", values).with_displayed_items(labels))
        })
        .with_err_message("invalid tier");

        let validate_directory = file_validator(FileValidatorOptions {
            dirs_only: true,
            dir_is_empty: true,
            ..Default::default()
        });
        let prompt_directory = validate_directory.clone();
        let directory = InputSourceSwitch::with_validator(
            Scalar(args.directory.clone().unwrap_or_default()),
            validate_directory,
        )
        .with_prompt(move || {
            let validate = prompt_directory.clone();
            Ok(FilePicker::new("Directory", working_dir.clone())
                .with_validate_and_map(move |path| validate(path)))
        })
        .with_err_message("invalid directory");

        let confirmed =
            InputSourceSwitch::new(Scalar(args.yes), |yes: bool| -> Result<bool> { Ok(yes) })
                .with_prompt(|| Ok(Confirmation::new("Create the application?", true)));

        Ok(Self { name, environments, tier, directory, confirmed })
    }

    /// Fails before anything is rendered when a value can never be obtained.
    fn validate(&self, ctx: &StreamContext) -> Result<()> {
        self.name.validate(ctx)?;
        self.environments.validate(ctx)?;
        self.tier.validate(ctx)?;
        self.directory.validate(ctx)?;
        self.confirmed.validate(ctx)?;
        Ok(())
    }
}

fn known_tier(tier: String) -> Result<String> {
    let tier = tier.trim().to_lowercase();
    if TIERS.iter().any(|(value, _)| *value == tier) {
        return Ok(tier);
    }
    Err(FieldError::for_field("tier", format!("unknown tier '{tier}'")).into())
}

/// Resolves every `init` input, then reports the setup steps in a session.
pub fn run_init(ctx: &StreamContext, args: &InitArgs) -> Result<Application> {
    let inputs = InitInputs::new(args, std::env::current_dir()?)?;
    inputs.validate(ctx)?;

    let app = Application {
        name: inputs.name.get_value(ctx)?,
        environments: inputs.environments.get_value(ctx)?,
        tier: inputs.tier.get_value(ctx)?,
        directory: PathBuf::from(inputs.directory.get_value(ctx)?),
    };
    log::debug!("Resolved application: {app:?}");

    let mut handler = ctx.start_session("Preparing application", "Prepared application");
    let step_delay = if ctx.is_interactive() {
        Duration::from_millis(STEP_DELAY_MS)
    } else {
        Duration::ZERO
    };

    handler.info(&format!("Application: {}", app.name));
    for env in &app.environments {
        if handler.is_cancelled() {
            break;
        }
        handler.set_task(&format!("Configuring {env}"), &format!("Configured {env}"));
        std::thread::sleep(step_delay);
        if env == "prod" && app.tier == "bronze" {
            handler.warn("bronze tier has no support in prod");
        }
    }

    if app.tier != "gold" {
        handler.set_task("Enabling on-call rota", "");
        handler.set_current_task_completed_title_with_status(
            &format!("On-call rota not available on the {} tier", app.tier),
            TaskStatus::Skipped,
        );
    }

    // runs inside the session when interactive, so the prompt is part of the frame
    match inputs.confirmed.get_value(ctx) {
        Ok(true) => {}
        Ok(false) => {
            handler.abort("Cancelled by user")?;
            return Err(Error::Interrupted);
        }
        Err(err) => return Err(abort_with(handler.as_mut(), &err.to_string(), err)),
    }

    handler.set_task("Writing manifest", "Wrote manifest");
    if let Err(err) = write_manifest(&app) {
        let message = format!("Cannot write manifest: {err}");
        return Err(abort_with(handler.as_mut(), &message, err));
    }
    handler.done()?;
    Ok(app)
}

/// Fails the session with `message` and hands back `err`, which stays the
/// command's error even when the session had already ended.
fn abort_with(handler: &mut dyn Handler, message: &str, err: Error) -> Error {
    if let Err(abort_err) = handler.abort(message) {
        log::debug!("Session ended before it could be aborted: {abort_err}");
    }
    err
}

fn write_manifest(app: &Application) -> Result<PathBuf> {
    std::fs::create_dir_all(&app.directory)?;
    let path = app.directory.join(MANIFEST_FILENAME);
    let content = serde_json::to_string_pretty(app)?;
    std::fs::write(&path, content)?;
    log::debug!("Manifest written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn non_interactive() -> (StreamContext, Capture) {
        let capture = Capture::default();
        let ctx = StreamContext::non_interactive(capture.clone(), ConsoleConfig::default());
        (ctx, capture)
    }

    fn full_args(directory: &Path) -> InitArgs {
        InitArgs {
            name: Some("my-app".to_string()),
            environments: vec!["dev".to_string(), "prod".to_string()],
            directory: Some(directory.to_string_lossy().into_owned()),
            tier: Some("silver".to_string()),
            yes: true,
        }
    }

    #[test]
    fn test_init_from_flags_writes_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let directory = tmp.path().join("my-app");
        let (ctx, capture) = non_interactive();

        let app = run_init(&ctx, &full_args(&directory)).unwrap();
        assert_eq!(app.environments, vec!["dev", "prod"]);

        let manifest = std::fs::read_to_string(directory.join(MANIFEST_FILENAME)).unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(manifest["name"], "my-app");
        assert_eq!(manifest["tier"], "silver");

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.starts_with("INFO: [Preparing application]\nINFO: Application: my-app\n"));
        assert!(output.contains("INFO: [Configuring prod]\n"));
        assert!(output.contains("INFO: [⚠ On-call rota not available on the silver tier]\n"));
    }

    #[test]
    fn test_init_missing_name_is_not_set() {
        let tmp = tempfile::tempdir().unwrap();
        let mut args = full_args(&tmp.path().join("app"));
        args.name = None;
        let (ctx, capture) = non_interactive();

        let err = run_init(&ctx, &args).unwrap_err();
        assert!(err.is_not_set());
        assert_eq!(err.to_string(), "invalid application name: value is not set");
        assert!(capture.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_init_rejects_non_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("existing"), "").unwrap();
        let (ctx, _) = non_interactive();

        let err = run_init(&ctx, &full_args(tmp.path())).unwrap_err();
        assert_eq!(err.to_string(), "invalid directory: directory is not empty");
    }

    #[test]
    fn test_abort_keeps_command_error_after_cancel() {
        use crate::terminal::TerminalEvent;
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let (keys, events) = crossbeam_channel::unbounded();
        let ctx = StreamContext::scripted(events, Capture::default(), (80, 24), ConsoleConfig::default());
        let mut handler = ctx.start_session("Writing manifest", "Wrote manifest");
        keys.send(TerminalEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)))
            .unwrap();
        while !handler.is_cancelled() {
            std::thread::sleep(Duration::from_millis(5));
        }

        let err = abort_with(handler.as_mut(), "Cannot write manifest", Error::Config("disk full".into()));
        assert!(matches!(err, Error::Config(ref message) if message == "disk full"));
        assert!(handler.done().unwrap_err().is_interrupted());
    }

    #[test]
    fn test_abort_on_plain_output_reports_failure() {
        let (ctx, capture) = non_interactive();
        let mut handler = ctx.start_session("Writing manifest", "Wrote manifest");
        let err = abort_with(handler.as_mut(), "Cannot write manifest", Error::Config("disk full".into()));
        assert!(matches!(err, Error::Config(_)));
        assert!(capture.text().contains("Cannot write manifest"));
    }

    #[test]
    fn test_known_tier_normalises() {
        assert_eq!(known_tier(" Gold ".to_string()).unwrap(), "gold");
        assert_eq!(
            known_tier("platinum".to_string()).unwrap_err().to_string(),
            "tier: unknown tier 'platinum'"
        );
    }
}
