mod wizard;

use clap::{Parser, Subcommand};
use qa_pages::{
    AnswerId, AnswerKind, Input, L10n, Question, QuestionId, Questionnaire, QuestionnaireSpec,
    State, TextRenderer, Transition,
};
use std::fs;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wizard::{AnswerParseError, InputKind, PromptContext, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Text-based paged questionnaire CLI",
    long_about = "Runs paged questionnaire definitions in a text shell, prints the definition schema and checks definition files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a questionnaire definition in a text shell.
    Run {
        /// Path to the questionnaire definition JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Optional JSON file replacing button labels and validation messages.
        #[arg(long, value_name = "L10N")]
        l10n: Option<PathBuf>,
        /// Show verbose output (page position, current answers).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also emit the results as JSON.
        #[arg(long)]
        answers_json: bool,
    },
    /// Print the JSON schema of questionnaire definitions.
    Schema,
    /// Parse and build a definition without running it.
    Check {
        /// Path to the questionnaire definition JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
    },
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            spec,
            l10n,
            verbose,
            answers_json,
        } => run_session(&spec, l10n.as_deref(), verbose, answers_json),
        Command::Schema => run_schema(),
        Command::Check { spec } => run_check(&spec),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_spec(path: &Path) -> CliResult<QuestionnaireSpec> {
    let json = fs::read_to_string(path)?;
    Ok(QuestionnaireSpec::from_json_str(&json)?)
}

fn run_schema() -> CliResult<()> {
    let schema = QuestionnaireSpec::json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_check(spec_path: &Path) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    let questionnaire = spec.build()?;
    println!(
        "Definition '{}' is valid: {} page(s), {} question(s)",
        questionnaire.id(),
        questionnaire.total_page_count(),
        spec.question_count()
    );
    Ok(())
}

fn run_session(
    spec_path: &Path,
    l10n_path: Option<&Path>,
    verbose: bool,
    answers_json: bool,
) -> CliResult<()> {
    let spec = load_spec(spec_path)?;
    let mut questionnaire = spec.build()?;
    if let Some(path) = l10n_path {
        let l10n: L10n = serde_json::from_str(&fs::read_to_string(path)?)?;
        questionnaire.set_l10n(l10n);
    }

    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose), answers_json);
    let mut renderer = TextRenderer::new(io::stdout());
    presenter.show_header(&questionnaire, spec.description.as_deref());
    questionnaire.render(&mut renderer, None)?;

    while questionnaire.state() != State::Finished {
        let number = questionnaire
            .current_page_number()
            .ok_or("questionnaire has no active page")?;
        presenter.show_status(&questionnaire);
        let total = questionnaire
            .page(number)
            .map_or(0, |page| page.questions().len());
        for index in 0..total {
            let id = QuestionId::new(number, index);
            prompt_question(&mut questionnaire, &mut renderer, &presenter, id, total)?;
        }

        let transition = prompt_navigation(&mut questionnaire, &mut renderer)?;
        debug!(page = number, ?transition, "navigation handled");
        if let Transition::Blocked(blocked) = transition {
            presenter.show_blocked(blocked);
        }
    }

    presenter.show_completion(&questionnaire.result_set());
    Ok(())
}

fn prompt_question(
    questionnaire: &mut Questionnaire,
    renderer: &mut TextRenderer<Stdout>,
    presenter: &WizardPresenter,
    id: QuestionId,
    total: usize,
) -> CliResult<()> {
    loop {
        let question = questionnaire
            .question(id)
            .ok_or_else(|| format!("question {} not found", id))?;
        if InputKind::of(question) == InputKind::None {
            return Ok(());
        }
        presenter.show_prompt(&PromptContext::new(question, id.question, total));
        let raw = read_input()?;
        if raw.eq_ignore_ascii_case("exit") {
            return Err("questionnaire aborted by user".into());
        }

        match parse_answer(question, &raw) {
            Ok(inputs) => {
                for (index, input) in inputs {
                    let answer = AnswerId::new(id.page, id.question, index);
                    questionnaire.interact(renderer, answer, input)?;
                }
                return Ok(());
            }
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

fn prompt_navigation(
    questionnaire: &mut Questionnaire,
    renderer: &mut TextRenderer<Stdout>,
) -> CliResult<Transition> {
    loop {
        questionnaire.render_controls(renderer)?;
        let raw = read_input()?;
        let transition = match raw.to_ascii_lowercase().as_str() {
            "" | "n" | "next" => questionnaire.next(renderer)?,
            "b" | "back" => questionnaire.back(renderer)?,
            "f" | "finish" => questionnaire.finish(renderer)?,
            "exit" => return Err("questionnaire aborted by user".into()),
            other => {
                eprintln!("Unknown command '{}': use b, n, f or exit.", other);
                continue;
            }
        };
        return Ok(transition);
    }
}

fn read_input() -> CliResult<String> {
    print!("> ");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err("input ended before the questionnaire was finished".into());
    }
    Ok(input.trim().to_string())
}

/// Turn a typed line into widget inputs; blank keeps the current answer.
fn parse_answer(question: &Question, raw: &str) -> Result<Vec<(usize, Input)>, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    match (InputKind::of(question), parse_option_numbers(raw)) {
        (InputKind::Choice | InputKind::Choices | InputKind::Mixed, Some(numbers)) => {
            select_options(question, &numbers)
        }
        (InputKind::Text | InputKind::Mixed, _) => enter_text(question, raw),
        (InputKind::None, _) => Ok(Vec::new()),
        (_, None) => Err(AnswerParseError::new(
            "Enter option numbers from the list.",
            Some(format!(
                "numbers between 1 and {}",
                question.answers().len()
            )),
        )),
    }
}

fn parse_option_numbers(raw: &str) -> Option<Vec<usize>> {
    raw.split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect()
}

fn select_options(
    question: &Question,
    numbers: &[usize],
) -> Result<Vec<(usize, Input)>, AnswerParseError> {
    let answers = question.answers();
    let mut single = None;
    let mut toggled = Vec::new();
    for &number in numbers {
        let index = number
            .checked_sub(1)
            .filter(|index| *index < answers.len())
            .ok_or_else(|| {
                AnswerParseError::new(
                    format!("There is no option {}.", number),
                    Some(format!("numbers between 1 and {}", answers.len())),
                )
            })?;
        match answers[index].kind() {
            AnswerKind::SingleChoice { .. } if single.is_none() => single = Some(index),
            AnswerKind::SingleChoice { .. } => {
                return Err(AnswerParseError::new(
                    "Choose only one option.",
                    Some("a single option number".into()),
                ));
            }
            AnswerKind::MultipleChoice { .. } => toggled.push(index),
            AnswerKind::TextInput { .. } | AnswerKind::Hint { .. } => {
                return Err(AnswerParseError::new(
                    format!("Option {} cannot be selected.", number),
                    None,
                ));
            }
        }
    }

    let mut inputs = Vec::new();
    if let Some(index) = single {
        inputs.push((index, Input::Select));
    }
    if !toggled.is_empty() {
        for (index, answer) in answers.iter().enumerate() {
            if matches!(answer.kind(), AnswerKind::MultipleChoice { .. }) {
                inputs.push((index, Input::Toggle(toggled.contains(&index))));
            }
        }
    }
    Ok(inputs)
}

fn enter_text(question: &Question, raw: &str) -> Result<Vec<(usize, Input)>, AnswerParseError> {
    let answers = question.answers();
    let index = answers
        .iter()
        .position(|answer| matches!(answer.kind(), AnswerKind::TextInput { .. }))
        .ok_or_else(|| AnswerParseError::new("This question does not take free text.", None))?;
    // The first answer with a value wins, so earlier choices would hide the text.
    if answers[..index]
        .iter()
        .any(|answer| answer.value(answers).is_some())
    {
        return Err(AnswerParseError::new(
            "A chosen option takes precedence over typed text.",
            Some(format!(
                "an option number between 1 and {} to change the choice",
                answers.len()
            )),
        ));
    }
    Ok(vec![(index, Input::Text(raw.to_string()))])
}
