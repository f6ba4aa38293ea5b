use serde_json::json;

use qa_pages::{
    Answer, ButtonLabels, Controls, ForwardControl, Input, L10n, Page, Question, QuestionId,
    Questionnaire, Renderer, SavedAnswer, TextRenderer, ValidationOptions,
};

fn sample_page() -> Page {
    let mut name = Question::new("Name", ValidationOptions::required());
    name.add_answer(Answer::text_input(Some("your name")));

    let mut colour = Question::new("Color", ValidationOptions::default());
    colour.add_answer(Answer::hint("Choose one."));
    colour.add_answer(Answer::single_choice("Red", Some("red")));
    colour.add_answer(Answer::single_choice("Blue", Some("blue")));

    let mut page = Page::new().with_title("About you");
    page.add_question(name);
    page.add_question(colour);
    page
}

fn rendered(renderer: TextRenderer<Vec<u8>>) -> String {
    String::from_utf8(renderer.into_inner()).unwrap()
}

#[test]
fn page_lists_questions_and_widgets() {
    let mut questionnaire = Questionnaire::new("render");
    questionnaire.add_page(sample_page());
    questionnaire.add_page(sample_page());
    let mut renderer = TextRenderer::new(Vec::new());
    questionnaire.render(&mut renderer, None).unwrap();

    let expected = "\
Page 1: About you
1. Name *
   1) > <your name>
2. Color
   i Choose one.
   ( ) 2) Red
   ( ) 3) Blue
[n] Next >
";
    assert_eq!(rendered(renderer), expected);
}

#[test]
fn checked_widgets_and_typed_text_are_shown() {
    let mut page = sample_page();
    page.question_mut(0)
        .unwrap()
        .apply_input(0, Input::Text("Ada".into()));
    page.question_mut(1).unwrap().apply_input(2, Input::Select);

    let mut topics = Question::new("Topics", ValidationOptions::default());
    topics.add_answer(Answer::multiple_choice("Parsers", None));
    topics.add_answer(Answer::multiple_choice("Storage", None));
    topics.apply_input(1, Input::Toggle(true));
    page.add_question(topics);

    let mut renderer = TextRenderer::new(Vec::new());
    renderer.page(&page).unwrap();
    let text = rendered(renderer);

    assert!(text.contains("   1) > Ada\n"));
    assert!(text.contains("   ( ) 2) Red\n   (x) 3) Blue\n"));
    assert!(text.contains("3. Topics\n   [ ] 1) Parsers\n   [x] 2) Storage\n"));
}

#[test]
fn controls_follow_the_position() {
    let mut questionnaire = Questionnaire::new("render");
    questionnaire.add_page(sample_page());
    questionnaire.add_page(sample_page());
    let mut renderer = TextRenderer::new(Vec::new());
    questionnaire.render(&mut renderer, Some(2)).unwrap();

    assert_eq!(
        questionnaire.controls(),
        Controls {
            back: Some("< Back".into()),
            forward: ForwardControl::Finish("Finish >".into()),
        }
    );
    assert!(rendered(renderer).ends_with("[b] < Back   [f] Finish >\n"));
}

#[test]
fn custom_labels_are_used() {
    let mut questionnaire = Questionnaire::new("render");
    questionnaire.add_page(sample_page());
    questionnaire.add_page(sample_page());
    questionnaire.set_l10n(L10n {
        buttons: ButtonLabels {
            back: "Zurück".into(),
            next: "Weiter".into(),
            finish: "Fertig".into(),
        },
        ..L10n::default()
    });
    let mut renderer = TextRenderer::new(Vec::new());
    questionnaire.render(&mut renderer, None).unwrap();
    assert!(rendered(renderer).ends_with("[n] Weiter\n"));
}

#[test]
fn validation_messages_are_shown_inline() {
    let mut page = sample_page();
    page.validate(&L10n::default());

    let mut renderer = TextRenderer::new(Vec::new());
    renderer.validation(&page.questions()[0]).unwrap();
    renderer.validation(&page.questions()[1]).unwrap();
    renderer.page(&page).unwrap();

    let text = rendered(renderer);
    assert!(text.starts_with("! Name: Please answer this question to continue.\nPage"));
    assert!(text.contains("1. Name *\n   ! Please answer this question to continue.\n"));
}

#[test]
fn results_print_every_answer() {
    let entries = vec![
        SavedAnswer {
            question: QuestionId::new(1, 0),
            text: "Name".into(),
            answer: Some(json!("Ada")),
        },
        SavedAnswer {
            question: QuestionId::new(2, 0),
            text: "Topics".into(),
            answer: Some(json!(["Parsers", "Storage"])),
        },
        SavedAnswer {
            question: QuestionId::new(2, 1),
            text: "Comment".into(),
            answer: None,
        },
    ];
    let mut renderer = TextRenderer::new(Vec::new());
    renderer.result(&entries).unwrap();
    assert_eq!(
        rendered(renderer),
        "Results\n - Name: Ada\n - Topics: Parsers, Storage\n - Comment: -\n"
    );
}
