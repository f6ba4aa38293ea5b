use std::fs;
use std::path::PathBuf;

use serde_json::json;

use qa_pages::{
    AnswerId, AnswerKind, Input, QuestionId, QuestionnaireError, QuestionnaireSpec, ResultSet,
    TextRenderer, Transition,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn onboarding() -> QuestionnaireSpec {
    let json = fs::read_to_string(fixture("onboarding.json")).unwrap();
    QuestionnaireSpec::from_json_str(&json).unwrap()
}

#[test]
fn fixture_builds_into_pages() {
    let spec = onboarding();
    assert_eq!(spec.question_count(), 3);

    let questionnaire = spec.build().unwrap();
    assert_eq!(questionnaire.id(), "onboarding");
    assert_eq!(questionnaire.title(), Some("Contributor onboarding"));
    assert_eq!(questionnaire.total_page_count(), 2);
    assert_eq!(questionnaire.page(2).unwrap().title(), Some("Interests"));

    let name = questionnaire.question(QuestionId::new(1, 0)).unwrap();
    assert!(name.options().required);
    assert_eq!(name.options().min, Some(2.0));
    assert!(matches!(
        name.answers()[0].kind(),
        AnswerKind::TextInput { placeholder: Some(text), .. } if text == "your name"
    ));

    let areas = questionnaire.question(QuestionId::new(2, 0)).unwrap();
    assert_eq!(areas.answers().len(), 4);
    assert!(matches!(
        areas.answers()[1].kind(),
        AnswerKind::MultipleChoice { value, .. } if value == "Parsers"
    ));
}

#[test]
fn schema_describes_the_definition() {
    let schema = QuestionnaireSpec::json_schema();
    let properties = schema.get("properties").expect("object schema");
    for key in ["id", "title", "pages", "l10n"] {
        assert!(properties.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn malformed_json_is_a_definition_error() {
    let error = QuestionnaireSpec::from_json_str("{ \"id\": 1 }").unwrap_err();
    assert!(matches!(error, QuestionnaireError::Definition(_)));
}

#[test]
fn structural_mistakes_are_rejected() {
    let mut spec = onboarding();
    spec.pages.clear();
    assert!(matches!(spec.build(), Err(QuestionnaireError::Definition(_))));

    let mut spec = onboarding();
    spec.id = "  ".into();
    assert!(spec.build().is_err());

    let mut spec = onboarding();
    spec.pages[0].questions[0].answers.clear();
    let error = spec.build().unwrap_err();
    assert!(error.to_string().contains("at least one answer"), "{}", error);

    let mut spec = onboarding();
    spec.pages[1].questions[0].min = Some(3.0);
    assert!(spec.build().is_err());

    let mut spec = onboarding();
    spec.pages[0].questions[0].text = String::new();
    assert!(spec.pages[0].questions[0].check().is_err());
}

#[test]
fn l10n_override_is_applied() {
    let json = json!({
        "id": "short",
        "title": "Short",
        "l10n": {
            "buttons": { "finish": "Done" },
            "validation": { "required": "Needed." }
        },
        "pages": [
            {
                "questions": [
                    {
                        "text": "Name",
                        "required": true,
                        "answers": [ { "type": "text_input" } ]
                    }
                ]
            }
        ]
    });
    let spec = QuestionnaireSpec::from_json_str(&json.to_string()).unwrap();
    let mut questionnaire = spec.build().unwrap();
    assert_eq!(questionnaire.l10n().buttons.finish, "Done");
    assert_eq!(questionnaire.l10n().buttons.next, "Next >");

    let mut renderer = TextRenderer::new(Vec::new());
    questionnaire.render(&mut renderer, None).unwrap();
    let output = String::from_utf8(renderer.get_ref().clone()).unwrap();
    assert!(output.ends_with("[f] Done\n"));

    // Finishing does not re-validate the last page.
    assert_eq!(questionnaire.finish(&mut renderer).unwrap(), Transition::Finished);
    let output = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(output.contains(" - Name: -\n"));
}

#[test]
fn completed_run_exports_results() {
    let mut questionnaire = onboarding().build().unwrap();
    let mut renderer = TextRenderer::new(Vec::new());
    questionnaire.render(&mut renderer, None).unwrap();

    questionnaire
        .interact(&mut renderer, AnswerId::new(1, 0, 0), Input::Text("A".into()))
        .unwrap();
    assert_eq!(
        questionnaire.next(&mut renderer).unwrap(),
        Transition::Blocked(qa_pages::Blocked::Invalid)
    );
    assert_eq!(
        questionnaire
            .question(QuestionId::new(1, 0))
            .unwrap()
            .validation_message(),
        Some("Please enter at least 2 character(s).")
    );

    questionnaire
        .interact(&mut renderer, AnswerId::new(1, 0, 0), Input::Text("Ada".into()))
        .unwrap();
    questionnaire
        .interact(&mut renderer, AnswerId::new(1, 1, 1), Input::Select)
        .unwrap();
    assert_eq!(questionnaire.next(&mut renderer).unwrap(), Transition::Moved(2));

    for answer in [1, 3] {
        questionnaire
            .interact(&mut renderer, AnswerId::new(2, 0, answer), Input::Toggle(true))
            .unwrap();
    }
    assert_eq!(questionnaire.next(&mut renderer).unwrap(), Transition::Finished);

    let results = questionnaire.result_set();
    assert_eq!(results.questionnaire_id, "onboarding");
    assert_eq!(results.pages.len(), 2);
    assert_eq!(results.pages[0].answers[1].answer, Some(json!("no")));
    assert_eq!(
        results.pages[1].answers[0].answer,
        Some(json!(["Parsers", "Storage"]))
    );

    let exported: ResultSet = serde_json::from_str(&results.to_json_pretty().unwrap()).unwrap();
    assert_eq!(exported, results);
    let decoded: ResultSet = serde_cbor::from_slice(&results.to_cbor().unwrap()).unwrap();
    assert_eq!(decoded, results);
}
