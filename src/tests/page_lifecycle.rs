use super::*;

const FORM1: &str = r#"
    <form id='surveyForm'>
      <h2>Q1</h2>
      <input id='name' name='name' required>
      <button id='next' type='button' onclick="location.href='form2.html'">次へ</button>
    </form>
"#;

const FORM2: &str = r#"
    <form id='surveyForm'>
      <label><input id='agree' type='checkbox' name='agree' value='yes' required>agree</label>
      <button id='prev' type='button' onclick="location.href='form1.html'">前へ</button>
      <button id='next' type='button' onclick="location.href='form3.html'">次へ</button>
    </form>
"#;

#[test]
fn setup_waits_for_loading_to_finish() -> Result<()> {
    let store = shared_store(&[(USER_ID_KEY, "u-9"), ("surveyData_u-9_form1", r#"{"name":"Mio"}"#)]);
    let mut page = SurveyPage::new("form1.html", FORM1, store, SurveyConfig::default())?;
    assert_eq!(page.ready_state(), ReadyState::Loading);

    page.wire_auto_save(1)?;
    page.wire_nav_guard()?;
    page.assert_value("#name", "")?;

    page.finish_loading()?;
    assert_eq!(page.ready_state(), ReadyState::Complete);
    page.assert_value("#name", "Mio")?;

    page.type_text("#name", "")?;
    page.click("#next")?;
    assert_eq!(page.navigated_to(), None);
    Ok(())
}

#[test]
fn setup_after_loading_runs_immediately() -> Result<()> {
    let mut page = SurveyPage::new("form1.html", FORM1, respondent_store(), SurveyConfig::default())?;
    page.finish_loading()?;
    page.wire_nav_guard()?;
    page.click("#next")?;
    assert_eq!(page.guard_state(), GuardState::Blocked);
    Ok(())
}

#[test]
fn identity_check_only_logs() -> Result<()> {
    let store = shared_store(&[]);
    let page = SurveyPage::load("form1.html", FORM1, 1, store.clone(), SurveyConfig::default())?;
    let warnings = page.console().messages_at(LogLevel::Warn);
    assert!(warnings.iter().any(|msg| msg.contains("user_id is not set; start")));
    assert!(!store.has(USER_ID_KEY));
    assert!(store.has(APOS_PID_KEY));

    let configured = SurveyPage::load("form1.html", FORM1, 1, respondent_store(), SurveyConfig::default())?;
    assert!(configured.console().messages_at(LogLevel::Warn).is_empty());
    assert!(
        configured
            .console()
            .messages_at(LogLevel::Info)
            .iter()
            .any(|msg| msg.contains("u-100"))
    );
    Ok(())
}

#[test]
fn session_walks_forward_and_back_with_saved_answers() -> Result<()> {
    let mut session = SurveySession::new(respondent_store(), SurveyConfig::default());
    session.register_page("form1.html", FORM1, 1);
    session.register_page("form2.html", FORM2, 2);

    let page = session.open("form1.html")?;
    page.type_text("#name", "Aya")?;
    page.click("#next")?;
    assert!(session.follow_navigation()?);
    assert_eq!(session.current_url(), Some("form2.html"));

    let page = session.page_mut()?;
    page.click("#next")?;
    page.assert_count(".error-message", 1)?;
    page.click("#agree")?;
    page.click("#prev")?;
    assert!(session.follow_navigation()?);

    session.page()?.assert_value("#name", "Aya")?;
    assert_eq!(session.history(), &["form1.html", "form2.html", "form1.html"]);

    let form2 = FormSnapshot::from_json(
        &session.store().get("surveyData_u-100_form2").unwrap_or_default(),
    )?;
    assert_eq!(form2.get("agree"), Some(&FieldValue::from(vec!["yes"])));
    Ok(())
}

#[test]
fn config_overrides_container_and_markers() -> Result<()> {
    let config = SurveyConfig::from_json(
        r#"{
            "form_id": "q",
            "error_class": "invalid",
            "message_class": "hint",
            "summary_class": "banner",
            "field_message": "required",
            "label_markers": { "forward": ["weiter"], "back": ["zurück"] }
        }"#,
    )?;
    let html = r#"
        <div id='q'><input id='name' name='name' required></div>
        <button id='w' onclick="location.href='form4.html'">Weiter</button>
        <button id='z' onclick="location.href='form2.html'">Zurück</button>
    "#;
    let mut page = SurveyPage::load("form3.html", html, 3, respondent_store(), config)?;
    page.click("#w")?;
    page.assert_has_class("#name", "invalid", true)?;
    page.assert_text(".hint", "required")?;
    page.assert_count(".banner", 1)?;
    assert_eq!(page.navigated_to(), None);

    page.click("#z")?;
    assert_eq!(page.navigated_to(), Some("form2.html"));
    Ok(())
}

#[test]
fn temporary_identity_survives_clock_moves_and_log_cap() -> Result<()> {
    let store = shared_store(&[]);
    let mut page = SurveyPage::new("form1.html", FORM1, store.clone(), SurveyConfig::default())?;
    let clock = ManualClock::new(5_000);
    clock.advance(250);
    page.set_clock(Box::new(clock));
    page.set_random_seed(0);
    page.set_console_limit(1);
    page.wire_standard(1)?;
    page.finish_loading()?;

    let first = page.resolve_identity();
    assert!(first.starts_with("temp_5250_"));
    assert_eq!(page.console().entries().count(), 1);
    page.console_mut().take_entries();

    page.set_clock(Box::new(ManualClock::new(9_999)));
    assert_eq!(page.resolve_identity(), first);
    assert_eq!(store.get(APOS_PID_KEY), Some(first.clone()));
    assert!(page.console().messages_at(LogLevel::Warn).is_empty());
    page.assert_exists("#next")?;
    assert!(page.assert_exists("#missing").is_err());
    Ok(())
}
