use super::*;

const PROFILE_FORM: &str = r#"
    <form id='surveyForm'>
      <fieldset>
        <legend>Profile</legend>
        <input id='name' name='name' required>
        <label><input id='male' type='radio' name='gender' value='m' required>M</label>
        <label><input id='female' type='radio' name='gender' value='f' required>F</label>
        <input id='note' name='note'>
      </fieldset>
      <button id='back' type='button' onclick="location.href='form1.html'">← 戻る</button>
      <button id='next' type='button' onclick="location.href='form3.html'">次へ →</button>
    </form>
"#;

fn load_profile() -> Result<SurveyPage> {
    SurveyPage::load("form2.html", PROFILE_FORM, 2, respondent_store(), SurveyConfig::default())
}

#[test]
fn empty_required_fields_block_navigation() -> Result<()> {
    let mut page = load_profile()?;
    page.click("#next")?;

    assert_eq!(page.navigated_to(), None);
    assert_eq!(page.guard_state(), GuardState::Blocked);
    let Some(GuardOutcome::Blocked(entries)) = page.last_guard_outcome() else {
        panic!("expected a blocked outcome, got {:?}", page.last_guard_outcome());
    };
    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_deref()).collect();
    assert_eq!(names, vec![Some("name"), Some("gender")]);

    page.assert_has_class("#name", "error", true)?;
    page.assert_has_class("#male", "error", true)?;
    page.assert_has_class("#note", "error", false)?;
    page.assert_count(".error-summary", 1)?;
    page.assert_count(".error-message", 2)?;
    page.assert_scrolled_into_view("#name")?;
    Ok(())
}

#[test]
fn filled_form_navigates_and_clears_markers() -> Result<()> {
    let mut page = load_profile()?;
    page.click("#next")?;
    page.click("#next")?;
    page.assert_count(".error-summary", 1)?;

    page.type_text("#name", "Aya")?;
    page.click("#female")?;
    page.click("#next")?;

    assert_eq!(page.navigated_to(), Some("form3.html"));
    assert_eq!(page.guard_state(), GuardState::Armed);
    assert_eq!(
        page.last_guard_outcome(),
        Some(&GuardOutcome::Navigated("form3.html".into()))
    );
    page.assert_count(".error-message", 0)?;
    page.assert_count(".error-summary", 0)?;
    page.assert_count(".error", 0)?;
    Ok(())
}

#[test]
fn summary_goes_before_the_first_landmark() -> Result<()> {
    let mut page = load_profile()?;
    page.click("#next")?;
    let form = page.dump_dom("#surveyForm")?;
    let summary_at = form.find("error-summary").unwrap_or(usize::MAX);
    let fieldset_at = form.find("<fieldset").unwrap_or(0);
    assert!(summary_at < fieldset_at, "{form}");

    let mut bare = SurveyPage::load(
        "form7.html",
        "<div id='wrap'><form id='surveyForm'><input id='q' name='q' required>\
         <button id='go' onclick=\"location.href='form8.html'\">next</button></form></div>",
        7,
        respondent_store(),
        SurveyConfig::default(),
    )?;
    bare.click("#go")?;
    let wrap = bare.dump_dom("#wrap")?;
    assert!(wrap.starts_with("<div id=\"wrap\"><div class=\"error-summary\""), "{wrap}");
    Ok(())
}

#[test]
fn inline_message_follows_the_wrapping_label() -> Result<()> {
    let mut page = load_profile()?;
    page.type_text("#name", "Aya")?;
    page.click("#next")?;
    let form = page.dump_dom("#surveyForm")?;
    assert!(form.contains("F</label><span class=\"error-message\">"), "{form}");
    Ok(())
}

#[test]
fn back_control_is_never_guarded() -> Result<()> {
    let mut page = load_profile()?;
    page.click("#back")?;
    assert_eq!(page.navigated_to(), Some("form1.html"));
    page.assert_count(".error-message", 0)?;
    Ok(())
}

#[test]
fn guard_suppresses_other_click_listeners() -> Result<()> {
    let mut page = load_profile()?;
    page.add_event_listener("#next", "click", false, "page-script")?;
    page.add_event_listener("#surveyForm", "click", false, "form-bubble")?;
    page.click("#next")?;
    assert!(page.listener_calls().is_empty());

    page.add_event_listener("#back", "click", false, "back-script")?;
    page.click("#back")?;
    assert_eq!(page.listener_calls(), &["back-script", "form-bubble"]);
    Ok(())
}

#[test]
fn without_forward_label_the_last_candidate_is_guarded() -> Result<()> {
    let html = r#"
        <form id='surveyForm'>
          <input id='q' name='q' required>
          <a id='first' onclick="location.href='form1.html'">A</a>
          <input id='second' type='button' value='B' data-next-page='form6.html'>
        </form>
    "#;
    let mut page = SurveyPage::load("form5.html", html, 5, respondent_store(), SurveyConfig::default())?;
    page.click("#first")?;
    assert_eq!(page.take_navigation().as_deref(), Some("form1.html"));

    page.click("#second")?;
    assert_eq!(page.navigated_to(), None);
    page.type_text("#q", "ok")?;
    page.click("#second")?;
    assert_eq!(page.navigated_to(), Some("form6.html"));
    Ok(())
}

#[test]
fn guard_falls_back_to_the_configured_container() -> Result<()> {
    let html = r#"
        <div id='surveyForm'><textarea id='memo' name='memo' required>   </textarea></div>
        <button id='next' onclick="location.href='form9.html'">Next »</button>
    "#;
    let mut page = SurveyPage::load("form8.html", html, 8, respondent_store(), SurveyConfig::default())?;
    page.click("#next")?;
    assert_eq!(page.navigated_to(), None);
    page.assert_has_class("#memo", "error", true)?;
    Ok(())
}

#[test]
fn missing_container_leaves_the_control_unguarded() -> Result<()> {
    let html = r#"
        <input id='q' name='q' required>
        <button id='next' onclick="location.href='form2.html'">次へ</button>
    "#;
    let mut page = SurveyPage::load("form1.html", html, 1, respondent_store(), SurveyConfig::default())?;
    page.click("#next")?;
    assert_eq!(page.navigated_to(), Some("form2.html"));
    assert!(page.console().messages_at(LogLevel::Error).iter().all(|msg| !msg.contains("guard")));
    Ok(())
}

#[test]
fn permissive_kinds_never_block() -> Result<()> {
    let html = r#"
        <form id='surveyForm'>
          <select id='s' name='s' required><option value=''>--</option></select>
          <input type='hidden' name='token' required>
          <button id='next' onclick="location.href='form2.html'">next</button>
        </form>
    "#;
    let mut page = SurveyPage::load("form1.html", html, 1, respondent_store(), SurveyConfig::default())?;
    assert!(page.validate_required()?.is_empty());
    page.click("#next")?;
    assert_eq!(page.navigated_to(), Some("form2.html"));
    Ok(())
}
