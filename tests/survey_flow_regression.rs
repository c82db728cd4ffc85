use survey_autosave::{
    FieldValue, FormSnapshot, GuardOutcome, KeyValueStore, LogLevel, MemoryStore, SharedStore,
    SurveyConfig, SurveyPage, SurveySession, USER_ID_KEY,
};

const CONSENT_FORM: &str = r#"
    <form id="surveyForm">
      <section>
        <h2>同意</h2>
        <input id="office" name="office_id" required>
        <label><input id="consent-yes" type="radio" name="consent" value="yes" required>はい</label>
        <label><input id="consent-no" type="radio" name="consent" value="no" required>いいえ</label>
        <textarea id="comment" name="comment"></textarea>
      </section>
      <button id="to-form1" type="button" onclick="location.href = &quot;form1.html&quot;">次へ ▶</button>
    </form>
"#;

const DRAWING_FORM: &str = r#"
    <form id="surveyForm">
      <canvas id="bodyMap" width="300" height="200"></canvas>
      <label><input id="pain-head" type="checkbox" name="pain" value="head">head</label>
      <label><input id="pain-back" type="checkbox" name="pain" value="back">back</label>
      <button id="prev" type="button" onclick="location.href='form0.html'">◀ 戻る</button>
      <button id="next" type="button" onclick="location.href='form2.html'">次へ ▶</button>
    </form>
"#;

fn store_for(user: &str) -> SharedStore {
    SharedStore::new(MemoryStore::with_entries(&[(USER_ID_KEY, user)]))
}

#[test]
fn entity_encoded_inline_handler_is_guarded() -> survey_autosave::Result<()> {
    let mut page = SurveyPage::load("form0.html", CONSENT_FORM, 0, store_for("u-1"), SurveyConfig::default())?;
    page.click("#to-form1")?;
    assert!(matches!(page.last_guard_outcome(), Some(GuardOutcome::Blocked(entries)) if entries.len() == 2));

    page.type_text("#office", "A-12")?;
    page.set_checked("#consent-yes", true)?;
    page.click("#to-form1")?;
    assert_eq!(page.navigated_to(), Some("form1.html"));
    Ok(())
}

#[test]
fn whitespace_only_answers_do_not_count() -> survey_autosave::Result<()> {
    let mut page = SurveyPage::load("form0.html", CONSENT_FORM, 0, store_for("u-1"), SurveyConfig::default())?;
    page.type_text("#office", " \t ")?;
    page.set_checked("#consent-no", true)?;
    page.click("#to-form1")?;
    assert_eq!(page.navigated_to(), None);
    page.assert_has_class("#office", "error", true)?;
    page.assert_has_class("#consent-yes", "error", false)?;
    page.assert_scrolled_into_view("#office")?;
    Ok(())
}

#[test]
fn respondents_do_not_share_records() -> survey_autosave::Result<()> {
    let store = SharedStore::new(MemoryStore::new());
    let mut first = store.clone();
    first.set(USER_ID_KEY, "u-1");
    let mut page = SurveyPage::load("form0.html", CONSENT_FORM, 0, store.clone(), SurveyConfig::default())?;
    page.type_text("#comment", "first respondent")?;

    first.set(USER_ID_KEY, "u-2");
    let page = SurveyPage::load("form0.html", CONSENT_FORM, 0, store.clone(), SurveyConfig::default())?;
    page.assert_value("#comment", "")?;
    assert!(store.has("surveyData_u-1_form0"));
    assert!(!store.has("surveyData_u-2_form0"));
    Ok(())
}

#[test]
fn drawing_and_checkboxes_round_trip_through_a_session() -> survey_autosave::Result<()> {
    let mut session = SurveySession::new(store_for("u-5"), SurveyConfig::default());
    session.register_page("form0.html", CONSENT_FORM, 0);
    session.register_page("form1.html", DRAWING_FORM, 1);

    let page = session.open("form1.html")?;
    page.draw_on_canvas("#bodyMap", &[1, 2, 3, 4])?;
    page.click("#pain-back")?;
    page.click("#pain-head")?;
    page.click("#prev")?;
    assert!(session.follow_navigation()?);
    assert_eq!(session.current_url(), Some("form0.html"));

    let stored = FormSnapshot::from_json(
        &session.store().get("surveyData_u-5_form1").unwrap_or_default(),
    )?;
    assert_eq!(stored.get("pain"), Some(&FieldValue::from(vec!["head", "back"])));
    assert!(matches!(
        stored.get("bodyMap_image"),
        Some(FieldValue::Single(url)) if url == "data:image/png;base64,AQIDBA=="
    ));

    let page = session.open("form1.html")?;
    page.flush()?;
    assert_eq!(page.canvas_raster("#bodyMap")?, vec![1, 2, 3, 4]);
    page.assert_checked("#pain-head", true)?;
    page.assert_checked("#pain-back", true)?;
    Ok(())
}

#[test]
fn undecodable_canvas_record_is_logged_on_flush() -> survey_autosave::Result<()> {
    let store = store_for("u-3");
    store.clone().set(
        "surveyData_u-3_form1",
        r#"{"bodyMap_image":"data:image/png;base64,%%%","pain":"head"}"#,
    );
    let mut page = SurveyPage::load("form1.html", DRAWING_FORM, 1, store, SurveyConfig::default())?;
    page.assert_checked("#pain-head", true)?;
    page.flush()?;
    assert!(page.canvas_raster("#bodyMap")?.is_empty());
    assert_eq!(page.console().messages_at(LogLevel::Error).len(), 1);
    Ok(())
}

#[test]
fn harness_rejects_mismatched_controls() {
    let mut page = match SurveyPage::load(
        "form1.html",
        DRAWING_FORM,
        1,
        store_for("u-1"),
        SurveyConfig::default(),
    ) {
        Ok(page) => page,
        Err(err) => panic!("load failed: {err}"),
    };
    assert!(matches!(
        page.type_text("#pain-head", "x"),
        Err(survey_autosave::Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        page.draw_on_canvas("#next", &[0]),
        Err(survey_autosave::Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        page.click("#missing"),
        Err(survey_autosave::Error::SelectorNotFound(_))
    ));
}
