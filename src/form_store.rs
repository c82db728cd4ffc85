use super::*;
use crate::dom::Dom;
use crate::canvas::Canvases;
use crate::form_controls::{controls_named, named_controls};

/// Storage key of one form page's snapshot.
pub fn storage_key(identity: &str, form_index: u32) -> String {
    storage_key_with_prefix(&SurveyConfig::default().storage_key_prefix, identity, form_index)
}

pub(crate) fn storage_key_with_prefix(prefix: &str, identity: &str, form_index: u32) -> String {
    format!("{prefix}{identity}_form{form_index}")
}

/// Captures every named control of `form` and every canvas inside it.
/// A canvas that cannot be exported is skipped and logged.
pub(crate) fn capture_snapshot(
    dom: &Dom,
    form: NodeId,
    canvases: &Canvases,
    config: &SurveyConfig,
    console: &mut Console,
) -> Result<FormSnapshot> {
    let mut snapshot = FormSnapshot::new();
    for (node, name) in named_controls(dom, form) {
        ControlKind::of(dom, node).capture(dom, node, &name, &mut snapshot)?;
    }

    for (index, canvas) in dom.descendants_by_tag(form, "canvas").into_iter().enumerate() {
        let canvas_id = dom
            .attr(canvas, "id")
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("canvas_{index}"));
        match canvases.to_data_url(canvas, &config.canvas_mime) {
            Ok(data_url) => {
                snapshot.insert(
                    format!("{canvas_id}{}", config.canvas_image_suffix),
                    data_url.as_str(),
                );
                console.debug(format!("captured canvas {canvas_id}"));
            }
            Err(err) => console.error(format!("canvas {canvas_id} was not saved: {err}")),
        }
    }
    Ok(snapshot)
}

/// Replays `snapshot` into `form` without dispatching events. Canvas
/// images are only queued; they are drawn when the queue is run.
pub(crate) fn restore_snapshot(
    dom: &mut Dom,
    form: NodeId,
    snapshot: &FormSnapshot,
    canvases: &mut Canvases,
    config: &SurveyConfig,
    console: &mut Console,
) -> Result<()> {
    for (key, stored) in snapshot.iter() {
        if let Some(canvas_id) = key.strip_suffix(config.canvas_image_suffix.as_str()) {
            let Some(canvas) = dom.by_id(canvas_id).filter(|node| dom.has_tag(*node, "canvas")) else {
                continue;
            };
            canvases.queue_draw(canvas, &stored.joined());
            console.debug(format!("queued canvas restore for {canvas_id}"));
            continue;
        }

        let mut representative_written = false;
        for node in controls_named(dom, form, key) {
            let kind = ControlKind::of(dom, node);
            if kind.is_selectable() {
                kind.restore_checked(dom, node, stored)?;
            } else if !representative_written {
                kind.restore_value(dom, node, stored)?;
                representative_written = true;
            }
        }
    }
    Ok(())
}

pub fn persist(store: &mut dyn KeyValueStore, key: &str, snapshot: &FormSnapshot) -> Result<()> {
    store.set(key, &snapshot.to_json()?);
    Ok(())
}

/// Reads the snapshot under `key`. Unreadable text is logged and treated
/// as absent.
pub fn load(store: &dyn KeyValueStore, key: &str, console: &mut Console) -> Option<FormSnapshot> {
    let text = store.get(key)?;
    match FormSnapshot::from_json(&text) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            console.error(format!("stored data under {key} could not be restored: {err}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_of(dom: &Dom) -> Result<NodeId> {
        dom.by_id("surveyForm")
            .ok_or_else(|| Error::SelectorNotFound("#surveyForm".into()))
    }

    const FORM: &str = "<form id=surveyForm>\
        <input name=name value='Aya'>\
        <input name=blank>\
        <input type=hidden name=token value=t1>\
        <input name=off value=kept disabled>\
        <input type=radio name=g value=m><input type=radio name=g value=f checked>\
        <input type=checkbox name=i value=a checked><input type=checkbox name=i value=b>\
        <input type=checkbox name=i value=c checked><input type=checkbox name=i value=a checked>\
        <textarea name=memo>line</textarea>\
        <select name=pref><option>x</option><option selected>y</option></select>\
        <input type=submit name=go value=send>\
        <canvas id=sig></canvas><canvas></canvas>\
      </form>";

    #[test]
    fn capture_collects_values_by_kind() -> Result<()> {
        let dom = html::parse_html(FORM)?;
        let mut canvases = Canvases::default();
        let mut console = Console::new();
        let snapshot = capture_snapshot(
            &dom,
            form_of(&dom)?,
            &canvases,
            &SurveyConfig::default(),
            &mut console,
        )?;
        assert_eq!(snapshot.get("name"), Some(&FieldValue::from("Aya")));
        assert_eq!(snapshot.get("blank"), None);
        assert_eq!(snapshot.get("token"), Some(&FieldValue::from("t1")));
        assert_eq!(snapshot.get("off"), Some(&FieldValue::from("kept")));
        assert_eq!(snapshot.get("g"), Some(&FieldValue::from("f")));
        assert_eq!(snapshot.get("i"), Some(&FieldValue::from(vec!["a", "c"])));
        assert_eq!(snapshot.get("memo"), Some(&FieldValue::from("line")));
        assert_eq!(snapshot.get("pref"), Some(&FieldValue::from("y")));
        assert_eq!(snapshot.get("go"), None);
        assert!(snapshot.contains_key("sig_image"));
        assert!(snapshot.contains_key("canvas_1_image"));

        let sig = dom.by_id("sig").ok_or_else(|| Error::SelectorNotFound("#sig".into()))?;
        canvases.set_tainted(sig, true);
        let snapshot = capture_snapshot(
            &dom,
            form_of(&dom)?,
            &canvases,
            &SurveyConfig::default(),
            &mut console,
        )?;
        assert!(!snapshot.contains_key("sig_image"));
        assert!(snapshot.contains_key("canvas_1_image"));
        assert_eq!(console.messages_at(LogLevel::Error).len(), 1);
        Ok(())
    }

    #[test]
    fn restore_sets_checked_state_and_representative_value() -> Result<()> {
        let mut dom = html::parse_html(
            "<form id=surveyForm>\
               <input id=t1 name=t><input id=t2 name=t>\
               <input id=c1 type=checkbox name=c value=a checked><input id=c2 type=checkbox name=c value=b>\
               <input id=r1 type=radio name=r value=x><input id=r2 type=radio name=r value=y>\
               <input id=list name=list>\
             </form>",
        )?;
        let form = form_of(&dom)?;
        let snapshot: FormSnapshot = [
            ("t", FieldValue::from("hello")),
            ("c", FieldValue::from(vec!["b"])),
            ("r", FieldValue::from("y")),
            ("list", FieldValue::from(vec!["a", "b"])),
            ("missing", FieldValue::from("ignored")),
        ]
        .into_iter()
        .collect();
        let mut canvases = Canvases::default();
        let mut console = Console::new();
        restore_snapshot(
            &mut dom,
            form,
            &snapshot,
            &mut canvases,
            &SurveyConfig::default(),
            &mut console,
        )?;

        let node = |id: &str| dom.by_id(id).ok_or_else(|| Error::SelectorNotFound(id.into()));
        assert_eq!(dom.value(node("t1")?)?, "hello");
        assert_eq!(dom.value(node("t2")?)?, "");
        assert!(!dom.checked(node("c1")?)?);
        assert!(dom.checked(node("c2")?)?);
        assert!(!dom.checked(node("r1")?)?);
        assert!(dom.checked(node("r2")?)?);
        assert_eq!(dom.value(node("list")?)?, "a,b");
        Ok(())
    }

    #[test]
    fn persist_is_idempotent_and_corruption_loads_as_none() -> Result<()> {
        let mut store = MemoryStore::new();
        let mut console = Console::new();
        let key = storage_key("temp_1_abcdef", 3);
        assert_eq!(key, "surveyData_temp_1_abcdef_form3");

        let snapshot: FormSnapshot = [("name", "Aya")].into_iter().collect();
        persist(&mut store, &key, &snapshot)?;
        let once = store.get(&key);
        persist(&mut store, &key, &snapshot)?;
        assert_eq!(store.get(&key), once);
        assert_eq!(load(&store, &key, &mut console), Some(snapshot));

        store.set(&key, "{\"name\": ");
        assert_eq!(load(&store, &key, &mut console), None);
        assert_eq!(console.messages_at(LogLevel::Error).len(), 1);
        assert_eq!(load(&store, "absent", &mut console), None);
        Ok(())
    }
}
