use super::*;
use automator_protocols::AspectRatio;

fn scripts() -> Scripts {
    Scripts::new(SelectorsConfig::default())
}

#[test]
fn test_aspect_ratio_locator_substitutes_ratio() {
    let locator = scripts().locator(Landmark::AspectRatioButton(AspectRatio::Portrait9x16));
    assert_eq!(
        locator,
        Locator::Css {
            selectors: vec![r#"button[aria-label="9:16"]"#.to_string()]
        }
    );
}

#[test]
fn test_video_option_matches_keywords() {
    let locator = scripts().locator(Landmark::VideoModeOption);
    match locator {
        Locator::MenuItem { selector, keywords } => {
            assert_eq!(selector, r#"[role="menuitem"]"#);
            assert_eq!(keywords, vec!["Video", "Generar"]);
        }
        other => panic!("unexpected locator: {:?}", other),
    }
}

#[test]
fn test_thumbnails_are_scoped_to_sidebar() {
    let s = scripts();
    assert_eq!(
        s.locator(Landmark::Thumbnail),
        s.locator(Landmark::ReferenceThumbnail)
    );
    assert!(matches!(
        s.locator(Landmark::Thumbnail),
        Locator::InContainer { .. }
    ));
}

#[test]
fn test_locator_serializes_with_kind_tag() {
    let json = serde_json::to_value(Locator::Css {
        selectors: vec!["video#sd-video".to_string()],
    })
    .unwrap();
    assert_eq!(json["kind"], "css");
    assert_eq!(json["selectors"][0], "video#sd-video");
    assert_eq!(serde_json::to_value(Locator::Body).unwrap()["kind"], "body");
}

#[test]
fn test_set_value_escapes_prompt() {
    let script = scripts().set_value(Landmark::EditPrompt, "say \"hi\"\n</script>");
    assert!(script.contains(r#""say \"hi\"\n</script>""#));
    assert!(script.contains("dispatchEvent(new Event('input'"));
}

#[test]
fn test_selectors_are_embedded_as_json() {
    let script = scripts().click(Landmark::BackButton);
    assert!(script.contains(r#""button[aria-label=\"Volver\"]""#));
    assert!(script.starts_with("(() => {"));
    assert!(script.ends_with("})()"));
}

#[test]
fn test_fetch_is_async_and_includes_credentials() {
    let script = scripts().fetch_data_url("https://assets.example/a.png");
    assert!(script.starts_with("(async () => {"));
    assert!(script.contains(r#"fetch("https://assets.example/a.png", { credentials: 'include' })"#));
}

#[test]
fn test_attach_file_embeds_payload() {
    let script = scripts().attach_file(Landmark::FileInput, "a.png", "image/png", "iVBORw0KGgo=");
    assert!(script.contains(r#"atob("iVBORw0KGgo=")"#));
    assert!(script.contains(r#"{ type: "image/png" }"#));
}
