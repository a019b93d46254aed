use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8765);
    assert_eq!(config.browser.page_url_pattern, "grok.com/imagine");
    assert!(config.state.persist);
    assert!(config.notify.webhook_url.is_none());
}

#[test]
fn test_media_config_default() {
    let media = MediaConfig::default();
    assert_eq!(media.aspect_ratio.as_str(), "16:9");
    assert_eq!(media.output_folder, "grok-videos");
    assert_eq!(media.completion_timeout().as_millis(), 300_000);
    assert_eq!(media.setup_settle().as_millis(), 500);
    assert_eq!(media.return_settle().as_millis(), 2000);
}

#[test]
fn test_edit_config_default() {
    let edit = EditConfig::default();
    assert_eq!(edit.delay_secs, 5);
    assert_eq!(edit.variants_per_prompt, 2);
    assert_eq!(edit.prompt_settle().as_millis(), 200);
    assert_eq!(edit.run_config().output_folder, "grok-edits");
}

#[test]
fn test_page_config_default() {
    let page = PageConfig::default();
    assert_eq!(page.transition_poll().as_millis(), 500);
    assert_eq!(page.transition_timeout().as_millis(), 10_000);
    assert_eq!(page.video_poll().as_millis(), 2000);
    assert_eq!(page.thumbnail_settle().as_millis(), 2000);
}

#[test]
fn test_aspect_ratio_selector_template() {
    let selectors = SelectorsConfig::default();
    assert_eq!(
        selectors.aspect_ratio_button_for("9:16"),
        r#"button[aria-label="9:16"]"#
    );
}

#[test]
fn test_selectors_partial_override() {
    let toml = r#"
        [page.selectors]
        back_button = "button.back"
        edit_textarea = ["textarea.prompt"]
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.page.selectors.back_button, "button.back");
    assert_eq!(config.page.selectors.edit_textarea, vec!["textarea.prompt"]);
    assert_eq!(config.page.selectors.video, "video#sd-video");
}

#[test]
fn test_automator_home_is_dot_dir() {
    assert!(automator_home().ends_with(".automator"));
}
