use super::*;

#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("make it blue!"), "make_it_blue");
    assert_eq!(sanitize_filename("  a  b  "), "a_b");
    assert_eq!(sanitize_filename("keep-dashes_and_underscores"), "keep-dashes_and_underscores");
    assert_eq!(sanitize_filename("???"), "");
}

#[test]
fn test_media_output_name() {
    assert_eq!(media_output_name(0, "cat.png"), "01-grok-cat.mp4");
    assert_eq!(media_output_name(11, "my.photo.jpeg"), "12-grok-my.photo.mp4");
    assert_eq!(media_output_name(2, "noext"), "03-grok-noext.mp4");
}

#[test]
fn test_edit_output_name_truncates_prompt() {
    let name = edit_output_name(1, "Replace the sky with a purple nebula full of stars");
    assert_eq!(name, "02-edit-Replace_the_sky_with_a_purple.png");
}

#[test]
fn test_prompt_label() {
    assert_eq!(prompt_label(0, "short"), "Prompt 1: \"short\"");

    let long = "x".repeat(45);
    let label = prompt_label(2, &long);
    assert_eq!(label, format!("Prompt 3: \"{}...\"", "x".repeat(40)));
}

#[test]
fn test_queue_item_from_path() {
    let item = QueueItem::from_path(4, "/tmp/images/dog.webp");
    assert_eq!(item.source_name, "dog.webp");
    assert_eq!(item.output_name, "05-grok-dog.mp4");
    assert!(item.payload.is_file_backed());
}

#[test]
fn test_inline_payload_not_file_backed() {
    let payload = ImagePayload::DataUrl("data:image/png;base64,AAAA".to_string());
    assert!(!payload.is_file_backed());
}
