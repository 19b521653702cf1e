//! Upload and recommendation flows over the in-memory backend.

mod common;

use assert_matches::assert_matches;
use common::{analysis_reply, item, photo, tagged, TestHarness};
use wardrobe::ai::OutfitRequest;
use wardrobe::pipeline::{UploadFile, UploadStage};
use wardrobe::render::{ANALYZING, UNTITLED};
use wardrobe::storage::DEFAULT_RECENT_LIMIT;
use wardrobe_common::{Error, ItemId, ItemStatus, UNKNOWN};

#[tokio::test]
async fn test_parse_failure_is_isolated_to_its_file() {
    let h = TestHarness::new();
    h.model
        .reply(analysis_reply("T-Shirt", "Top"))
        .reply("I think this is a shirt!")
        .reply(format!("```json\n{}\n```", analysis_reply("Jeans", "Bottom")));

    let files = vec![photo("one.jpg"), photo("two.jpg"), photo("three.jpg")];
    let report = h.wardrobe.upload_batch(files, |_| {}).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(h.backend.upload_attempts(), 3);
    assert_eq!(h.model.calls(), 3);

    let second = &report.outcomes[1];
    assert_eq!(second.file, "two.jpg");
    assert_matches!(second.error, Some(Error::Parse(_)));

    // The record exists but stays processing
    let stuck_id = second.item_id.clone().unwrap();
    let stuck = h.wardrobe.item(&stuck_id).await.unwrap();
    assert_eq!(stuck.status, ItemStatus::Processing);
    assert!(stuck.ai_data.is_none());

    let items = h.backend.items();
    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    assert_eq!(items[0].status, ItemStatus::Available);
    assert_eq!(items[0].category.as_deref(), Some("Top"));
    assert_eq!(items[2].category.as_deref(), Some("Bottom"));
}

#[tokio::test]
async fn test_upload_failure_writes_no_record() {
    let h = TestHarness::new();
    h.backend.fail_uploads(true);

    let report = h
        .wardrobe
        .upload_batch(vec![photo("a.png"), photo("b.png")], |_| {})
        .await
        .unwrap();

    assert_eq!(report.failed, 2);
    assert!(h.backend.items().is_empty());
    assert_eq!(h.model.calls(), 0);
    assert!(report.outcomes.iter().all(|o| o.item_id.is_none()));
    assert_matches!(report.outcomes[0].error, Some(Error::Upload(_)));
}

#[tokio::test]
async fn test_insert_failure_leaves_orphaned_blob() {
    let h = TestHarness::new();
    h.backend.fail_inserts(true);

    let report = h.wardrobe.upload_batch(vec![photo("coat.png")], |_| {}).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_matches!(report.outcomes[0].error, Some(Error::Insert(_)));
    assert!(h.backend.items().is_empty());
    assert_eq!(h.backend.object_keys().len(), 1);
    assert!(h.backend.object_keys()[0].ends_with("_coat_png.webp"));
}

#[tokio::test]
async fn test_undecodable_file_never_reaches_storage() {
    let h = TestHarness::new();
    h.model.reply(analysis_reply("Scarf", "Accessory"));

    let files = vec![
        UploadFile::new("notes.txt", b"not an image".to_vec()),
        photo("scarf.png"),
    ];
    let report = h.wardrobe.upload_batch(files, |_| {}).await.unwrap();

    assert_matches!(report.outcomes[0].error, Some(Error::Decode(_)));
    assert!(report.outcomes[1].is_success());
    assert_eq!(h.backend.upload_attempts(), 1);
}

#[tokio::test]
async fn test_update_failure_keeps_item_processing() {
    let h = TestHarness::new();
    h.backend.fail_updates(true);
    h.model.reply(analysis_reply("Boots", "Shoes"));

    let report = h.wardrobe.upload_batch(vec![photo("boots.png")], |_| {}).await.unwrap();

    assert_matches!(report.outcomes[0].error, Some(Error::Update(_)));
    let items = h.backend.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, ItemStatus::Processing);
}

#[tokio::test]
async fn test_progress_stages_in_order() {
    let h = TestHarness::new();
    h.model.reply(analysis_reply("Hat", "Accessory"));

    let mut stages = Vec::new();
    let mut preview_seen = None;
    let report = h
        .wardrobe
        .upload_batch(vec![photo("hat.png")], |p| {
            assert_eq!((p.index, p.total, p.file), (1, 1, "hat.png"));
            if let UploadStage::Uploading {
                preview: Some(path),
            } = &p.stage
            {
                assert!(path.exists());
                preview_seen = Some(path.clone());
            }
            stages.push(p.stage.clone());
        })
        .await
        .unwrap();

    let id = report.outcomes[0].item_id.clone().unwrap();
    assert_eq!(stages.len(), 4);
    assert_eq!(stages[0], UploadStage::Compressing);
    assert_matches!(stages[1], UploadStage::Uploading { .. });
    assert_eq!(stages[2], UploadStage::Analyzing);
    assert_eq!(stages[3], UploadStage::Persisted(id));
    assert!(stages[3].is_terminal());

    let preview = preview_seen.unwrap();
    assert!(!preview.exists());
}

#[tokio::test]
async fn test_vision_request_carries_compressed_image() {
    let h = TestHarness::new();
    h.model.reply(analysis_reply("Dress", "One-Piece"));

    h.wardrobe.upload_batch(vec![photo("dress.png")], |_| {}).await.unwrap();

    let request = &h.model.requests()[0];
    assert_eq!(request.len(), 2);
    assert!(h.model.prompt(0).contains("PURE JSON"));
    assert_matches!(
        &request[1],
        wardrobe::ai::Part::InlineData { inline_data } if inline_data.mime_type == "image/webp"
    );
}

#[tokio::test]
async fn test_loosely_typed_analysis_is_persisted() {
    let h = TestHarness::new();
    h.model.reply(
        r#"{"type": "Shirt", "color": ["Red", "White"], "category": "Top", "tags": "Striped, Nautical", "description": "Breton top"}"#,
    );

    let report = h
        .wardrobe
        .upload_batch(vec![photo("breton.png")], |_| {})
        .await
        .unwrap();
    assert!(report.all_succeeded(), "{:?}", report.outcomes);

    let item = &h.backend.items()[0];
    assert_eq!(item.status, ItemStatus::Available);
    assert_eq!(item.category.as_deref(), Some("Top"));
    assert_eq!(item.tags, vec!["Striped", "Nautical"]);
    let ai = item.ai_data.as_ref().unwrap();
    assert_eq!(ai.get("color"), Some(&serde_json::json!(["Red", "White"])));
}

#[tokio::test]
async fn test_analysis_with_odd_category_falls_back_to_unknown() {
    let h = TestHarness::new();
    h.model
        .reply(r#"{"type": "Belt", "category": ["Accessory"], "tags": 3}"#)
        .reply(r#"{"type": "Cap", "category": {"name": "Accessory"}}"#);

    let report = h
        .wardrobe
        .upload_batch(vec![photo("belt.png"), photo("cap.png")], |_| {})
        .await
        .unwrap();
    assert_eq!(report.succeeded, 2);

    let items = h.backend.items();
    assert_eq!(items[0].category.as_deref(), Some("Accessory"));
    assert!(items[0].tags.is_empty());
    assert_eq!(items[1].category.as_deref(), Some(UNKNOWN));
}

#[tokio::test]
async fn test_recommend_empty_wardrobe_makes_no_request() {
    let h = TestHarness::new();
    h.backend
        .seed([item(1, "Unanalysed", ItemStatus::Processing, 0)]);

    let result = h.wardrobe.recommend(&OutfitRequest::default()).await;

    assert_matches!(result, Err(Error::EmptyWardrobe));
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_recommend_uses_only_available_items() {
    let h = TestHarness::new();
    h.backend.seed([
        tagged(1, "Blue Tee", "T-Shirt", "Blue", "Top"),
        item(2, "Mystery Jacket", ItemStatus::Processing, 0),
    ]);
    h.model.reply(
        r#"```json
{"title": "Easy Blue", "reason": "Simple and cool.", "itemIds": [1], "notes": "Tuck it in"}
```"#,
    );

    let request = OutfitRequest::new(Some("picnic"), Some("sunny"));
    let view = h.wardrobe.recommend(&request).await.unwrap();

    let prompt = h.model.prompt(0);
    assert!(prompt.contains("Blue Tee"));
    assert!(prompt.contains(r#""id":"1""#));
    assert!(!prompt.contains("Mystery Jacket"));
    assert!(prompt.contains("- Occasion: picnic"));
    assert_eq!(h.model.requests()[0].len(), 1);

    assert_eq!(view.title, "Easy Blue");
    assert_eq!(view.pieces.len(), 1);
    assert_eq!(view.pieces[0].name, "Blue Tee");
}

#[tokio::test]
async fn test_recommend_tolerates_dangling_ids() {
    let h = TestHarness::new();
    h.backend.seed([
        tagged(1, "Blue Tee", "T-Shirt", "Blue", "Top"),
        tagged(3, "Black Jeans", "Jeans", "Black", "Bottom"),
    ]);
    h.model
        .reply(r#"{"title": "Night out", "reason": "Dark tones.", "itemIds": ["3", "42", "1"], "notes": ""}"#);

    let view = h.wardrobe.recommend(&OutfitRequest::default()).await.unwrap();

    let names: Vec<_> = view.pieces.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Black Jeans", "Blue Tee"]);
    assert_eq!(view.missing, vec![ItemId::from(42)]);
}

#[tokio::test]
async fn test_recommend_accepts_null_notes() {
    let h = TestHarness::new();
    h.backend.seed([tagged(1, "Blue Tee", "T-Shirt", "Blue", "Top")]);
    h.model
        .reply(r#"{"title": "Casual", "reason": "Easy.", "itemIds": ["1"], "notes": null}"#);

    let view = h.wardrobe.recommend(&OutfitRequest::default()).await.unwrap();
    assert_eq!(view.title, "Casual");
    assert_eq!(view.pieces.len(), 1);
}

#[tokio::test]
async fn test_recommend_propagates_model_errors() {
    let h = TestHarness::new();
    h.backend.seed([tagged(1, "Blue Tee", "T-Shirt", "Blue", "Top")]);
    h.model.fail(Error::Api {
        status: 503,
        body: "overloaded".into(),
    });

    let result = h.wardrobe.recommend(&OutfitRequest::default()).await;
    assert_matches!(result, Err(Error::Api { status: 503, body }) if body == "overloaded");

    h.model.reply("no json here");
    let result = h.wardrobe.recommend(&OutfitRequest::default()).await;
    assert_matches!(result, Err(Error::Parse(_)));
}

#[tokio::test]
async fn test_reanalyze_recovers_stuck_item() {
    let h = TestHarness::new();
    h.model
        .reply("garbled")
        .reply(analysis_reply("Cardigan", "Top"));

    let report = h.wardrobe.upload_batch(vec![photo("cardigan.png")], |_| {}).await.unwrap();
    let id = report.outcomes[0].item_id.clone().unwrap();

    let analysis = h.wardrobe.reanalyze(&id).await.unwrap();
    assert_eq!(analysis.kind().as_deref(), Some("Cardigan"));

    let item = h.wardrobe.item(&id).await.unwrap();
    assert_eq!(item.status, ItemStatus::Available);
    assert_eq!(item.category.as_deref(), Some("Top"));

    // Second attempt is refused once the item is available
    assert_matches!(h.wardrobe.reanalyze(&id).await, Err(Error::Update(_)));
    assert_eq!(h.model.calls(), 2);
}

#[tokio::test]
async fn test_reanalyze_unknown_item() {
    let h = TestHarness::new();
    assert_matches!(
        h.wardrobe.reanalyze(&ItemId::from("nope")).await,
        Err(Error::NotFound(_))
    );
}

#[tokio::test]
async fn test_catalog_newest_first_with_placeholders() {
    let h = TestHarness::new();
    h.backend.seed([
        tagged(1, "Blue Tee", "T-Shirt", "Blue", "Top"),
        item(2, "", ItemStatus::Processing, 5),
        item(3, "Old Coat", ItemStatus::Processing, 60),
    ]);

    let cards = h.wardrobe.catalog().await.unwrap();

    let titles: Vec<_> = cards.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Blue Tee", UNTITLED, "Old Coat"]);
    assert_eq!(cards[0].subtitle, "Top");
    assert_eq!(cards[1].subtitle, ANALYZING);
}

#[tokio::test]
async fn test_catalog_caps_recent_items() {
    let h = TestHarness::new();
    h.backend
        .seed((1..=60).map(|i| item(i, &format!("Item {i}"), ItemStatus::Processing, i)));

    let recent = h.wardrobe.gateway().list_recent().await.unwrap();
    assert_eq!(recent.len(), DEFAULT_RECENT_LIMIT);
    assert_eq!(recent[0].id, ItemId::from(1));
    assert_eq!(recent[49].id, ItemId::from(50));
    assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    assert_eq!(h.wardrobe.catalog().await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_remove_item() {
    let h = TestHarness::new();
    h.backend.seed([
        tagged(1, "Blue Tee", "T-Shirt", "Blue", "Top"),
        item(2, "Socks", ItemStatus::Processing, 0),
    ]);

    h.wardrobe.remove(&ItemId::from(2)).await.unwrap();
    assert_eq!(h.backend.items().len(), 1);

    assert_matches!(
        h.wardrobe.remove(&ItemId::from(2)).await,
        Err(Error::NotFound(_))
    );
}
