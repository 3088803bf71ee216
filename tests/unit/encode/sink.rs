use serde_json::Value;

use super::*;
use crate::foundation::error::VizageError;
use crate::session::batch::EncodedPortrait;
use crate::test_fixture::{full_face, scratch_dir};

const CFG: SinkConfig = SinkConfig {
    size: 64,
    thumbnail_size: 16,
    total: 2,
};

fn ok_item(index: usize, name: &str) -> BatchItem {
    BatchItem {
        index,
        name: name.to_owned(),
        config: full_face(),
        result: Ok(EncodedPortrait {
            full_size_png: vec![1, 2, 3],
            thumbnail_png: vec![4, 5],
        }),
    }
}

fn failed_item(index: usize, name: &str) -> BatchItem {
    BatchItem {
        index,
        name: name.to_owned(),
        config: full_face(),
        result: Err(VizageError::unresolved_part("hair99")),
    }
}

fn drive(sink: &mut dyn PortraitSink) {
    sink.begin(CFG).unwrap();
    sink.push_item(ok_item(0, "a")).unwrap();
    sink.push_item(failed_item(1, "b")).unwrap();
    sink.end().unwrap();
}

#[test]
fn in_memory_sink_keeps_items_and_config() {
    let mut sink = InMemorySink::new();
    drive(&mut sink);
    assert_eq!(sink.config(), Some(CFG));
    assert!(sink.ended());
    let items = sink.into_items();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(!items[1].is_ok());
}

#[test]
fn json_lines_sink_emits_one_event_per_line() {
    let mut sink = JsonLinesSink::new(Vec::new());
    drive(&mut sink);
    let out = String::from_utf8(sink.into_inner()).unwrap();
    let events: Vec<Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 4);

    assert_eq!(events[0]["event"], "start");
    assert_eq!(events[0]["total"], 2);
    assert_eq!(events[0]["thumbnailSize"], 16);

    assert_eq!(events[1]["event"], "item");
    assert_eq!(events[1]["index"], 0);
    assert_eq!(events[1]["name"], "a");
    assert_eq!(events[1]["config"]["hairColor"], "#8e7355");
    assert_eq!(events[1]["thumbnail"], png_data_url(&[4, 5]));
    assert_eq!(events[1]["fullSizeImage"], png_data_url(&[1, 2, 3]));

    assert_eq!(events[2]["event"], "error");
    assert_eq!(events[2]["name"], "b");
    assert!(
        events[2]["error"]
            .as_str()
            .unwrap()
            .contains("unresolved part")
    );

    assert_eq!(events[3]["event"], "end");
    assert_eq!(events[3]["ok"], 1);
    assert_eq!(events[3]["failed"], 1);
}

#[test]
fn directory_sink_writes_images_and_index() {
    let dir = scratch_dir("directory_sink").join("out");
    let mut sink = DirectorySink::new(&dir);
    drive(&mut sink);

    assert_eq!(std::fs::read(dir.join("a.png")).unwrap(), vec![1, 2, 3]);
    assert_eq!(std::fs::read(dir.join("a.thumb.png")).unwrap(), vec![4, 5]);
    assert!(!dir.join("b.png").exists());

    let index = std::fs::read(dir.join(PORTRAITS_INDEX_FILE)).unwrap();
    let records: Vec<PortraitConfig> = serde_json::from_slice(&index).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "a");
    assert_eq!(records[0].full_size_image.as_deref(), Some("a.png"));
    assert_eq!(records[0].thumbnail, png_data_url(&[4, 5]));
    assert_eq!(records[0].config, full_face());
}

#[test]
fn directory_sink_keeps_colliding_names_apart() {
    let dir = scratch_dir("directory_sink_collide");
    let mut sink = DirectorySink::new(&dir);
    sink.begin(CFG).unwrap();
    sink.push_item(ok_item(0, "a/b")).unwrap();
    sink.push_item(ok_item(1, "a_b")).unwrap();
    sink.push_item(ok_item(2, "A_B")).unwrap();
    sink.end().unwrap();

    let files: Vec<_> = sink
        .records()
        .iter()
        .map(|r| r.full_size_image.clone().unwrap())
        .collect();
    assert_eq!(files, vec!["a_b.png", "a_b_2.png", "A_B_3.png"]);
    for f in &files {
        assert!(sink.dir().join(f).is_file());
    }
    assert!(dir.join("a_b_2.thumb.png").is_file());
}

#[test]
fn file_stems_stay_inside_the_directory() {
    assert_eq!(file_stem("p_1_0_abc123"), "p_1_0_abc123");
    assert_eq!(file_stem("../evil"), "_evil");
    assert_eq!(file_stem("a b/c"), "a_b_c");
    assert_eq!(file_stem(".."), "portrait");
}
