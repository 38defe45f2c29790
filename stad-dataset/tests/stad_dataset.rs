use noisy_float::prelude::*;
use stad_dataset::{
    config::{DatasetConfig, Modality},
    dataset::{AnnotationSchema, FramePath, IndexedDataset, StadDataset},
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

fn base_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("stad_dataset")
}

fn base_config() -> DatasetConfig {
    let dir = base_dir();
    DatasetConfig {
        ann_file: dir.join("annotations.csv"),
        frame_root: dir.join("frames"),
        label_file: Some(dir.join("labelmap.txt")),
        proposal_file: Some(dir.join("proposals.json")),
        schema: AnnotationSchema::Short,
        filename_tmpl: "img_{:05}.jpg".into(),
        start_index: 1,
        modality: Modality::Rgb,
        person_det_score_thr: r64(0.9),
        num_classes: 4,
        custom_classes: Some(vec![3, 7, 9]),
        num_max_proposals: 1000,
        timestamp_start: 900,
        timestamp_end: 1800,
        use_frames: true,
        fps: 25,
        fps_file: Some(dir.join("fps.csv")),
        multilabel: true,
        class_weights: None,
        augment_labels: false,
    }
}

fn weight_config() -> DatasetConfig {
    let weights: HashMap<String, R64> = [
        ("3".to_owned(), r64(1.0)),
        ("7".to_owned(), r64(2.5)),
        ("9".to_owned(), r64(4.0)),
    ]
    .into_iter()
    .collect();
    DatasetConfig {
        class_weights: Some(weights),
        augment_labels: true,
        ..base_config()
    }
}

#[test]
fn load_groups_and_resolves_metadata() {
    let dataset = StadDataset::load(base_config()).unwrap();
    assert_eq!(dataset.num_records(), 3);
    assert!(dataset.per_sample_weights().is_none());

    let records = dataset.records();
    assert_eq!(records[0].img_key, "vid001,00902");
    assert_eq!(records[1].img_key, "vid001,00903");
    assert_eq!(records[2].img_key, "vid002,00902");

    // the two rows sharing one entity box merge into one multi-hot actor,
    // and the class-5 row is filtered out by the class list
    let ann = &records[0].ann;
    assert_eq!(ann.len(), 2);
    assert_eq!(ann.labels[0], vec![0.0, 1.0, 1.0, 0.0]);
    assert_eq!(ann.labels[1], vec![0.0, 0.0, 0.0, 1.0]);
    assert_eq!(ann.entity_ids, vec![0, 1]);
    assert!(!ann.bboxes.contains(&[50.0, 60.0, 150.0, 260.0].map(r64)));

    for record in records {
        assert_eq!(record.ann.bboxes.len(), record.ann.labels.len());
        assert_eq!(record.ann.labels.len(), record.ann.entity_ids.len());
    }

    // shot info comes from the frame directory listings; the stray
    // non-frame files in vid002's directory are ignored
    assert_eq!(records[0].shot_info, Some((1, 3)));
    assert_eq!(records[2].shot_info, Some((10, 12)));

    // vid001 has an fps override, vid002 falls back to the default
    assert_eq!(records[0].fps, 30);
    assert_eq!(records[2].fps, 25);
}

#[test]
fn nth_attaches_filtered_proposals() {
    let dataset = StadDataset::load(base_config()).unwrap();

    // one of two proposals clears the 0.9 threshold
    let item = dataset.nth(0).unwrap();
    assert_eq!(item.record.img_key, "vid001,00902");
    assert_eq!(item.filename_tmpl, "img_{:05}.jpg");
    assert_eq!(item.timestamp_start, 900);
    assert_eq!(item.timestamp_end, 1800);
    assert_eq!(item.proposals.as_ref().unwrap().len(), 1);
    assert_eq!(item.scores, Some(vec![r64(0.95)]));

    // unscored 4-column rows pass through without scores
    let item = dataset.nth(1).unwrap();
    assert_eq!(item.proposals.as_ref().unwrap().len(), 1);
    assert_eq!(item.scores, None);

    // no proposal clears the threshold, so the best one survives
    let item = dataset.nth(2).unwrap();
    assert_eq!(item.proposals.as_ref().unwrap().len(), 1);
    assert_eq!(item.scores, Some(vec![r64(0.1)]));

    assert!(dataset.nth(3).is_err());
}

#[test]
fn class_weights_enable_augmentation_and_sample_weights() {
    let dataset = StadDataset::load(weight_config()).unwrap();
    let records = dataset.records();

    // frame weights sum the pre-augmentation label weights
    let weights = dataset.per_sample_weights().unwrap();
    assert_eq!(weights, vec![r64(7.5), r64(1.0), r64(2.5)]);

    // actor {3, 7} duplicates by floor(2.5) = 2, actor {9} by floor(4.0) = 4
    assert_eq!(records[0].ann.len(), 6);
    assert_eq!(records[0].ann.entity_ids, vec![0, 0, 1, 1, 1, 1]);
    // a single weight-1.0 class stays untouched
    assert_eq!(records[1].ann.len(), 1);
    assert_eq!(records[2].ann.len(), 2);
}

#[test]
fn augmentation_without_weights_is_a_no_op() {
    let plain = StadDataset::load(base_config()).unwrap();
    let augment_only = StadDataset::load(DatasetConfig {
        augment_labels: true,
        ..base_config()
    })
    .unwrap();

    for (lhs, rhs) in plain.records().iter().zip(augment_only.records()) {
        assert_eq!(lhs.ann, rhs.ann);
    }
}

#[test]
fn video_mode_defers_shot_info() {
    let dataset = StadDataset::load(DatasetConfig {
        use_frames: false,
        ..base_config()
    })
    .unwrap();

    for record in dataset.records() {
        assert_eq!(record.shot_info, None);
        assert!(matches!(record.path, FramePath::Filename(_)));
    }
}

#[test]
fn grouping_is_stable_across_interleaved_lines() {
    let dataset = StadDataset::load(DatasetConfig {
        ann_file: base_dir().join("interleaved.csv"),
        ..base_config()
    })
    .unwrap();

    // vid001's timestamp-902 lines are split by other frames in the file,
    // yet all land in the same record
    assert_eq!(dataset.num_records(), 3);
    let records = dataset.records();
    assert_eq!(records[0].img_key, "vid001,00902");
    assert_eq!(records[1].img_key, "vid001,00903");
    assert_eq!(records[2].img_key, "vid002,00902");

    let ann = &records[0].ann;
    assert_eq!(ann.len(), 2);
    assert_eq!(ann.labels[0], vec![0.0, 1.0, 1.0, 0.0]);
    assert_eq!(ann.entity_ids, vec![0, 1]);
}

#[test]
fn whitelisted_away_video_still_requires_frames() {
    // vid999's only line is outside the class list, but its frame
    // directory is still demanded
    let err = StadDataset::load(DatasetConfig {
        ann_file: base_dir().join("filtered_video.csv"),
        ..base_config()
    })
    .unwrap_err();
    assert!(format!("{:#}", err).contains("frame directory"));
}

#[test]
fn missing_frame_directory_fails() {
    let err = StadDataset::load(DatasetConfig {
        frame_root: base_dir().join("no-such-frames"),
        ..base_config()
    })
    .unwrap_err();
    assert!(format!("{:#}", err).contains("frame directory"));
}

#[test]
fn without_class_list_original_ids_are_kept() {
    let dataset = StadDataset::load(DatasetConfig {
        custom_classes: None,
        label_file: None,
        num_classes: 10,
        ..base_config()
    })
    .unwrap();

    // nothing is filtered; the class-5 actor appears as its own box
    assert_eq!(dataset.num_records(), 3);
    let ann = &dataset.records()[0].ann;
    assert_eq!(ann.len(), 3);
    assert_eq!(ann.labels[2][5], 1.0);
}
