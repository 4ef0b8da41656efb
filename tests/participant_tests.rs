// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Test cases for participant and connectivity construction
//!
//! Tests cover:
//! - Bounding box geometry
//! - Connectivity weights from the bound network
//! - Random placement limits and the bound frame
//! - Retained module fields

use rand::rngs::StdRng;
use rand::SeedableRng;
use yal_parser::participant::connectivity::connection_weight;
use yal_parser::participant::{as_participant, BOUND};
use yal_parser::yal::reader::YalReader;
use yal_parser::{
    as_participants, parse, Module, NetworkEntry, ParticipantOptions, RetainFields, YalError,
};

fn fixture() -> Vec<Module> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/xerox_subset.yal");
    YalReader::new().read(path).expect("fixture should parse")
}

fn fixed_options() -> ParticipantOptions {
    ParticipantOptions {
        randomize_placement: false,
        ..Default::default()
    }
}

#[test]
fn test_square_geometry_any_order() {
    let orders = [
        "0 0 0 10 10 10 10 0",
        "10 10 0 0 10 0 0 10",
        "10 0 10 10 0 10 0 0",
    ];
    for dims in orders {
        let doc = format!(
            "MODULE sq; TYPE STANDARD; DIMENSIONS {dims}; IOLIST; a I 0 0; ENDIOLIST; ENDMODULE;"
        );
        let modules = parse(&doc).unwrap();
        let p = as_participant(&modules[0], &RetainFields::none()).unwrap();
        assert_eq!((p.xmin, p.ymin, p.width, p.height), (0, 0, 10, 10));
    }
}

#[test]
fn test_connection_weight_example() {
    let a = NetworkEntry {
        instance_name: "i1".to_string(),
        module_name: "M1".to_string(),
        signal_names: vec!["n1".to_string(), "n2".to_string(), "G".to_string()],
    };
    let b = NetworkEntry {
        instance_name: "i2".to_string(),
        module_name: "M2".to_string(),
        signal_names: vec!["n2".to_string(), "n3".to_string(), "G".to_string()],
    };
    assert_eq!(connection_weight(&a, &b), 1);
}

#[test]
fn test_fixture_connections() {
    let modules = fixture();
    let mut rng = StdRng::seed_from_u64(0);
    let parts = as_participants(&modules, &fixed_options(), &mut rng).unwrap();

    let by_idx = |idx: &str| parts.iter().find(|p| p.idx == idx).unwrap();
    let bk1 = by_idx("bk1");
    let bk2 = by_idx("bk2");
    let bk3 = by_idx("bk3");

    assert_eq!(bk1.connections.get("bk2"), Some(&1));
    assert_eq!(bk1.connections.get("bk3"), Some(&2));
    assert_eq!(bk2.connections.get("bk1"), Some(&1));
    assert_eq!(bk2.connections.get("bk3"), Some(&2));
    assert_eq!(bk3.connections.get("bk1"), Some(&2));
    assert_eq!(bk3.connections.get("bk2"), Some(&2));

    for p in &parts {
        assert!(!p.connections.contains_key(BOUND));
        assert!(!p.connections.contains_key(&p.idx));
    }
    assert!(by_idx(BOUND).connections.is_empty());
}

#[test]
fn test_no_bound_means_no_connections() {
    let doc = "
MODULE a; TYPE PAD; DIMENSIONS 0 0 10 10; IOLIST; p I 0 0; ENDIOLIST;
NETWORK; i1 b n1; i2 c n1; ENDNETWORK; ENDMODULE;
MODULE b; TYPE PAD; DIMENSIONS 0 0 10 10; IOLIST; p I 0 0; ENDIOLIST; ENDMODULE;
MODULE c; TYPE PAD; DIMENSIONS 0 0 10 10; IOLIST; p I 0 0; ENDIOLIST; ENDMODULE;
";
    let modules = parse(doc).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let parts = as_participants(&modules, &ParticipantOptions::default(), &mut rng).unwrap();
    assert_eq!(parts.len(), 3);
    assert!(parts.iter().all(|p| p.connections.is_empty()));
}

#[test]
fn test_bound_never_randomized() {
    let modules = fixture();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let parts = as_participants(&modules, &ParticipantOptions::default(), &mut rng).unwrap();
        let bound = parts.last().unwrap();
        assert_eq!(bound.idx, BOUND);
        assert_eq!((bound.xmin, bound.ymin), (0, 0));
        assert_eq!((bound.width, bound.height), (1000, 1000));
        for p in parts.iter().filter(|p| !p.is_bound()) {
            assert!(p.xmin >= 0 && p.xmin < 1000 - p.width);
            assert!(p.ymin >= 0 && p.ymin < 1000 - p.height);
        }
    }
}

#[test]
fn test_default_bound_without_frame() {
    let doc = "MODULE blk; TYPE STANDARD; DIMENSIONS 0 0 20 20; IOLIST; a I 0 0; ENDIOLIST; ENDMODULE;";
    let modules = parse(doc).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..1000 {
        let parts = as_participants(&modules, &ParticipantOptions::default(), &mut rng).unwrap();
        assert!((0..100).contains(&parts[0].xmin));
        assert!((0..100).contains(&parts[0].ymin));
    }
}

#[test]
fn test_module_larger_than_frame_is_rejected() {
    let doc = "
MODULE huge; TYPE STANDARD; DIMENSIONS 0 0 500 10; IOLIST; a I 0 0; ENDIOLIST; ENDMODULE;
MODULE bound; TYPE PARENT; DIMENSIONS 0 0 100 100; IOLIST; p PI TOP 0; ENDIOLIST; ENDMODULE;
";
    let modules = parse(doc).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let err = as_participants(&modules, &ParticipantOptions::default(), &mut rng).unwrap_err();
    assert!(matches!(err, YalError::Configuration { axis: 'x', .. }));

    // Without randomization the same design is fine
    assert!(as_participants(&modules, &fixed_options(), &mut rng).is_ok());
}

#[test]
fn test_retained_fields() {
    let modules = fixture();
    let mut rng = StdRng::seed_from_u64(0);

    let parts = as_participants(&modules, &fixed_options(), &mut rng).unwrap();
    assert!(parts.iter().all(|p| p.network.is_some()));
    assert!(parts.iter().all(|p| p.terminals.is_none()));

    let options = ParticipantOptions {
        randomize_placement: false,
        retain: RetainFields::from_names(["terminals", "critical_nets"]).unwrap(),
        ..Default::default()
    };
    let parts = as_participants(&modules, &options, &mut rng).unwrap();
    let bound = parts.iter().find(|p| p.is_bound()).unwrap();
    assert_eq!(bound.terminals.as_ref().map(Vec::len), Some(2));
    assert_eq!(
        bound.critical_nets.as_ref().and_then(|c| c.get("net1")),
        Some(&600)
    );
    assert!(bound.network.is_none());
    assert!(bound.placement.is_none());
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let modules = fixture();
    let options = ParticipantOptions {
        colorize: true,
        ..Default::default()
    };
    let a = as_participants(&modules, &options, &mut StdRng::seed_from_u64(17)).unwrap();
    let b = as_participants(&modules, &options, &mut StdRng::seed_from_u64(17)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_outline_span_beyond_i64_is_rejected() {
    let doc = "MODULE wide; TYPE STANDARD; \
               DIMENSIONS -9223372036854775808 0 9223372036854775807 0; \
               IOLIST; a I 0 0; ENDIOLIST; ENDMODULE;";
    let modules = parse(doc).unwrap();
    assert_eq!(modules[0].dimensions[0].x, i64::MIN);

    assert!(matches!(
        modules[0].width(),
        Err(YalError::Extent { axis: 'x', .. })
    ));
    assert!(as_participant(&modules[0], &RetainFields::none()).is_err());
    let mut rng = StdRng::seed_from_u64(0);
    match as_participants(&modules, &fixed_options(), &mut rng) {
        Err(YalError::Extent {
            name, low, high, ..
        }) => {
            assert_eq!(name, "wide");
            assert_eq!((low, high), (i64::MIN, i64::MAX));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_first_bound_sets_frame_for_all() {
    let doc = "
MODULE blk; TYPE STANDARD; DIMENSIONS 0 0 30 30; IOLIST; a I 0 0; ENDIOLIST; ENDMODULE;
MODULE bound; TYPE PARENT; DIMENSIONS 0 0 40 40; IOLIST; p PI TOP 0; ENDIOLIST;
NETWORK; u1 blk n1; ENDNETWORK; ENDMODULE;
MODULE other; TYPE STANDARD; DIMENSIONS 0 0 5 5; IOLIST; a I 0 0; ENDIOLIST; ENDMODULE;
MODULE bound; TYPE PARENT; DIMENSIONS 7 9 500 500; IOLIST; p PI TOP 0; ENDIOLIST; ENDMODULE;
";
    let modules = parse(doc).unwrap();
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let parts = as_participants(&modules, &ParticipantOptions::default(), &mut rng).unwrap();

        let idx: Vec<&str> = parts.iter().map(|p| p.idx.as_str()).collect();
        assert_eq!(idx, vec!["blk", "other", BOUND, BOUND]);

        // Frame is the first bound: 40 x 40
        assert!((0..10).contains(&parts[0].xmin));
        assert!((0..10).contains(&parts[0].ymin));
        assert!((0..35).contains(&parts[1].xmin));

        // Both bound participants keep their own outline
        assert_eq!((parts[2].xmin, parts[2].ymin, parts[2].width), (0, 0, 40));
        assert_eq!((parts[3].xmin, parts[3].ymin, parts[3].width), (7, 9, 493));
    }
}
