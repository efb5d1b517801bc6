mod common;

use common::*;
use serde_json::json;
use velobql::velo::bql::execution::{EmitterKind, RangeUnit, Value};

/// The standard fixture rearranged onto two streams: even tuples go to src1
/// with `l = "l{i}"`, odd tuples to src2 with `r = "r{i}"`.
fn two_stream_tuples(n: usize) -> Vec<velobql::Tuple> {
    let mut tuples = test_tuples(n);
    for (i, tuple) in tuples.iter_mut().enumerate() {
        if i % 2 == 0 {
            tuple.input_name = "src1".to_string();
            tuple
                .data
                .insert("l".to_string(), Value::String(format!("l{}", i)));
        } else {
            tuple.input_name = "src2".to_string();
            tuple
                .data
                .insert("r".to_string(), Value::String(format!("r{}", i)));
        }
    }
    tuples
}

/// Like [`two_stream_tuples`] but with a numeric payload `a`/`b = i/2 + 1`.
fn numbered_two_stream_tuples(n: usize) -> Vec<velobql::Tuple> {
    let mut tuples = test_tuples(n);
    for (i, tuple) in tuples.iter_mut().enumerate() {
        let value = Value::Int(i as i64 / 2 + 1);
        if i % 2 == 0 {
            tuple.input_name = "src1".to_string();
            tuple.data.insert("a".to_string(), value);
        } else {
            tuple.input_name = "src2".to_string();
            tuple.data.insert("b".to_string(), value);
        }
    }
    tuples
}

#[test]
fn test_insert_stream_join_of_two_streams() {
    // SELECT ISTREAM src1:l, src2:r
    //   FROM src1 [RANGE 2 TUPLES], src2 [RANGE 2 TUPLES]
    let plan = select_plan(
        vec![
            projection("l", field(&["src1", "l"])),
            projection("r", field(&["src2", "r"])),
        ],
        vec![
            stream_relation("src1", "src1", 2, RangeUnit::Tuples),
            stream_relation("src2", "src2", 2, RangeUnit::Tuples),
        ],
        EmitterKind::InsertStream,
    );
    let mut plan = build(plan);

    for (idx, tuple) in two_stream_tuples(8).iter().enumerate() {
        let out = plan.process(tuple).unwrap();
        let expected = match idx {
            // the src2 buffer is still empty, the product has no rows
            0 => vec![],
            1 => vec![json!({"l": "l0", "r": "r1"})],
            2 => vec![json!({"l": "l2", "r": "r1"})],
            _ if idx % 2 == 1 => vec![
                json!({"l": format!("l{}", idx - 3), "r": format!("r{}", idx)}),
                json!({"l": format!("l{}", idx - 1), "r": format!("r{}", idx)}),
            ],
            _ => vec![
                json!({"l": format!("l{}", idx), "r": format!("r{}", idx - 3)}),
                json!({"l": format!("l{}", idx), "r": format!("r{}", idx - 1)}),
            ],
        };
        assert_rows_eq(
            out,
            expected.into_iter().map(row).collect(),
            &format!("call {}", idx),
        );
    }
}

#[test]
fn test_join_with_join_condition() {
    // SELECT ISTREAM src1:l, src2:r
    //   FROM src1 [RANGE 2 TUPLES], src2 [RANGE 2 TUPLES]
    //   WHERE src1:int + 1 = src2:int
    let mut plan = select_plan(
        vec![
            projection("l", field(&["src1", "l"])),
            projection("r", field(&["src2", "r"])),
        ],
        vec![
            stream_relation("src1", "src1", 2, RangeUnit::Tuples),
            stream_relation("src2", "src2", 2, RangeUnit::Tuples),
        ],
        EmitterKind::InsertStream,
    );
    plan.filter = Some(equals(
        plus_int(field(&["src1", "int"]), 1),
        field(&["src2", "int"]),
    ));
    let mut plan = build(plan);

    for (idx, tuple) in two_stream_tuples(8).iter().enumerate() {
        let out = plan.process(tuple).unwrap();
        let expected = match idx {
            0 | 2 => vec![],
            // a src2 tuple was just added; it pairs with its predecessor
            _ if idx % 2 == 1 => vec![json!({
                "l": format!("l{}", idx - 1),
                "r": format!("r{}", idx)
            })],
            // a src1 tuple was just added; its partner has not arrived yet
            _ => vec![],
        };
        assert_rows_eq(
            out,
            expected.into_iter().map(row).collect(),
            &format!("call {}", idx),
        );
    }
}

#[test]
fn test_self_join_with_join_condition() {
    // SELECT ISTREAM src1:x AS l, src2:x AS r
    //   FROM src [RANGE 2 TUPLES] AS src1, src [RANGE 2 TUPLES] AS src2
    //   WHERE src1:int + 1 = src2:int
    let mut plan = select_plan(
        vec![
            projection("l", field(&["src1", "x"])),
            projection("r", field(&["src2", "x"])),
        ],
        vec![
            stream_relation("src", "src1", 2, RangeUnit::Tuples),
            stream_relation("src", "src2", 2, RangeUnit::Tuples),
        ],
        EmitterKind::InsertStream,
    );
    plan.filter = Some(equals(
        plus_int(field(&["src1", "int"]), 1),
        field(&["src2", "int"]),
    ));
    let mut plan = build(plan);

    let mut tuples = test_tuples(8);
    for (i, tuple) in tuples.iter_mut().enumerate() {
        tuple
            .data
            .insert("x".to_string(), Value::String(format!("x{}", i)));
    }

    for (idx, tuple) in tuples.iter().enumerate() {
        let out = plan.process(tuple).unwrap();
        let expected = if idx == 0 {
            // the only pair in the windows fails the join condition
            vec![]
        } else {
            vec![json!({
                "l": format!("x{}", idx - 1),
                "r": format!("x{}", idx)
            })]
        };
        assert_rows_eq(
            out,
            expected.into_iter().map(row).collect(),
            &format!("call {}", idx),
        );
    }
}

#[test]
fn test_join_with_per_source_emit_intervals() {
    // SELECT RSTREAM [EVERY 2 TUPLES IN src1, 3 TUPLES IN src2]
    //     x:a AS l, y:b AS r
    //   FROM src1 [RANGE 3 TUPLES] AS x, src2 [RANGE 2 TUPLES] AS y
    let mut plan = select_plan(
        vec![
            projection("l", field(&["x", "a"])),
            projection("r", field(&["y", "b"])),
        ],
        vec![
            stream_relation("src1", "x", 3, RangeUnit::Tuples),
            stream_relation("src2", "y", 2, RangeUnit::Tuples),
        ],
        EmitterKind::AllStream,
    );
    plan.emit_intervals = vec![every_tuples("src1", 2), every_tuples("src2", 3)];
    let mut plan = build(plan);

    let expected: Vec<Vec<(i64, i64)>> = vec![
        vec![], // skip
        vec![], // skip
        vec![(1, 1), (2, 1)],
        vec![], // skip
        vec![], // skip
        vec![(1, 2), (1, 3), (2, 2), (2, 3), (3, 2), (3, 3)],
        vec![(2, 2), (2, 3), (3, 2), (3, 3), (4, 2), (4, 3)],
        vec![], // skip
        vec![], // skip
        vec![], // skip
        vec![(4, 4), (4, 5), (5, 4), (5, 5), (6, 4), (6, 5)],
        vec![(4, 5), (4, 6), (5, 5), (5, 6), (6, 5), (6, 6)],
    ];
    for (idx, tuple) in numbered_two_stream_tuples(12).iter().enumerate() {
        let out = plan.process(tuple).unwrap();
        let rows = expected[idx]
            .iter()
            .map(|(l, r)| row(json!({ "l": l, "r": r })))
            .collect();
        assert_rows_eq(out, rows, &format!("call {}", idx));
    }
}

#[test]
fn test_join_with_mixed_window_units() {
    // SELECT RSTREAM src1:l, src2:r
    //   FROM src1 [RANGE 1 TUPLES], src2 [RANGE 5 SECONDS]
    let plan = select_plan(
        vec![
            projection("l", field(&["src1", "l"])),
            projection("r", field(&["src2", "r"])),
        ],
        vec![
            stream_relation("src1", "src1", 1, RangeUnit::Tuples),
            stream_relation("src2", "src2", 5, RangeUnit::Seconds),
        ],
        EmitterKind::AllStream,
    );
    let mut plan = build(plan);

    let expected: Vec<Vec<(usize, usize)>> = vec![
        vec![],
        vec![(0, 1)],
        vec![(2, 1)],
        vec![(2, 1), (2, 3)],
        vec![(4, 1), (4, 3)],
        vec![(4, 1), (4, 3), (4, 5)],
        vec![(6, 1), (6, 3), (6, 5)],
        // r1 fell out of the five-second window
        vec![(6, 3), (6, 5), (6, 7)],
    ];
    for (idx, tuple) in two_stream_tuples(8).iter().enumerate() {
        let out = plan.process(tuple).unwrap();
        let rows = expected[idx]
            .iter()
            .map(|(l, r)| row(json!({"l": format!("l{}", l), "r": format!("r{}", r)})))
            .collect();
        assert_rows_eq(out, rows, &format!("call {}", idx));
    }
}
