use std::sync::Arc;

use super::*;
use crate::error::{ErrorKind, FieldPath, RecodeError, Segment};
use crate::schema::{AggregateDescriptor, Deferred, FieldDescriptor, Shape};
use crate::value::{AggregateValue, Kind};

fn output_descriptor() -> Arc<AggregateDescriptor> {
    Arc::new(AggregateDescriptor::new(
        "OutputStruct",
        vec![
            FieldDescriptor::visible("Name", Shape::Text),
            FieldDescriptor::visible("Count", Shape::SignedInt),
            FieldDescriptor::visible("Ratio", Shape::Float),
            FieldDescriptor::visible("Weight", Shape::UnsignedInt),
        ],
    ))
}

fn output() -> Value {
    Value::Aggregate(AggregateValue::zeroed(output_descriptor()))
}

fn input(name: Value, count: Value, ratio: Value, weight: Value) -> Value {
    Value::aggregate(
        "InputStruct",
        [("Name", name), ("Count", count), ("Ratio", ratio), ("Weight", weight)],
    )
}

fn expected(name: &str, count: i64, ratio: f64, weight: u64) -> Value {
    Value::Aggregate(AggregateValue::from_parts(
        output_descriptor(),
        vec![
            Value::from(name),
            Value::Int(count),
            Value::Float(ratio),
            Value::UInt(weight),
        ],
    ))
}

fn path(segments: &[&str]) -> FieldPath {
    let mut path = FieldPath::root();
    for segment in segments {
        match segment.parse::<usize>() {
            Ok(index) => path.push(Segment::Index(index)),
            Err(_) => path.push(Segment::Field((*segment).into())),
        }
    }
    path
}

#[test]
fn scalar_scenarios() {
    let cases = [
        (
            input(Value::from("string"), Value::UInt(1), Value::Float(1.1), Value::Int(1)),
            expected("string", 1, 1.1, 1),
        ),
        (
            input(Value::from("1.5"), Value::from("1"), Value::from("1.1"), Value::from("1")),
            expected("1.5", 1, 1.1, 1),
        ),
        (
            input(Value::from("1.5"), Value::from("-10"), Value::Int(-1), Value::Float(1.0)),
            expected("1.5", -10, -1.0, 1),
        ),
        (
            input(Value::from("1.5"), Value::from("-10"), Value::UInt(1), Value::Float(1.0)),
            expected("1.5", -10, 1.0, 1),
        ),
        (
            input(Value::Float(1.5), Value::from("-10"), Value::UInt(1), Value::Float(1.0)),
            expected("1.5", -10, 1.0, 1),
        ),
        (
            input(Value::Int(1), Value::from("-10"), Value::UInt(1), Value::Float(1.0)),
            expected("1", -10, 1.0, 1),
        ),
    ];

    for (source, want) in cases {
        let mut destination = output();
        recode(&source, &mut destination).unwrap();
        assert_eq!(destination, want, "source {source:?}");
    }
}

#[test]
fn nested_aggregate_recurses() {
    let inner = input(Value::Float(1.5), Value::from("-10"), Value::UInt(1), Value::Float(1.0));
    let source = Value::aggregate("EmbedInputStruct", [("Data", inner)]);
    let wrapper = Arc::new(AggregateDescriptor::new(
        "EmbedOutputStruct",
        vec![FieldDescriptor::visible(
            "Data",
            Shape::Aggregate(output_descriptor()),
        )],
    ));
    let mut destination = Value::Aggregate(AggregateValue::zeroed(wrapper));

    recode(&source, &mut destination).unwrap();

    let data = destination.as_aggregate().and_then(|a| a.get("Data")).expect("Data field");
    assert_eq!(data, &expected("1.5", -10, 1.0, 1));
}

fn list_destination() -> Value {
    let descriptor = AggregateDescriptor::new(
        "Listing",
        vec![FieldDescriptor::visible(
            "Items",
            Shape::Sequence(Deferred::ready(Shape::SignedInt)),
        )],
    );
    Value::Aggregate(AggregateValue::zeroed(Arc::new(descriptor)))
}

#[test]
fn sequence_length_follows_source() {
    let mut destination = list_destination();
    if let Value::Aggregate(aggregate) = &mut destination {
        aggregate.set(
            "Items",
            Value::Sequence(crate::value::SequenceValue::new(
                Deferred::ready(Shape::SignedInt),
                vec![Value::Int(9); 5],
            )),
        );
    }
    let source = Value::aggregate(
        "Listing",
        [("Items", Value::sequence([Value::from("1"), Value::UInt(2), Value::Float(3.7)]))],
    );

    recode(&source, &mut destination).unwrap();

    let items = destination
        .as_aggregate()
        .and_then(|a| a.get("Items"))
        .and_then(Value::as_sequence)
        .expect("Items sequence");
    assert_eq!(items.items(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn sequence_element_failure_reports_index() {
    let mut destination = list_destination();
    let source = Value::aggregate(
        "Listing",
        [("Items", Value::sequence([Value::Int(1), Value::from("x")]))],
    );
    let err = recode(&source, &mut destination).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
    assert_eq!(err.path(), Some(&path(&["Items", "1"])));
    assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("$.Items[1]"));
}

#[test]
fn sequence_requires_sequence_source() {
    let mut destination = list_destination();
    let source = Value::aggregate("Listing", [("Items", Value::Int(1))]);
    let err = recode(&source, &mut destination).unwrap_err();
    assert_eq!(
        err,
        RecodeError::TypeMismatch {
            expected: Kind::Sequence,
            found: Kind::SignedInt,
            path: path(&["Items"]),
        }
    );
}

#[test]
fn indirection_is_transparent() {
    let plain = input(Value::from("a"), Value::Int(2), Value::Float(0.5), Value::UInt(3));
    let mut reference = output();
    recode(&plain, &mut reference).unwrap();

    for source in [Value::some(plain.clone()), Value::some(Value::some(plain.clone()))] {
        let mut destination = output();
        recode(&source, &mut destination).unwrap();
        assert_eq!(destination, reference);
    }

    let mut wrapped = Value::some(Value::some(output()));
    recode(&plain, &mut wrapped).unwrap();
    assert_eq!(wrapped, Value::some(Value::some(reference.clone())));

    let wrapped_fields = input(
        Value::some(Value::from("a")),
        Value::some(Value::some(Value::Int(2))),
        Value::some(Value::Float(0.5)),
        Value::UInt(3),
    );
    let mut destination = output();
    recode(&wrapped_fields, &mut destination).unwrap();
    assert_eq!(destination, reference);
}

#[test]
fn recode_is_idempotent() {
    let source = input(Value::from("x"), Value::from("7"), Value::Int(2), Value::Float(8.9));
    let mut first = output();
    let mut second = output();
    recode(&source, &mut first).unwrap();
    recode(&source, &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn extra_source_fields_are_ignored() {
    let source = Value::aggregate(
        "Wide",
        [
            ("Extra", Value::Bool(true)),
            ("Name", Value::from("n")),
            ("Count", Value::Int(1)),
            ("Ratio", Value::Int(2)),
            ("Weight", Value::Int(3)),
        ],
    );
    let mut destination = output();
    recode(&source, &mut destination).unwrap();
    assert_eq!(destination, expected("n", 1, 2.0, 3));
}

#[test]
fn missing_field_aborts_after_earlier_fields() {
    let source = Value::aggregate(
        "Partial",
        [("Name", Value::from("kept")), ("Count", Value::Int(5))],
    );
    let mut destination = output();
    let err = recode(&source, &mut destination).unwrap_err();
    assert_eq!(
        err,
        RecodeError::FieldNotFound {
            aggregate: "Partial".into(),
            field: "Ratio".into(),
            path: path(&["Ratio"]),
        }
    );
    // Fields are visited in declaration order and never rolled back.
    assert_eq!(destination, expected("kept", 5, 0.0, 0));
}

#[test]
fn hidden_fields_are_neither_matched_nor_written() {
    let descriptor = Arc::new(AggregateDescriptor::new(
        "Guarded",
        vec![
            FieldDescriptor::visible("Name", Shape::Text),
            FieldDescriptor::hidden("secret", Shape::SignedInt),
        ],
    ));
    let mut destination = Value::Aggregate(AggregateValue::from_parts(
        descriptor,
        vec![Value::Text(String::new()), Value::Int(42)],
    ));
    let source = Value::aggregate("In", [("Name", Value::from("n"))]);

    recode(&source, &mut destination).unwrap();

    let aggregate = destination.as_aggregate().expect("aggregate");
    assert_eq!(aggregate.get("Name"), Some(&Value::from("n")));
    assert_eq!(aggregate.get("secret"), Some(&Value::Int(42)));
}

#[test]
fn fields_after_a_hidden_field_are_written() {
    let descriptor = Arc::new(AggregateDescriptor::new(
        "Interleaved",
        vec![
            FieldDescriptor::visible("First", Shape::SignedInt),
            FieldDescriptor::hidden("middle", Shape::Text),
            FieldDescriptor::visible("Last", Shape::UnsignedInt),
        ],
    ));
    let mut destination = Value::Aggregate(AggregateValue::from_parts(
        descriptor,
        vec![Value::Int(0), Value::from("kept"), Value::UInt(0)],
    ));
    let source = Value::aggregate(
        "In",
        [("Last", Value::from("9")), ("First", Value::Float(-2.5))],
    );

    recode(&source, &mut destination).unwrap();

    let values = destination.as_aggregate().expect("aggregate").values();
    assert_eq!(values, &[Value::Int(-2), Value::from("kept"), Value::UInt(9)]);
}

#[test]
fn boxed_sequence_elements_are_allocated() {
    let descriptor = AggregateDescriptor::new(
        "Boxes",
        vec![FieldDescriptor::visible(
            "Items",
            Shape::Sequence(Deferred::ready(Shape::Boxed(Deferred::ready(Shape::Float)))),
        )],
    );
    let mut destination = Value::Aggregate(AggregateValue::zeroed(Arc::new(descriptor)));
    let source = Value::aggregate(
        "In",
        [("Items", Value::sequence([Value::from("1.5"), Value::Int(2)]))],
    );

    recode(&source, &mut destination).unwrap();

    let items = destination
        .as_aggregate()
        .and_then(|a| a.get("Items"))
        .and_then(Value::as_sequence)
        .expect("sequence");
    assert_eq!(
        items.items(),
        &[Value::some(Value::Float(1.5)), Value::some(Value::Float(2.0))]
    );
}

#[test]
fn root_checks() {
    let source = input(Value::from("a"), Value::Int(1), Value::Int(1), Value::Int(1));

    let err = recode(&Value::Int(1), &mut output()).unwrap_err();
    assert_eq!(err, RecodeError::InvalidSource { found: Kind::SignedInt });

    let err = recode(&Value::some(Value::none()), &mut output()).unwrap_err();
    assert_eq!(err, RecodeError::InvalidSource { found: Kind::Absent });

    let err = recode(&source, &mut Value::sequence(Vec::new())).unwrap_err();
    assert_eq!(err, RecodeError::InvalidDestination { found: Kind::Sequence });

    let err = recode(&source, &mut Value::some(Value::none())).unwrap_err();
    assert_eq!(err, RecodeError::NilDestination { path: FieldPath::root() });
}

#[test]
fn empty_destination_indirection_in_field() {
    let descriptor = AggregateDescriptor::new(
        "Holder",
        vec![FieldDescriptor::visible(
            "Slot",
            Shape::Indirection(Deferred::ready(Shape::SignedInt)),
        )],
    );
    let source = Value::aggregate("In", [("Slot", Value::Int(1))]);

    let mut empty = Value::Aggregate(AggregateValue::zeroed(Arc::new(descriptor.clone())));
    let err = recode(&source, &mut empty).unwrap_err();
    assert_eq!(err, RecodeError::NilDestination { path: path(&["Slot"]) });

    let mut allocated = Value::Aggregate(AggregateValue::from_parts(
        Arc::new(descriptor),
        vec![Value::some(Value::Int(0))],
    ));
    recode(&source, &mut allocated).unwrap();
    assert_eq!(
        allocated.as_aggregate().and_then(|a| a.get("Slot")),
        Some(&Value::some(Value::Int(1)))
    );
}

#[test]
fn aggregate_into_scalar_is_a_mismatch() {
    let source = input(
        Value::aggregate("Inner", [("x", Value::Int(1))]),
        Value::Int(1),
        Value::Int(1),
        Value::Int(1),
    );
    let err = recode(&source, &mut output()).unwrap_err();
    assert_eq!(
        err,
        RecodeError::TypeMismatch {
            expected: Kind::Text,
            found: Kind::Aggregate,
            path: path(&["Name"]),
        }
    );
}

#[test]
fn unsupported_destination_shapes() {
    for (shape, kind) in [(Shape::Bool, Kind::Bool), (Shape::Opaque("func".into()), Kind::Opaque)] {
        let descriptor = AggregateDescriptor::new("Odd", vec![FieldDescriptor::visible("F", shape)]);
        let mut destination = Value::Aggregate(AggregateValue::zeroed(Arc::new(descriptor)));
        let source = Value::aggregate("In", [("F", Value::Bool(true))]);
        let err = recode(&source, &mut destination).unwrap_err();
        assert_eq!(err, RecodeError::UnsupportedShape { found: kind, path: path(&["F"]) });
    }
}

fn chain(depth: usize) -> (Value, Value) {
    let mut shape = output_descriptor();
    let mut source = input(Value::from("leaf"), Value::Int(1), Value::Int(1), Value::Int(1));
    for _ in 0..depth {
        shape = Arc::new(AggregateDescriptor::new(
            "Link",
            vec![FieldDescriptor::visible("Next", Shape::Aggregate(shape))],
        ));
        source = Value::aggregate("Link", [("Next", source)]);
    }
    (source, Value::Aggregate(AggregateValue::zeroed(shape)))
}

#[test]
fn depth_guard_stops_deep_inputs() {
    let (source, mut destination) = chain(10);
    let recoder = Recoder::new(RecodeConfig::with_max_depth(5));
    let err = recoder.recode(&source, &mut destination).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
    assert_eq!(err.path().map(|p| p.segments().len()), Some(6));
}

#[test]
fn depth_guard_allows_inputs_within_limit() {
    let (source, mut destination) = chain(10);
    Recoder::new(RecodeConfig::with_max_depth(11))
        .recode(&source, &mut destination)
        .unwrap();

    let (source, mut destination) = chain(10);
    Recoder::new(RecodeConfig::unbounded())
        .recode(&source, &mut destination)
        .unwrap();
}

#[test]
fn engine_and_values_cross_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Recoder>();
    assert_send_sync::<Value>();

    let source = input(Value::from("t"), Value::Int(1), Value::Int(2), Value::Int(3));
    let recoder = Recoder::default();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let mut destination = output();
                recoder.recode(&source, &mut destination).unwrap();
                assert_eq!(destination, expected("t", 1, 2.0, 3));
            });
        }
    });
}
