use proptest::prelude::*;
use pdbx_cif::{parse, to_string, ErrorClass, ValueStyle, Writer, WriterOptions};
use pdbx_core::{DataCategory, DataContainer};

/// Values mixing every character that affects quoting. Multi-line values
/// with no CIF spelling are left out: a line starting with `;`, or a line
/// ending in a carriage return.
fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9.?-]{1,8}",
        "[A-Za-z0-9_ '\"#;$\\[\\]\t\r.?]{0,12}",
        "[a-z \r]{0,6}\n[a-z '\"\r]{0,6}",
        Just("loop_".to_string()),
        Just("data_x".to_string()),
        Just("?".to_string()),
        Just(".".to_string()),
    ]
    .prop_filter("text field content must read back intact", |v| {
        ValueStyle::of(v) != ValueStyle::TextField || writable_text_field(v)
    })
}

fn writable_text_field(value: &str) -> bool {
    !value.contains("\n;") && !value.split('\n').any(|line| line.ends_with('\r'))
}

fn category() -> impl Strategy<Value = DataCategory> {
    (
        "[a-z][a-z0-9_]{0,8}",
        prop::collection::hash_set("[a-z][a-z0-9_.]{0,8}", 1..5),
        1usize..4,
    )
        .prop_flat_map(|(name, attributes, rows)| {
            let attributes: Vec<String> = attributes.into_iter().collect();
            let width = attributes.len();
            (
                Just(name),
                Just(attributes),
                prop::collection::vec(prop::collection::vec(value(), width), rows),
            )
        })
        .prop_map(|(name, attributes, rows)| {
            let mut category = DataCategory::with_attributes(name, attributes).unwrap();
            for row in rows {
                category.append_row(row).unwrap();
            }
            category
        })
}

fn container() -> impl Strategy<Value = DataContainer> {
    (
        "[A-Za-z0-9_]{0,8}",
        prop::collection::vec(category(), 0..4),
    )
        .prop_map(|(name, categories)| {
            let mut container = DataContainer::new(name).unwrap();
            for category in categories {
                // Category names from the generator may repeat; keep the first.
                let _ = container.add(category);
            }
            container
        })
}

fn options() -> impl Strategy<Value = WriterOptions> {
    (1usize..4, any::<bool>(), 4usize..120, any::<bool>()).prop_map(
        |(spacing, align_columns, max_line_length, category_separators)| WriterOptions {
            spacing,
            align_columns,
            max_line_length,
            category_separators,
        },
    )
}

proptest! {
    /// Writing then parsing reproduces the model exactly.
    #[test]
    fn round_trip_property(containers in prop::collection::vec(container(), 0..3)) {
        let text = to_string(&containers).unwrap();
        let back = parse(&text).map_err(|err| format!("{err}\n{text}"));
        prop_assert_eq!(back, Ok(containers));
    }

    /// Layout options never change what is read back.
    #[test]
    fn options_do_not_change_content(container in container(), options in options()) {
        let text = Writer::new(options).to_string(std::slice::from_ref(&container)).unwrap();
        let back = parse(&text).unwrap();
        prop_assert_eq!(back, vec![container]);
    }

    /// Text that parses once keeps parsing to the same model after rewriting.
    #[test]
    fn idempotent_reparse(container in container(), options in options()) {
        let text = Writer::new(options).to_string(&[container]).unwrap();
        let first = parse(&text).unwrap();
        let second = parse(&to_string(&first).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Any value with a line break is written as a text field.
    #[test]
    fn newlines_force_text_fields(head in "[a-z '\"]{0,6}", tail in "[a-z '\"]{0,6}") {
        let value = format!("{head}\n{tail}");
        prop_assert_eq!(ValueStyle::of(&value), ValueStyle::TextField);
    }

    /// The tokenizer and parser never panic on arbitrary input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,200}") {
        let _ = parse(&input);
    }

    /// Cutting a loop off after its header is reported as truncation.
    #[test]
    fn truncated_loop_is_end_of_stream(columns in 1usize..5) {
        let mut source = String::from("data_x\nloop_\n");
        for i in 0..columns {
            source.push_str(&format!("_c.a{i}\n"));
        }
        let err = parse(&source).unwrap_err();
        prop_assert_eq!(err.class(), ErrorClass::EndOfStream);
    }
}
