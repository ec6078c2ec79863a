use super::*;
use crate::member::MAX_ARRAY_SIZE;

#[test]
fn parses_a_struct_template_with_a_count_reference() {
    let schema = Schema::parse("Foo\nCount U32\nItems STRUCT [Count]\n  X F32\n}\n")
        .expect("template must parse");
    assert_eq!(schema.name, "Foo");
    assert_eq!(schema.tree.roots().len(), 2);

    let tree = &schema.tree;
    let count = tree.roots()[0];
    let items = tree.roots()[1];
    assert_eq!(tree.name(count), "Count");
    assert_eq!(tree.kind(count), ValueKind::U32);
    assert_eq!(tree.kind(items), ValueKind::Struct);
    assert_eq!(tree.array_size_source(items), ArraySize::Ref(count));
    assert_eq!(tree.size_dependents(count), &[items]);

    let x = tree.child(items, "X").expect("struct child");
    assert_eq!(tree.kind(x), ValueKind::F32);
    assert_eq!(tree.qualified_name(x).to_string(), "Items/X");
}

#[test]
fn skips_blank_lines_and_comment_lines() {
    let schema = Schema::parse("# template header\n\nDoor\n\n# count of hinges\nHinges U8\n")
        .expect("template must parse");
    assert_eq!(schema.name, "Door");
    assert_eq!(schema.tree.roots().len(), 1);
}

#[test]
fn star_brackets_mean_indefinite() {
    let schema = Schema::parse("Blob\nData U8 [*]\n").expect("template must parse");
    let data = schema.tree.roots()[0];
    assert_eq!(
        schema.tree.array_size_source(data),
        ArraySize::Literal(INDEFINITE_ARRAY)
    );
    assert_eq!(schema.tree.array_size(data), MAX_ARRAY_SIZE);
}

#[test]
fn numeric_brackets_are_literal_counts() {
    let schema = Schema::parse("Palette\nColors COLOR4 [16]\n").expect("template must parse");
    let colors = schema.tree.roots()[0];
    assert_eq!(schema.tree.array_size(colors), 16);
}

#[test]
fn forward_count_references_do_not_resolve() {
    let err = Schema::parse("Foo\nItems STRUCT [Count]\n  X F32\n}\nCount U32\n")
        .expect_err("forward reference must fail");
    assert!(matches!(err, CodecError::Schema(_)));
    assert!(err.to_string().contains("Count"));
}

#[test]
fn count_references_see_enclosing_blocks() {
    let schema = Schema::parse(
        "Rail\nPoints U16\nSegment STRUCT\n  Knots F32 [Points]\n}\n",
    )
    .expect("template must parse");
    let tree = &schema.tree;
    let points = tree.roots()[0];
    let segment = tree.roots()[1];
    let knots = tree.child(segment, "Knots").expect("nested child");
    assert_eq!(tree.array_size_source(knots), ArraySize::Ref(points));
}

#[test]
fn unterminated_struct_is_fatal() {
    let err = Schema::parse("Foo\nItems STRUCT\n  X F32\n").expect_err("open block must fail");
    assert!(err.to_string().contains("unterminated"));
}

#[test]
fn unmatched_closing_delimiter_is_fatal() {
    let err = Schema::parse("Foo\nX F32\n}\n").expect_err("stray brace must fail");
    assert!(matches!(err, CodecError::Schema(_)));
}

#[test]
fn unknown_kind_keywords_are_fatal() {
    let err = Schema::parse("Foo\nX FLOAT\n").expect_err("unknown kind must fail");
    assert!(err.to_string().contains("FLOAT"));
}

#[test]
fn empty_template_has_no_name() {
    let err = Schema::parse("").expect_err("empty template must fail");
    assert!(matches!(err, CodecError::Schema(_)));
}

#[test]
fn comment_members_take_one_trailing_token() {
    let schema = Schema::parse("Foo\nNote COMMENT padding\nX U8\n").expect("template must parse");
    let note = schema.tree.roots()[0];
    assert_eq!(schema.tree.kind(note), ValueKind::Comment);
    assert_eq!(schema.tree.description(note), "padding");

    let err = Schema::parse("Foo\nNote COMMENT\n").expect_err("missing text must fail");
    assert!(matches!(err, CodecError::Schema(_)));
}

#[test]
fn enum_blocks_declare_flag_tables() {
    let schema = Schema::parse(
        "Actor\nState ENUM\n  visible 0x01\n  solid 4\n}\n",
    )
    .expect("template must parse");
    let state = schema.tree.roots()[0];
    assert_eq!(schema.tree.kind(state), ValueKind::Enum);
    let table = schema.tree.flag_table(state);
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].name, "visible");
    assert_eq!(table[0].mask, 0x01);
    assert_eq!(table[1].mask, 0x04);
}

#[test]
fn unterminated_enum_is_fatal() {
    let err = Schema::parse("Actor\nState ENUM\n  visible 1\n").expect_err("open enum must fail");
    assert!(err.to_string().contains("unterminated"));
}

#[test]
fn duplicate_sibling_names_are_fatal() {
    let err = Schema::parse("Foo\nX U8\nX U16\n").expect_err("duplicate must fail");
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn nested_structs_parse_recursively() {
    let schema = Schema::parse(
        "Scene\nLayer STRUCT [2]\n  Name STRING\n  Props STRUCT\n    Mass F32\n  }\n}\n",
    )
    .expect("template must parse");
    let tree = &schema.tree;
    let layer = tree.roots()[0];
    let props = tree.child(layer, "Props").expect("inner struct");
    let mass = tree.child(props, "Mass").expect("inner leaf");
    assert_eq!(tree.qualified_name(mass).to_string(), "Layer/Props/Mass");
    assert_eq!(tree.array_size(layer), 2);
}
