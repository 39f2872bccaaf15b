//! Token-exact behavior of the JSX-capable tokenizer.

use cyclo::reader::tsx::TsxReader;
use cyclo::reader::Reader;

fn tokens(source: &str) -> Vec<String> {
    TsxReader.generate_tokens(source).map(|t| t.text).collect()
}

fn significant(source: &str) -> Vec<String> {
    TsxReader
        .generate_tokens(source)
        .filter(|t| t.is_significant())
        .map(|t| t.text)
        .collect()
}

#[test]
fn attribute_free_tags_are_single_tokens() {
    assert_eq!(
        significant("(<abc><b>xxx</b></abc>)"),
        vec!["(", "<abc>", "<b>", "xxx", "</b>", "</abc>", ")"]
    );
    assert_eq!(
        significant("(<b><b>xxx</b></b>)"),
        vec!["(", "<b>", "<b>", "xxx", "</b>", "</b>", ")"]
    );
}

#[test]
fn tag_body_code_tokens_flow_through() {
    assert_eq!(
        significant("(<abc>xxx  +yyy</abc>)"),
        vec!["(", "<abc>", "xxx", "+", "yyy", "</abc>", ")"]
    );
}

#[test]
fn qualified_component_names() {
    assert_eq!(
        significant("<Nav.Item></Nav.Item>"),
        vec!["<Nav.Item>", "</Nav.Item>"]
    );
}

#[test]
fn self_closing_tag_collapses() {
    assert_eq!(significant("<abc />"), vec!["<abc />"]);
}

#[test]
fn literal_attributes_collapse_whole_element() {
    assert_eq!(
        significant(r#"<abc x="x">a</abc>"#),
        vec![r#"<abc x="x">a</abc>"#]
    );
}

#[test]
fn embedded_attribute_expression_replaces_the_element() {
    assert_eq!(significant("<abc x={y}>a</abc><a></a>"), vec!["y"]);
}

#[test]
fn comparisons_roll_back_unchanged() {
    assert_eq!(tokens("a<3 x>"), vec!["a", "<", "3", " ", "x", ">"]);
    assert_eq!(tokens("a < b"), vec!["a", " ", "<", " ", "b"]);
    assert_eq!(
        tokens("a<b and c> d"),
        vec!["a", "<", "b", " ", "and", " ", "c", ">", " ", "d"]
    );
}

#[test]
fn rolled_back_input_is_lossless() {
    for src in ["a<3 x>", "a < b", "a<b and c> d", "x = a < b ? a : b;"] {
        let joined: String = tokens(src).concat();
        assert_eq!(joined, src, "token texts must reassemble {src:?}");
    }
}

#[test]
fn arrow_in_attribute_expression_stays_visible() {
    assert_eq!(
        significant("<StaticQuery render={data =>()} />"),
        vec!["data", "=>", "(", ")"]
    );
}

#[test]
fn generic_argument_lexes_as_one_tag_shaped_token() {
    assert_eq!(
        significant("const [open, setOpen] = useState<boolean>(false);"),
        vec![
            "const", "[", "open", ",", "setOpen", "]", "=", "useState",
            "<boolean>", "(", "false", ")", ";"
        ]
    );
}

#[test]
fn template_literal_is_one_token() {
    assert_eq!(
        significant("const s = `a ${b} c`;"),
        vec!["const", "s", "=", "`a ${b} c`", ";"]
    );
}

#[test]
fn line_numbers_follow_newlines() {
    let toks: Vec<_> = TsxReader.generate_tokens("a\nb\n\nc").collect();
    let lines: Vec<(String, usize)> = toks
        .into_iter()
        .filter(|t| t.is_significant())
        .map(|t| (t.text, t.line))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 4)
        ]
    );
}
