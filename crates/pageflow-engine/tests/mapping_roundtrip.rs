use pageflow_engine::registry::tags;
use pageflow_engine::{
    Bias, LayoutNodeRef, LayoutTree, ModelNode, PageSpec, Registry, RenderDoc,
};
use rstest::rstest;

fn page(width: f64, height: f64) -> PageSpec {
    PageSpec {
        width,
        height,
        padding_top: 0.0,
        padding_bottom: 0.0,
        padding_left: 0.0,
        padding_right: 0.0,
    }
}

fn spanned_document() -> ModelNode {
    // A block mixing bare leaves with a delimited span container.
    ModelNode::branch(
        tags::DOCUMENT,
        vec![
            ModelNode::branch(
                tags::PARAGRAPH,
                vec![
                    ModelNode::leaf(tags::TEXT, "ab "),
                    ModelNode::branch(tags::SPAN, vec![ModelNode::leaf(tags::TEXT, "cd ")]),
                    ModelNode::leaf(tags::TEXT, "ef"),
                ],
            ),
            ModelNode::branch(tags::PARAGRAPH, vec![ModelNode::leaf(tags::TEXT, "gh")]),
        ],
    )
}

fn derive(model: &ModelNode, spec: PageSpec) -> (Registry, RenderDoc, LayoutTree) {
    let registry = Registry::with_defaults(spec);
    let render = RenderDoc::derive(model, &registry).unwrap();
    let layout = pageflow_engine::layout::build(&render, &registry).unwrap();
    (registry, render, layout)
}

#[test]
fn selectable_to_model_is_monotonic_across_spans() {
    let model = spanned_document();
    let (_, render, _) = derive(&model, page(80.0, 24.0));

    let size = render.selectable_size();
    assert_eq!(size, 12); // "ab cd ef" (8) + end slot + "gh" (2) + end slot
    let mut previous = 0;
    for offset in 0..size {
        let mapped = render.model_offset_at(offset).unwrap();
        assert!((1..render.model_size() - 1).contains(&mapped));
        if offset > 0 {
            assert!(
                mapped > previous,
                "not increasing at {offset}: {previous} -> {mapped}"
            );
        }
        previous = mapped;
    }
}

#[test]
fn span_delimiters_are_counted_once() {
    let model = spanned_document();
    let (_, render, _) = derive(&model, page(80.0, 24.0));

    // doc(1) + block(1) + "ab " = offsets 2..5.
    assert_eq!(render.model_offset_at(0).unwrap(), 2);
    // First char inside the span adds the span's opening delimiter.
    assert_eq!(render.model_offset_at(3).unwrap(), 6);
    // First char of "ef" sits past the span's closing delimiter.
    assert_eq!(render.model_offset_at(6).unwrap(), 10);
}

#[rstest]
#[case::wide(page(80.0, 24.0))]
#[case::wrapped(page(6.0, 24.0))]
#[case::paged(page(6.0, 2.0))]
fn screen_position_round_trips_every_offset(#[case] spec: PageSpec) {
    let model = ModelNode::branch(
        tags::DOCUMENT,
        vec![
            ModelNode::branch(
                tags::PARAGRAPH,
                vec![ModelNode::leaf(tags::TEXT, "Hello world wide web")],
            ),
            ModelNode::branch(tags::PARAGRAPH, vec![ModelNode::leaf(tags::TEXT, "Foo")]),
            ModelNode::branch(tags::PARAGRAPH, vec![]),
        ],
    );
    let (_, _, layout) = derive(&model, spec);

    for offset in 0..layout.selectable_size() {
        let (address, local) = layout.locate_box(offset, Bias::Forward).unwrap();
        let resolved = layout
            .resolve_position(LayoutNodeRef::Word(address), local)
            .unwrap();
        assert_eq!(resolved, offset, "round trip broke at {offset}");
    }
}

#[test]
fn resolve_position_clamps_into_the_node_span() {
    let model = spanned_document();
    let (_, _, layout) = derive(&model, page(80.0, 24.0));

    let (address, _) = layout.locate_box(0, Bias::Forward).unwrap();
    let word = layout.word(address).unwrap();
    // Pointer landing past a node's last position resolves inside it.
    let resolved = layout
        .resolve_position(LayoutNodeRef::Word(address), word.size() + 40)
        .unwrap();
    assert_eq!(resolved, word.size() - 1);

    let line = address.line_address();
    let resolved = layout
        .resolve_position(LayoutNodeRef::Line(line), 10_000)
        .unwrap();
    let line_box = layout.line(line).unwrap();
    assert_eq!(resolved, line_box.size() - 1);

    let resolved = layout
        .resolve_position(LayoutNodeRef::Page(0), 10_000)
        .unwrap();
    assert_eq!(resolved, layout.pages()[0].size() - 1);
}

#[test]
fn bias_resolves_edge_offsets_to_opposite_sides() {
    // Width 6 wraps "Hello world" after "Hello ": offset 6 is both the end
    // of line 1 and the start of line 2.
    let model = ModelNode::branch(
        tags::DOCUMENT,
        vec![ModelNode::branch(
            tags::PARAGRAPH,
            vec![ModelNode::leaf(tags::TEXT, "Hello world")],
        )],
    );
    let (_, _, layout) = derive(&model, page(6.0, 24.0));

    let (forward, forward_local) = layout.locate_box(6, Bias::Forward).unwrap();
    let (backward, backward_local) = layout.locate_box(6, Bias::Backward).unwrap();
    assert_eq!((forward.line, forward_local), (1, 0));
    assert_eq!((backward.line, backward_local), (0, 6));
}

#[test]
fn locate_box_rejects_offsets_past_the_span() {
    let model = spanned_document();
    let (_, _, layout) = derive(&model, page(80.0, 24.0));
    assert!(layout
        .locate_box(layout.selectable_size(), Bias::Forward)
        .is_err());
    assert!(layout
        .locate_box(layout.selectable_size(), Bias::Backward)
        .is_err());
}

#[test]
fn layout_and_render_agree_on_selectable_size() {
    let model = spanned_document();
    let (_, render, layout) = derive(&model, page(4.0, 3.0));
    assert_eq!(render.selectable_size(), layout.selectable_size());
}
