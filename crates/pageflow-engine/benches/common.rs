// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
use pageflow_engine::registry::tags;
use pageflow_engine::ModelNode;

const WORDS: &[&str] = &[
    "layout", "engine", "cursor", "page", "line", "word", "offset", "render", "model", "tree",
];

#[allow(dead_code)]
pub fn generate_document(blocks: usize, words_per_block: usize) -> ModelNode {
    let children = (0..blocks)
        .map(|block| {
            let text = (0..words_per_block)
                .map(|word| WORDS[(block + word) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ");
            ModelNode::branch(tags::PARAGRAPH, vec![ModelNode::leaf(tags::TEXT, text)])
        })
        .collect();
    ModelNode::branch(tags::DOCUMENT, children)
}
