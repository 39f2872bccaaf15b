//! Vue single-file-component reader.
//!
//! Only `<script>` blocks are analyzed; each block is tokenized with the
//! JavaScript or TypeScript lexer depending on its `lang` attribute, with
//! line numbers offset to the block's position in the original file. All
//! blocks feed one recognizer pass, so a component's functions end up in a
//! single report.

use crate::analysis::JS_CONDITIONS;
use crate::lexer::js::JsTokenFilter;
use crate::lexer::Token;

use super::split::{self, RegionKind};
use super::{javascript, typescript, Reader};

pub struct VueReader;

impl Reader for VueReader {
    fn language(&self) -> &str {
        "vue"
    }

    fn extensions(&self) -> &[&str] {
        &["vue"]
    }

    fn conditions(&self) -> &'static phf::Set<&'static str> {
        &JS_CONDITIONS
    }

    fn generate_tokens<'s>(&self, source: &'s str) -> Box<dyn Iterator<Item = Token> + 's> {
        // Blocks are tokenized on demand as the stream reaches them.
        Box::new(
            split::split(source)
                .into_iter()
                .filter(|region| region.kind == RegionKind::Script)
                .flat_map(|region| {
                    let typed = matches!(region.lang.as_deref(), Some("ts" | "typescript"));
                    let lexer = if typed {
                        typescript::lexer()
                    } else {
                        javascript::lexer()
                    };
                    JsTokenFilter::new(lexer.tokenize(region.text, region.start_line), false)
                }),
        )
    }
}
