//! Index schema and per-pool text analysis.

use std::path::Path;

use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{
    Language, LowerCaser, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer,
};
use tantivy::Index;

/// Stored chunk text, indexed with positions.
pub const CONTENT_FIELD: &str = "content";
/// Raw stored path of the file a chunk came from.
pub const PATH_FIELD: &str = "doc_path";

const TOKENIZER_NAME: &str = "pool_text";

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let _path_field = schema_builder.add_text_field(PATH_FIELD, STRING | STORED);
    let content_indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKENIZER_NAME)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let content_options = TextOptions::default()
        .set_indexing_options(content_indexing)
        .set_stored();
    let _content_field = schema_builder.add_text_field(CONTENT_FIELD, content_options);
    schema_builder.build()
}

/// Register the pool's analyzer on an index handle.
///
/// Build and query must register the identical chain, otherwise stemmed
/// query terms will not line up with the indexed terms.
pub fn register_analyzer(index: &Index, stemming: &str, stopwords: Option<&Path>) {
    let mut builder = TextAnalyzer::builder(SimpleTokenizer::default()).filter_dynamic(LowerCaser);
    if let Some(words) = stopwords.and_then(read_stopwords) {
        if !words.is_empty() {
            builder = builder.filter_dynamic(StopWordFilter::remove(words));
        }
    }
    if let Some(language) = stemming_language(stemming) {
        builder = builder.filter_dynamic(Stemmer::new(language));
    }
    index.tokenizers().register(TOKENIZER_NAME, builder.build());
}

/// One stopword per line; blank lines are skipped.
fn read_stopwords(file: &Path) -> Option<Vec<String>> {
    let content = std::fs::read_to_string(file).ok()?;
    Some(
        content
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Map a pool's stemming-language code onto the engine's stemmer set.
/// Unknown codes (including "none") disable stemming.
fn stemming_language(code: &str) -> Option<Language> {
    match code.to_ascii_lowercase().as_str() {
        "ar" | "arabic" => Some(Language::Arabic),
        "da" | "danish" => Some(Language::Danish),
        "nl" | "dutch" => Some(Language::Dutch),
        "en" | "english" => Some(Language::English),
        "fi" | "finnish" => Some(Language::Finnish),
        "fr" | "french" => Some(Language::French),
        "de" | "german" => Some(Language::German),
        "el" | "greek" => Some(Language::Greek),
        "hu" | "hungarian" => Some(Language::Hungarian),
        "it" | "italian" => Some(Language::Italian),
        "no" | "norwegian" => Some(Language::Norwegian),
        "pt" | "portuguese" => Some(Language::Portuguese),
        "ro" | "romanian" => Some(Language::Romanian),
        "ru" | "russian" => Some(Language::Russian),
        "es" | "spanish" => Some(Language::Spanish),
        "sv" | "swedish" => Some(Language::Swedish),
        "ta" | "tamil" => Some(Language::Tamil),
        "tr" | "turkish" => Some(Language::Turkish),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes_and_names_both_map() {
        assert!(matches!(stemming_language("en"), Some(Language::English)));
        assert!(matches!(stemming_language("English"), Some(Language::English)));
        assert!(stemming_language("none").is_none());
        assert!(stemming_language("").is_none());
    }
}
