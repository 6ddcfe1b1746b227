//! Decoder for spaCy's `Doc.to_json()` document shape.

use serde::Deserialize;

use crate::{
    error::NlpError,
    parse::tree::{ParsedDocument, PartOfSpeech, RawToken, Sentence},
};

#[derive(Debug, Deserialize)]
struct SpacyDoc {
    text: String,
    #[serde(default)]
    sents: Vec<SpacySpan>,
    tokens: Vec<SpacyToken>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct SpacySpan {
    start: usize,
    end: usize,
}

#[derive(Debug, Deserialize)]
struct SpacyToken {
    id: usize,
    start: usize,
    end: usize,
    #[serde(default)]
    pos: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    dep: String,
    head: usize,
}

/// Decodes one spaCy JSON document.
pub fn from_spacy_json(json: &str) -> Result<ParsedDocument, NlpError> {
    let doc: SpacyDoc = serde_json::from_str(json)
        .map_err(|err| NlpError::malformed(format!("invalid spaCy JSON: {err}")))?;
    decode(doc)
}

/// Decodes one spaCy document that was already read as a JSON value.
pub fn from_spacy_value(value: serde_json::Value) -> Result<ParsedDocument, NlpError> {
    let doc: SpacyDoc = serde_json::from_value(value)
        .map_err(|err| NlpError::malformed(format!("invalid spaCy JSON: {err}")))?;
    decode(doc)
}

fn decode(doc: SpacyDoc) -> Result<ParsedDocument, NlpError> {
    for (position, token) in doc.tokens.iter().enumerate() {
        if token.id != position {
            return Err(NlpError::malformed(format!(
                "token ids must be dense and ordered, found {} at position {position}",
                token.id
            )));
        }
    }
    // offsets are in characters; entry `i` is the byte position of char `i`
    let char_to_byte: Vec<usize> = doc
        .text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(doc.text.len()))
        .collect();
    let spans = if doc.sents.is_empty() {
        vec![SpacySpan {
            start: 0,
            end: char_to_byte.len() - 1,
        }]
    } else {
        doc.sents.clone()
    };

    let mut sentences = Vec::with_capacity(spans.len());
    let mut cursor = 0;
    for span in spans {
        let first = cursor;
        while cursor < doc.tokens.len() && doc.tokens[cursor].end <= span.end {
            if doc.tokens[cursor].start < span.start {
                return Err(NlpError::malformed(format!(
                    "token {} starts before its sentence",
                    doc.tokens[cursor].id
                )));
            }
            cursor += 1;
        }
        if cursor == first {
            continue;
        }
        let raw = doc.tokens[first..cursor]
            .iter()
            .map(|token| token_to_raw(&doc.text, &char_to_byte, token, first, cursor))
            .collect::<Result<Vec<_>, _>>()?;
        sentences.push(Sentence::from_heads(raw, first)?);
    }
    if cursor != doc.tokens.len() {
        return Err(NlpError::malformed(format!(
            "{} tokens fall outside every sentence",
            doc.tokens.len() - cursor
        )));
    }
    Ok(ParsedDocument {
        text: doc.text,
        sentences,
    })
}

fn token_to_raw(
    text: &str,
    char_to_byte: &[usize],
    token: &SpacyToken,
    first: usize,
    end: usize,
) -> Result<RawToken, NlpError> {
    if !(first..end).contains(&token.head) {
        return Err(NlpError::malformed(format!(
            "token {} has head {} in another sentence",
            token.id, token.head
        )));
    }
    let surface = char_to_byte
        .get(token.start)
        .zip(char_to_byte.get(token.end))
        .and_then(|(&start, &end)| text.get(start..end))
        .ok_or_else(|| {
            NlpError::malformed(format!(
                "token {} span {}..{} is not inside the text",
                token.id, token.start, token.end
            ))
        })?;
    Ok(RawToken::new(
        surface,
        PartOfSpeech::from(token.pos.as_str()),
        token.tag.clone(),
        token.dep.clone(),
        token.head - first,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::fixtures;

    #[test]
    fn decodes_single_sentence_document() {
        let doc = from_spacy_json(fixtures::WHO_IS_OBAMAS_DAD_JSON).unwrap();
        assert_eq!(doc.text, "Who is Obama's Dad?");
        assert_eq!(doc.sentences.len(), 1);
        let sentence = &doc.sentences[0];
        assert_eq!(sentence.root_token().text, "is");
        let texts: Vec<_> = sentence.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Who", "is", "Obama", "'s", "Dad", "?"]);
        assert_eq!(sentence.token(2).unwrap().dep, "poss");
        assert_eq!(sentence.token(2).unwrap().pos, PartOfSpeech::Propn);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let json = r#"{
            "text": "Who is Pelé's Dad?",
            "tokens": [
                {"id": 0, "start": 0, "end": 3, "pos": "PRON", "tag": "WP", "dep": "attr", "head": 1},
                {"id": 1, "start": 4, "end": 6, "pos": "AUX", "tag": "VBZ", "dep": "ROOT", "head": 1},
                {"id": 2, "start": 7, "end": 11, "pos": "PROPN", "tag": "NNP", "dep": "poss", "head": 4},
                {"id": 3, "start": 11, "end": 13, "pos": "PART", "tag": "POS", "dep": "case", "head": 2},
                {"id": 4, "start": 14, "end": 17, "pos": "PROPN", "tag": "NNP", "dep": "nsubj", "head": 1},
                {"id": 5, "start": 17, "end": 18, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 1}
            ]
        }"#;
        let doc = from_spacy_json(json).unwrap();
        assert_eq!(doc.sentences.len(), 1);
        let texts: Vec<_> = doc.sentences[0]
            .tokens()
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Who", "is", "Pelé", "'s", "Dad", "?"]);
    }

    #[test]
    fn span_past_the_last_character_is_rejected() {
        let json = r#"{
            "text": "Pelé",
            "tokens": [{"id": 0, "start": 0, "end": 5, "pos": "PROPN", "tag": "NNP", "dep": "ROOT", "head": 0}]
        }"#;
        let err = from_spacy_json(json).unwrap_err();
        assert!(err.to_string().contains("not inside the text"));
    }

    #[test]
    fn splits_tokens_into_sentences() {
        let json = r#"{
            "text": "Paris. Why?",
            "sents": [{"start": 0, "end": 6}, {"start": 7, "end": 11}],
            "tokens": [
                {"id": 0, "start": 0, "end": 5, "pos": "PROPN", "tag": "NNP", "dep": "ROOT", "head": 0},
                {"id": 1, "start": 5, "end": 6, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 0},
                {"id": 2, "start": 7, "end": 10, "pos": "ADV", "tag": "WRB", "dep": "ROOT", "head": 2},
                {"id": 3, "start": 10, "end": 11, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 2}
            ]
        }"#;
        let doc = from_spacy_json(json).unwrap();
        assert_eq!(doc.sentences.len(), 2);
        assert_eq!(doc.sentences[1].root_token().text, "Why");
        assert_eq!(doc.sentences[1].root_token().index, 2);
        assert_eq!(doc.sentences[1].root(), 0);
    }

    #[test]
    fn missing_sentences_cover_the_whole_text() {
        let json = r#"{
            "text": "Paris",
            "tokens": [{"id": 0, "start": 0, "end": 5, "pos": "PROPN", "tag": "NNP", "dep": "ROOT", "head": 0}]
        }"#;
        let doc = from_spacy_json(json).unwrap();
        assert_eq!(doc.sentences.len(), 1);
    }

    #[test]
    fn rejects_heads_crossing_sentences() {
        let json = r#"{
            "text": "A. B.",
            "sents": [{"start": 0, "end": 2}, {"start": 3, "end": 5}],
            "tokens": [
                {"id": 0, "start": 0, "end": 1, "pos": "X", "tag": "", "dep": "ROOT", "head": 0},
                {"id": 1, "start": 1, "end": 2, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 2},
                {"id": 2, "start": 3, "end": 4, "pos": "X", "tag": "", "dep": "ROOT", "head": 2},
                {"id": 3, "start": 4, "end": 5, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 2}
            ]
        }"#;
        let err = from_spacy_json(json).unwrap_err();
        assert!(err.to_string().contains("another sentence"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            from_spacy_json("{\"text\": 3}"),
            Err(NlpError::MalformedDocument { .. })
        ));
    }
}
