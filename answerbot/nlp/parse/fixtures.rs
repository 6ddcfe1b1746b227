//! Hand-pinned parses shared by the unit tests.

use crate::parse::tree::{
    PartOfSpeech::{self, Adp, Det, Noun, Pron, Propn, Punct, Verb},
    RawToken, Sentence,
};

/// spaCy JSON for "Who is Obama's Dad?" (en_core_web_sm 2.x labels).
pub const WHO_IS_OBAMAS_DAD_JSON: &str = r#"{
    "text": "Who is Obama's Dad?",
    "sents": [{"start": 0, "end": 19}],
    "tokens": [
        {"id": 0, "start": 0, "end": 3, "pos": "PRON", "tag": "WP", "dep": "attr", "head": 1},
        {"id": 1, "start": 4, "end": 6, "pos": "VERB", "tag": "VBZ", "dep": "ROOT", "head": 1},
        {"id": 2, "start": 7, "end": 12, "pos": "PROPN", "tag": "NNP", "dep": "poss", "head": 4},
        {"id": 3, "start": 12, "end": 14, "pos": "PART", "tag": "POS", "dep": "case", "head": 2},
        {"id": 4, "start": 15, "end": 18, "pos": "PROPN", "tag": "NNP", "dep": "nsubj", "head": 1},
        {"id": 5, "start": 18, "end": 19, "pos": "PUNCT", "tag": ".", "dep": "punct", "head": 1}
    ]
}"#;

pub fn sentence(tokens: &[(&str, PartOfSpeech, &str, &str, usize)]) -> Sentence {
    let raw = tokens
        .iter()
        .map(|&(text, pos, tag, dep, head)| RawToken::new(text, pos, tag, dep, head))
        .collect();
    Sentence::from_heads(raw, 0).unwrap()
}

pub fn who_is_obamas_dad() -> Sentence {
    sentence(&[
        ("Who", Pron, "WP", "attr", 1),
        ("is", Verb, "VBZ", "ROOT", 1),
        ("Obama", Propn, "NNP", "poss", 4),
        ("'s", PartOfSpeech::Part, "POS", "case", 2),
        ("Dad", Propn, "NNP", "nsubj", 1),
        ("?", Punct, ".", "punct", 1),
    ])
}

pub fn capital_of_france() -> Sentence {
    sentence(&[
        ("What", Pron, "WP", "attr", 1),
        ("is", Verb, "VBZ", "ROOT", 1),
        ("the", Det, "DT", "det", 3),
        ("capital", Noun, "NN", "nsubj", 1),
        ("of", Adp, "IN", "prep", 3),
        ("France", Propn, "NNP", "pobj", 4),
        ("?", Punct, ".", "punct", 1),
    ])
}

pub fn where_was_obama_born() -> Sentence {
    sentence(&[
        ("Where", PartOfSpeech::Adv, "WRB", "advmod", 3),
        ("was", Verb, "VBD", "auxpass", 3),
        ("Obama", Propn, "NNP", "nsubjpass", 3),
        ("born", Verb, "VBN", "ROOT", 3),
        ("?", Punct, ".", "punct", 3),
    ])
}

pub fn which_did_he_choose() -> Sentence {
    sentence(&[
        ("Which", Det, "WDT", "dobj", 3),
        ("did", Verb, "VBD", "aux", 3),
        ("he", Pron, "PRP", "nsubj", 3),
        ("choose", Verb, "VB", "ROOT", 3),
        ("?", Punct, ".", "punct", 3),
    ])
}

pub fn what_did_obama_do() -> Sentence {
    sentence(&[
        ("What", Pron, "WP", "dobj", 3),
        ("did", Verb, "VBD", "aux", 3),
        ("Obama", Propn, "NNP", "nsubj", 3),
        ("do", Verb, "VB", "ROOT", 3),
        ("?", Punct, ".", "punct", 3),
    ])
}

pub fn who_is_the_man_that_obama_met() -> Sentence {
    sentence(&[
        ("Who", Pron, "WP", "attr", 1),
        ("is", Verb, "VBZ", "ROOT", 1),
        ("the", Det, "DT", "det", 3),
        ("man", Noun, "NN", "nsubj", 1),
        ("that", Pron, "WDT", "dobj", 6),
        ("Obama", Propn, "NNP", "nsubj", 6),
        ("met", Verb, "VBD", "relcl", 3),
        ("?", Punct, ".", "punct", 1),
    ])
}
